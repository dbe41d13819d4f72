//! Logging hook for client traffic.
//!
//! This module provides the [`ClientLogger`] trait that lets an embedder
//! capture what passes through the [`OpenAi`](crate::OpenAi) client.

use crate::{ChatCompletionChunk, ChatCompletionRequest, ModelListResponse};

/// A trait for logging client operations.
///
/// Install an implementation with [`OpenAi::with_logger`](crate::OpenAi::with_logger)
/// to record requests and every decoded chunk, e.g. for replaying a
/// provider's stream in a test.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Mutex;
/// use thinkstream::{ChatCompletionChunk, ChatCompletionRequest, ClientLogger, ModelListResponse};
///
/// struct JsonLinesLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for JsonLinesLogger {
///     fn log_request(&self, request: &ChatCompletionRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_chunk(&self, chunk: &ChatCompletionChunk) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
///
///     fn log_models(&self, _: &ModelListResponse) {}
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a chat request just before it is sent.
    fn log_request(&self, request: &ChatCompletionRequest);

    /// Log one decoded streaming chunk.
    ///
    /// Called for every chunk a stream yields, in order, including
    /// usage-only chunks with no choices.
    fn log_chunk(&self, chunk: &ChatCompletionChunk);

    /// Log the response of a model listing.
    fn log_models(&self, models: &ModelListResponse);
}
