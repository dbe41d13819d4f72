//! The streaming seam between the chat session and the HTTP client.
//!
//! A session only needs three operations from whatever produces chunks:
//! open a stream for a request, receive the next chunk, and close the
//! stream. [`ChatBackend`] and [`ChunkStream`] capture exactly that, so the
//! session can be driven by the real [`OpenAi`](crate::OpenAi) client or by a
//! scripted sequence of chunks.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};

use crate::client_logger::ClientLogger;
use crate::error::Result;
use crate::observability::{STREAM_DURATION, STREAM_TTFB};
use crate::types::{ChatCompletionChunk, ChatCompletionRequest};

/// A live stream of chunks for one chat turn.
#[async_trait::async_trait]
pub trait ChunkStream: Send {
    /// Wait for the next chunk.
    ///
    /// `Ok(None)` signals end-of-stream; it is returned again on every call
    /// after the stream ended or was closed.
    async fn recv(&mut self) -> Result<Option<ChatCompletionChunk>>;

    /// Release the underlying connection. Calling it twice is harmless.
    fn close(&mut self);
}

/// Something that can open chat streams.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Open a stream for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the server
    /// rejected it before streaming began.
    async fn open_stream(&self, request: &ChatCompletionRequest)
    -> Result<Box<dyn ChunkStream>>;
}

/// A [`ChunkStream`] over any stream of decoded chunks.
pub struct ChatStream {
    inner: Option<Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>>,
    logger: Option<Arc<dyn ClientLogger>>,
    opened_at: Instant,
    received_first: bool,
}

impl ChatStream {
    /// Wrap a stream of chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<ChatCompletionChunk>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(stream)),
            logger: None,
            opened_at: Instant::now(),
            received_first: false,
        }
    }

    /// Wrap an already-known sequence of chunks.
    pub fn from_chunks(chunks: Vec<ChatCompletionChunk>) -> Self {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Report every received chunk to `logger`.
    pub fn with_logger(mut self, logger: Option<Arc<dyn ClientLogger>>) -> Self {
        self.logger = logger;
        self
    }

    /// Returns true once the stream ended or was closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("closed", &self.is_closed())
            .field("received_first", &self.received_first)
            .finish()
    }
}

#[async_trait::async_trait]
impl ChunkStream for ChatStream {
    async fn recv(&mut self) -> Result<Option<ChatCompletionChunk>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        match inner.next().await {
            Some(Ok(chunk)) => {
                if !self.received_first {
                    self.received_first = true;
                    STREAM_TTFB.add(self.opened_at.elapsed().as_secs_f64());
                }
                if let Some(logger) = &self.logger {
                    logger.log_chunk(&chunk);
                }
                Ok(Some(chunk))
            }
            Some(Err(err)) => Err(err),
            None => {
                self.close();
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if self.inner.take().is_some() {
            STREAM_DURATION.add(self.opened_at.elapsed().as_secs_f64());
        }
    }
}
