//! Server-Sent Events (SSE) processing for streamed chat completions.
//!
//! OpenAI-compatible servers send one JSON chunk per `data:` frame and finish
//! with `data: [DONE]`. This module turns the raw byte stream of an HTTP
//! response into a stream of [`ChatCompletionChunk`] values.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::types::ChatCompletionChunk;
use crate::{Error, Result};

/// Payload that marks the end of a stream.
const DONE_MARKER: &str = "[DONE]";

/// One decoded SSE frame.
#[derive(Debug)]
enum Frame {
    /// A chunk, or the error that replaced it.
    Chunk(Result<ChatCompletionChunk>),
    /// The `[DONE]` marker.
    Done,
    /// Comments, keep-alives and empty payloads.
    Skip,
}

/// Process a stream of bytes into a stream of chat completion chunks.
///
/// The returned stream ends on `[DONE]` or when the byte stream ends. A
/// transport error is yielded once and then ends the stream. Text outside of
/// any SSE field, such as a plain JSON error body, is yielded as an error.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    // Convert transport errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    stream::unfold(
        (stream, LineBuffer::default(), false),
        move |(mut stream, mut buffer, mut finished)| async move {
            loop {
                if finished {
                    return None;
                }

                // First check if we have a complete frame in the buffer
                if let Some(frame) = buffer.take_frame() {
                    match decode_frame(&frame) {
                        Frame::Chunk(chunk) => {
                            count_chunk(&chunk);
                            return Some((chunk, (stream, buffer, finished)));
                        }
                        Frame::Done => return None,
                        Frame::Skip => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.push(&bytes);
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        finished = true;
                        return Some((Err(e), (stream, buffer, finished)));
                    }
                    None => {
                        // End of stream; the server may omit the final blank line.
                        finished = true;
                        let frame = buffer.take_rest();
                        if frame.iter().all(u8::is_ascii_whitespace) {
                            return None;
                        }
                        match decode_frame(&frame) {
                            Frame::Chunk(chunk) => {
                                count_chunk(&chunk);
                                return Some((chunk, (stream, buffer, finished)));
                            }
                            Frame::Done | Frame::Skip => return None,
                        }
                    }
                }
            }
        },
    )
}

fn count_chunk(chunk: &Result<ChatCompletionChunk>) {
    if chunk.is_ok() {
        STREAM_CHUNKS.click();
    } else {
        STREAM_ERRORS.click();
    }
}

/// Bytes received so far, with every line ending rewritten to `\n`.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A `\r` at the end of one
/// read may pair with a `\n` at the start of the next.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
    after_cr: bool,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                b'\r' => {
                    self.bytes.push(b'\n');
                    self.after_cr = true;
                }
                b'\n' if self.after_cr => self.after_cr = false,
                b => {
                    self.bytes.push(b);
                    self.after_cr = false;
                }
            }
        }
    }

    /// Remove the first complete frame (terminated by a blank line).
    fn take_frame(&mut self) -> Option<Vec<u8>> {
        let end = self.bytes.windows(2).position(|w| w == b"\n\n")?;
        let frame = self.bytes[..end].to_vec();
        self.bytes.drain(..end + 2);
        Some(frame)
    }

    fn take_rest(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

/// Decode a single frame.
///
/// Only `data:` lines matter; `event:`, `id:`, `retry:` and `:` comment
/// lines are ignored. Multiple data lines are joined with a newline. A frame
/// with no `data:` line but other text is a response body that was never
/// SSE, and becomes an error.
fn decode_frame(frame: &[u8]) -> Frame {
    let text = match std::str::from_utf8(frame) {
        Ok(text) => text,
        Err(e) => return Frame::Chunk(Err(e.into())),
    };

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data.is_empty() {
        let stray: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim().is_empty() && !is_field_line(line))
            .collect();
        if stray.is_empty() {
            return Frame::Skip;
        }
        return Frame::Chunk(Err(unexpected_body(&stray.join("\n"))));
    }
    let data = data.join("\n");
    let data = data.trim();

    match data {
        "" => Frame::Skip,
        DONE_MARKER => Frame::Done,
        json => Frame::Chunk(parse_chunk(json)),
    }
}

fn is_field_line(line: &str) -> bool {
    line.starts_with(':')
        || ["event:", "id:", "retry:"]
            .iter()
            .any(|field| line.starts_with(field))
        || matches!(line, "event" | "id" | "retry" | "data")
}

/// An error for text that arrived outside of any SSE field.
fn unexpected_body(text: &str) -> Error {
    let text = text.trim();
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => match value.get("error").filter(|e| e.is_object()) {
            Some(error) => stream_error(error),
            None => Error::streaming(format!("unexpected response body: {text}"), None),
        },
        Err(_) => Error::streaming(format!("unexpected response body: {text}"), None),
    }
}

/// Parse a data payload, turning an in-band error envelope into an `Error`.
fn parse_chunk(json: &str) -> Result<ChatCompletionChunk> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
        Error::serialization(
            format!("Failed to parse chunk JSON: {e}"),
            Some(Box::new(e)),
        )
    })?;
    if let Some(error) = value.get("error").filter(|e| e.is_object()) {
        return Err(stream_error(error));
    }
    Ok(serde_json::from_value(value)?)
}

fn stream_error(error: &serde_json::Value) -> Error {
    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
        code: Option<serde_json::Value>,
    }

    let detail: Option<ErrorDetail> = serde_json::from_value(error.clone()).ok();
    let status_code = detail
        .as_ref()
        .and_then(|d| d.code.as_ref())
        .and_then(serde_json::Value::as_u64)
        .filter(|code| (400..600).contains(code))
        .map(|code| code as u16)
        .unwrap_or(500);
    let error_type = detail
        .as_ref()
        .and_then(|d| d.error_type.clone())
        .or_else(|| Some("stream_error".to_string()));
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| error.to_string());
    Error::api(status_code, error_type, message, None)
}
