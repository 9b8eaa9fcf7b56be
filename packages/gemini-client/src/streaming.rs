//! SSE streaming parser for `streamGenerateContent?alt=sse`.
//!
//! Converts a raw `reqwest` byte stream into `StreamChunk` values.
//! Gemini sends one `data: {json}` line per event and simply closes the
//! connection when done; there is no `[DONE]` sentinel.

use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::GeminiError;
use crate::types::{ErrorEnvelope, GenerateContentResponse};

/// A single text fragment from a streamed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// The text produced by this event (may be empty).
    pub text: String,
    /// Finish reason reported on the final event, if any.
    pub finish_reason: Option<String>,
}

/// Stream adapter that converts raw SSE bytes into `StreamChunk` values.
pub struct GenerateContentStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: Vec<u8>,
    finished: bool,
}

impl GenerateContentStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: Vec::new(),
            finished: false,
        }
    }
}

impl Stream for GenerateContentStream {
    type Item = Result<StreamChunk, GeminiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(item) = next_event(&mut this.buffer) {
                return Poll::Ready(Some(item));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(GeminiError::Network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    // Flush a trailing event that arrived without its newline
                    this.finished = true;
                    if !this.buffer.is_empty() {
                        this.buffer.push(b'\n');
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Pop complete lines off the buffer until one yields an event.
/// Returns `None` when no complete data line is buffered yet.
fn next_event(buffer: &mut Vec<u8>) -> Option<Result<StreamChunk, GeminiError>> {
    loop {
        let newline_pos = buffer.iter().position(|b| *b == b'\n')?;
        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

        let line = match std::str::from_utf8(&line_bytes) {
            Ok(line) => line.trim(),
            Err(e) => {
                return Some(Err(GeminiError::Parse(format!(
                    "Invalid UTF-8 in stream: {}",
                    e
                ))))
            }
        };

        // Blank lines separate events; "event:", "id:" and comments carry nothing we use
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };

        return Some(parse_event(data.trim()));
    }
}

/// First 200 characters of a payload, for error messages.
fn preview(data: &str) -> &str {
    data.char_indices().nth(200).map_or(data, |(i, _)| &data[..i])
}

fn parse_event(data: &str) -> Result<StreamChunk, GeminiError> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        GeminiError::Parse(format!(
            "Failed to parse stream event: {} (data: {})",
            e,
            preview(data)
        ))
    })?;

    if value.get("error").is_some() {
        let envelope: ErrorEnvelope = serde_json::from_value(value)
            .map_err(|e| GeminiError::Parse(format!("Malformed error payload: {}", e)))?;
        return Err(GeminiError::Api(envelope.error.to_string()));
    }

    let response: GenerateContentResponse = serde_json::from_value(value)
        .map_err(|e| GeminiError::Parse(format!("Unexpected stream event: {}", e)))?;

    if let Some(reason) = response.block_reason() {
        return Err(GeminiError::Api(format!("Prompt blocked: {}", reason)));
    }

    Ok(StreamChunk {
        text: response.text(),
        finish_reason: response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn event(text: &str) -> String {
        format!(
            r#"data: {{"candidates":[{{"content":{{"role":"model","parts":[{{"text":"{}"}}]}}}}]}}"#,
            text
        )
    }

    fn stream_of(pieces: Vec<String>) -> GenerateContentStream {
        let data: Vec<Result<Bytes, reqwest::Error>> =
            pieces.into_iter().map(|p| Ok(Bytes::from(p))).collect();
        GenerateContentStream::new(futures::stream::iter(data))
    }

    #[tokio::test]
    async fn test_parse_multiple_events() {
        let mut stream = stream_of(vec![
            format!("{}\r\n\r\n", event("Hel")),
            format!("{}\r\n\r\n", event("lo")),
        ]);

        assert_eq!(stream.next().await.unwrap().unwrap().text, "Hel");
        assert_eq!(stream.next().await.unwrap().unwrap().text, "lo");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_long_non_json_line_with_multibyte_text_is_a_parse_error() {
        let mut stream = stream_of(vec![format!("data: {}ééé\n", "x".repeat(199))]);

        match stream.next().await.unwrap() {
            Err(GeminiError::Parse(message)) => {
                assert!(message.contains(&format!("{}é", "x".repeat(199))));
                assert!(!message.contains("éé"));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_event_split_across_reads() {
        let line = format!("{}\n\n", event("split"));
        let (head, tail) = line.split_at(17);
        let mut stream = stream_of(vec![head.to_string(), tail.to_string()]);

        assert_eq!(stream.next().await.unwrap().unwrap().text, "split");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_multibyte_char_split_across_reads() {
        let line = format!("{}\n", event("héllo"));
        let bytes = line.into_bytes();
        let cut = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let data: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(bytes[..cut].to_vec())),
            Ok(Bytes::from(bytes[cut..].to_vec())),
        ];
        let mut stream = GenerateContentStream::new(futures::stream::iter(data));

        assert_eq!(stream.next().await.unwrap().unwrap().text, "héllo");
    }

    #[tokio::test]
    async fn test_trailing_event_without_newline() {
        let mut stream = stream_of(vec![event("last")]);

        assert_eq!(stream.next().await.unwrap().unwrap().text, "last");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_payload_becomes_api_error() {
        let mut stream = stream_of(vec![
            r#"data: {"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
                .to_string()
                + "\n",
        ]);

        match stream.next().await.unwrap() {
            Err(GeminiError::Api(msg)) => assert!(msg.contains("Quota exceeded")),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_finish_reason_and_empty_text() {
        let mut stream = stream_of(vec![
            r#"data: {"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#.to_string()
                + "\n",
        ]);

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.text, "");
        assert_eq!(chunk.finish_reason.as_deref(), Some("STOP"));
    }
}
