//! Incremental decoder for the gateway's `data:` frame stream
//!
//! Bytes arrive in arbitrary chunks. The decoder accumulates them, splits on
//! newlines and parses each complete `data:` line. A JSON payload that does not
//! parse is held back and joined with the following line(s) until it does.

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Output of the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A piece of assistant text
    Delta(String),
    /// The `[DONE]` sentinel was seen
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecoderState {
    /// Reading lines normally
    Streaming,
    /// A data payload failed to parse and waits for its continuation
    Rebuffered { frame: String },
    /// `[DONE]` seen; further input is ignored
    Done,
}

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Result of trying to read one payload
enum Payload {
    Parsed(Option<String>),
    Incomplete,
}

fn parse_payload(json: &str) -> Payload {
    match serde_json::from_str::<Chunk>(json) {
        Ok(chunk) => Payload::Parsed(
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content)
                .filter(|s| !s.is_empty()),
        ),
        Err(_) => Payload::Incomplete,
    }
}

/// Line-oriented stream decoder
#[derive(Debug)]
pub struct SseDecoder {
    buffer: String,
    state: DecoderState,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            state: DecoderState::Streaming,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == DecoderState::Done
    }

    /// Feed a chunk of text; returns the events completed by it
    pub fn push(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.is_done() {
            return events;
        }
        self.buffer.push_str(chunk);

        while let Some(pos) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }

            if let Some(event) = self.handle_line(&line) {
                let done = event == StreamEvent::Done;
                events.push(event);
                if done {
                    self.buffer.clear();
                    break;
                }
            }
        }

        events
    }

    /// Flush the unterminated tail once the transport closes
    pub fn finish(&mut self) -> EngineResult<Vec<StreamEvent>> {
        let mut events = Vec::new();

        if !self.is_done() && !self.buffer.is_empty() {
            let mut line = std::mem::take(&mut self.buffer);
            if line.ends_with('\r') {
                line.pop();
            }
            events.extend(self.handle_line(&line));
        }

        match std::mem::replace(&mut self.state, DecoderState::Done) {
            DecoderState::Rebuffered { frame } => {
                warn!("stream closed with an incomplete frame ({} bytes)", frame.len());
                Err(EngineError::Stream(format!("truncated frame: {}", frame)))
            }
            _ => Ok(events),
        }
    }

    fn handle_line(&mut self, line: &str) -> Option<StreamEvent> {
        match std::mem::replace(&mut self.state, DecoderState::Streaming) {
            DecoderState::Done => {
                self.state = DecoderState::Done;
                None
            }
            DecoderState::Streaming => self.handle_fresh_line(line),
            DecoderState::Rebuffered { frame } => {
                // A self-contained frame supersedes the stale partial
                if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
                    if payload.trim() == DONE_SENTINEL || matches!(parse_payload(payload), Payload::Parsed(_)) {
                        debug!("dropping stale partial frame ({} bytes)", frame.len());
                        return self.handle_fresh_line(line);
                    }
                }

                let joined = format!("{}{}", frame, line);
                match parse_payload(&joined) {
                    Payload::Parsed(content) => content.map(StreamEvent::Delta),
                    Payload::Incomplete => {
                        self.state = DecoderState::Rebuffered { frame: joined };
                        None
                    }
                }
            }
        }
    }

    fn handle_fresh_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() || line.starts_with(':') {
            return None;
        }
        let payload = line.strip_prefix(DATA_PREFIX)?;

        if payload.trim() == DONE_SENTINEL {
            self.state = DecoderState::Done;
            return Some(StreamEvent::Done);
        }

        match parse_payload(payload) {
            Payload::Parsed(content) => content.map(StreamEvent::Delta),
            Payload::Incomplete => {
                self.state = DecoderState::Rebuffered {
                    frame: payload.to_string(),
                };
                None
            }
        }
    }
}

/// Decode a complete response body in one go
pub fn decode_all(body: &str) -> EngineResult<Vec<StreamEvent>> {
    let mut decoder = SseDecoder::new();
    let mut events = decoder.push(body);
    events.extend(decoder.finish()?);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
        )
    }

    fn deltas(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Delta(s) => Some(s.as_str()),
                StreamEvent::Done => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_stream() {
        let body = format!("{}{}data: [DONE]\n", frame("Hello"), frame(", world"));
        let events = decode_all(&body).unwrap();
        assert_eq!(deltas(&events), "Hello, world");
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[test]
    fn test_split_across_chunks() {
        let body = format!("{}{}", frame("abc"), frame("def"));
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        for piece in body.as_bytes().chunks(7) {
            events.extend(decoder.push(std::str::from_utf8(piece).unwrap()));
        }
        events.extend(decoder.finish().unwrap());
        assert_eq!(deltas(&events), "abcdef");
    }

    #[test]
    fn test_crlf_comments_and_other_fields() {
        let body = format!(
            ": keep-alive\r\n\r\nevent: message\r\n{}\r\ndata: [DONE]\r\n",
            frame("x").trim_end()
        );
        let events = decode_all(&body).unwrap();
        assert_eq!(events, vec![StreamEvent::Delta("x".into()), StreamEvent::Done]);
    }

    #[test]
    fn test_done_stops_processing() {
        let body = format!("data: [DONE]\n{}", frame("ignored"));
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.push(&body), vec![StreamEvent::Done]);
        assert!(decoder.is_done());
        assert!(decoder.push(&frame("later")).is_empty());
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_rebuffered_frame_joins_next_line() {
        let body = "data: {\"choices\":[{\"delta\":\n{\"content\":\"joined\"}}]}\n";
        let events = decode_all(body).unwrap();
        assert_eq!(events, vec![StreamEvent::Delta("joined".into())]);
    }

    #[test]
    fn test_stale_partial_superseded() {
        let body = format!("data: {{\"choices\":[\n{}", frame("fresh"));
        let events = decode_all(&body).unwrap();
        assert_eq!(events, vec![StreamEvent::Delta("fresh".into())]);
    }

    #[test]
    fn test_unterminated_tail_flushed() {
        let body = frame("tail");
        let events = decode_all(body.trim_end()).unwrap();
        assert_eq!(events, vec![StreamEvent::Delta("tail".into())]);
    }

    #[test]
    fn test_truncated_frame_is_error() {
        let mut decoder = SseDecoder::new();
        decoder.push("data: {\"choices\":[{\"delta\"\n");
        assert!(matches!(decoder.finish(), Err(EngineError::Stream(_))));
    }

    #[test]
    fn test_empty_content_skipped() {
        let body = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n";
        assert!(decode_all(body).unwrap().is_empty());
    }
}
