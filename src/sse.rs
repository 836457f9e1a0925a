//! Server-Sent Events decoding for the streaming chat endpoint.
//!
//! One shared splitter/decoder pair is used by every streaming call site,
//! so the quirks of the backend's framing are handled in exactly one place.
//!
//! Wire format:
//! ```text
//! data: {"id":"chatcmpl-...","choices":[{"delta":{"content":"……嗯"}}]}
//!
//! data: [DONE]
//! ```
//!
//! Observed quirks that must not break a session: doubled `data:data: `
//! prefixes, bare `data:` lines, unparseable payloads, and chunk
//! boundaries falling anywhere, including inside a multi-byte character.

use serde::Deserialize;
use tracing::warn;

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

/// Accumulates transport chunks and yields complete lines.
///
/// Only newline-terminated content counts as a line: whatever trails the
/// last newline stays buffered for the next [`feed`](LineSplitter::feed),
/// and a partial line still buffered when the transport closes is
/// discarded with the splitter.
///
/// The buffer holds raw bytes rather than decoded text so a chunk ending
/// in the middle of a UTF-8 sequence reassembles cleanly.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one transport chunk and return every line it completes,
    /// in order, without their terminating newline.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// One decoded event from a single line of the stream.
#[derive(Debug, Clone)]
pub enum EventRecord {
    /// A data line carrying a parsed payload.
    Data(StreamChunk),
    /// The `[DONE]` sentinel: the producer has finished emitting.
    Terminator,
    /// Blank lines, comment/field lines, bare or partial `data:` frames,
    /// and payloads that fail to parse. Skipped, never fatal.
    Ignorable,
}

/// Decode one complete line into an [`EventRecord`].
///
/// `data:` prefixes are stripped repeatedly, tolerating the doubled
/// `data:data: {...}` frames the backend occasionally produces. The
/// terminator comparison is exact equality after stripping and trimming.
/// A payload that fails to parse is logged and skipped; a single
/// malformed record never terminates the stream.
pub fn decode_line(line: &str) -> EventRecord {
    if line.trim().is_empty() {
        return EventRecord::Ignorable;
    }

    // The prefix must sit at column 0; an indented "data:" is not an
    // SSE frame on this backend.
    if !line.starts_with(DATA_PREFIX) {
        return EventRecord::Ignorable;
    }

    let mut payload = line;

    while let Some(rest) = payload.strip_prefix(DATA_PREFIX) {
        payload = rest.trim();
    }

    if payload == DONE_MARKER {
        return EventRecord::Terminator;
    }

    if payload.is_empty() {
        // A lone "data:" is an incomplete frame, not an error.
        return EventRecord::Ignorable;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => EventRecord::Data(chunk),
        Err(err) => {
            warn!(error = %err, payload, "skipping undecodable stream event");
            EventRecord::Ignorable
        }
    }
}

/// Payload of one data event, in the chat-completion chunk shape.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Incremental slice of the reply. Metadata-only frames (e.g. the
/// role announcement) carry no content, which is expected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// The first choice's incremental content, if present and non-empty.
    pub fn delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}
