//! Incremental NDJSON decoding
//!
//! Chunks arrive with arbitrary boundaries: a JSON line, or even a single
//! UTF-8 character, may be split across reads. The decoder holds back the
//! incomplete tail and only emits whole lines.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::record::EventRecord;

/// Stream-aware UTF-8 decoder
///
/// Bytes of a multi-byte character cut off at the end of a chunk are kept
/// until the next chunk completes them. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all text that is complete so far
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        None => {
                            // Incomplete sequence at the end, wait for more bytes
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    /// Flush at end of input; a dangling partial character becomes U+FFFD
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Counters kept for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub chunks: usize,
    pub bytes: usize,
    pub records: usize,
    pub blank_lines: usize,
    pub malformed: usize,
}

/// What was left when the stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSummary {
    pub stats: DecodeStats,
    /// Unterminated trailing text that was dropped, if any
    pub dropped_partial: Option<String>,
}

/// Newline-delimited JSON decoder for one response stream
///
/// Not restartable: a new stream needs a new decoder.
#[derive(Debug)]
pub struct NdjsonDecoder {
    utf8: Utf8StreamDecoder,
    /// Decoded text after the last newline seen
    line_buffer: String,
    stats: DecodeStats,
    started: Instant,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self {
            utf8: Utf8StreamDecoder::new(),
            line_buffer: String::new(),
            stats: DecodeStats::default(),
            started: Instant::now(),
        }
    }

    /// Feed one chunk and return every record it completed, in source order
    pub fn consume(&mut self, chunk: &[u8]) -> Vec<EventRecord> {
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len();
        debug!(
            "Stream chunk received: {} bytes (total: {} bytes)",
            chunk.len(),
            self.stats.bytes
        );

        let text = self.utf8.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }

        // Only the new text can contain a newline the buffer didn't have
        let search_from = self.line_buffer.len();
        self.line_buffer.push_str(&text);
        let Some(offset) = self.line_buffer[search_from..].rfind('\n') else {
            return Vec::new();
        };
        let split_at = search_from + offset + 1;

        let tail = self.line_buffer.split_off(split_at);
        let complete = std::mem::replace(&mut self.line_buffer, tail);

        let mut records = Vec::new();
        for line in complete[..complete.len() - 1].split('\n') {
            if let Some(record) = self.parse_line(line) {
                records.push(record);
            }
        }
        records
    }

    fn parse_line(&mut self, line: &str) -> Option<EventRecord> {
        let line = line.trim();
        if line.is_empty() {
            self.stats.blank_lines += 1;
            return None;
        }

        match serde_json::from_str::<EventRecord>(line) {
            Ok(record) => {
                self.stats.records += 1;
                debug!(
                    "Stream record #{} at {:?}: kind={:?}",
                    self.stats.records,
                    self.started.elapsed(),
                    record.kind()
                );
                Some(record)
            }
            Err(e) => {
                self.stats.malformed += 1;
                warn!(
                    target: "charter::stream",
                    error = %e,
                    line = %line,
                    "Failed to parse stream record"
                );
                None
            }
        }
    }

    /// Text currently waiting for a newline
    pub fn pending(&self) -> &str {
        &self.line_buffer
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// End the stream. Buffered partial text is dropped, never parsed.
    pub fn finish(mut self) -> DecodeSummary {
        let mut rest = std::mem::take(&mut self.line_buffer);
        rest.push_str(&self.utf8.finish());

        let dropped_partial = if rest.trim().is_empty() {
            None
        } else {
            debug!(
                "Dropping unterminated trailing line ({} bytes)",
                rest.len()
            );
            Some(rest)
        };

        info!(
            "Stream finished: {:?} elapsed, {} chunks, {} bytes, {} records, {} malformed",
            self.started.elapsed(),
            self.stats.chunks,
            self.stats.bytes,
            self.stats.records,
            self.stats.malformed
        );

        DecodeSummary {
            stats: self.stats,
            dropped_partial,
        }
    }
}

impl Default for NdjsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}
