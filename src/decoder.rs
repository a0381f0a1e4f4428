//! ADI text decoder

use tracing::warn;

use crate::document::AdifDocument;
use crate::field::{find_marker, scan_tokens, EOH_MARKER, EOR_MARKER};

/// Splits ADI text into a header and records
pub struct Decoder;

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode ADI text
    ///
    /// The header is everything up to and including the first `<EOH>`. The rest
    /// is split on `<EOR>` (any case); pieces are trimmed and empty ones dropped.
    pub fn decode(&self, input: &str) -> AdifDocument {
        let (header, body) = Self::split_header(input);
        let mut document = AdifDocument {
            header: header.map(str::to_string),
            records: Vec::new(),
        };

        for piece in Self::split_records(body) {
            if document.add_record(piece) && scan_tokens(piece).next().is_none() {
                warn!(
                    record = document.len(),
                    "record contains no ADIF fields: {:?}",
                    piece.trim()
                );
            }
        }

        document
    }

    /// Split off the header, including its `<EOH>` marker
    fn split_header(input: &str) -> (Option<&str>, &str) {
        match find_marker(input, EOH_MARKER) {
            Some(pos) => {
                let end = pos + EOH_MARKER.len();
                (Some(&input[..end]), &input[end..])
            }
            None => (None, input),
        }
    }

    /// Split on every `<EOR>` marker, dropping the markers
    fn split_records(body: &str) -> Vec<&str> {
        let mut pieces = Vec::new();
        let mut rest = body;
        while let Some(pos) = find_marker(rest, EOR_MARKER) {
            pieces.push(&rest[..pos]);
            rest = &rest[pos + EOR_MARKER.len()..];
        }
        pieces.push(rest);
        pieces
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
