//! ADI text encoder

use crate::document::AdifDocument;
use crate::field::EOR_MARKER;

/// Encodes a document back into ADI text
pub struct Encoder;

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode a document to a string
    ///
    /// The header is followed by a newline. Each record gets exactly one
    /// ` <EOR>` and sits on its own line.
    pub fn encode(&self, document: &AdifDocument) -> String {
        let mut output = String::new();

        if let Some(header) = &document.header {
            output.push_str(header);
            output.push('\n');
        }

        for record in &document.records {
            output.push_str(record);
            output.push(' ');
            output.push_str(EOR_MARKER);
            output.push('\n');
        }

        output
    }

    /// Encode a document directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(&self, document: &AdifDocument, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.encode(document).as_bytes())
    }

    /// Encode a document to a file
    pub fn encode_to_file(&self, document: &AdifDocument, path: &std::path::Path) -> std::io::Result<()> {
        std::fs::write(path, self.encode(document))
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
