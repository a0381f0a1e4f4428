//! ADIF document data structures

use std::collections::BTreeMap;

use tracing::debug;

use crate::field::parse_fields;
use crate::record::{apply_field, record_body, EditAction};

/// An ADI file split into its header and records
///
/// Records are stored trimmed and without their `<EOR>` marker; the encoder
/// writes exactly one marker after each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdifDocument {
    /// Everything up to and including `<EOH>`, if the file has a header
    pub header: Option<String>,
    /// Record bodies in file order
    pub records: Vec<String>,
}

/// Counts reported after setting a field across a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    /// Records processed
    pub records: usize,
    /// Records that did not have the field before
    pub added: usize,
    /// Records whose existing field was replaced
    pub updated: usize,
}

impl AdifDocument {
    /// Create an empty document without a header
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with the given header text
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            records: Vec::new(),
        }
    }

    /// Add a record, stripping whitespace and a trailing marker
    ///
    /// Returns false (and adds nothing) when the record is empty.
    pub fn add_record(&mut self, record: &str) -> bool {
        let body = record_body(record);
        if body.is_empty() {
            return false;
        }
        self.records.push(body.to_string());
        true
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fields of the record at `index`, keyed by canonical name
    pub fn record_fields(&self, index: usize) -> Option<BTreeMap<String, String>> {
        self.records.get(index).map(|record| parse_fields(record))
    }

    /// Set `field_name` to `field_value` in every record
    pub fn apply_field(&mut self, field_name: &str, field_value: &str) -> EditSummary {
        let mut summary = EditSummary::default();

        for (i, record) in self.records.iter_mut().enumerate() {
            let edit = apply_field(record, field_name, field_value);
            match edit.action {
                EditAction::Added => summary.added += 1,
                EditAction::Updated => summary.updated += 1,
            }
            debug!(record = i + 1, action = ?edit.action, "set field {}", field_name);
            *record = record_body(&edit.text).to_string();
            summary.records += 1;
        }

        summary
    }
}
