//! Single-record editing
//!
//! A record is free text holding field tokens and, optionally, its `<EOR>`
//! marker. [`apply_field`] sets one field to a fixed value and makes sure the
//! result is terminated by exactly one marker: a marker already in the text is
//! kept, and ` <EOR>` is appended only when the record had none.

use crate::field::{canonical_name, render, rfind_marker, scan_tokens, Token, EOR_MARKER};

/// What an edit did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// The field was not present and has been inserted
    Added,
    /// One or more occurrences were replaced by the new value
    Updated,
}

/// Result of editing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEdit {
    pub text: String,
    pub action: EditAction,
}

/// Add or update `field_name` in `record`, returning the new record text
pub fn edit_record(record: &str, field_name: &str, field_value: &str) -> String {
    apply_field(record, field_name, field_value).text
}

/// Add or update `field_name` in `record`
///
/// Matching is by name only and ignores case, declared length and type code.
/// Every existing occurrence collapses into a single `<NAME:N>value` token at
/// the position of the first one. When the field is missing the token goes in
/// front of the last `<EOR>`, or at the end of the trimmed record followed by
/// ` <EOR>` and a newline when there is no marker.
///
/// Without a marker the two cases end differently: an added field leaves the
/// record ending in ` <EOR>\n`, an updated one in ` <EOR>` with no newline.
/// [`record_body`] strips either form.
pub fn apply_field(record: &str, field_name: &str, field_value: &str) -> RecordEdit {
    let name = canonical_name(field_name);
    let token = render(&name, field_value);

    let existing: Vec<Token<'_>> = scan_tokens(record)
        .filter(|t| t.is_named(&name))
        .collect();

    if !existing.is_empty() {
        return RecordEdit {
            text: replace_tokens(record, &existing, &token),
            action: EditAction::Updated,
        };
    }

    let text = match rfind_marker(record, EOR_MARKER) {
        Some(pos) => format!("{}{} {}", &record[..pos], token, &record[pos..]),
        None => format!("{} {} {}\n", record.trim(), token, EOR_MARKER),
    };

    RecordEdit {
        text,
        action: EditAction::Added,
    }
}

/// Replace the first matched token with `token` and drop the others
fn replace_tokens(record: &str, existing: &[Token<'_>], token: &str) -> String {
    let mut text = String::with_capacity(record.len() + token.len());
    let mut last = 0;

    for (i, old) in existing.iter().enumerate() {
        text.push_str(&record[last..old.start]);
        if i == 0 {
            text.push_str(token);
            // Keep the separator that followed the old value
            let raw = old.raw_value;
            text.push_str(&raw[raw.trim_end().len()..]);
        }
        last = old.end;
    }
    text.push_str(&record[last..]);

    if rfind_marker(&text, EOR_MARKER).is_none() {
        text.truncate(text.trim_end().len());
        text.push(' ');
        text.push_str(EOR_MARKER);
    }

    text
}

/// Whether `record` contains the field at all, whatever its value
pub fn has_field(record: &str, field_name: &str) -> bool {
    let name = canonical_name(field_name);
    scan_tokens(record).any(|t| t.is_named(&name))
}

/// The record text without surrounding whitespace and without a trailing `<EOR>`
pub fn record_body(record: &str) -> &str {
    let trimmed = record.trim();
    match rfind_marker(trimmed, EOR_MARKER) {
        Some(pos) if pos + EOR_MARKER.len() == trimmed.len() => trimmed[..pos].trim_end(),
        _ => trimmed,
    }
}
