//! Whole-file update: read, edit every record, write

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::decoder::Decoder;
use crate::document::EditSummary;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::field::{is_valid_name, is_valid_value};

/// Read an ADI file into memory
///
/// UTF-8 is tried first. Files that are not valid UTF-8 are decoded as
/// Windows-1252, which covers the ISO-8859-1 exports of older loggers.
pub fn read_adif(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::InputNotFound(path.to_path_buf()),
        _ => Error::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(text.into_owned())
        }
    }
}

/// Set a field in every record of ADI text
pub fn update_text(input: &str, field_name: &str, field_value: &str) -> (String, EditSummary) {
    let mut document = Decoder::new().decode(input);
    let summary = document.apply_field(field_name, field_value);
    (Encoder::new().encode(&document), summary)
}

/// Set a field in every record of `input`, writing the result to `output`
///
/// Nothing is written unless the input was read successfully.
pub fn update_file(input: &Path, output: &Path, field_name: &str, field_value: &str) -> Result<EditSummary> {
    if !is_valid_name(field_name) {
        return Err(Error::InvalidFieldName(field_name.to_string()));
    }
    if !is_valid_value(field_value) {
        return Err(Error::InvalidFieldValue(field_value.to_string()));
    }
    if same_file(input, output) {
        return Err(Error::SameFile(output.to_path_buf()));
    }

    let started = Instant::now();
    let content = read_adif(input)?;
    let mut document = Decoder::new().decode(&content);
    let summary = document.apply_field(field_name, field_value);

    Encoder::new()
        .encode_to_file(&document, output)
        .map_err(|source| Error::Write {
            path: output.to_path_buf(),
            source,
        })?;

    info!(
        records = summary.records,
        added = summary.added,
        updated = summary.updated,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote {}",
        output.display()
    );

    Ok(summary)
}

/// Whether two paths name the same file
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
