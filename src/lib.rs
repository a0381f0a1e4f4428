//! # adif-edit
//!
//! Add or update one field across every record of an ADIF log.
//!
//! ADIF (Amateur Data Interchange Format) is the tagged text format amateur
//! radio loggers use to exchange contact ("QSO") records. This crate handles
//! the ADI flavour: plain text with `<NAME:LENGTH>VALUE` tokens.
//!
//! ## ADI Format
//!
//! ```text
//! Exported by some logger
//! <ADIF_VER:5>3.1.4
//! <EOH>
//! <CALL:4>W1AW <BAND:3>20M <MODE:2>CW <EOR>
//! <CALL:5>K1ABC <BAND:3>40M <MODE:3>SSB <OTHER:4>POTA <EOR>
//! ```
//!
//! - Everything up to `<EOH>` is the header and is copied unchanged.
//! - Each record ends with `<EOR>`. Markers and names are case-insensitive.
//! - A token may carry a type code: `<QSO_DATE:8:D>20240101`.
//!
//! ## Editing Rules
//!
//! Setting a field on a record (see [`record::apply_field`]):
//! 1. Every existing token with that name, whatever its length or type, is
//!    collapsed into one `<NAME:N>value` token
//! 2. Otherwise the token is inserted in front of the record's `<EOR>`
//! 3. The record always ends up with exactly one `<EOR>`
//!
//! ```
//! use adif_edit::record::edit_record;
//!
//! let updated = edit_record("<CALL:4>W1AW<EOR>", "OTHER", "SOTA");
//! assert_eq!(updated, "<CALL:4>W1AW<OTHER:4>SOTA <EOR>");
//! ```
//!
//! Whole files go through [`Decoder`], [`AdifDocument::apply_field`] and
//! [`Encoder`], or in one call through [`updater::update_file`].

pub mod config;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod field;
pub mod prompt;
pub mod record;
pub mod session;
pub mod updater;

pub use config::Config;
pub use decoder::Decoder;
pub use document::{AdifDocument, EditSummary};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use field::{parse_fields, render, Field, Token};
pub use record::{apply_field, edit_record, has_field, EditAction, RecordEdit};
pub use session::{Mode, Outcome, Request, Session};
pub use updater::{update_file, update_text};
