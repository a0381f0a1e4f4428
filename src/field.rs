//! ADIF field tokens
//!
//! A field token is `<NAME:LENGTH>VALUE` or `<NAME:LENGTH:TYPE>VALUE`. Reading is
//! lenient: the raw value runs from `>` to the next `<` and is cut to LENGTH
//! characters. Writing always derives LENGTH from the value and never emits a
//! type code.

use std::collections::BTreeMap;
use std::fmt;

// ADI format constants
pub const TAG_OPEN: char = '<';
pub const TAG_CLOSE: char = '>';
pub const TAG_SEPARATOR: char = ':';
pub const EOR_MARKER: &str = "<EOR>";
pub const EOH_MARKER: &str = "<EOH>";

/// One field token found in record text
///
/// Offsets are byte offsets into the scanned text. `end` is the end of the raw
/// value span, so `text[start..end]` is the whole token as it would be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Offset of the opening `<`
    pub start: usize,
    /// Offset just past the raw value
    pub end: usize,
    /// Name as written in the text
    pub name: &'a str,
    /// Declared length
    pub length: usize,
    /// Optional single-character type code
    pub type_code: Option<char>,
    /// Everything between `>` and the next `<`
    pub raw_value: &'a str,
}

impl<'a> Token<'a> {
    /// Upper-cased name used for comparisons and field maps
    pub fn canonical_name(&self) -> String {
        canonical_name(self.name)
    }

    /// The raw value cut to the declared length
    pub fn value(&self) -> &'a str {
        match self.raw_value.char_indices().nth(self.length) {
            Some((cut, _)) => &self.raw_value[..cut],
            None => self.raw_value,
        }
    }

    /// Whether this token carries the given field name (case-insensitive)
    pub fn is_named(&self, name: &str) -> bool {
        self.canonical_name() == canonical_name(name)
    }
}

/// Iterator over the field tokens of a text, left to right
pub struct TokenScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for TokenScanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some(offset) = self.text[self.pos..].find(TAG_OPEN) {
            let start = self.pos + offset;
            match match_token_at(self.text, start) {
                Some(token) => {
                    self.pos = token.end;
                    return Some(token);
                }
                // Not a token; keep looking after this '<'
                None => self.pos = start + 1,
            }
        }
        self.pos = self.text.len();
        None
    }
}

/// Scan `text` for field tokens
///
/// Text that does not match the token grammar is skipped, so this never fails.
/// Markers such as `<EOR>` carry no length and are never reported as tokens.
pub fn scan_tokens(text: &str) -> TokenScanner<'_> {
    TokenScanner { text, pos: 0 }
}

/// Try to read a token whose `<` sits at byte offset `start`
fn match_token_at(text: &str, start: usize) -> Option<Token<'_>> {
    let rest = &text[start + TAG_OPEN.len_utf8()..];

    let name_len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let rest = rest[name_len..].strip_prefix(TAG_SEPARATOR)?;

    let digits_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_len == 0 {
        return None;
    }
    // A length too large for usize still means "take the whole value"
    let length = rest[..digits_len].parse::<usize>().unwrap_or(usize::MAX);
    let mut rest = &rest[digits_len..];

    let mut type_code = None;
    if let Some(after) = rest.strip_prefix(TAG_SEPARATOR) {
        let mut chars = after.chars();
        let code = chars.next().filter(|&c| is_word_char(c))?;
        type_code = Some(code);
        rest = chars.as_str();
    }

    let rest = rest.strip_prefix(TAG_CLOSE)?;
    let value_len = rest.find(TAG_OPEN).unwrap_or(rest.len());
    let value_start = text.len() - rest.len();

    Some(Token {
        start,
        end: value_start + value_len,
        name,
        length,
        type_code,
        raw_value: &rest[..value_len],
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Upper-case canonical form of a field name
pub fn canonical_name(name: &str) -> String {
    name.to_uppercase()
}

/// Whether `name` could ever be matched as a field name
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_word_char)
}

/// Whether `value` can be written as a token value and read back unchanged
///
/// A `<` would end the value early on the next read and a `>` could be taken
/// for the end of a tag, so neither may appear.
pub fn is_valid_value(value: &str) -> bool {
    !value.contains(|c: char| c == TAG_OPEN || c == TAG_CLOSE)
}

/// Collect the fields of a record, keyed by canonical name
///
/// When a name appears more than once the last occurrence wins.
pub fn parse_fields(text: &str) -> BTreeMap<String, String> {
    scan_tokens(text)
        .map(|token| (token.canonical_name(), token.value().to_string()))
        .collect()
}

/// Render `<NAME:N>VALUE` where N is the character count of `value`
///
/// The name is written exactly as given.
pub fn render(name: &str, value: &str) -> String {
    format!("<{}{}{}>{}", name, TAG_SEPARATOR, value.chars().count(), value)
}

/// A field name and value ready to be written into records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    /// Create a field, canonicalizing the name
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: canonical_name(name),
            value: value.into(),
        }
    }

    /// The token text for this field
    pub fn to_token(&self) -> String {
        render(&self.name, &self.value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// Find the first case-insensitive occurrence of an ASCII marker such as `<EOR>`
pub fn find_marker(text: &str, marker: &str) -> Option<usize> {
    let (haystack, needle) = (text.as_bytes(), marker.as_bytes());
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Find the last case-insensitive occurrence of an ASCII marker
pub fn rfind_marker(text: &str, marker: &str) -> Option<usize> {
    let (haystack, needle) = (text.as_bytes(), marker.as_bytes());
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|window| window.eq_ignore_ascii_case(needle))
}
