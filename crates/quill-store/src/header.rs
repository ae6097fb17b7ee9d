//! Header block parsing.
//!
//! A post file starts with an optional header of `key: value` lines,
//! terminated by the first blank line. Everything after it is the body:
//!
//! ```text
//! title: Hello World
//! tags: rust, blogging
//!
//! Body text starts here.
//! ```
//!
//! Parsing is lenient. A file whose first line is not a `key: value` line has
//! no header at all, and malformed lines inside a header are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain value.
    Text(String),
    /// Value of a list field, split on the list separator.
    List(Vec<String>),
}

impl FieldValue {
    /// The plain value, if this is not a list.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// The list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

/// Header fields keyed by name, as written in the file.
pub type Header = BTreeMap<String, FieldValue>;

/// Result of splitting a file into header and body.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedFile<'a> {
    /// Parsed header fields (empty when the file has no header).
    pub header: Header,
    /// Everything after the header's terminating blank line.
    pub body: &'a str,
}

/// Default header keys parsed as lists.
pub const DEFAULT_LIST_FIELDS: &[&str] = &["tags"];

/// Default separator between list items.
pub const DEFAULT_LIST_SEPARATOR: char = ',';

/// Splits raw file contents into a header mapping and a body.
#[derive(Debug, Clone)]
pub struct HeaderParser {
    list_fields: Vec<String>,
    separator: char,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self {
            list_fields: DEFAULT_LIST_FIELDS.iter().map(|s| (*s).to_owned()).collect(),
            separator: DEFAULT_LIST_SEPARATOR,
        }
    }
}

impl HeaderParser {
    /// Create a parser with custom list fields and separator.
    #[must_use]
    pub fn new(list_fields: Vec<String>, separator: char) -> Self {
        Self {
            list_fields,
            separator,
        }
    }

    /// Header keys parsed as lists.
    #[must_use]
    pub fn list_fields(&self) -> &[String] {
        &self.list_fields
    }

    /// Separator between list items.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Split `contents` into header and body.
    #[must_use]
    pub fn parse<'a>(&self, contents: &'a str) -> ParsedFile<'a> {
        let mut header = Header::new();
        let mut offset = 0;

        for (idx, line) in contents.split_inclusive('\n').enumerate() {
            let text = line.trim_end_matches(['\n', '\r']);
            let field = split_field(text);

            if idx == 0 && field.is_none() {
                return ParsedFile {
                    header,
                    body: contents,
                };
            }

            offset += line.len();

            if text.trim().is_empty() {
                return ParsedFile {
                    header,
                    body: &contents[offset..],
                };
            }

            match field {
                Some((key, value)) => {
                    header.insert(key.to_owned(), self.field_value(key, value));
                }
                None => {
                    tracing::debug!(line = %text, "Skipping malformed header line");
                }
            }
        }

        // Header ran to the end of the file without a blank line
        ParsedFile { header, body: "" }
    }

    /// Render a header and body back into file contents.
    ///
    /// The output parses back into the same header and body. An empty header
    /// produces the body unchanged.
    #[must_use]
    pub fn compose(&self, header: &Header, body: &str) -> String {
        if header.is_empty() {
            return body.to_owned();
        }

        let joiner = format!("{} ", self.separator);
        let mut out = String::new();
        for (key, value) in header {
            let rendered = match value {
                FieldValue::Text(text) => text.replace(['\r', '\n'], " "),
                FieldValue::List(items) => items.join(&joiner),
            };
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&rendered);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(body);
        out
    }

    fn field_value(&self, key: &str, value: &str) -> FieldValue {
        if self.list_fields.iter().any(|f| f == key) {
            FieldValue::List(
                value
                    .split(self.separator)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_owned)
                    .collect(),
            )
        } else {
            FieldValue::Text(value.to_owned())
        }
    }
}

/// Split a `key: value` line.
///
/// Keys are a single word of alphanumerics, `_` or `-`, so prose such as
/// `Note to self: ...` is not mistaken for a header.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some((key, value.trim()))
}
