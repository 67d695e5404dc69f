//! Conversion between the raw text of a field and its structured value.
//!
//! Whether a field holds a list is decided by its name alone. The table is:
//!
//! | field                                       | separator  |
//! |---------------------------------------------|------------|
//! | `author`, `editor`, `publisher`, `translator` | `" and "`  |
//! | `pages`                                     | `"-"`      |
//! | `keywords`                                  | whitespace, written back as `" "` |
//!
//! Every other field is kept as a plain string.

use crate::types::FieldValue;

/// How a field's raw text is split into a list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// person-like lists joined by “ and ”
    Names,
    /// page ranges like “12-15”
    Range,
    /// whitespace-separated words
    Words,
    /// no structure, kept verbatim
    Plain,
}

impl Policy {
    /// The separator used when writing a list back to text.
    /// `Plain` fields have no list form.
    pub fn separator(self) -> Option<&'static str> {
        match self {
            Self::Names => Some(" and "),
            Self::Range => Some("-"),
            Self::Words => Some(" "),
            Self::Plain => None,
        }
    }
}

/// Look up the policy of a field name (case-insensitive)
pub fn policy(field: &str) -> Policy {
    match field.to_lowercase().as_str() {
        "author" | "editor" | "publisher" | "translator" => Policy::Names,
        "pages" => Policy::Range,
        "keywords" => Policy::Words,
        _ => Policy::Plain,
    }
}

/// Turn the raw text of `field` into its structured value
pub fn to_structured(field: &str, raw: &str) -> FieldValue {
    match policy(field) {
        Policy::Names => FieldValue::List(raw.split(" and ").map(str::to_string).collect()),
        Policy::Range => FieldValue::List(raw.split('-').map(str::to_string).collect()),
        Policy::Words => FieldValue::List(raw.split_whitespace().map(str::to_string).collect()),
        Policy::Plain => FieldValue::Scalar(raw.to_string()),
    }
}

/// Turn a structured value of `field` back into raw text.
/// Returns `None` for a list under a field without list form.
pub fn to_raw(field: &str, value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Scalar(text) => Some(text.clone()),
        FieldValue::List(items) => policy(field).separator().map(|sep| items.join(sep)),
    }
}

/// Give `value` the shape the table prescribes for `field`, as if it had
/// been written to text and read back. `None` if `to_raw` fails.
pub fn normalize(field: &str, value: &FieldValue) -> Option<FieldValue> {
    to_raw(field, value).map(|raw| to_structured(field, &raw))
}
