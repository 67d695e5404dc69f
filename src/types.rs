use std::cmp;

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::codec;
use crate::errors::{BibError, Result};
use crate::parser;

/// Entry type reserved for the `@preamble` block
pub const PREAMBLE: &str = "preamble";

/// Entry type of edited volumes which other entries cross-reference
pub const COLLECTION: &str = "collection";

/// Fields are written in this order. Fields not listed here follow
/// in the order they were added to the entry.
pub const FIELD_ORDER: [&str; 38] = [
    "key",
    "author",
    "title",
    "subtitle",
    "origtitle",
    "translator",
    "crossref",
    "editor",
    "booktitle",
    "booksubtitle",
    "origbooktitle",
    "chapter",
    "journal",
    "series",
    "volume",
    "number",
    "edition",
    "organization",
    "institution",
    "school",
    "publisher",
    "address",
    "pubstate",
    "howpublished",
    "url",
    "urldate",
    "doi",
    "month",
    "year",
    "pubyear",
    "pages",
    "isbn",
    "issn",
    "annote",
    "eprint",
    "type",
    "note",
    "keywords",
];

/// The value of one field. Whether a field is a list is decided by
/// its name, see [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
enum Content {
    Preamble(String),
    Fields(IndexMap<String, FieldValue>),
}

/// One entry in a `.bib` file, or its preamble
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Entry {
    kind: String,
    id: Option<String>,
    content: Content,
}

impl Entry {
    /// Generate a new entry without fields, e.g. `Entry::new("book", "knuth97")`.
    /// The type is lowercased.
    ///
    /// Fails with `InvalidPreamble` for the `preamble` type, use [`Entry::preamble`].
    pub fn new(kind: &str, id: &str) -> Result<Entry> {
        Self::with_fields(kind, id, IndexMap::new())
    }

    /// Generate a new entry from a mapping of fields. Field names are lowercased
    /// and values are shaped by [`codec::normalize`].
    ///
    /// The ID is trimmed. It must not be empty and must not contain `,`, `{`,
    /// `}` or `%`, since the entry could not be read back otherwise.
    pub fn with_fields(
        kind: &str,
        id: &str,
        fields: IndexMap<String, FieldValue>,
    ) -> Result<Entry> {
        let kind = kind.to_lowercase();
        if kind == PREAMBLE {
            return Err(BibError::InvalidPreamble(
                "a preamble cannot be built from fields".to_string(),
            ));
        }
        let id = id.trim();
        if id.is_empty() {
            return Err(BibError::MissingIdentifier(id.to_string()));
        }
        if id.contains([',', '{', '}', '%']) {
            return Err(BibError::InvalidIdentifier(id.to_string()));
        }
        let mut entry = Entry {
            kind,
            id: Some(id.to_string()),
            content: Content::Fields(IndexMap::new()),
        };
        entry.update(fields, true)?;
        Ok(entry)
    }

    /// Generate the preamble entry holding `text` verbatim
    pub fn preamble(text: &str) -> Entry {
        Entry {
            kind: PREAMBLE.to_string(),
            id: None,
            content: Content::Preamble(text.to_string()),
        }
    }

    /// Build an entry of type `kind` from the raw text between its outer braces
    pub fn parse(kind: &str, body: &str) -> Result<Entry> {
        let kind = kind.to_lowercase();
        if kind == PREAMBLE {
            return Ok(Self::preamble(body));
        }
        let (id, fields) = parser::parse_body(body)?;
        Ok(Entry {
            kind,
            id: Some(id),
            content: Content::Fields(fields),
        })
    }

    /// entry type, e.g. “article”
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// entry ID, e.g. “DBLP:books/lib/Knuth97”; `None` for the preamble
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_preamble(&self) -> bool {
        matches!(self.content, Content::Preamble(_))
    }

    /// The preamble text, if this is the preamble
    pub fn preamble_text(&self) -> Option<&str> {
        match &self.content {
            Content::Preamble(text) => Some(text),
            Content::Fields(_) => None,
        }
    }

    /// All fields in storage order. The preamble has none.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        let fields = match &self.content {
            Content::Fields(fields) => Some(fields),
            Content::Preamble(_) => None,
        };
        fields
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match &self.content {
            Content::Fields(fields) => fields.get(&name.to_lowercase()),
            Content::Preamble(_) => None,
        }
    }

    /// The field as it would be written to a `.bib` file
    pub fn raw(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|value| codec::to_raw(name, value))
    }

    /// Set a field, replacing any previous value. Returns the previous value.
    ///
    /// The value is reshaped to what the field holds when read from a file,
    /// e.g. `Scalar("A and B")` for `author` is stored as `List(["A", "B"])`.
    /// A list for a plain field fails with `InvalidField`.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<Option<FieldValue>> {
        let name = name.to_lowercase();
        let fields = self.fields_mut()?;
        let value = shaped(&name, &value)?;
        Ok(fields.insert(name, value))
    }

    /// Set a field from its raw text, running it through the codec
    pub fn set_raw(&mut self, name: &str, raw: &str) -> Result<Option<FieldValue>> {
        self.set(name, codec::to_structured(name, raw))
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        match &mut self.content {
            Content::Fields(fields) => fields.shift_remove(&name.to_lowercase()),
            Content::Preamble(_) => None,
        }
    }

    /// Merge `fields` into this entry. Existing fields are only replaced
    /// if `overwrite` is set. Values are shaped as in [`Entry::set`]; if one
    /// of them fails, the entry is left unchanged.
    pub fn update(&mut self, fields: IndexMap<String, FieldValue>, overwrite: bool) -> Result<()> {
        let own = self.fields_mut()?;
        let fields = fields
            .into_iter()
            .map(|(name, value)| {
                let name = name.to_lowercase();
                let value = shaped(&name, &value)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>>>()?;
        for (name, value) in fields {
            if overwrite || !own.contains_key(&name) {
                own.insert(name, value);
            }
        }
        Ok(())
    }

    fn fields_mut(&mut self) -> Result<&mut IndexMap<String, FieldValue>> {
        match &mut self.content {
            Content::Fields(fields) => Ok(fields),
            Content::Preamble(_) => Err(BibError::InvalidPreamble(
                "a preamble has no fields".to_string(),
            )),
        }
    }

    /// Format this entry as BibTeχ, e.g.
    ///
    /// ```tex
    /// @book{tolkien1937,
    ///     author = {J. R. R. Tolkien},
    ///     title = {The Hobbit}
    /// }
    /// ```
    pub fn to_bibtex(&self) -> String {
        let fields = match &self.content {
            Content::Preamble(text) => return format!("@{}{{{}}}", PREAMBLE, text),
            Content::Fields(fields) => fields,
        };

        let ordered = FIELD_ORDER
            .iter()
            .filter_map(|name| fields.get_key_value(*name))
            .chain(
                fields
                    .iter()
                    .filter(|(name, _)| !FIELD_ORDER.contains(&name.as_str())),
            );
        let lines: Vec<String> = ordered
            .map(|(name, value)| {
                let raw = codec::to_raw(name, value).unwrap_or_default();
                format!("    {} = {{{}}}", name, raw)
            })
            .collect();

        let mut out = format!("@{}{{{},", self.kind, self.id().unwrap_or_default());
        if !lines.is_empty() {
            out.push('\n');
            out.push_str(&lines.join(",\n"));
        }
        out.push_str("\n}");
        out
    }
}

fn shaped(name: &str, value: &FieldValue) -> Result<FieldValue> {
    codec::normalize(name, value).ok_or_else(|| BibError::InvalidField(name.to_string()))
}

/// Order entries by ID. The preamble counts as empty ID.
pub fn cmp_by_id(a: &Entry, b: &Entry) -> cmp::Ordering {
    a.id().unwrap_or_default().cmp(b.id().unwrap_or_default())
}
