use std::collections::hash_map;
use std::collections::HashMap;
use std::fs;
use std::path;
use std::str;

use log::debug;
use regex::Regex;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::errors::{BibError, Result};
use crate::parser::Entries;
use crate::types::{cmp_by_id, Entry, COLLECTION, PREAMBLE};

/// The key the preamble is stored under. No regular ID can start with `@`
/// when read from a `.bib` file.
pub const PREAMBLE_KEY: &str = "@preamble";

/// A bibliography: entries mapped by their ID, plus at most one preamble
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Database {
    entries: HashMap<String, Entry>,
}

impl Database {
    pub fn new() -> Database {
        Database::default()
    }

    /// Parse a whole `.bib` source. The first error aborts parsing.
    pub fn parse(src: &str) -> Result<Database> {
        let mut db = Database::new();
        for entry in Entries::new(src) {
            db.insert(entry?)?;
        }
        Ok(db)
    }

    /// Read the file at `path` at once and parse it
    pub fn from_file<P: AsRef<path::Path>>(path: P) -> Result<Database> {
        let path = path.as_ref();
        debug!("reading {}", path.display());
        let src = fs::read_to_string(path)?;
        let db = Self::parse(&src)?;
        debug!("read {} entries from {}", db.len(), path.display());
        Ok(db)
    }

    /// Collect entries into a database, checking the same rules as [`Database::insert`]
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Result<Database> {
        let mut db = Database::new();
        for entry in entries {
            db.insert(entry)?;
        }
        Ok(db)
    }

    /// Add an entry. Fails if its ID is taken, or if it is a second preamble.
    pub fn insert(&mut self, entry: Entry) -> Result<()> {
        if entry.is_preamble() {
            return match self.entries.get(PREAMBLE_KEY) {
                Some(other) if other.is_preamble() => Err(BibError::DuplicatePreamble),
                Some(_) => Err(BibError::InvalidPreamble(format!(
                    "'{}' is already used by a regular entry",
                    PREAMBLE_KEY
                ))),
                None => {
                    self.entries.insert(PREAMBLE_KEY.to_string(), entry);
                    Ok(())
                }
            };
        }

        let id = entry.id().unwrap_or_default().to_string();
        match self.entries.entry(id) {
            hash_map::Entry::Occupied(slot) => {
                Err(BibError::DuplicateIdentifier(slot.key().clone()))
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        self.entries.remove(id)
    }

    /// The text of the preamble, if there is one
    pub fn preamble(&self) -> Option<&str> {
        self.entries
            .get(PREAMBLE_KEY)
            .and_then(Entry::preamble_text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Entries where the BibTeχ text of `field` matches `pattern` somewhere.
    /// The text is what [`crate::codec::to_raw`] renders, so a list is matched
    /// joined by its separator: `["A", "B"]` under `author` is seen as
    /// `"A and B"`, never as `A, B` or the like. A missing field is matched
    /// as empty string.
    pub fn by_field_pattern(&self, field: &str, pattern: &Regex) -> Database {
        self.filter(|entry| pattern.is_match(&entry.raw(field).unwrap_or_default()))
    }

    /// Entries of one of the given types, or with `complement`, of none of them
    pub fn by_type(&self, kinds: &[&str], complement: bool) -> Database {
        let kinds: Vec<String> = kinds.iter().map(|kind| kind.to_lowercase()).collect();
        self.filter(|entry| kinds.iter().any(|kind| kind == entry.kind()) != complement)
    }

    fn filter<F: Fn(&Entry) -> bool>(&self, keep: F) -> Database {
        Database {
            entries: self
                .entries
                .iter()
                .filter(|(_, entry)| keep(entry))
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect(),
        }
    }

    /// Format the whole database as BibTeχ: the preamble first, then all
    /// regular entries by ID, then all collections by ID. BibTeχ only
    /// resolves a `crossref` to a collection if the collection comes later.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        if let Some(preamble) = self.entries.values().find(|entry| entry.is_preamble()) {
            out.push_str(&preamble.to_bibtex());
        }
        out.push_str(&join_sorted(
            self.iter()
                .filter(|entry| entry.kind() != PREAMBLE && entry.kind() != COLLECTION),
        ));
        out.push_str(&join_sorted(
            self.iter().filter(|entry| entry.kind() == COLLECTION),
        ));
        out
    }

    /// Format all entries sorted by ID only. The preamble sorts first.
    pub fn serialize_unordered(&self) -> String {
        join_sorted(self.iter())
    }

    /// Write [`Database::serialize`] to the file at `path`, replacing it
    pub fn write_to<P: AsRef<path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("writing {} entries to {}", self.len(), path.display());
        fs::write(path, self.serialize())?;
        Ok(())
    }
}

fn join_sorted<'e, I: Iterator<Item = &'e Entry>>(entries: I) -> String {
    let mut entries: Vec<&Entry> = entries.collect();
    entries.sort_by(|a, b| cmp_by_id(a, b).then_with(|| a.kind().cmp(b.kind())));
    entries
        .iter()
        .map(|entry| entry.to_bibtex())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl str::FromStr for Database {
    type Err = BibError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::parse(src)
    }
}
