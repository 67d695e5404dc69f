//! This crate reads and writes BibTeχ `.bib` files in pure, safe rust.
//!
//! A `.bib` file is a sequence of entries like this one, optionally
//! preceded by one `@preamble{…}` block:
//!
//! ```tex
//! @book{DBLP:books/aw/Knuth73a,
//!     author    = {Donald E. Knuth},
//!     title     = {The Art of Computer Programming, Volume {I:} Fundamental Algorithms},
//!     publisher = {Addison-Wesley},
//!     year      = {1973},
//!     pages     = {1-634},
//!  }
//! ```
//!
//! We call `book` the `kind` or type of the entry and `DBLP:books/aw/Knuth73a`
//! its ID. Then we have a sequence of fields with a name (like `year`) and a
//! value (like `1973`). Field values must be enclosed in braces. A `%`
//! starts a comment running to the end of the line, unless it appears
//! inside braces or double quotes.
//!
//! Some fields hold lists (see [`codec`]): `author`, `editor`, `publisher`
//! and `translator` are split at “ and ”, `pages` at “-” and `keywords` at
//! whitespace. Writing an entry joins them again.
//!
//! The API is built around a [`Database`] mapping IDs to entries:
//!
//! ```rust
//! use bibparse::{Database, FieldValue};
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     //let db = Database::from_file("source.bib")?;
//!     let db: Database = "@book{tolkien1937, author = {J. R. R. Tolkien}, pages = {1-310}}".parse()?;
//!     let entry = db.get("tolkien1937").ok_or("no such entry")?;
//!     assert_eq!(entry.kind(), "book");
//!     assert_eq!(entry.get("pages"), Some(&FieldValue::List(vec!["1".into(), "310".into()])));
//!     print!("{}", db.serialize());
//!     Ok(())
//! }
//! ```
//!
//! Serializing puts the preamble first, then all entries sorted by ID, and
//! finally all entries of type `collection`, since BibTeχ only resolves a
//! cross-reference to an entry written after the one referring to it.
//!
//! The whole source is read and parsed at once. Any error (a missing ID,
//! a duplicate ID, a second preamble) aborts parsing.

pub mod codec;
mod database;
mod errors;
mod lexer;
mod parser;
mod types;

pub use crate::database::{Database, PREAMBLE_KEY};
pub use crate::errors::{BibError, Result};
pub use crate::parser::Entries;
pub use crate::types::{cmp_by_id, Entry, FieldValue, COLLECTION, FIELD_ORDER, PREAMBLE};
