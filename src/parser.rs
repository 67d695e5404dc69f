use indexmap::IndexMap;

use crate::codec;
use crate::errors::{BibError, Result};
use crate::lexer;
use crate::types::{Entry, FieldValue};

#[derive(Clone, Copy, PartialEq, Eq)]
enum BodyState {
    ReadingKey,
    ReadingValue,
}

/// Split the body of an entry, like `knuth97, author = {Donald Knuth}`,
/// into its ID and its fields.
///
/// Field names are lowercased and only their alphanumeric characters are
/// kept. Values must be enclosed in braces and are handed to the codec
/// without their outer pair. If a field occurs twice, the last one wins.
pub(crate) fn parse_body(body: &str) -> Result<(String, IndexMap<String, FieldValue>)> {
    let data = lexer::strip_comments(body);
    let (id, rest) = match data.split_once(',') {
        Some((id, rest)) if !id.trim().is_empty() => (id.trim(), rest),
        _ => return Err(BibError::MissingIdentifier(data.clone())),
    };

    let mut fields = IndexMap::new();
    let mut state = BodyState::ReadingKey;
    let mut name = String::new();
    let mut value = String::new();
    let mut curlybrace_level = 0usize;

    for chr in rest.chars() {
        match state {
            BodyState::ReadingKey => {
                if chr.is_alphanumeric() {
                    name.push(chr);
                } else if chr == '{' {
                    curlybrace_level = 1;
                    state = BodyState::ReadingValue;
                }
            }
            BodyState::ReadingValue => {
                if chr == '{' {
                    curlybrace_level += 1;
                } else if chr == '}' {
                    curlybrace_level -= 1;
                    if curlybrace_level == 0 {
                        if !name.is_empty() {
                            let parsed = codec::to_structured(&name, &value);
                            fields.insert(name.to_lowercase(), parsed);
                        }
                        name.clear();
                        value.clear();
                        state = BodyState::ReadingKey;
                        continue;
                    }
                }
                value.push(chr);
            }
        }
    }

    Ok((id.to_string(), fields))
}

/// A stateful iterator yielding one `Entry` after another from a source string
pub struct Entries<'s> {
    iter: lexer::LexingIterator<'s>,
    failed: bool,
}

impl<'s> Entries<'s> {
    pub fn new(src: &'s str) -> Entries<'s> {
        Entries {
            iter: lexer::LexingIterator::new(src),
            failed: false,
        }
    }
}

impl<'s> Iterator for Entries<'s> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let block = self.iter.next()?;
        let result = Entry::parse(&block.kind, &block.body);
        self.failed = result.is_err();
        Some(result)
    }
}
