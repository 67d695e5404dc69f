use std::error;
use std::fmt;
use std::io;

/// Everything that can go wrong while reading or building a bibliography.
/// Any of these aborts the current parse; there is no partial result.
#[derive(Debug)]
pub enum BibError {
    /// an entry body without a comma separating the ID from its fields
    MissingIdentifier(String),
    /// a second entry with an ID already present in the database
    DuplicateIdentifier(String),
    /// an ID which would not survive being written and read back
    InvalidIdentifier(String),
    /// a second `@preamble` block
    DuplicatePreamble,
    /// a preamble built from fields, or a preamble slot holding a regular entry
    InvalidPreamble(String),
    /// a list given for a field which only holds plain text
    InvalidField(String),
    /// reading or writing the underlying file failed
    Io(io::Error),
}

impl fmt::Display for BibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentifier(body) => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "missing ID in empty entry")
                } else {
                    write!(f, "missing ID in entry '{}'", body)
                }
            }
            Self::DuplicateIdentifier(id) => write!(f, "found duplicate ID '{}'", id),
            Self::InvalidIdentifier(id) => {
                write!(f, "invalid ID '{}': must not contain ',', '{{', '}}' or '%'", id)
            }
            Self::DuplicatePreamble => write!(f, "found more than one @preamble"),
            Self::InvalidPreamble(reason) => write!(f, "invalid @preamble: {}", reason),
            Self::InvalidField(name) => write!(f, "field '{}' cannot hold a list", name),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl error::Error for BibError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BibError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T, E = BibError> = std::result::Result<T, E>;
