use std::fmt;

use crate::flags::DataType;
use crate::registry::DocumentKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Occurs when the flags on a stored value name a data type the invoked transcoder cannot
    /// produce. Retrying reproduces the same error; the caller asked for the wrong type.
    TypeMismatch { expected: DataType, flags: u32 },
    /// Occurs when no transcoder is registered for the requested document kind. This is a
    /// configuration error, not a data error.
    UnsupportedType(DocumentKind),
    /// Occurs when the payload bytes fail the kind-specific validation on decode, e.g. invalid
    /// UTF-8 for a string document or unparseable JSON. Distinct from [`Error::TypeMismatch`] so
    /// callers can tell corrupt data apart from a misrouted read.
    MalformedContent { kind: DocumentKind, detail: String },
    /// Occurs when a document is constructed with an empty id.
    InvalidId(String),
    /// Content was larger than the maximum value size accepted for a write.
    ValueTooLarge { max: usize, actual: usize },
    /// Occurs when serde serialization fails on the encode path.
    SerdeFail(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::TypeMismatch { expected, flags } => write!(
                f,
                "Flags 0x{:08x} do not carry a {} payload",
                flags, expected
            ),
            Error::UnsupportedType(kind) => {
                write!(f, "No transcoder registered for {} documents", kind)
            }
            Error::MalformedContent { kind, ref detail } => {
                write!(f, "Malformed {} content: {}", kind, detail)
            }
            Error::InvalidId(ref reason) => write!(f, "Invalid document id: {}", reason),
            Error::ValueTooLarge { max, actual } => write!(
                f,
                "Content too large: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::SerdeFail(ref msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}
