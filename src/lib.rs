//! docwire converts typed document values into wire-transmissible byte payloads plus a 32-bit
//! flags word, and reverses that transformation on read. It is the transcoding core of a
//! database client: the transport layer hands it raw bytes, flags, and a response status, and
//! gets back typed, immutable documents — including for data written by older clients that
//! predate typed flags entirely.
//!
//! The crate provides:
//!
//! - A flag codec packing a data-type tag, a compression tag, and a format discriminant into
//!   one 32-bit word, with the two older flag generations (common-format words and the bare
//!   "0 means string" convention) decoded alongside the current compatibility format.
//! - A transcoder per document kind — string, JSON, binary, and a legacy fallback — each a
//!   pure, stateless strategy with a uniform encode/decode contract. Every transcoder
//!   publishes the flag patterns it accepts as plain data, so the compatibility matrix is
//!   auditable without reading any decode logic.
//! - A registry that selects the transcoder for a requested document kind, or infers the kind
//!   from the stored flags when the caller does not name one.
//! - Immutable [`Document`] value objects carrying id, content, CAS, expiry, and an optional
//!   mutation token. Decode always copies content out of the transport's buffer, so documents
//!   own everything they hold.
//!
//! Encode always emits the compatibility flag format: modern readers unpack a typed word,
//! while legacy-only readers see a meaningful tag in their own 16-bit flag space. Decode
//! accepts all three generations. A round trip is byte-exact, and re-encoding a decoded
//! document reproduces identical content under the canonical flags.
//!
//! ```
//! use docwire::{Document, ResponseStatus, StringTranscoder, Transcoder};
//!
//! let doc = Document::new("greeting", "hello".to_string())?;
//! let encoded = StringTranscoder.encode(&doc)?;
//! let decoded = StringTranscoder.decode(
//!     "greeting",
//!     &encoded.content,
//!     0,
//!     0,
//!     encoded.flags,
//!     ResponseStatus::Success,
//! )?;
//! assert_eq!(decoded.content(), "hello");
//! # Ok::<(), docwire::Error>(())
//! ```

mod document;
mod error;
mod registry;
mod response;

pub mod flags;
pub mod transcoder;

pub use self::document::{
    BinaryDocument, Document, JsonDocument, LegacyDocument, MutationToken, StringDocument,
};
pub use self::error::{Error, Result};
pub use self::flags::{Compression, DataType, FlagFormat, FlagPattern, FlagView};
pub use self::registry::{AnyDocument, AnyTranscoder, DocumentKind, TranscoderRegistry};
pub use self::response::ResponseStatus;
pub use self::transcoder::binary::BinaryTranscoder;
pub use self::transcoder::json::JsonTranscoder;
pub use self::transcoder::legacy::{LegacyTranscoder, LegacyValue};
pub use self::transcoder::string::StringTranscoder;
pub use self::transcoder::{Encoded, Transcoder};

/// Maximum content size accepted for a write, matching the server's value ceiling.
pub const MAX_VALUE_SIZE: usize = 20 * 1024 * 1024;
