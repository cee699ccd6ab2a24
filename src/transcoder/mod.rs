//! The transcoder family: one strategy per document kind, behind a uniform
//! two-operation contract.
//!
//! Every transcoder is a stateless unit struct whose operations are pure functions of their
//! inputs, so one shared instance serves any number of concurrent operations without locking.
//! Encode produces an owned payload plus the flags word to store with it; decode borrows the
//! transport's buffer for the duration of the call and returns a document that owns a copy of
//! its content.

pub mod binary;
pub mod json;
pub mod legacy;
pub mod string;

use crate::error::{Error, Result};
use crate::flags::{DataType, FlagPattern};
use crate::response::ResponseStatus;
use crate::MAX_VALUE_SIZE;

/// Output of an encode: the wire payload and the flags word to store alongside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    pub content: Vec<u8>,
    pub flags: u32,
}

pub trait Transcoder {
    /// The document type this transcoder produces and consumes.
    type Doc;

    /// The canonical data type tag this transcoder writes.
    fn data_type(&self) -> DataType;

    /// The flag patterns this transcoder will decode, in order of preference. Anything outside
    /// this list is a type mismatch, even if the payload happens to be interpretable.
    fn accepted_flags(&self) -> &'static [FlagPattern];

    /// Encode a document's content to a wire payload and flags word.
    fn encode(&self, doc: &Self::Doc) -> Result<Encoded>;

    /// Decode a wire payload into a new document. The content slice is only borrowed for the
    /// duration of the call; the returned document owns its content.
    fn decode(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        status: ResponseStatus,
    ) -> Result<Self::Doc>;

    fn accepts(&self, flags: u32) -> bool {
        self.accepted_flags().iter().any(|p| p.matches(flags))
    }

    /// Flag check every decode performs first. The dispatcher should already have routed the
    /// payload to the right transcoder, but this is the last line of defense.
    fn ensure_accepts(&self, flags: u32) -> Result<()> {
        if self.accepts(flags) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: self.data_type(),
                flags,
            })
        }
    }
}

/// Encode-side size ceiling. The server rejects larger values anyway; failing here keeps the
/// oversized payload off the wire entirely.
pub(crate) fn ensure_size(actual: usize) -> Result<()> {
    if actual > MAX_VALUE_SIZE {
        Err(Error::ValueTooLarge {
            max: MAX_VALUE_SIZE,
            actual,
        })
    } else {
        Ok(())
    }
}
