//! Transcoder for raw binary documents.

use crate::document::{BinaryDocument, Document};
use crate::error::Result;
use crate::flags::{DataType, FlagPattern, BINARY_COMPAT_FLAGS, LEGACY_SPECIAL_BYTEARRAY};
use crate::response::ResponseStatus;
use crate::transcoder::{ensure_size, Encoded, Transcoder};

/// Raw bytes both ways. Zero flags are not accepted: the untyped convention meant string, and
/// handing string bytes back as binary would silently mask a misrouted read.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryTranscoder;

const ACCEPTS: &[FlagPattern] = &[
    FlagPattern::Compat(DataType::Binary),
    FlagPattern::Common(DataType::Binary),
    FlagPattern::LegacyTag(LEGACY_SPECIAL_BYTEARRAY),
];

impl Transcoder for BinaryTranscoder {
    type Doc = BinaryDocument;

    fn data_type(&self) -> DataType {
        DataType::Binary
    }

    fn accepted_flags(&self) -> &'static [FlagPattern] {
        ACCEPTS
    }

    fn encode(&self, doc: &BinaryDocument) -> Result<Encoded> {
        ensure_size(doc.content().len())?;
        Ok(Encoded {
            content: doc.content().clone(),
            flags: BINARY_COMPAT_FLAGS,
        })
    }

    fn decode(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        _status: ResponseStatus,
    ) -> Result<BinaryDocument> {
        self.ensure_accepts(flags)?;
        Ok(Document::new(id, content.to_vec())?
            .with_cas(cas)
            .with_expiry(expiry))
    }
}
