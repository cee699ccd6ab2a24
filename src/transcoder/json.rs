//! Transcoder for JSON documents.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{Document, JsonDocument};
use crate::error::{Error, Result};
use crate::flags::{DataType, FlagPattern, JSON_COMPAT_FLAGS};
use crate::registry::DocumentKind;
use crate::response::ResponseStatus;
use crate::transcoder::{ensure_size, Encoded, Transcoder};

/// Encodes a parsed JSON value tree to its UTF-8 serialization and validates parseability on
/// decode. Zero flags are accepted because pre-flags clients stored JSON under the untyped
/// convention; the payload still has to parse.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTranscoder;

const ACCEPTS: &[FlagPattern] = &[
    FlagPattern::Compat(DataType::Json),
    FlagPattern::Common(DataType::Json),
    FlagPattern::ZeroFlags,
];

impl JsonTranscoder {
    /// Encode any serializable value as a JSON payload, without going through a
    /// `serde_json::Value` tree first.
    pub fn encode_typed<T: Serialize>(&self, doc: &Document<T>) -> Result<Encoded> {
        let content =
            serde_json::to_vec(doc.content()).map_err(|e| Error::SerdeFail(e.to_string()))?;
        ensure_size(content.len())?;
        Ok(Encoded {
            content,
            flags: JSON_COMPAT_FLAGS,
        })
    }

    /// Decode a JSON payload straight into a deserializable type.
    pub fn decode_typed<T: DeserializeOwned>(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        _status: ResponseStatus,
    ) -> Result<Document<T>> {
        self.ensure_accepts(flags)?;
        let value: T = serde_json::from_slice(content).map_err(|e| Error::MalformedContent {
            kind: DocumentKind::Json,
            detail: e.to_string(),
        })?;
        Ok(Document::new(id, value)?.with_cas(cas).with_expiry(expiry))
    }
}

impl Transcoder for JsonTranscoder {
    type Doc = JsonDocument;

    fn data_type(&self) -> DataType {
        DataType::Json
    }

    fn accepted_flags(&self) -> &'static [FlagPattern] {
        ACCEPTS
    }

    fn encode(&self, doc: &JsonDocument) -> Result<Encoded> {
        self.encode_typed(doc)
    }

    fn decode(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        status: ResponseStatus,
    ) -> Result<JsonDocument> {
        self.decode_typed(id, content, cas, expiry, flags, status)
    }
}
