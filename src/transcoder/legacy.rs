//! Fallback transcoder for payloads written by pre-flags clients.
//!
//! Before typed flags, clients crammed everything into the low halfword: 0 for plain text, a
//! serialized-object bit, and a family of "special" tags for primitives stored in fixed binary
//! layouts. This transcoder accepts any flags word and classifies the payload by that tag, so
//! it doubles as the default when a read does not name a document kind and the stored flags
//! identify nothing newer.

use byteorder::{BigEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

use crate::document::{Document, LegacyDocument};
use crate::error::{Error, Result};
use crate::flags::{
    legacy_compat_flags, legacy_tag, DataType, FlagPattern, BINARY_COMPAT_FLAGS,
    LEGACY_SERIALIZED, LEGACY_SPECIAL_BOOLEAN, LEGACY_SPECIAL_BYTEARRAY, LEGACY_SPECIAL_LONG,
    SERIALIZED_COMPAT_FLAGS, STRING_COMPAT_FLAGS,
};
use crate::registry::DocumentKind;
use crate::response::ResponseStatus;
use crate::transcoder::{ensure_size, Encoded, Transcoder};

/// The payload shapes legacy clients wrote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LegacyValue {
    /// Plain UTF-8 text, the untagged default.
    Text(String),
    /// A tagged raw byte array.
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// An opaque serialized-object blob. Carried, never interpreted.
    Serialized(#[serde(with = "serde_bytes")] Vec<u8>),
    /// A big-endian 64-bit integer.
    Long(i64),
    /// A single-byte boolean.
    Boolean(bool),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyTranscoder;

const ACCEPTS: &[FlagPattern] = &[FlagPattern::Any];

fn malformed(detail: impl Into<String>) -> Error {
    Error::MalformedContent {
        kind: DocumentKind::Legacy,
        detail: detail.into(),
    }
}

impl Transcoder for LegacyTranscoder {
    type Doc = LegacyDocument;

    fn data_type(&self) -> DataType {
        DataType::Serialized
    }

    fn accepted_flags(&self) -> &'static [FlagPattern] {
        ACCEPTS
    }

    fn encode(&self, doc: &LegacyDocument) -> Result<Encoded> {
        let (content, flags) = match doc.content() {
            LegacyValue::Text(s) => (s.as_bytes().to_vec(), STRING_COMPAT_FLAGS),
            LegacyValue::Bytes(b) => (b.clone(), BINARY_COMPAT_FLAGS),
            LegacyValue::Serialized(b) => (b.clone(), SERIALIZED_COMPAT_FLAGS),
            LegacyValue::Long(v) => (
                v.to_be_bytes().to_vec(),
                legacy_compat_flags(LEGACY_SPECIAL_LONG),
            ),
            LegacyValue::Boolean(b) => (
                vec![*b as u8],
                legacy_compat_flags(LEGACY_SPECIAL_BOOLEAN),
            ),
        };
        ensure_size(content.len())?;
        Ok(Encoded { content, flags })
    }

    fn decode(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        _status: ResponseStatus,
    ) -> Result<LegacyDocument> {
        self.ensure_accepts(flags)?;
        let value = match legacy_tag(flags) {
            LEGACY_SERIALIZED => LegacyValue::Serialized(content.to_vec()),
            LEGACY_SPECIAL_BYTEARRAY => LegacyValue::Bytes(content.to_vec()),
            LEGACY_SPECIAL_LONG => {
                if content.len() != 8 {
                    return Err(malformed(format!(
                        "long payload must be 8 bytes, got {}",
                        content.len()
                    )));
                }
                let mut rdr = content;
                let v = rdr.read_i64::<BigEndian>().unwrap(); // length checked above
                LegacyValue::Long(v)
            }
            LEGACY_SPECIAL_BOOLEAN => match content {
                [0] => LegacyValue::Boolean(false),
                [1] => LegacyValue::Boolean(true),
                _ => return Err(malformed("boolean payload must be a single 0/1 byte")),
            },
            _ => {
                let text = std::str::from_utf8(content)
                    .map_err(|e| malformed(e.to_string()))?;
                LegacyValue::Text(text.to_owned())
            }
        };
        Ok(Document::new(id, value)?.with_cas(cas).with_expiry(expiry))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::response::ResponseStatus::Success;

    fn round_trip(value: LegacyValue) -> LegacyValue {
        let doc = Document::new("id", value).unwrap();
        let encoded = LegacyTranscoder.encode(&doc).unwrap();
        LegacyTranscoder
            .decode("id", &encoded.content, 0, 0, encoded.flags, Success)
            .unwrap()
            .into_content()
    }

    #[test]
    fn round_trips_every_shape() {
        let cases = vec![
            LegacyValue::Text("plain old text".into()),
            LegacyValue::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            LegacyValue::Serialized(vec![0xAC, 0xED, 0x00, 0x05]),
            LegacyValue::Long(-40_000_000_000),
            LegacyValue::Long(i64::MAX),
            LegacyValue::Boolean(true),
            LegacyValue::Boolean(false),
        ];
        for case in cases {
            assert_eq!(round_trip(case.clone()), case);
        }
    }

    #[test]
    fn untagged_payload_is_text() {
        let decoded = LegacyTranscoder
            .decode("id", b"value", 0, 0, 0, Success)
            .unwrap();
        assert_eq!(decoded.content(), &LegacyValue::Text("value".into()));
    }

    #[test]
    fn serialized_tag_is_opaque() {
        let decoded = LegacyTranscoder
            .decode("id", &[1, 2, 3], 0, 0, LEGACY_SERIALIZED as u32, Success)
            .unwrap();
        assert_eq!(decoded.content(), &LegacyValue::Serialized(vec![1, 2, 3]));
    }

    #[test]
    fn long_payload_length_is_checked() {
        let err = LegacyTranscoder
            .decode("id", &[0, 1, 2], 0, 0, LEGACY_SPECIAL_LONG as u32, Success)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedContent { .. }));
        let decoded = LegacyTranscoder
            .decode(
                "id",
                &1234i64.to_be_bytes(),
                0,
                0,
                LEGACY_SPECIAL_LONG as u32,
                Success,
            )
            .unwrap();
        assert_eq!(decoded.content(), &LegacyValue::Long(1234));
    }

    #[test]
    fn boolean_payload_is_strict() {
        for bad in [&[][..], &[2][..], &[0, 0][..]] {
            let err = LegacyTranscoder
                .decode("id", bad, 0, 0, LEGACY_SPECIAL_BOOLEAN as u32, Success)
                .unwrap_err();
            assert!(matches!(err, Error::MalformedContent { .. }));
        }
    }

    #[test]
    fn invalid_utf8_text_is_malformed() {
        let err = LegacyTranscoder
            .decode("id", &[0xFF, 0xFF], 0, 0, 0, Success)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedContent { .. }));
    }
}
