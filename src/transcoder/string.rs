//! Transcoder for UTF-8 string documents.

use crate::document::{Document, StringDocument};
use crate::error::{Error, Result};
use crate::flags::{DataType, FlagPattern, STRING_COMPAT_FLAGS};
use crate::registry::DocumentKind;
use crate::response::ResponseStatus;
use crate::transcoder::{ensure_size, Encoded, Transcoder};

/// Strings carry the longest compatibility tail of any kind: before typed flags existed, a
/// value with flags 0 simply *was* a string. Encode therefore emits the compatibility word,
/// which modern readers unpack as a typed string while legacy-only readers see an empty tag
/// in their halfword and fall back to exactly that raw-string interpretation. Decode accepts
/// all three generations and treats them identically.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringTranscoder;

const ACCEPTS: &[FlagPattern] = &[
    FlagPattern::Compat(DataType::String),
    FlagPattern::Common(DataType::String),
    FlagPattern::ZeroFlags,
];

impl Transcoder for StringTranscoder {
    type Doc = StringDocument;

    fn data_type(&self) -> DataType {
        DataType::String
    }

    fn accepted_flags(&self) -> &'static [FlagPattern] {
        ACCEPTS
    }

    fn encode(&self, doc: &StringDocument) -> Result<Encoded> {
        let content = doc.content().as_bytes().to_vec();
        ensure_size(content.len())?;
        Ok(Encoded {
            content,
            flags: STRING_COMPAT_FLAGS,
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
    ) -> Result<StringDocument> {
        self.ensure_accepts(flags)?;
        let text = std::str::from_utf8(content).map_err(|e| Error::MalformedContent {
            kind: DocumentKind::String,
            detail: e.to_string(),
        })?;
        Ok(Document::new(id, text.to_owned())?
            .with_cas(cas)
            .with_expiry(expiry))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flags::{JSON_COMPAT_FLAGS, STRING_COMMON_FLAGS};
    use crate::response::ResponseStatus::Success;

    #[test]
    fn encodes_string() {
        let doc = Document::new("id", "value".to_string()).unwrap();
        let encoded = StringTranscoder.encode(&doc).unwrap();
        assert_eq!(encoded.content, b"value");
        assert_eq!(encoded.flags, STRING_COMPAT_FLAGS);
    }

    #[test]
    fn encodes_empty_string() {
        let doc = Document::new("id", String::new()).unwrap();
        let encoded = StringTranscoder.encode(&doc).unwrap();
        assert!(encoded.content.is_empty());
        assert_eq!(encoded.flags, STRING_COMPAT_FLAGS);
    }

    #[test]
    fn decodes_common_string() {
        let decoded = StringTranscoder
            .decode("id", b"value", 0, 0, STRING_COMMON_FLAGS, Success)
            .unwrap();
        assert_eq!(decoded.content(), "value");
    }

    #[test]
    fn decodes_legacy_string() {
        let decoded = StringTranscoder
            .decode("id", b"value", 0, 0, 0, Success)
            .unwrap();
        assert_eq!(decoded.content(), "value");
    }

    #[test]
    fn decodes_compat_string_with_any_cas_and_expiry() {
        let decoded = StringTranscoder
            .decode("id", b"value", 0xCAFE, 300, STRING_COMPAT_FLAGS, Success)
            .unwrap();
        assert_eq!(decoded.content(), "value");
        assert_eq!(decoded.cas(), 0xCAFE);
        assert_eq!(decoded.expiry(), 300);
    }

    #[test]
    fn decodes_compat_string_with_compression_bits() {
        let flags = STRING_COMPAT_FLAGS | (3 << 29);
        let decoded = StringTranscoder
            .decode("id", b"value", 0, 0, flags, Success)
            .unwrap();
        assert_eq!(decoded.content(), "value");
    }

    #[test]
    fn round_trips_multibyte_utf8() {
        for text in ["", "value", "søméthing wïth ünïcode", "日本語テキスト", "🦀"] {
            let doc = Document::new("id", text.to_string()).unwrap();
            let encoded = StringTranscoder.encode(&doc).unwrap();
            let decoded = StringTranscoder
                .decode("id", &encoded.content, 0, 0, encoded.flags, Success)
                .unwrap();
            assert_eq!(decoded.content(), text);
        }
    }

    #[test]
    fn rejects_foreign_flags() {
        let err = StringTranscoder
            .decode("id", b"{}", 0, 0, JSON_COMPAT_FLAGS, Success)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: DataType::String,
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = StringTranscoder
            .decode("id", &[0xFF, 0xFE, 0xFD], 0, 0, STRING_COMPAT_FLAGS, Success)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedContent { .. }));
    }
}
