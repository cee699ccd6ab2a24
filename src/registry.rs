//! Transcoder selection: by document kind on the write path, by kind or stored flags on the
//! read path.
//!
//! The transcoder family is a closed set of variants behind one registry rather than open
//! dynamic dispatch; adding a document kind means adding a variant and its flag patterns.
//! Selection by kind is an injective mapping. When a read does not name a kind, the stored
//! flags are unpacked to infer one, and anything the flag codec cannot identify falls back to
//! the legacy transcoder, preserving the historical default for untyped data.

use std::fmt;

use crate::document::{BinaryDocument, JsonDocument, LegacyDocument, StringDocument};
use crate::error::{Error, Result};
use crate::flags::{self, compat_flags, DataType};
use crate::response::ResponseStatus;
use crate::transcoder::binary::BinaryTranscoder;
use crate::transcoder::json::JsonTranscoder;
use crate::transcoder::legacy::LegacyTranscoder;
use crate::transcoder::string::StringTranscoder;
use crate::transcoder::{Encoded, Transcoder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    String,
    Json,
    Binary,
    Legacy,
}

impl DocumentKind {
    fn index(self) -> usize {
        match self {
            DocumentKind::String => 0,
            DocumentKind::Json => 1,
            DocumentKind::Binary => 2,
            DocumentKind::Legacy => 3,
        }
    }

    /// Infer the kind of a stored value from its flags alone. Exactly-zero flags predate any
    /// type information and go to the legacy kind, as does every word the flag codec reports
    /// as unknown.
    pub fn infer(flags: u32) -> Self {
        if flags == 0 {
            return DocumentKind::Legacy;
        }
        match flags::unpack(flags).data_type {
            DataType::String => DocumentKind::String,
            DataType::Json => DocumentKind::Json,
            DataType::Binary => DocumentKind::Binary,
            DataType::Serialized | DataType::Unknown => DocumentKind::Legacy,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DocumentKind::String => f.write_str("string"),
            DocumentKind::Json => f.write_str("json"),
            DocumentKind::Binary => f.write_str("binary"),
            DocumentKind::Legacy => f.write_str("legacy"),
        }
    }
}

/// A document of any supported kind, as produced by kind-inferred decoding.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyDocument {
    String(StringDocument),
    Json(JsonDocument),
    Binary(BinaryDocument),
    Legacy(LegacyDocument),
}

impl AnyDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            AnyDocument::String(_) => DocumentKind::String,
            AnyDocument::Json(_) => DocumentKind::Json,
            AnyDocument::Binary(_) => DocumentKind::Binary,
            AnyDocument::Legacy(_) => DocumentKind::Legacy,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AnyDocument::String(d) => d.id(),
            AnyDocument::Json(d) => d.id(),
            AnyDocument::Binary(d) => d.id(),
            AnyDocument::Legacy(d) => d.id(),
        }
    }

    pub fn cas(&self) -> u64 {
        match self {
            AnyDocument::String(d) => d.cas(),
            AnyDocument::Json(d) => d.cas(),
            AnyDocument::Binary(d) => d.cas(),
            AnyDocument::Legacy(d) => d.cas(),
        }
    }

    pub fn expiry(&self) -> u32 {
        match self {
            AnyDocument::String(d) => d.expiry(),
            AnyDocument::Json(d) => d.expiry(),
            AnyDocument::Binary(d) => d.expiry(),
            AnyDocument::Legacy(d) => d.expiry(),
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            AnyDocument::String(_) => DataType::String,
            AnyDocument::Json(_) => DataType::Json,
            AnyDocument::Binary(_) => DataType::Binary,
            AnyDocument::Legacy(_) => DataType::Serialized,
        }
    }
}

/// One registered transcoder, as a closed variant set.
#[derive(Clone, Copy, Debug)]
pub enum AnyTranscoder {
    String(StringTranscoder),
    Json(JsonTranscoder),
    Binary(BinaryTranscoder),
    Legacy(LegacyTranscoder),
}

impl AnyTranscoder {
    pub fn kind(&self) -> DocumentKind {
        match self {
            AnyTranscoder::String(_) => DocumentKind::String,
            AnyTranscoder::Json(_) => DocumentKind::Json,
            AnyTranscoder::Binary(_) => DocumentKind::Binary,
            AnyTranscoder::Legacy(_) => DocumentKind::Legacy,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            AnyTranscoder::String(t) => t.data_type(),
            AnyTranscoder::Json(t) => t.data_type(),
            AnyTranscoder::Binary(t) => t.data_type(),
            AnyTranscoder::Legacy(t) => t.data_type(),
        }
    }

    pub fn accepts(&self, flags: u32) -> bool {
        match self {
            AnyTranscoder::String(t) => t.accepts(flags),
            AnyTranscoder::Json(t) => t.accepts(flags),
            AnyTranscoder::Binary(t) => t.accepts(flags),
            AnyTranscoder::Legacy(t) => t.accepts(flags),
        }
    }

    /// Encode a document through this transcoder. A document of any other kind is a type
    /// mismatch; the flags in the error describe what the document's own kind would write.
    pub fn encode(&self, doc: &AnyDocument) -> Result<Encoded> {
        match (self, doc) {
            (AnyTranscoder::String(t), AnyDocument::String(d)) => t.encode(d),
            (AnyTranscoder::Json(t), AnyDocument::Json(d)) => t.encode(d),
            (AnyTranscoder::Binary(t), AnyDocument::Binary(d)) => t.encode(d),
            (AnyTranscoder::Legacy(t), AnyDocument::Legacy(d)) => t.encode(d),
            (t, d) => Err(Error::TypeMismatch {
                expected: t.data_type(),
                flags: compat_flags(d.data_type()),
            }),
        }
    }

    pub fn decode(
        &self,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        status: ResponseStatus,
    ) -> Result<AnyDocument> {
        match self {
            AnyTranscoder::String(t) => t
                .decode(id, content, cas, expiry, flags, status)
                .map(AnyDocument::String),
            AnyTranscoder::Json(t) => t
                .decode(id, content, cas, expiry, flags, status)
                .map(AnyDocument::Json),
            AnyTranscoder::Binary(t) => t
                .decode(id, content, cas, expiry, flags, status)
                .map(AnyDocument::Binary),
            AnyTranscoder::Legacy(t) => t
                .decode(id, content, cas, expiry, flags, status)
                .map(AnyDocument::Legacy),
        }
    }
}

/// Registry mapping document kinds to transcoders.
///
/// [`TranscoderRegistry::default`] registers the full family; [`TranscoderRegistry::empty`]
/// plus [`register`][TranscoderRegistry::register] builds a restricted one. Asking for an
/// unregistered kind is a configuration error, surfaced as [`Error::UnsupportedType`] and
/// never retried.
#[derive(Clone, Debug)]
pub struct TranscoderRegistry {
    slots: [Option<AnyTranscoder>; 4],
}

impl TranscoderRegistry {
    pub fn empty() -> Self {
        Self { slots: [None; 4] }
    }

    /// Register a transcoder under its kind, replacing any previous registration.
    pub fn register(&mut self, transcoder: AnyTranscoder) -> &mut Self {
        self.slots[transcoder.kind().index()] = Some(transcoder);
        self
    }

    /// The transcoder to use for writing documents of the given kind.
    pub fn for_encoding(&self, kind: DocumentKind) -> Result<&AnyTranscoder> {
        self.slots[kind.index()]
            .as_ref()
            .ok_or(Error::UnsupportedType(kind))
    }

    /// The transcoder to use for a read. With a kind, the lookup is the same injective mapping
    /// as the write path; without one, the kind is inferred from the stored flags.
    pub fn for_decoding(&self, kind: Option<DocumentKind>, flags: u32) -> Result<&AnyTranscoder> {
        self.for_encoding(kind.unwrap_or_else(|| DocumentKind::infer(flags)))
    }

    /// Select by the document's kind and encode in one step.
    pub fn encode(&self, doc: &AnyDocument) -> Result<Encoded> {
        self.for_encoding(doc.kind())?.encode(doc)
    }

    /// Select and decode in one step.
    #[allow(clippy::too_many_arguments)]
    pub fn decode(
        &self,
        kind: Option<DocumentKind>,
        id: &str,
        content: &[u8],
        cas: u64,
        expiry: u32,
        flags: u32,
        status: ResponseStatus,
    ) -> Result<AnyDocument> {
        self.for_decoding(kind, flags)?
            .decode(id, content, cas, expiry, flags, status)
    }
}

impl Default for TranscoderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(AnyTranscoder::String(StringTranscoder))
            .register(AnyTranscoder::Json(JsonTranscoder))
            .register(AnyTranscoder::Binary(BinaryTranscoder))
            .register(AnyTranscoder::Legacy(LegacyTranscoder));
        registry
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Document;
    use crate::flags::{
        BINARY_COMPAT_FLAGS, JSON_COMMON_FLAGS, JSON_COMPAT_FLAGS, LEGACY_SERIALIZED,
        STRING_COMMON_FLAGS, STRING_COMPAT_FLAGS,
    };
    use crate::response::ResponseStatus::Success;
    use crate::transcoder::legacy::LegacyValue;

    #[test]
    fn infers_kind_from_flags() {
        let cases = [
            (STRING_COMPAT_FLAGS, DocumentKind::String),
            (STRING_COMMON_FLAGS, DocumentKind::String),
            (JSON_COMPAT_FLAGS, DocumentKind::Json),
            (JSON_COMMON_FLAGS, DocumentKind::Json),
            (BINARY_COMPAT_FLAGS, DocumentKind::Binary),
            (LEGACY_SERIALIZED as u32, DocumentKind::Legacy),
            (0, DocumentKind::Legacy),
            (0xDEAD_BEEF, DocumentKind::Legacy),
        ];
        for (flags, expected) in cases {
            assert_eq!(DocumentKind::infer(flags), expected, "{:#x}", flags);
        }
    }

    #[test]
    fn unregistered_kind_is_a_configuration_error() {
        let mut registry = TranscoderRegistry::empty();
        registry.register(AnyTranscoder::String(StringTranscoder));
        assert!(registry.for_encoding(DocumentKind::String).is_ok());
        assert_eq!(
            registry.for_encoding(DocumentKind::Json).unwrap_err(),
            Error::UnsupportedType(DocumentKind::Json)
        );
        assert_eq!(
            registry
                .for_decoding(None, JSON_COMPAT_FLAGS)
                .unwrap_err(),
            Error::UnsupportedType(DocumentKind::Json)
        );
    }

    #[test]
    fn decodes_by_inferred_kind() {
        let registry = TranscoderRegistry::default();
        let decoded = registry
            .decode(None, "id", b"value", 0, 0, STRING_COMPAT_FLAGS, Success)
            .unwrap();
        match decoded {
            AnyDocument::String(d) => assert_eq!(d.content(), "value"),
            other => panic!("expected a string document, got {:?}", other),
        }
        let decoded = registry
            .decode(None, "id", b"value", 0, 0, 0, Success)
            .unwrap();
        match decoded {
            AnyDocument::Legacy(d) => {
                assert_eq!(d.content(), &LegacyValue::Text("value".into()))
            }
            other => panic!("expected a legacy document, got {:?}", other),
        }
    }

    #[test]
    fn requested_kind_overrides_inference() {
        let registry = TranscoderRegistry::default();
        let decoded = registry
            .decode(
                Some(DocumentKind::String),
                "id",
                b"value",
                0,
                0,
                STRING_COMMON_FLAGS,
                Success,
            )
            .unwrap();
        assert_eq!(decoded.kind(), DocumentKind::String);
        // The requested kind's transcoder still rejects flags it cannot interpret.
        let err = registry
            .decode(
                Some(DocumentKind::Binary),
                "id",
                b"value",
                0,
                0,
                STRING_COMPAT_FLAGS,
                Success,
            )
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn encode_selects_by_document_kind() {
        let registry = TranscoderRegistry::default();
        let doc = AnyDocument::String(Document::new("id", "value".to_string()).unwrap());
        let encoded = registry.encode(&doc).unwrap();
        assert_eq!(encoded.flags, STRING_COMPAT_FLAGS);
        assert_eq!(encoded.content, b"value");
    }

    #[test]
    fn mismatched_document_and_transcoder_is_rejected() {
        let doc = AnyDocument::String(Document::new("id", "value".to_string()).unwrap());
        let err = AnyTranscoder::Json(JsonTranscoder).encode(&doc).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: DataType::Json,
                ..
            }
        ));
    }

    #[test]
    fn reencoding_decoded_output_is_byte_identical() {
        let registry = TranscoderRegistry::default();
        let original = b"{\"k\":[1,2,3]}";
        for flags in [JSON_COMPAT_FLAGS, JSON_COMMON_FLAGS] {
            let decoded = registry
                .decode(None, "id", original, 0, 0, flags, Success)
                .unwrap();
            let reencoded = registry.encode(&decoded).unwrap();
            assert_eq!(reencoded.content, original);
            assert_eq!(reencoded.flags, JSON_COMPAT_FLAGS);
        }
    }

    #[test]
    fn shared_registry_has_no_cross_talk() {
        use rand::distributions::Alphanumeric;
        use rand::Rng;

        let registry = TranscoderRegistry::default();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let mut rng = rand::thread_rng();
                    for _ in 0..200 {
                        let len = rng.gen_range(0..256);
                        let text: String = (0..len)
                            .map(|_| char::from(rng.sample(Alphanumeric)))
                            .collect();
                        let doc =
                            AnyDocument::String(Document::new("id", text.clone()).unwrap());
                        let encoded = registry.encode(&doc).unwrap();
                        let decoded = registry
                            .decode(None, "id", &encoded.content, 0, 0, encoded.flags, Success)
                            .unwrap();
                        match decoded {
                            AnyDocument::String(d) => assert_eq!(d.content(), &text),
                            other => panic!("expected a string document, got {:?}", other),
                        }
                    }
                });
            }
        });
    }
}
