//! Immutable document value objects.
//!
//! A [`Document`] is created either by application code ahead of a write, or by a transcoder
//! on decode. It is never mutated afterwards: a changed document (say, a new CAS after a
//! successful write) is a new instance built with the consuming `with_*` methods. Decode
//! always copies content out of the transport's buffer, so a document owns everything it
//! holds and the transport is free to reclaim the buffer the moment decode returns.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transcoder::legacy::LegacyValue;

/// A string document.
pub type StringDocument = Document<String>;
/// A JSON document holding a parsed value tree.
pub type JsonDocument = Document<serde_json::Value>;
/// A binary document holding raw bytes.
pub type BinaryDocument = Document<Vec<u8>>;
/// A document in one of the payload shapes pre-flags clients wrote.
pub type LegacyDocument = Document<LegacyValue>;

/// Token describing the mutation that produced a document version. Opaque at this layer;
/// callers use it for durability and consistency checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationToken {
    pub partition_id: u16,
    pub partition_uuid: u64,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document<T> {
    id: String,
    content: T,
    cas: u64,
    expiry: u32,
    mutation_token: Option<MutationToken>,
}

impl<T> Document<T> {
    /// Create a document with no CAS, no expiry, and no mutation token.
    ///
    /// # Errors
    ///
    /// Fails if the id is empty.
    pub fn new(id: impl Into<String>, content: T) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidId("id must not be empty".into()));
        }
        Ok(Self {
            id,
            content,
            cas: 0,
            expiry: 0,
            mutation_token: None,
        })
    }

    /// New instance with the given CAS. 0 means not-yet-persisted / no check on write.
    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    /// New instance with the given expiry, in seconds. 0 means never.
    pub fn with_expiry(mut self, expiry: u32) -> Self {
        self.expiry = expiry;
        self
    }

    /// New instance carrying the mutation token reported by the server.
    pub fn with_mutation_token(mut self, token: MutationToken) -> Self {
        self.mutation_token = Some(token);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    pub fn cas(&self) -> u64 {
        self.cas
    }

    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    pub fn mutation_token(&self) -> Option<&MutationToken> {
        self.mutation_token.as_ref()
    }
}
