//! Session identifier.

use std::fmt;

/// Opaque token identifying the current build/run of the development server.
///
/// Only equality is meaningful. The raw bytes are kept exactly as received:
/// no decoding, no trimming, no normalization. Display is lossy UTF-8.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Vec<u8>);

impl SessionId {
    /// Create a session identifier from raw bytes or text.
    #[must_use]
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    /// Raw identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SessionId {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

impl From<String> for SessionId {
    fn from(raw: String) -> Self {
        Self(raw.into_bytes())
    }
}

impl From<&str> for SessionId {
    fn from(raw: &str) -> Self {
        Self(raw.as_bytes().to_vec())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
