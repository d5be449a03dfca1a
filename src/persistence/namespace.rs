//! Namespace derivation and storage keys
//!
//! A namespace is the SHA-256 hex digest of a caller-supplied scope, so keys
//! stay store-safe no matter what the scope string contains.

use std::fmt;

use sha2::{Digest, Sha256};

/// Separator between namespace and logical key
pub const KEY_SEPARATOR: char = '/';

/// Lowercase hex SHA-256 digest of `text` (64 characters)
#[must_use]
pub fn hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

/// Hashed scope under which one owner's entries live
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn for_scope(scope: &str) -> Self {
        Self(hash(scope))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `namespace/logical_key`
    pub fn key(&self, logical_key: &str) -> String {
        format!("{}{KEY_SEPARATOR}{logical_key}", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
