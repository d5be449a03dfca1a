//! Crate-wide error type

/// Errors raised while encoding, decoding or touching the backing store.
///
/// A missing key is never an error: loaders return the caller's default.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value could not be represented in the wire format
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Stored text did not match the requested shape, or was not valid JSON
    #[error("deserialization failed: {0}")]
    Deserialization(String),
    /// The backing store rejected an operation
    #[error("store error: {0}")]
    Store(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn mismatch(expected: &str, found: &serde_json::Value) -> Self {
        Error::Deserialization(format!("expected {expected}, found {}", json_kind(found)))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
