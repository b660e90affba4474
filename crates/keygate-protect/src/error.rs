//! Error types for keygate-protect.

use thiserror::Error;

/// Protection error types.
#[derive(Debug, Error)]
pub enum ProtectError {
    /// The obfuscation secret was empty.
    #[error("Obfuscation secret must not be empty")]
    EmptySecret,

    /// The ciphertext blob was not valid base64.
    #[error("Invalid payload encoding: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The artifact envelope could not be parsed.
    #[error("Invalid artifact envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// Result type for protection operations.
pub type ProtectResult<T> = Result<T, ProtectError>;
