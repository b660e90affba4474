//! Client error types.

use thiserror::Error;

/// Errors surfaced by the verification client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The authority could not be reached or answered garbage. Already
    /// retried once by the transport layer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The embedded payload could not be unwrapped.
    #[error("artifact error: {0}")]
    Artifact(#[from] keygate_protect::ProtectError),

    /// The HTTP client could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),
}
