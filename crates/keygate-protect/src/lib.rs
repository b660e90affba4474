//! Content protection for distributed artifacts.
//!
//! The codec is a byte-wise XOR against a repeating secret followed by a
//! base64 encoding. This is deliberately NOT a cryptographic control: the
//! secret ships embedded alongside the ciphertext in the same artifact,
//! so the scheme only deters casual viewing of the payload. The contract
//! that matters (and the one under test) is the exact round-trip,
//! `reveal(protect(x, k), k) == x`.

pub mod artifact;
pub mod codec;
pub mod error;

pub use artifact::SealedArtifact;
pub use codec::{protect, reveal};
pub use error::{ProtectError, ProtectResult};
