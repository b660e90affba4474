//! Business logic for the Keygate activation protocol.
//!
//! [`activation::ActivationService`] owns the full key and device
//! lifecycle: operator key issuance, device binding with per-key quota
//! enforcement, token verification, and device revocation.

pub mod activation;
pub mod keygen;
pub mod token;

pub use activation::{
    ActivationService, BindOutcome, BindRejection, InvalidReason, KeyInspection, RevokeOutcome,
    VerifyOutcome,
};
