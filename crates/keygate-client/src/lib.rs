//! The verification client embedded in distributed artifacts.
//!
//! The heart of the crate is the pure state machine in [`state`]: every
//! transition is a function of `(state, event) -> (state, effects)`, so
//! activation, re-verification, and the offline-grace window are testable
//! without any network or storage. [`driver::VerificationClient`] wires
//! the machine to the real transport, cache store, and sealed artifact.

pub mod cache;
pub mod driver;
pub mod error;
pub mod fingerprint;
pub mod state;
pub mod transport;

pub use cache::{ActivationCache, CacheStore, FileCacheStore, MemoryCacheStore};
pub use driver::VerificationClient;
pub use error::ClientError;
pub use state::{Context, Effect, Event, VerificationState};
pub use transport::{ActivationApi, TimeoutProfile};
