//! Repository implementations for the key store and device registry.

pub mod device;
pub mod license_key;
