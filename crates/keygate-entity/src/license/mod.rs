//! License key entities.

pub mod model;

pub use model::{LicenseKey, LicenseKeyWithDevices};
