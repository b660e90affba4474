//! Bound device entities.

pub mod model;

pub use model::{Device, DeviceWithKeyStatus};
