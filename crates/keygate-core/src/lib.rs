//! Core building blocks shared by every Keygate crate: the unified error
//! type, the result alias, and the configuration schemas.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
