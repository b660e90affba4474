//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse for AppError` implementation and the `ApiErrorResponse`
//! body live in `keygate-core` alongside `AppError` so the impl satisfies the
//! orphan rule. They are re-exported here to preserve the public path.

pub use keygate_core::error::ApiErrorResponse;
