//! Wire DTOs.
//!
//! The external JSON contract uses the Portuguese field names the
//! deployed clients were built against; Rust-side names stay idiomatic
//! via `serde(rename)`.

pub mod request;
pub mod response;

use validator::Validate;

use keygate_core::error::AppError;
use keygate_core::result::AppResult;

/// Validate a request DTO, surfacing the first field message as a 400.
pub(crate) fn validate_request<T: Validate>(req: &T) -> AppResult<()> {
    req.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Requisição inválida".to_string());
        AppError::validation(message)
    })
}
