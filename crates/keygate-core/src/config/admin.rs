//! Admin endpoint protection configuration.

use serde::{Deserialize, Serialize};

/// Shared-secret protection for the `/api/admin` surface.
///
/// The secret is compared by exact match against the `x-admin-secret`
/// request header. An empty secret disables the admin surface entirely:
/// every admin request is rejected until one is configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// The shared secret. Set via `KEYGATE__ADMIN__SECRET` in deployments.
    #[serde(default)]
    pub secret: String,
}
