//! HTTP transport to the activation authority.
//!
//! Every call uses a two-tier timeout: a short first attempt, then one
//! automatic retry with a longer timeout before the call is reported as
//! failed. Mobile and embedded browsers wake their radios slowly, so the
//! mobile profile starts with a much longer first tier.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

/// Two-tier call timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutProfile {
    /// Timeout of the first attempt.
    pub first_attempt: Duration,
    /// Timeout of the single automatic retry.
    pub retry: Duration,
}

impl TimeoutProfile {
    /// Desktop-class clients with predictable networking.
    pub fn desktop() -> Self {
        Self {
            first_attempt: Duration::from_secs(15),
            retry: Duration::from_secs(60),
        }
    }

    /// Mobile/embedded clients with slow network wake-up.
    pub fn mobile() -> Self {
        Self {
            first_attempt: Duration::from_secs(45),
            retry: Duration::from_secs(60),
        }
    }
}

impl Default for TimeoutProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// JSON client for the authority's activation endpoints.
#[derive(Debug, Clone)]
pub struct ActivationApi {
    base_url: String,
    client: reqwest::Client,
    timeouts: TimeoutProfile,
}

/// Reply of `POST /api/ativar`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivateReply {
    /// Whether the device was bound.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// The issued (or existing) token on success.
    #[serde(default)]
    pub token: Option<String>,
    /// Human-readable refusal reason.
    #[serde(rename = "erro", default)]
    pub error: Option<String>,
}

/// Reply of `POST /api/verificar`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyReply {
    /// Whether the token is still accepted.
    #[serde(rename = "valido")]
    pub valid: bool,
    /// Disclosed reason when invalid.
    #[serde(rename = "erro", default)]
    pub error: Option<String>,
}

/// Reply of `POST /api/desativar`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeactivateReply {
    /// Whether a binding was removed.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// Reason when nothing was removed.
    #[serde(rename = "erro", default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActivateRequest<'a> {
    #[serde(rename = "chave")]
    code: &'a str,
    fingerprint: &'a str,
    #[serde(rename = "nomeDispositivo", skip_serializing_if = "Option::is_none")]
    device_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
    fingerprint: &'a str,
}

#[derive(Debug, Serialize)]
struct DeactivateRequest<'a> {
    #[serde(rename = "chave")]
    code: &'a str,
    fingerprint: &'a str,
}

impl ActivationApi {
    /// Creates a client for the authority at `base_url`.
    pub fn new(base_url: &str, timeouts: TimeoutProfile) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeouts,
        })
    }

    /// Bind this device to a key.
    pub async fn activate(
        &self,
        code: &str,
        fingerprint: &str,
        device_name: Option<&str>,
    ) -> Result<ActivateReply, ClientError> {
        self.post_with_retry(
            "/api/ativar",
            &ActivateRequest {
                code,
                fingerprint,
                device_name,
            },
        )
        .await
    }

    /// Re-verify a cached token.
    pub async fn verify(&self, token: &str, fingerprint: &str) -> Result<VerifyReply, ClientError> {
        self.post_with_retry("/api/verificar", &VerifyRequest { token, fingerprint })
            .await
    }

    /// Release this device's binding.
    pub async fn deactivate(
        &self,
        code: &str,
        fingerprint: &str,
    ) -> Result<DeactivateReply, ClientError> {
        self.post_with_retry("/api/desativar", &DeactivateRequest { code, fingerprint })
            .await
    }

    async fn post_with_retry<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        match self.post_once(path, body, self.timeouts.first_attempt).await {
            Ok(reply) => Ok(reply),
            Err(first) if is_retryable(&first) => {
                debug!(path, "First attempt failed ({first}), retrying with longer timeout");
                self.post_once(path, body, self.timeouts.retry)
                    .await
                    .map_err(|e| ClientError::Transport(e.to_string()))
            }
            Err(e) => Err(ClientError::Transport(e.to_string())),
        }
    }

    async fn post_once<B, R>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R, reqwest::Error>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        // Business refusals arrive as JSON bodies on 403, so the status
        // code is not checked here; only the body shape matters.
        self.client
            .post(format!("{}{}", self.base_url, path))
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json::<R>()
            .await
    }
}

fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}
