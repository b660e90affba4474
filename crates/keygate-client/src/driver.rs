//! Cooperative driver for the verification state machine.
//!
//! The driver owns the machine state and executes effects: remote calls
//! through [`ActivationApi`], cache persistence through a [`CacheStore`],
//! and payload reveal through the sealed artifact. It is single-threaded
//! cooperative — at most one remote call is outstanding at any time, and
//! user actions arriving while a call is in flight are ignored by the
//! machine itself.

use chrono::Utc;
use tracing::info;

use keygate_protect::SealedArtifact;

use crate::cache::CacheStore;
use crate::error::ClientError;
use crate::state::{step, Context, Effect, Event, VerificationState, DEFAULT_OFFLINE_GRACE_DAYS};
use crate::transport::{ActivationApi, TimeoutProfile};
use crate::{fingerprint, transport};

/// The embedded verification client.
pub struct VerificationClient<S: CacheStore> {
    api: ActivationApi,
    store: S,
    artifact: SealedArtifact,
    fingerprint: String,
    device_name: String,
    offline_grace_days: i64,
    state: VerificationState,
    payload: Option<Vec<u8>>,
    last_message: Option<String>,
}

impl<S: CacheStore> VerificationClient<S> {
    /// Creates a client for a sealed artifact.
    pub fn new(
        artifact: SealedArtifact,
        store: S,
        timeouts: TimeoutProfile,
    ) -> Result<Self, ClientError> {
        let api = ActivationApi::new(&artifact.server_url, timeouts)?;
        Ok(Self {
            api,
            store,
            artifact,
            fingerprint: fingerprint::derive_fingerprint(),
            device_name: fingerprint::device_name(),
            offline_grace_days: DEFAULT_OFFLINE_GRACE_DAYS,
            state: VerificationState::Unverified,
            payload: None,
            last_message: None,
        })
    }

    /// Current machine state.
    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// The revealed payload, once unlocked (online or within grace).
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// The most recent user-facing message, if any.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// This install's fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Handle the artifact being opened: verify a cached activation if
    /// one exists, otherwise wait for a key.
    pub async fn open(&mut self) -> Result<(), ClientError> {
        let cache = self.store.load();
        self.dispatch(Event::Opened { cache }).await
    }

    /// Handle the user submitting a key code.
    pub async fn submit_key(&mut self, code: &str) -> Result<(), ClientError> {
        self.dispatch(Event::KeySubmitted {
            code: code.to_string(),
        })
        .await
    }

    /// Handle the user pressing the retry affordance.
    pub async fn retry(&mut self) -> Result<(), ClientError> {
        self.dispatch(Event::RetryRequested).await
    }

    /// Release this device's binding on the authority and forget the
    /// local activation.
    pub async fn deactivate(&mut self, code: &str) -> Result<bool, ClientError> {
        let reply = self.api.deactivate(code, &self.fingerprint).await?;
        if reply.success {
            self.store.purge();
            self.payload = None;
            self.state = VerificationState::Unverified;
        }
        Ok(reply.success)
    }

    async fn dispatch(&mut self, event: Event) -> Result<(), ClientError> {
        let ctx = Context {
            now: Utc::now(),
            fingerprint: self.fingerprint.clone(),
            offline_grace_days: self.offline_grace_days,
        };
        let state = std::mem::replace(&mut self.state, VerificationState::Unverified);
        let (next, effects) = step(state, event, &ctx);
        self.state = next;

        let mut follow_up = None;
        for effect in effects {
            match effect {
                Effect::SaveCache(cache) => self.store.save(&cache),
                Effect::PurgeCache => self.store.purge(),
                Effect::RevealPayload => {
                    self.payload = Some(self.artifact.open()?);
                    info!("Payload revealed");
                }
                Effect::ShowMessage(message) => self.last_message = Some(message),
                Effect::CallBind { code } => {
                    follow_up = Some(self.call_bind(&code).await?);
                }
                Effect::CallVerify { token } => {
                    follow_up = Some(self.call_verify(&token).await?);
                }
            }
        }

        if let Some(event) = follow_up {
            // One level deep: a remote call resolves into exactly one
            // completion event, which never schedules another call.
            Box::pin(self.dispatch(event)).await?;
        }
        Ok(())
    }

    async fn call_bind(&self, code: &str) -> Result<Event, ClientError> {
        match self
            .api
            .activate(code, &self.fingerprint, Some(&self.device_name))
            .await
        {
            Ok(transport::ActivateReply {
                success: true,
                token: Some(token),
                ..
            }) => Ok(Event::BindSucceeded { token }),
            Ok(reply) => Ok(Event::BindRejected {
                message: reply
                    .error
                    .unwrap_or_else(|| "Chave inválida.".to_string()),
            }),
            Err(ClientError::Transport(message)) => Ok(Event::TransportFailed { message }),
            Err(e) => Err(e),
        }
    }

    async fn call_verify(&self, token: &str) -> Result<Event, ClientError> {
        match self.api.verify(token, &self.fingerprint).await {
            Ok(reply) => Ok(Event::VerifyCompleted { valid: reply.valid }),
            Err(ClientError::Transport(message)) => Ok(Event::TransportFailed { message }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;

    #[tokio::test]
    async fn test_open_without_cache_waits_for_a_key() {
        let artifact = SealedArtifact::seal(b"material", "http://127.0.0.1:9").unwrap();
        let mut client =
            VerificationClient::new(artifact, MemoryCacheStore::new(), TimeoutProfile::default())
                .unwrap();

        client.open().await.unwrap();
        assert_eq!(client.state(), &VerificationState::Unverified);
        assert!(client.payload().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_authority_surfaces_a_network_error() {
        // Grab a port that nothing is listening on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let artifact =
            SealedArtifact::seal(b"material", &format!("http://127.0.0.1:{port}")).unwrap();
        let fast = TimeoutProfile {
            first_attempt: std::time::Duration::from_millis(300),
            retry: std::time::Duration::from_millis(300),
        };
        let mut client =
            VerificationClient::new(artifact, MemoryCacheStore::new(), fast).unwrap();

        client.open().await.unwrap();
        client.submit_key("KG-2026-ABCD-EFGH-JKMN").await.unwrap();
        match client.state() {
            VerificationState::NetworkError { retry, .. } => assert!(retry.is_some()),
            other => panic!("expected NetworkError, got {other:?}"),
        }
        assert!(client.payload().is_none());
    }

    #[tokio::test]
    async fn test_short_key_never_reaches_the_network() {
        let artifact = SealedArtifact::seal(b"material", "http://127.0.0.1:9").unwrap();
        let mut client =
            VerificationClient::new(artifact, MemoryCacheStore::new(), TimeoutProfile::default())
                .unwrap();

        client.open().await.unwrap();
        client.submit_key("KG-12").await.unwrap();
        assert_eq!(client.state(), &VerificationState::Unverified);
        assert!(client.last_message().is_some());
    }
}
