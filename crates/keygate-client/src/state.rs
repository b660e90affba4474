//! The verification state machine.
//!
//! Transitions are pure: [`step`] maps `(state, event)` to the next state
//! plus a list of effects for the driver to execute. No I/O happens here,
//! which is what makes the offline-grace and retry rules testable without
//! a network or a filesystem.

use chrono::{DateTime, Utc};

use crate::cache::ActivationCache;

/// Minimum length of a key code after stripping separators; anything
/// shorter is rejected locally without a round trip.
const MIN_CODE_LEN: usize = 16;

/// Days a previously verified device stays unlocked without reaching the
/// authority.
pub const DEFAULT_OFFLINE_GRACE_DAYS: i64 = 30;

/// States of the verification machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// No usable activation; the user must supply a key.
    Unverified,
    /// A remote call is in flight. Further user events are ignored until
    /// it resolves.
    Verifying {
        /// What the in-flight call is doing.
        attempt: Attempt,
    },
    /// The payload is revealed after a successful online check.
    Unlocked,
    /// The authority refused the activation; the user may retry with a
    /// different key.
    Blocked {
        /// The authority's reason, verbatim.
        reason: String,
    },
    /// The authority is unreachable but the last verification is recent
    /// enough; the payload is revealed on trust.
    OfflineGrace {
        /// Whole days since the last successful verification.
        days_since_verified: i64,
    },
    /// The authority is unreachable and no grace applies.
    NetworkError {
        /// Message to surface to the user.
        message: String,
        /// The attempt to repeat when the user asks for a retry, if any.
        retry: Option<Attempt>,
    },
}

/// The remote call a `Verifying` state is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// First-time (or repeated) activation with a typed key.
    Bind {
        /// The normalized key code being submitted.
        code: String,
    },
    /// Re-verification of a cached token.
    Verify {
        /// The cached activation being re-verified.
        cache: ActivationCache,
    },
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The artifact was opened; carries whatever the cache store had.
    Opened {
        /// Cached activation, if any.
        cache: Option<ActivationCache>,
    },
    /// The user submitted a key code.
    KeySubmitted {
        /// The raw typed code.
        code: String,
    },
    /// The bind call returned a token.
    BindSucceeded {
        /// The issued bearer token.
        token: String,
    },
    /// The bind call was refused by the authority.
    BindRejected {
        /// The authority's reason, verbatim.
        message: String,
    },
    /// The verify call completed (in either direction).
    VerifyCompleted {
        /// Whether the token is still accepted.
        valid: bool,
    },
    /// The transport gave up (after its internal retry).
    TransportFailed {
        /// Description of the failure.
        message: String,
    },
    /// The user pressed the retry affordance.
    RetryRequested,
}

/// Side effects for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the bind endpoint with this code.
    CallBind {
        /// Normalized key code.
        code: String,
    },
    /// Call the verify endpoint with this token.
    CallVerify {
        /// Cached bearer token.
        token: String,
    },
    /// Persist the activation cache.
    SaveCache(ActivationCache),
    /// Remove the activation cache.
    PurgeCache,
    /// Unwrap and show the protected payload.
    RevealPayload,
    /// Surface a message to the user.
    ShowMessage(String),
}

/// Ambient inputs of a transition.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current time.
    pub now: DateTime<Utc>,
    /// This install's device fingerprint.
    pub fingerprint: String,
    /// Width of the offline-grace window in days.
    pub offline_grace_days: i64,
}

impl Context {
    /// Context with the default grace window.
    pub fn new(now: DateTime<Utc>, fingerprint: impl Into<String>) -> Self {
        Self {
            now,
            fingerprint: fingerprint.into(),
            offline_grace_days: DEFAULT_OFFLINE_GRACE_DAYS,
        }
    }
}

/// Advance the machine by one event.
pub fn step(
    state: VerificationState,
    event: Event,
    ctx: &Context,
) -> (VerificationState, Vec<Effect>) {
    use VerificationState::*;

    match (state, event) {
        // ── Opening the artifact ─────────────────────────────────
        (Verifying { attempt }, Event::Opened { .. }) => (Verifying { attempt }, vec![]),
        (_, Event::Opened { cache: None }) => (Unverified, vec![]),
        (_, Event::Opened { cache: Some(cache) }) => {
            let token = cache.token.clone();
            (
                Verifying {
                    attempt: Attempt::Verify { cache },
                },
                vec![Effect::CallVerify { token }],
            )
        }

        // ── Key entry ────────────────────────────────────────────
        // Only the interactive states accept a typed key; while a call is
        // in flight (or after unlock) the input is ignored.
        (
            state @ (Unverified | Blocked { .. } | NetworkError { .. }),
            Event::KeySubmitted { code },
        ) => match validate_code(&code) {
            Ok(code) => (
                Verifying {
                    attempt: Attempt::Bind { code: code.clone() },
                },
                vec![Effect::CallBind { code }],
            ),
            Err(message) => (state, vec![Effect::ShowMessage(message.to_string())]),
        },

        // ── Bind resolution ──────────────────────────────────────
        (Verifying { attempt: Attempt::Bind { .. } }, Event::BindSucceeded { token }) => {
            let cache = ActivationCache {
                token,
                fingerprint: ctx.fingerprint.clone(),
                activated_at: ctx.now,
                last_verified_at: ctx.now,
            };
            (
                Unlocked,
                vec![Effect::SaveCache(cache), Effect::RevealPayload],
            )
        }
        (Verifying { attempt: Attempt::Bind { .. } }, Event::BindRejected { message }) => (
            Blocked {
                reason: message.clone(),
            },
            vec![Effect::ShowMessage(message)],
        ),
        (Verifying { attempt: Attempt::Bind { code } }, Event::TransportFailed { message }) => (
            NetworkError {
                message: message.clone(),
                retry: Some(Attempt::Bind { code }),
            },
            vec![Effect::ShowMessage(offline_bind_message())],
        ),

        // ── Verify resolution ────────────────────────────────────
        (
            Verifying { attempt: Attempt::Verify { cache } },
            Event::VerifyCompleted { valid: true },
        ) => {
            let refreshed = ActivationCache {
                fingerprint: ctx.fingerprint.clone(),
                last_verified_at: ctx.now,
                ..cache
            };
            (
                Unlocked,
                vec![Effect::SaveCache(refreshed), Effect::RevealPayload],
            )
        }
        // A refused token gets no offline grace: the cache is purged and
        // the user must re-activate from scratch.
        (
            Verifying { attempt: Attempt::Verify { .. } },
            Event::VerifyCompleted { valid: false },
        ) => (Unverified, vec![Effect::PurgeCache]),
        (Verifying { attempt: Attempt::Verify { cache } }, Event::TransportFailed { message }) => {
            let elapsed = ctx.now.signed_duration_since(cache.last_verified_at);
            let days = elapsed.num_days();
            if elapsed.num_seconds() <= ctx.offline_grace_days * 86_400 {
                (
                    OfflineGrace {
                        days_since_verified: days.max(0),
                    },
                    vec![Effect::RevealPayload],
                )
            } else {
                (
                    NetworkError {
                        message,
                        retry: None,
                    },
                    vec![
                        Effect::PurgeCache,
                        Effect::ShowMessage(grace_expired_message(days)),
                    ],
                )
            }
        }

        // ── Manual retry ─────────────────────────────────────────
        (NetworkError { retry: Some(attempt), .. }, Event::RetryRequested) => {
            let effect = match &attempt {
                Attempt::Bind { code } => Effect::CallBind { code: code.clone() },
                Attempt::Verify { cache } => Effect::CallVerify {
                    token: cache.token.clone(),
                },
            };
            (Verifying { attempt }, vec![effect])
        }
        (NetworkError { retry: None, .. }, Event::RetryRequested) => (Unverified, vec![]),

        // Everything else (stale completions, retry outside an error
        // state, events after unlock) is ignored.
        (state, _) => (state, vec![]),
    }
}

/// Local shape check before a bind round trip: at least [`MIN_CODE_LEN`]
/// alphanumeric characters. Returns the normalized (trimmed, uppercased)
/// code to submit.
fn validate_code(code: &str) -> Result<String, &'static str> {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return Err("Digite sua chave de ativação.");
    }
    let significant = normalized.chars().filter(char::is_ascii_alphanumeric).count();
    if significant < MIN_CODE_LEN {
        return Err("Chave inválida. Verifique e tente novamente.");
    }
    Ok(normalized)
}

fn offline_bind_message() -> String {
    "Não foi possível conectar ao servidor. Verifique sua internet e tente novamente.".to_string()
}

fn grace_expired_message(days: i64) -> String {
    format!(
        "Sua ativação precisa ser verificada online ({days} dias sem verificar). Conecte-se à internet."
    )
}
