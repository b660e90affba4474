//! Sealed artifact envelope.
//!
//! A sealed artifact carries everything the embedded client needs to run
//! offline: the obfuscated payload, the obfuscation secret, and the URL
//! of the activation authority. The secret traveling next to the payload
//! is what makes the scheme a deterrent rather than a security boundary.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ProtectResult;

/// Length in bytes of the generated obfuscation secret (hex encoded).
const SECRET_LEN: usize = 16;

/// The envelope embedded into a distributed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedArtifact {
    /// Obfuscated payload, base64 encoded.
    pub encoded_payload: String,
    /// The secret the payload was obfuscated with.
    pub obfuscation_secret: String,
    /// Base URL of the activation authority.
    pub server_url: String,
}

impl SealedArtifact {
    /// Wrap arbitrary payload bytes with a freshly generated secret.
    pub fn seal(payload: &[u8], server_url: &str) -> ProtectResult<Self> {
        let secret = random_secret();
        let encoded_payload = codec::protect(payload, &secret)?;
        Ok(Self {
            encoded_payload,
            obfuscation_secret: secret,
            server_url: server_url.to_string(),
        })
    }

    /// Recover the payload bytes.
    pub fn open(&self) -> ProtectResult<Vec<u8>> {
        codec::reveal(&self.encoded_payload, &self.obfuscation_secret)
    }

    /// Serialize the envelope for embedding.
    pub fn to_json(&self) -> ProtectResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an embedded envelope.
    pub fn from_json(raw: &str) -> ProtectResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn random_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_LEN)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let payload = "<h1>Material de estudo</h1>".as_bytes();
        let artifact = SealedArtifact::seal(payload, "https://ativacao.example.com").unwrap();
        assert_eq!(artifact.open().unwrap(), payload);
    }

    #[test]
    fn test_secret_is_fresh_per_seal() {
        let a = SealedArtifact::seal(b"x", "https://s").unwrap();
        let b = SealedArtifact::seal(b"x", "https://s").unwrap();
        assert_ne!(a.obfuscation_secret, b.obfuscation_secret);
        assert_eq!(a.obfuscation_secret.len(), SECRET_LEN * 2);
    }

    #[test]
    fn test_envelope_json_roundtrip() {
        let artifact = SealedArtifact::seal(b"payload bytes", "https://s").unwrap();
        let json = artifact.to_json().unwrap();
        let parsed = SealedArtifact::from_json(&json).unwrap();
        assert_eq!(parsed, artifact);
        assert_eq!(parsed.open().unwrap(), b"payload bytes");
    }
}
