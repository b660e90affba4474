//! Device bearer token generation.

use rand::Rng;

/// Generates a fresh device token: 32 random bytes, hex encoded.
///
/// Tokens are the bearer credential for verification, so they must be
/// unpredictable and practically collision-free across the whole device
/// registry, not just within one key.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

/// Simple hex encoding without external dependency.
mod hex {
    /// Encode bytes to hex string.
    pub fn encode(bytes: Vec<u8>) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1_000).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 1_000);
    }
}
