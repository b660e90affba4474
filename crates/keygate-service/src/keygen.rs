//! Activation key code generation.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

use keygate_core::config::keygen::KeygenConfig;

/// Characters allowed in the random blocks of a key code.
///
/// Excludes I, O, 0 and 1 so codes survive being read aloud or retyped
/// from paper.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of random blocks in a code.
const BLOCK_COUNT: usize = 3;

/// Characters per random block.
const BLOCK_LEN: usize = 4;

/// Generates key codes of the form `PREFIX-YEAR-XXXX-XXXX-XXXX`.
///
/// Generation is random, not sequential; uniqueness against the store is
/// the caller's responsibility (the service retries on collision).
#[derive(Debug, Clone)]
pub struct KeyCodeGenerator {
    prefix: String,
}

impl KeyCodeGenerator {
    /// Creates a generator from configuration.
    pub fn new(config: &KeygenConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
        }
    }

    /// Generate a fresh candidate code, stamped with the year of `now`.
    pub fn generate(&self, now: DateTime<Utc>) -> String {
        let mut code = format!("{}-{}", self.prefix, now.year());
        for _ in 0..BLOCK_COUNT {
            code.push('-');
            code.push_str(&random_block());
        }
        code
    }
}

fn random_block() -> String {
    let mut rng = rand::thread_rng();
    (0..BLOCK_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn generator() -> KeyCodeGenerator {
        KeyCodeGenerator::new(&KeygenConfig::default())
    }

    #[test]
    fn test_code_format() {
        let code = generator().generate(Utc::now());
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], "KG");
        assert_eq!(parts[1], Utc::now().year().to_string());
        for block in &parts[2..] {
            assert_eq!(block.len(), BLOCK_LEN);
        }
    }

    #[test]
    fn test_blocks_use_only_the_unambiguous_alphabet() {
        let code = generator().generate(Utc::now());
        for block in code.split('-').skip(2) {
            for c in block.bytes() {
                assert!(
                    CODE_ALPHABET.contains(&c),
                    "unexpected character {:?} in {code}",
                    c as char
                );
            }
        }
    }

    #[test]
    fn test_ten_thousand_codes_are_distinct() {
        let keygen = generator();
        let now = Utc::now();
        let codes: HashSet<String> = (0..10_000).map(|_| keygen.generate(now)).collect();
        assert_eq!(codes.len(), 10_000);
    }
}
