//! The obfuscation codec: repeating-key XOR + base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ProtectError, ProtectResult};

/// Obfuscate payload bytes into a transport-safe text blob.
///
/// Each payload byte is XORed with the corresponding byte of the
/// repeating secret, and the result is base64 encoded so it can be
/// embedded in text-based artifacts.
pub fn protect(plaintext: &[u8], secret: &str) -> ProtectResult<String> {
    let key = secret_bytes(secret)?;
    let obfuscated = xor_cycle(plaintext, key);
    Ok(STANDARD.encode(obfuscated))
}

/// Exact inverse of [`protect`].
pub fn reveal(blob: &str, secret: &str) -> ProtectResult<Vec<u8>> {
    let key = secret_bytes(secret)?;
    let obfuscated = STANDARD.decode(blob.trim())?;
    Ok(xor_cycle(&obfuscated, key))
}

fn secret_bytes(secret: &str) -> ProtectResult<&[u8]> {
    if secret.is_empty() {
        return Err(ProtectError::EmptySecret);
    }
    Ok(secret.as_bytes())
}

fn xor_cycle(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_text() {
        let payload = "Letra de câmbio, nota promissória e cheque".as_bytes();
        let blob = protect(payload, "s3cr3t").unwrap();
        assert_eq!(reveal(&blob, "s3cr3t").unwrap(), payload);
    }

    #[test]
    fn test_roundtrip_empty_payload() {
        let blob = protect(b"", "k").unwrap();
        assert_eq!(reveal(&blob, "k").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_roundtrip_binary() {
        let payload: Vec<u8> = (0..=255).collect();
        let blob = protect(&payload, "0123456789abcdef").unwrap();
        assert_eq!(reveal(&blob, "0123456789abcdef").unwrap(), payload);
    }

    #[test]
    fn test_roundtrip_payload_shorter_than_secret() {
        let blob = protect(b"x", "a-much-longer-secret").unwrap();
        assert_eq!(reveal(&blob, "a-much-longer-secret").unwrap(), b"x");
    }

    #[test]
    fn test_blob_is_ascii_safe() {
        let blob = protect("conteúdo protegido".as_bytes(), "chave").unwrap();
        assert!(blob.is_ascii());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            protect(b"data", ""),
            Err(ProtectError::EmptySecret)
        ));
        assert!(matches!(reveal("AAAA", ""), Err(ProtectError::EmptySecret)));
    }

    #[test]
    fn test_wrong_secret_does_not_reveal_the_payload() {
        let payload = b"conteudo do material";
        let blob = protect(payload, "chave-correta").unwrap();
        let garbled = reveal(&blob, "chave-errada!").unwrap();
        assert_ne!(garbled, payload);
    }

    #[test]
    fn test_invalid_base64_is_a_decode_error() {
        assert!(matches!(
            reveal("not base64 !!!", "k"),
            Err(ProtectError::Decode(_))
        ));
    }
}
