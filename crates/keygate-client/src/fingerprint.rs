//! Device fingerprint derivation.
//!
//! The fingerprint is a checksum over a handful of environment
//! attributes. It is deliberately weak: stable for one install under
//! normal conditions, but it can collide between installs and can change
//! when the environment changes. It identifies a device on a best-effort
//! basis only and must never be treated as strong identity.

use std::env;

/// Derive this install's fingerprint, e.g. `fp_1a2b3c_z`.
pub fn derive_fingerprint() -> String {
    let attributes = [
        env::consts::OS.to_string(),
        env::consts::ARCH.to_string(),
        env::consts::FAMILY.to_string(),
        env::var("HOSTNAME")
            .or_else(|_| env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "x".to_string()),
        env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "x".to_string()),
        env::var("HOME").unwrap_or_else(|_| "x".to_string()),
        env::var("LANG").unwrap_or_else(|_| "x".to_string()),
    ];
    let joined = attributes.join("|");
    format!(
        "fp_{}_{}",
        to_base36(checksum(&joined) as u64),
        to_base36(joined.len() as u64)
    )
}

/// Best-effort device label for the admin listing.
pub fn device_name() -> String {
    match env::consts::OS {
        "windows" => "Windows",
        "macos" => "Mac",
        "linux" => "Linux",
        "android" => "Android",
        "ios" => "iPhone/iPad",
        _ => "Dispositivo",
    }
    .to_string()
}

/// 32-bit additive checksum over the attribute string.
fn checksum(input: &str) -> u32 {
    let mut hash: i32 = 0;
    for c in input.chars() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(c as i32);
    }
    hash.unsigned_abs()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_within_a_process() {
        assert_eq!(derive_fingerprint(), derive_fingerprint());
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = derive_fingerprint();
        assert!(fp.starts_with("fp_"));
        let rest = &fp[3..];
        let mut parts = rest.split('_');
        let hash = parts.next().unwrap();
        let len = parts.next().unwrap();
        assert!(!hash.is_empty() && !len.is_empty());
        assert!(hash.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(len.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_checksum_differs_on_different_inputs() {
        assert_ne!(checksum("linux|x86_64|hostA"), checksum("linux|x86_64|hostB"));
    }

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
