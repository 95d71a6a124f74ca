//! Security Utilities
//!
//! Secret generation, OTP hashing, and password hashing primitives.
//!
//! OTP codes are never persisted in the clear: only the keyed HMAC-SHA256
//! digest is stored, and verification recomputes the digest and compares it
//! in constant time. The code itself is low-entropy by design and is
//! protected by the digest, a short expiry, and upstream rate limiting.

use bcrypt::{hash, verify, DEFAULT_COST};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Byte length of an opaque password-reset token (256 bits)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Generate a 6-digit numeric OTP code, uniform in [100000, 999999]
pub fn generate_otp_code() -> String {
    rand::thread_rng().gen_range(100000..=999999).to_string()
}

/// Generate an opaque 256-bit reset token as a fixed-length hex string
pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::thread_rng().gen();
    encode_hex(&bytes)
}

/// Compute the keyed HMAC-SHA256 digest of an OTP code
pub fn hash_otp(code: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(code.as_bytes());
    encode_hex(&mac.finalize().into_bytes())
}

/// Verify a candidate OTP code against a stored digest
pub fn verify_otp_digest(candidate: &str, stored_digest: &str, secret: &str) -> bool {
    constant_time_compare(&hash_otp(candidate, secret), stored_digest)
}

/// Hash a password using bcrypt with the default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password with a custom bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Timing-safe string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}

/// Encode bytes as a lowercase hex string
fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_code() {
        for _ in 0..100 {
            let otp = generate_otp_code();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));

            let otp_num: u32 = otp.parse().unwrap();
            assert!((100000..=999999).contains(&otp_num));
        }
    }

    #[test]
    fn test_generate_reset_token() {
        let token1 = generate_reset_token();
        let token2 = generate_reset_token();

        // 32 bytes hex-encoded, always fixed length
        assert_eq!(token1.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(token2.len(), RESET_TOKEN_BYTES * 2);
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_otp_digest_deterministic() {
        let digest1 = hash_otp("123456", "server_secret");
        let digest2 = hash_otp("123456", "server_secret");
        assert_eq!(digest1, digest2);

        // Different code or secret produces a different digest
        assert_ne!(digest1, hash_otp("654321", "server_secret"));
        assert_ne!(digest1, hash_otp("123456", "other_secret"));
    }

    #[test]
    fn test_verify_otp_digest() {
        let digest = hash_otp("123456", "server_secret");

        assert!(verify_otp_digest("123456", &digest, "server_secret"));
        assert!(!verify_otp_digest("654321", &digest, "server_secret"));
        assert!(!verify_otp_digest("123456", &digest, "wrong_secret"));
    }

    #[test]
    fn test_password_hashing() {
        let password = "test_password_123";
        let hash = hash_password_with_cost(password, 4).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello_world"));
    }

    #[test]
    fn test_encode_hex() {
        assert_eq!(encode_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
    }
}
