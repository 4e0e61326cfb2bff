// src/auth/token.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const TOKEN_BYTES: usize = 32;

/// Generate a URL-safe session token from OS randomness.
/// 32 bytes -> ~43 chars, safe for cookies without encoding.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Hash a token for storage; only the hash ever touches the DB.
pub fn hash_token(token: &str) -> [u8; 32] {
    let out = Sha256::digest(token.as_bytes());
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

/// Compare without short-circuiting on the first differing byte. Used both
/// for session hashes and for the operator password check.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Password check routed through hashing so the comparison is length-blind.
pub fn password_matches(supplied: &str, expected: &str) -> bool {
    constant_time_eq(&hash_token(supplied), &hash_token(expected))
}
