// PKCE helpers for the hosted auth code exchange (RFC 7636, S256)
use base64::prelude::*;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a high-entropy code verifier (43 base64url characters)
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge: base64url(sha256(verifier)) without padding
pub fn compute_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    BASE64_URL_SAFE_NO_PAD.encode(digest)
}
