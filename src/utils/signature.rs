// Paystack webhook signature check: hex(HMAC-SHA512(secret, raw body))
use ring::hmac;
use subtle::ConstantTimeEq;

pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA512, secret.as_bytes());
    let tag = hmac::sign(&key, payload);
    tag.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
}

/// Compare the `x-paystack-signature` header against the expected digest in constant time
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let expected = sign_payload(secret, payload);
    let provided = signature.trim().to_ascii_lowercase();

    if expected.len() != provided.len() {
        return false;
    }

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
