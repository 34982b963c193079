//! HMAC-SHA256 signing over `version ‖ message`

use crate::auth::RootSecret;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Signature length in bytes (SHA-256 output)
pub const SIGNATURE_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(key: &RootSecret, version: u8, message: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(&[version]);
    mac.update(message);
    mac
}

/// Sign: HMAC-SHA256(key, version ‖ message)
pub fn sign(key: &RootSecret, version: u8, message: &[u8]) -> [u8; SIGNATURE_LEN] {
    let digest = mac_for(key, version, message).finalize().into_bytes();
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&digest);
    signature
}

/// Recompute the signature and compare in constant time
pub fn verify(key: &RootSecret, version: u8, message: &[u8], signature: &[u8]) -> bool {
    mac_for(key, version, message).verify_slice(signature).is_ok()
}
