//! MD5 body fingerprint.
//!
//! MD5 is only a fixed-length content fingerprint inside the HMAC-SHA256
//! envelope. Authenticity comes from the keyed SHA-256 step.

use md5::{Digest, Md5};

/// Compute the MD5 digest of a body and return it hex-encoded (32 chars).
pub fn md5_hex(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}
