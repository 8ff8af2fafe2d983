//! Canonical signing string construction.
//!
//! The signed message is five newline-delimited fields, no trailing newline:
//! ```text
//! <unix timestamp>
//! <nonce>
//! <HTTP method>
//! <full url>
//! <hex md5 of body>
//! ```
//! Signer and verifier must produce it byte-for-byte identically, so nothing
//! here normalizes its inputs.

use crate::crypto::digest::md5_hex;

/// Build the signing string from already-hashed components.
pub fn build_signing_string(
    timestamp: i64,
    nonce: &str,
    method: &str,
    url: &str,
    body_hash_hex: &str,
) -> String {
    format!("{timestamp}\n{nonce}\n{method}\n{url}\n{body_hash_hex}")
}

/// Build the signing string for a raw body.
pub fn signing_string_for_body(
    timestamp: i64,
    nonce: &str,
    method: &str,
    url: &str,
    body: &[u8],
) -> String {
    build_signing_string(timestamp, nonce, method, url, &md5_hex(body))
}
