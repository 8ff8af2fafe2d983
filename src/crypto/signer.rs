//! HMAC-SHA256 request signer.

use crate::crypto::nonce::generate_nonce;
use crate::crypto::signing::signing_string_for_body;
use crate::protocol::headers::{HEADER_X_NONCE, HEADER_X_SIGNATURE, HEADER_X_TIMESTAMP};
use crate::SigwardenError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::{HeaderMap, HeaderValue};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes and verifies request signatures with a shared secret.
///
/// Holds no state besides the key, so one instance can be shared across
/// request handlers without locking. Nonce uniqueness is not checked here.
#[derive(Clone)]
pub struct Signer {
    key: Vec<u8>,
}

impl Signer {
    /// Create a signer for the given shared secret.
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    /// Sign a request and return the hex-encoded HMAC-SHA256.
    ///
    /// Only the whole seconds of `timestamp` are signed.
    pub fn sign(
        &self,
        nonce: &str,
        timestamp: DateTime<Utc>,
        method: &str,
        url: &str,
        body: &[u8],
    ) -> String {
        let signing_string =
            signing_string_for_body(timestamp.timestamp(), nonce, method, url, body);

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(signing_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a claimed signature in constant time.
    pub fn verify(
        &self,
        claimed: &str,
        nonce: &str,
        timestamp: DateTime<Utc>,
        method: &str,
        url: &str,
        body: &[u8],
    ) -> bool {
        let expected = self.sign(nonce, timestamp, method, url, body);
        // Length is not secret: both sides are 64 hex chars when well-formed
        claimed.len() == expected.len()
            && bool::from(claimed.as_bytes().ct_eq(expected.as_bytes()))
    }

    /// Produce the headers a sender attaches to a request, with a fresh nonce.
    pub fn sign_request(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> SignatureHeaders {
        let nonce = generate_nonce();
        let signature = self.sign(&nonce, now, method, url, body);
        SignatureHeaders {
            nonce,
            timestamp: now.timestamp(),
            signature,
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

/// The three signature headers carried by a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// Sender-generated nonce.
    pub nonce: String,
    /// Signing time in unix seconds.
    pub timestamp: i64,
    /// Hex-encoded HMAC-SHA256.
    pub signature: String,
}

impl SignatureHeaders {
    /// Insert the headers into a header map, replacing existing values.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), SigwardenError> {
        headers.insert(HEADER_X_SIGNATURE, header_value(&self.signature)?);
        headers.insert(HEADER_X_TIMESTAMP, HeaderValue::from(self.timestamp));
        headers.insert(HEADER_X_NONCE, header_value(&self.nonce)?);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, SigwardenError> {
    HeaderValue::from_str(value)
        .map_err(|e| SigwardenError::ProtocolError(format!("Invalid header value: {}", e)))
}
