//! # Sigwarden
//!
//! **HMAC request signing and signed-request validation for HTTP services.**
//!
//! A sender signs each request with a shared secret; the receiver rebuilds the
//! exact signed message from the incoming request and rejects anything forged
//! or stale before the handler runs.
//!
//! ## Features
//!
//! - **HMAC-SHA256 signatures** over timestamp, nonce, method, full URL and body digest
//! - **Constant-time verification** - no timing oracle on partial matches
//! - **Freshness window** - signatures older than 15 seconds (configurable) are rejected
//! - **Proxy-aware URL reconstruction** - scheme recovered from forwarding headers
//! - **Bounded body hashing** - at most 2 KiB is read for verification, the
//!   handler still sees the full body
//! - **Tower middleware** - invalid requests get a bare `401`, no details leaked
//!
//! ## Signing string
//!
//! ```text
//! {unix_timestamp}\n{nonce}\n{HTTP_METHOD}\n{full_url}\n{hex(md5(body))}
//! ```
//!
//! Carried in the `X-Timestamp`, `X-Nonce` and `X-Signature` headers.
//!
//! ## Quickstart
//!
//! ```no_run
//! use sigwarden::{Validator, ValidatorConfig};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), sigwarden::SigwardenError> {
//!     let config = ValidatorConfig::new("shared-secret")
//!         .with_max_signature_age(Duration::from_secs(15))
//!         .with_base_url("https://hooks.example.com");
//!
//!     // Wrap any tower service: unsigned or forged requests never reach it.
//!     let _layer = Validator::new(config)?.into_layer();
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Sigwarden protects against:
//! - **Forged requests** - without the secret no valid MAC can be produced
//! - **Tampering** - changing method, URL, body or nonce invalidates the MAC
//! - **Stale replays** - old signatures fall outside the freshness window
//!
//! Sigwarden does **not** track nonces, so a request replayed within the
//! freshness window is accepted. Future-dated timestamps are not rejected.
//! Only the first 2 KiB of a body is covered by the signature.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/sigwarden/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Validation (main receiving-side API)
pub mod validator;

// Client layer
pub mod client;

// Framework integrations
pub mod integrations;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::{SigningClientConfig, ValidatorConfig, DEFAULT_MAX_SIGNATURE_AGE};
pub use crypto::signer::{SignatureHeaders, Signer};
pub use errors::SigwardenError;
pub use integrations::gate::{validate, SignatureLayer, SignatureService};
pub use protocol::body::{RestoredBody, MAX_BODY_SIZE};
pub use protocol::url::{DefaultUrlExtractor, SecureTransport, UrlExtractor};
pub use validator::{SignatureClaims, Validator};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
