//! Header names used by signed requests.
//!
//! Lookups through [`http::HeaderMap`] are case-insensitive.

use http::HeaderName;

/// Hex-encoded HMAC-SHA256 of the signing string.
pub const HEADER_X_SIGNATURE: HeaderName = HeaderName::from_static("x-signature");

/// Signing time as decimal unix seconds.
pub const HEADER_X_TIMESTAMP: HeaderName = HeaderName::from_static("x-timestamp");

/// Sender-generated nonce.
pub const HEADER_X_NONCE: HeaderName = HeaderName::from_static("x-nonce");

/// Scheme forwarded by a reverse proxy.
pub const HEADER_X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Non-standard variant of `X-Forwarded-Proto`.
pub const HEADER_X_FORWARDED_PROTOCOL: HeaderName =
    HeaderName::from_static("x-forwarded-protocol");

/// `on` when the proxy terminated TLS.
pub const HEADER_X_FORWARDED_SSL: HeaderName = HeaderName::from_static("x-forwarded-ssl");

/// Scheme hint set by some WSGI-style proxies.
pub const HEADER_X_URL_SCHEME: HeaderName = HeaderName::from_static("x-url-scheme");

/// Non-empty, visible-ASCII header value, if present.
pub(crate) fn header_str<'a>(headers: &'a http::HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
