//! Reconstruction of the externally visible request URL.
//!
//! Behind reverse proxies a server cannot see its own external scheme, so the
//! default extractor walks a trust hierarchy: the transport first, then
//! increasingly generic proxy conventions.

use crate::protocol::headers::{
    header_str, HEADER_X_FORWARDED_PROTO, HEADER_X_FORWARDED_PROTOCOL, HEADER_X_FORWARDED_SSL,
    HEADER_X_URL_SCHEME,
};
use crate::SigwardenError;
use http::header::HOST;
use http::request::Parts;
use http::uri::Scheme;

/// Marker a server inserts into request extensions when the connection is TLS.
///
/// `http::Request` carries no TLS state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTransport;

/// Strategy for resolving the full URL a request was sent to.
pub trait UrlExtractor: Send + Sync {
    /// Return `scheme://host` followed by the path and query exactly as received.
    fn extract(&self, parts: &Parts) -> Result<String, SigwardenError>;
}

impl<F> UrlExtractor for F
where
    F: Fn(&Parts) -> Result<String, SigwardenError> + Send + Sync,
{
    fn extract(&self, parts: &Parts) -> Result<String, SigwardenError> {
        self(parts)
    }
}

/// Scheme from proxy headers, host from the URI authority or `Host` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUrlExtractor;

impl UrlExtractor for DefaultUrlExtractor {
    fn extract(&self, parts: &Parts) -> Result<String, SigwardenError> {
        let scheme = extract_scheme(parts);
        let host = extract_host(parts).ok_or(SigwardenError::MissingHost)?;
        Ok(format!("{}://{}{}", scheme, host, request_uri(parts)))
    }
}

/// Resolve the request scheme.
///
/// Order: TLS transport, `X-Forwarded-Proto`, `X-Forwarded-Protocol`,
/// `X-Forwarded-Ssl: on`, `X-Url-Scheme`, then `http`.
pub fn extract_scheme(parts: &Parts) -> &str {
    if parts.extensions.get::<SecureTransport>().is_some()
        || parts.uri.scheme() == Some(&Scheme::HTTPS)
    {
        return "https";
    }
    if let Some(scheme) = header_str(&parts.headers, &HEADER_X_FORWARDED_PROTO) {
        return scheme;
    }
    if let Some(scheme) = header_str(&parts.headers, &HEADER_X_FORWARDED_PROTOCOL) {
        return scheme;
    }
    if header_str(&parts.headers, &HEADER_X_FORWARDED_SSL) == Some("on") {
        return "https";
    }
    if let Some(scheme) = header_str(&parts.headers, &HEADER_X_URL_SCHEME) {
        return scheme;
    }
    "http"
}

/// Host of the request target.
///
/// An absolute-form target's authority overrides the `Host` header.
pub fn extract_host(parts: &Parts) -> Option<&str> {
    parts
        .uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| header_str(&parts.headers, &HOST))
}

/// Path and query exactly as received (no normalization or decoding).
pub fn request_uri(parts: &Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| !pq.is_empty())
        .unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_default_scheme_is_http() {
        let p = parts("/foo/bar", &[("host", "example.com")]);
        assert_eq!(DefaultUrlExtractor.extract(&p).unwrap(), "http://example.com/foo/bar");
    }

    #[test]
    fn test_absolute_uri() {
        let cases = [
            "http://example.com/foo/bar",
            "https://example.com/foo/bar",
            "https://example.com:443/foo/bar",
            "https://example.com:443/foo/bar?p1=A&p2",
        ];
        for url in cases {
            let p = parts(url, &[]);
            assert_eq!(DefaultUrlExtractor.extract(&p).unwrap(), url);
        }
    }

    #[test]
    fn test_forwarded_proto() {
        let p = parts("/foo", &[("host", "example.com"), ("X-Forwarded-Proto", "https")]);
        assert_eq!(extract_scheme(&p), "https");
    }

    #[test]
    fn test_forwarded_protocol() {
        let p = parts("/foo", &[("host", "example.com"), ("X-Forwarded-Protocol", "https")]);
        assert_eq!(extract_scheme(&p), "https");
    }

    #[test]
    fn test_forwarded_ssl() {
        let on = parts("/foo", &[("X-Forwarded-Ssl", "on")]);
        assert_eq!(extract_scheme(&on), "https");

        let off = parts("/foo", &[("X-Forwarded-Ssl", "off")]);
        assert_eq!(extract_scheme(&off), "http");
    }

    #[test]
    fn test_url_scheme() {
        let p = parts("/foo", &[("X-Url-Scheme", "https")]);
        assert_eq!(extract_scheme(&p), "https");
    }

    #[test]
    fn test_scheme_priority() {
        let p = parts(
            "/foo",
            &[
                ("X-Url-Scheme", "ftp"),
                ("X-Forwarded-Ssl", "on"),
                ("X-Forwarded-Protocol", "gopher"),
                ("X-Forwarded-Proto", "wss"),
            ],
        );
        assert_eq!(extract_scheme(&p), "wss");

        let mut tls = parts("/foo", &[("X-Forwarded-Proto", "http")]);
        tls.extensions.insert(SecureTransport);
        assert_eq!(extract_scheme(&tls), "https");
    }

    #[test]
    fn test_authority_wins_over_host_header() {
        let p = parts("http://api.example/hook", &[("host", "evil.example")]);
        assert_eq!(DefaultUrlExtractor.extract(&p).unwrap(), "http://api.example/hook");

        let p = parts("http://internal:8080/foo", &[("host", "public.example")]);
        assert_eq!(extract_host(&p), Some("internal:8080"));
    }

    #[test]
    fn test_host_header_for_origin_form() {
        let p = parts("/hook", &[("host", "api.example:8443")]);
        assert_eq!(extract_host(&p), Some("api.example:8443"));
    }

    #[test]
    fn test_missing_host() {
        let p = parts("/foo", &[]);
        let result = DefaultUrlExtractor.extract(&p);
        assert!(matches!(result, Err(SigwardenError::MissingHost)));
    }

    #[test]
    fn test_query_preserved_verbatim() {
        let p = parts("/a%2Fb/?z=1&a=%20&flag", &[("host", "example.com")]);
        assert_eq!(
            DefaultUrlExtractor.extract(&p).unwrap(),
            "http://example.com/a%2Fb/?z=1&a=%20&flag"
        );
    }

    #[test]
    fn test_closure_extractor() {
        let closure = |p: &Parts| -> Result<String, SigwardenError> {
            Ok(format!("https://hooks.example{}", request_uri(p)))
        };
        let extractor: &dyn UrlExtractor = &closure;
        let p = parts("/cb?x=1", &[]);
        assert_eq!(extractor.extract(&p).unwrap(), "https://hooks.example/cb?x=1");
    }
}
