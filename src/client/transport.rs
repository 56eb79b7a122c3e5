//! HTTP transport for the scanner API
//!
//! The transport issues exactly one HTTP exchange per call and never
//! retries. Failures are classified into [`TransportErrorKind`]s so the
//! executor can decide which ones are worth another attempt.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method};
use thiserror::Error;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{ConfigError, Result};

/// Request body, already resolved for the HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` key/value pairs
    Form(Vec<(String, String)>),
    /// Opaque payload with an explicit content type
    Raw {
        content: Vec<u8>,
        content_type: String,
    },
}

/// A single HTTP request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the configured endpoint
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP response: status code and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Low-level failure categories.
///
/// reqwest does not surface socket-argument or header-parse failures
/// separately, so [`ReqwestTransport`] never yields `InvalidArgument` or
/// `MalformedHeaders`; they are kept for other [`Transport`]
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ConnectionReset,
    InvalidArgument,
    PrematureEof,
    MalformedResponse,
    MalformedHeaders,
    Protocol,
    /// The target URI could not be built; never retried
    InvalidUri,
    /// Anything else; never retried
    Other,
}

impl TransportErrorKind {
    /// Whether a fresh attempt has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            TransportErrorKind::InvalidUri | TransportErrorKind::Other
        )
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::ConnectionReset => "connection reset",
            TransportErrorKind::InvalidArgument => "invalid socket argument",
            TransportErrorKind::PrematureEof => "premature end of body",
            TransportErrorKind::MalformedResponse => "malformed HTTP response",
            TransportErrorKind::MalformedHeaders => "malformed HTTP headers",
            TransportErrorKind::Protocol => "protocol error",
            TransportErrorKind::InvalidUri => "invalid URI",
            TransportErrorKind::Other => "transport failure",
        };
        f.write_str(text)
    }
}

/// A classified transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::ConnectionReset
        } else if err.is_builder() {
            TransportErrorKind::InvalidUri
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::PrematureEof
        } else if err.is_redirect() {
            TransportErrorKind::MalformedResponse
        } else if err.is_request() {
            TransportErrorKind::Protocol
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, err.to_string())
    }
}

/// Something that can carry one HTTP exchange to the scanner.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Resolve a request path and query against the endpoint base URL.
///
/// Paths are always taken relative to the base so an endpoint mounted
/// below the root (`https://host/nessus/`) keeps its prefix.
pub fn resolve_url(
    base: &Url,
    path: &str,
    query: &[(String, String)],
) -> std::result::Result<Url, TransportError> {
    let mut url = base
        .join(path.trim_start_matches('/'))
        .map_err(|e| TransportError::new(TransportErrorKind::InvalidUri, format!("{path}: {e}")))?;

    if url.origin() != base.origin() {
        return Err(TransportError::new(
            TransportErrorKind::InvalidUri,
            format!("{path} escapes the configured endpoint"),
        ));
    }

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// reqwest-backed transport holding one client for the lifetime of the
/// scanner connection.
pub struct ReqwestTransport {
    http: HttpClient,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(!config.verify_tls())
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let url = resolve_url(&self.base_url, &request.path, &request.query)?;
        debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Form(fields) => builder.form(fields),
            Body::Raw {
                content,
                content_type,
            } => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(content.clone()),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!("<- {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://127.0.0.1:8834/").unwrap()
    }

    #[test]
    fn test_resolve_url_joins_path() {
        let url = resolve_url(&base(), "/scans/5", &[]).unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1:8834/scans/5");
    }

    #[test]
    fn test_resolve_url_keeps_base_prefix() {
        let base = Url::parse("https://scanner.local/nessus/").unwrap();
        let url = resolve_url(&base, "/session", &[]).unwrap();
        assert_eq!(url.as_str(), "https://scanner.local/nessus/session");
    }

    #[test]
    fn test_resolve_url_appends_query() {
        let query = vec![("folder_id".to_string(), "3".to_string())];
        let url = resolve_url(&base(), "scans", &query).unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1:8834/scans?folder_id=3");
    }

    #[test]
    fn test_resolve_url_rejects_malformed() {
        let err = resolve_url(&base(), "http://[::1", &[]).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidUri);
        assert!(!err.is_transient());
    }

    #[test]
    fn test_resolve_url_rejects_foreign_origin() {
        let err = resolve_url(&base(), "https://elsewhere.example/scans", &[]).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidUri);
    }

    #[test]
    fn test_transient_kinds() {
        for kind in [
            TransportErrorKind::Timeout,
            TransportErrorKind::ConnectionReset,
            TransportErrorKind::InvalidArgument,
            TransportErrorKind::PrematureEof,
            TransportErrorKind::MalformedResponse,
            TransportErrorKind::MalformedHeaders,
            TransportErrorKind::Protocol,
        ] {
            assert!(kind.is_transient(), "{kind:?} should be transient");
        }
        assert!(!TransportErrorKind::InvalidUri.is_transient());
        assert!(!TransportErrorKind::Other.is_transient());
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: Method::GET,
            path: "/scans".to_string(),
            query: vec![],
            headers: vec![("X-Cookie".to_string(), "token=abc".to_string())],
            body: Body::Empty,
        };
        assert_eq!(request.header("x-cookie"), Some("token=abc"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let config = ConnectionConfig::new(url).with_tls(false);
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = HttpRequest {
            method: Method::GET,
            path: "/server/status".to_string(),
            query: vec![],
            headers: vec![],
            body: Body::Empty,
        };

        let err = transport.send(&request).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::ConnectionReset);
        assert!(err.is_transient());
    }
}
