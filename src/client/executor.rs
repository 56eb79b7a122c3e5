//! Resilient request executor
//!
//! Wraps a [`Transport`] with a bounded retry loop for transient I/O
//! failures. The executor never returns an error: exhausted retries, bad
//! URIs and unparseable bodies all come back as [`Reply::Degraded`].

use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;

use super::reply::{Degraded, Reply};
use super::request::RequestDescriptor;
use super::transport::{Transport, TransportErrorKind};

/// Sends requests through a transport, retrying transient failures.
pub struct RequestExecutor {
    transport: Box<dyn Transport>,
    retries: u32,
    retry_sleep: Duration,
}

impl RequestExecutor {
    /// `retries` is the number of extra attempts after the first one.
    pub fn new(transport: Box<dyn Transport>, retries: u32, retry_sleep: Duration) -> Self {
        Self {
            transport,
            retries,
            retry_sleep,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Execute `descriptor` with `method`, optionally carrying an
    /// authentication header.
    pub async fn execute(
        &self,
        method: Method,
        descriptor: &RequestDescriptor,
        auth_header: Option<(&str, &str)>,
    ) -> Reply {
        let request = descriptor.to_http(method, auth_header);
        let mut remaining = self.retries;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let err = match self.transport.send(&request).await {
                Ok(response) => {
                    return Reply::from_response(response, descriptor.wants_raw_content());
                }
                Err(err) => err,
            };

            if err.kind == TransportErrorKind::InvalidUri {
                warn!("{} {}: {}", request.method, request.path, err);
                return Reply::Degraded(Degraded::InvalidUri(err.message));
            }

            if !err.is_transient() {
                warn!("{} {} failed: {}", request.method, request.path, err);
                return Reply::Degraded(Degraded::Transport(err.to_string()));
            }

            if remaining == 0 {
                warn!(
                    "{} {} failed after {} attempts: {}",
                    request.method, request.path, attempts, err
                );
                return Reply::Degraded(Degraded::RetriesExhausted {
                    attempts,
                    last: err.kind,
                });
            }

            remaining -= 1;
            debug!(
                "{} {} attempt {} failed ({}); retrying in {:?}, {} left",
                request.method, request.path, attempts, err, self.retry_sleep, remaining
            );
            tokio::time::sleep(self.retry_sleep).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubTransport;
    use serde_json::json;

    fn executor(stub: &StubTransport, retries: u32) -> RequestExecutor {
        RequestExecutor::new(Box::new(stub.clone()), retries, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transient_failure_makes_n_plus_one_attempts() {
        for retries in 0..5u32 {
            let stub = StubTransport::new();
            for _ in 0..=retries {
                stub.fail(TransportErrorKind::ConnectionReset);
            }

            let reply = executor(&stub, retries)
                .execute(Method::GET, &RequestDescriptor::new("/scans"), None)
                .await;

            assert_eq!(stub.request_count(), retries as usize + 1);
            assert_eq!(
                reply,
                Reply::Degraded(Degraded::RetriesExhausted {
                    attempts: retries + 1,
                    last: TransportErrorKind::ConnectionReset,
                })
            );
            assert_eq!(reply.into_json(), json!({}));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_stops_retrying() {
        let retries = 3u32;
        for k in 1..=retries + 1 {
            let stub = StubTransport::new();
            for _ in 1..k {
                stub.fail(TransportErrorKind::Timeout);
            }
            stub.json(200, json!({"status": "ready"}));

            let reply = executor(&stub, retries)
                .execute(Method::GET, &RequestDescriptor::new("/server/status"), None)
                .await;

            assert_eq!(stub.request_count(), k as usize);
            assert_eq!(reply, Reply::Json(json!({"status": "ready"})));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_sleep_between_attempts() {
        let stub = StubTransport::new();
        stub.fail(TransportErrorKind::MalformedHeaders);
        stub.fail(TransportErrorKind::PrematureEof);
        stub.json(200, json!({}));

        let started = tokio::time::Instant::now();
        executor(&stub, 3)
            .execute(Method::GET, &RequestDescriptor::new("/scans"), None)
            .await;

        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_uri_is_never_retried() {
        for retries in [0u32, 1, 3, 10] {
            let stub = StubTransport::new();
            for _ in 0..=retries {
                stub.fail(TransportErrorKind::InvalidUri);
            }

            let reply = executor(&stub, retries)
                .execute(Method::GET, &RequestDescriptor::new("http://[::1"), None)
                .await;

            assert_eq!(stub.request_count(), 1);
            assert!(matches!(reply, Reply::Degraded(Degraded::InvalidUri(_))));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_failure_is_not_retried() {
        let stub = StubTransport::new();
        stub.fail(TransportErrorKind::Other);
        stub.json(200, json!({}));

        let reply = executor(&stub, 3)
            .execute(Method::GET, &RequestDescriptor::new("/scans"), None)
            .await;

        assert_eq!(stub.request_count(), 1);
        assert!(matches!(reply, Reply::Degraded(Degraded::Transport(_))));
    }

    #[tokio::test]
    async fn test_non_json_body_yields_empty_mapping() {
        let stub = StubTransport::new();
        stub.body(200, "not json");

        let reply = executor(&stub, 3)
            .execute(Method::GET, &RequestDescriptor::new("/scans"), None)
            .await;

        assert_eq!(stub.request_count(), 1);
        assert_eq!(reply.into_json(), json!({}));
    }

    #[tokio::test]
    async fn test_raw_content_is_returned_verbatim() {
        let stub = StubTransport::new();
        stub.body(200, "<NessusClientData_v2/>");

        let reply = executor(&stub, 0)
            .execute(
                Method::GET,
                &RequestDescriptor::new("/scans/1/export/7/download").raw_content(),
                None,
            )
            .await;

        assert_eq!(reply, Reply::Raw(b"<NessusClientData_v2/>".to_vec()));
    }

    #[tokio::test]
    async fn test_auth_header_reaches_transport() {
        let stub = StubTransport::new();
        stub.json(200, json!({}));

        executor(&stub, 0)
            .execute(
                Method::DELETE,
                &RequestDescriptor::new("/scans/4"),
                Some(("X-Cookie", "token=abc")),
            )
            .await;

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::DELETE);
        assert_eq!(requests[0].header("X-Cookie"), Some("token=abc"));
    }
}
