//! Scripted transport for testing
//!
//! Replays a queue of canned responses and records every request it sees,
//! so tests can assert on exact attempt counts without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{
    Body, HttpRequest, HttpResponse, Transport, TransportError, TransportErrorKind,
};

/// One scripted step.
#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(TransportErrorKind),
    /// Answer 200 with the request's raw body
    Echo,
}

/// Transport double driven by a FIFO script.
///
/// Clones share the same script and request log.
///
/// # Example
/// ```ignore
/// let stub = StubTransport::new();
/// stub.fail(TransportErrorKind::Timeout);
/// stub.json(200, json!({"token": "abc"}));
/// ```
/// State sits behind std `Mutex`es; no guard is held across an `.await`.
#[derive(Clone, Default)]
pub struct StubTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, step: Scripted) -> &Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    /// Queue a JSON response.
    pub fn json(&self, status: u16, value: Value) -> &Self {
        self.push(Scripted::Respond(HttpResponse {
            status,
            body: value.to_string().into_bytes(),
        }))
    }

    /// Queue a response with an arbitrary body.
    pub fn body(&self, status: u16, body: &str) -> &Self {
        self.push(Scripted::Respond(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }))
    }

    /// Queue a transport failure.
    pub fn fail(&self, kind: TransportErrorKind) -> &Self {
        self.push(Scripted::Fail(kind))
    }

    /// Queue a response that echoes the request body.
    pub fn echo(&self) -> &Self {
        self.push(Scripted::Echo)
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests sent to `path`.
    pub fn count_for(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(kind)) => Err(TransportError::new(kind, "scripted failure")),
            Some(Scripted::Echo) => {
                let body = match &request.body {
                    Body::Raw { content, .. } => content.clone(),
                    Body::Form(_) | Body::Empty => b"{}".to_vec(),
                };
                Ok(HttpResponse { status: 200, body })
            }
            None => Err(TransportError::new(
                TransportErrorKind::Other,
                format!("no scripted response for {} {}", request.method, request.path),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    fn get(path: &str) -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            path: path.to_string(),
            query: vec![],
            headers: vec![],
            body: Body::Empty,
        }
    }

    #[tokio::test]
    async fn test_clones_share_script_and_log() {
        let stub = StubTransport::new();
        stub.json(200, json!({"n": 1})).json(200, json!({"n": 2}));
        let other = stub.clone();

        let (req_a, req_b) = (get("/a"), get("/b"));
        let (a, b) = tokio::join!(stub.send(&req_a), other.send(&req_b));

        let bodies = [a.unwrap().body, b.unwrap().body];
        assert!(bodies.contains(&br#"{"n":1}"#.to_vec()));
        assert!(bodies.contains(&br#"{"n":2}"#.to_vec()));
        assert_eq!(stub.request_count(), 2);
        assert_eq!(other.count_for("/a"), 1);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails_without_retry() {
        let stub = StubTransport::new();
        let err = stub.send(&get("/scans")).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Other);
        assert!(!err.is_transient());
    }
}
