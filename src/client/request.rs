//! Request descriptors
//!
//! A [`RequestDescriptor`] says what to ask the scanner for without
//! committing to an HTTP method. The executor turns it into an
//! [`HttpRequest`] once the method and the session header are known.

use reqwest::Method;
use serde::Serialize;

use super::transport::{Body, HttpRequest};

/// Payload carried by POST/PUT requests.
///
/// Form fields and a raw body are mutually exclusive: setting one
/// replaces the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Fields(Vec<(String, String)>),
    Raw {
        content: Vec<u8>,
        content_type: String,
    },
}

/// Description of a single scanner API call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDescriptor {
    path: String,
    query: Vec<(String, String)>,
    payload: Payload,
    headers: Vec<(String, String)>,
    raw_content: bool,
    authenticating: bool,
}

impl RequestDescriptor {
    /// Describe a call to `path`, relative to the scanner endpoint.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a URL query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a key/value field.
    ///
    /// Fields are form-encoded for POST/PUT and sent as query parameters
    /// for GET/DELETE. A previously set raw body is discarded.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.payload {
            Payload::Fields(fields) => fields.push((key.into(), value.into())),
            payload => *payload = Payload::Fields(vec![(key.into(), value.into())]),
        }
        self
    }

    /// Send `content` verbatim with the given content type.
    pub fn raw_body(mut self, content: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        self.payload = Payload::Raw {
            content: content.into(),
            content_type: content_type.into(),
        };
        self
    }

    /// Serialize `value` as the JSON request body.
    pub fn json_body<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Self> {
        let content = serde_json::to_vec(value)?;
        Ok(self.raw_body(content, "application/json"))
    }

    /// Add an extra request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Return the response body as bytes instead of parsing it as JSON.
    pub fn raw_content(mut self) -> Self {
        self.raw_content = true;
        self
    }

    /// Mark this call as the login exchange itself.
    pub(crate) fn authenticating(mut self) -> Self {
        self.authenticating = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn wants_raw_content(&self) -> bool {
        self.raw_content
    }

    pub fn is_authenticating(&self) -> bool {
        self.authenticating
    }

    /// Build the concrete HTTP request for `method`.
    pub fn to_http(&self, method: Method, auth_header: Option<(&str, &str)>) -> HttpRequest {
        let mut query = self.query.clone();
        let mut headers = self.headers.clone();
        if let Some((name, value)) = auth_header {
            headers.push((name.to_string(), value.to_string()));
        }

        let sends_body = method == Method::POST || method == Method::PUT;
        let body = match (&self.payload, sends_body) {
            (Payload::None, _) => Body::Empty,
            (Payload::Fields(fields), true) => Body::Form(fields.clone()),
            (Payload::Fields(fields), false) => {
                query.extend(fields.iter().cloned());
                Body::Empty
            }
            (
                Payload::Raw {
                    content,
                    content_type,
                },
                true,
            ) => Body::Raw {
                content: content.clone(),
                content_type: content_type.clone(),
            },
            (Payload::Raw { .. }, false) => Body::Empty,
        };

        HttpRequest {
            method,
            path: self.path.clone(),
            query,
            headers,
            body,
        }
    }
}
