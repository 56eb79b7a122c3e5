//! Response outcomes
//!
//! Every scanner call resolves to a [`Reply`]. The shape of a response is
//! decided once, right after the transport returns, so callers match on
//! a variant instead of sniffing JSON for error keys.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::transport::{HttpResponse, TransportErrorKind};
use crate::error::{ApiError, Result};

/// Error message the scanner uses for an expired or unknown session token.
pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Why a call produced no usable data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degraded {
    #[error("gave up after {attempts} attempts, last failure: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: TransportErrorKind,
    },

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("response body (HTTP {status}) is not JSON")]
    Unparseable { status: u16 },
}

/// Outcome of a scanner call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Parsed JSON body
    Json(Value),
    /// Body bytes, returned verbatim for raw-content requests
    Raw(Vec<u8>),
    /// JSON object carrying a top-level `error` key
    ServerError {
        status: u16,
        message: String,
        body: Value,
    },
    /// No data: the call failed below the JSON layer
    Degraded(Degraded),
}

impl Reply {
    /// Classify a transport response.
    ///
    /// Raw-content responses are never inspected for error objects.
    pub fn from_response(response: HttpResponse, raw_content: bool) -> Self {
        if raw_content {
            return Reply::Raw(response.body);
        }

        let value: Value = match serde_json::from_slice(&response.body) {
            Ok(value) => value,
            Err(_) => {
                return Reply::Degraded(Degraded::Unparseable {
                    status: response.status,
                });
            }
        };

        match value.get("error") {
            Some(error) if !error.is_null() => {
                let message = match error.as_str() {
                    Some(text) => text.to_string(),
                    None => error.to_string(),
                };
                Reply::ServerError {
                    status: response.status,
                    message,
                    body: value,
                }
            }
            _ => Reply::Json(value),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Reply::Degraded(_))
    }

    /// Whether the scanner rejected the session token.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Reply::ServerError { message, .. } if message == INVALID_CREDENTIALS)
    }

    /// Borrow the JSON body of a successful reply.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Reply::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Fail-soft JSON view.
    ///
    /// Degraded and raw replies become an empty mapping; server errors
    /// become their error object.
    pub fn into_json(self) -> Value {
        match self {
            Reply::Json(value) => value,
            Reply::ServerError { body, .. } => body,
            Reply::Raw(_) | Reply::Degraded(_) => Value::Object(Map::new()),
        }
    }

    /// Body bytes of a raw-content reply.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Reply::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Strict view: anything but a JSON body becomes an error.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Raw(_) => Err(ApiError::InvalidResponse(
                "expected JSON, got raw content".to_string(),
            )
            .into()),
            Reply::ServerError {
                message, status, ..
            } if message == INVALID_CREDENTIALS || status == 401 => {
                Err(ApiError::Unauthorized.into())
            }
            Reply::ServerError {
                status, message, ..
            } if status == 404 => Err(ApiError::NotFound(message).into()),
            Reply::ServerError {
                status, message, ..
            } => Err(ApiError::Server { status, message }.into()),
            Reply::Degraded(reason) => Err(ApiError::Degraded(reason).into()),
        }
    }

    /// Strict view deserialized into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.into_result()?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {e}")).into())
    }
}
