//! Error types for Nessop

use thiserror::Error;

use crate::client::reply::Degraded;

/// Result type alias for Nessop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// API-related errors.
///
/// The request layer encodes failures in [`Reply`](crate::client::Reply);
/// these variants exist for callers that convert a reply into a `Result`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `nessop init` to set up your credentials.")]
    Unauthorized,

    #[error("Scanner returned an error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request degraded: {0}")]
    Degraded(Degraded),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Gave up waiting for {0}")]
    Timeout(String),

    #[error("Job aborted: {0}")]
    Aborted(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `nessop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Scanner credentials not configured. Run `nessop init` to set up your credentials.")]
    MissingCredentials,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::TransportErrorKind;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("nessop init"));
    }

    #[test]
    fn test_api_error_server_message() {
        let err = ApiError::Server {
            status: 404,
            message: "The requested file was not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_api_error_degraded_names_reason() {
        let err = ApiError::Degraded(Degraded::RetriesExhausted {
            attempts: 4,
            last: TransportErrorKind::Timeout,
        });
        let msg = err.to_string();
        assert!(msg.contains("4 attempts"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_api_error_timeout() {
        let err = ApiError::Timeout("scan 42".to_string());
        assert!(err.to_string().contains("scan 42"));
    }

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound;
        assert!(err.to_string().contains("nessop init"));
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::ParseError("unexpected key".to_string());
        assert!(err.to_string().contains("unexpected key"));
    }

    #[test]
    fn test_config_error_missing_credentials() {
        let err = ConfigError::MissingCredentials;
        assert!(err.to_string().contains("nessop init"));
    }

    #[test]
    fn test_conversions_into_error() {
        assert!(matches!(
            Error::from(ApiError::Unauthorized),
            Error::Api(ApiError::Unauthorized)
        ));
        assert!(matches!(
            Error::from(ConfigError::NotFound),
            Error::Config(ConfigError::NotFound)
        ));

        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("url: [unclosed").unwrap_err();
        assert!(matches!(ConfigError::from(yaml_err), ConfigError::ParseError(_)));
    }
}
