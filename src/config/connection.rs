//! Connection settings for a scanner endpoint

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default scanner endpoint.
pub const DEFAULT_URL: &str = "https://127.0.0.1:8834/";

/// Default number of retries after a transient failure.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default pause between retries and between polls.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach and authenticate to a scanner.
///
/// Built once with the `with_*` methods and then handed to the client,
/// which never changes it.
#[derive(Clone)]
pub struct ConnectionConfig {
    url: String,
    verify_tls: bool,
    use_tls: bool,
    retries: u32,
    retry_sleep: Duration,
    poll_sleep: Duration,
    timeout: Duration,
    username: Option<String>,
    password: Option<String>,
    auto_login: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            // Scanners usually run with self-signed certificates
            verify_tls: false,
            use_tls: true,
            retries: DEFAULT_RETRIES,
            retry_sleep: DEFAULT_SLEEP,
            poll_sleep: DEFAULT_SLEEP,
            timeout: DEFAULT_TIMEOUT,
            username: None,
            password: None,
            auto_login: false,
        }
    }
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_tls(mut self, enabled: bool) -> Self {
        self.use_tls = enabled;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_sleep(mut self, sleep: Duration) -> Self {
        self.retry_sleep = sleep;
        self
    }

    pub fn with_poll_sleep(mut self, sleep: Duration) -> Self {
        self.poll_sleep = sleep;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Log in while constructing the client.
    pub fn with_auto_login(mut self, auto_login: bool) -> Self {
        self.auto_login = auto_login;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn retry_sleep(&self) -> Duration {
        self.retry_sleep
    }

    pub fn poll_sleep(&self) -> Duration {
        self.poll_sleep
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn auto_login(&self) -> bool {
        self.auto_login
    }

    /// Parsed endpoint URL with the scheme forced to match the TLS flag
    /// and a trailing slash so relative paths join below it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| ConfigError::Invalid(format!("invalid scanner URL {}: {e}", self.url)))?;

        let scheme = if self.use_tls { "https" } else { "http" };
        if url.scheme() != scheme {
            url.set_scheme(scheme).map_err(|_| {
                ConfigError::Invalid(format!("cannot use {scheme} for {}", self.url))
            })?;
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("verify_tls", &self.verify_tls)
            .field("use_tls", &self.use_tls)
            .field("retries", &self.retries)
            .field("retry_sleep", &self.retry_sleep)
            .field("poll_sleep", &self.poll_sleep)
            .field("timeout", &self.timeout)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("auto_login", &self.auto_login)
            .finish()
    }
}
