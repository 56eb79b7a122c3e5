//! Configuration management for Nessop

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

mod connection;

pub use connection::{
    ConnectionConfig, DEFAULT_RETRIES, DEFAULT_SLEEP, DEFAULT_TIMEOUT, DEFAULT_URL,
};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scanner endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Verify the scanner's TLS certificate
    #[serde(default)]
    pub verify_tls: bool,

    /// Use TLS; inferred from the URL scheme when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tls: Option<bool>,

    /// Scanner username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Scanner password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Cached session token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Retries after a transient network failure
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds to wait between retries
    #[serde(default = "default_sleep_secs")]
    pub retry_sleep_secs: f64,

    /// Seconds to wait between status polls
    #[serde(default = "default_sleep_secs")]
    pub poll_sleep_secs: f64,
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_sleep_secs() -> f64 {
    DEFAULT_SLEEP.as_secs_f64()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_sleep_secs: default_sleep_secs(),
            poll_sleep_secs: default_sleep_secs(),
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a non-negative number, got {value}")).into())
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".nessop").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Credentials live in this file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Validate that credentials are present
    pub fn validate_auth(&self) -> Result<()> {
        if self.username.is_none() || self.password.is_none() {
            return Err(ConfigError::MissingCredentials.into());
        }
        Ok(())
    }

    /// Endpoint URL, falling back to the default scanner address
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_URL)
    }

    /// Build connection settings from this configuration
    pub fn connection(&self) -> Result<ConnectionConfig> {
        let url = self.url();
        let use_tls = self
            .use_tls
            .unwrap_or_else(|| !url.starts_with("http://"));

        let mut connection = ConnectionConfig::new(url)
            .with_verify_tls(self.verify_tls)
            .with_tls(use_tls)
            .with_retries(self.preferences.retries)
            .with_retry_sleep(seconds("retry_sleep_secs", self.preferences.retry_sleep_secs)?)
            .with_poll_sleep(seconds("poll_sleep_secs", self.preferences.poll_sleep_secs)?);

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            connection = connection.with_credentials(username.clone(), password.clone());
        }

        Ok(connection)
    }
}
