//! Nessop - resilient client for Nessus-style scanner REST APIs
//!
//! The [`client`] module holds the request layer: bounded retries for
//! transient network failures, transparent re-authentication when the
//! session token expires, and polling for scans and report exports.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ScannerApi, ScannerClient};
pub use config::{Config, ConnectionConfig};
pub use error::{ApiError, ConfigError, Error, Result};
