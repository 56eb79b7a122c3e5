//! Scanner API client
//!
//! Layers, leaf first:
//! - [`transport`] - one HTTP exchange, no retries
//! - [`executor`] - bounded retry for transient failures
//! - [`session`] - login and transparent re-authentication
//! - [`poll`] - waiting on server-side scans and exports
//! - [`scanner`] - the client surface built on the above

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub mod executor;
pub mod models;
pub mod poll;
pub mod reply;
pub mod request;
pub mod scanner;
pub mod session;
#[cfg(test)]
pub mod stub;
pub mod transport;

pub use executor::RequestExecutor;
pub use models::{ScanDetails, ScanInfo, ScanSummary, ServerProperties, ServerStatus};
pub use poll::{PollOptions, PollOutcome, PollStep, ScanStatus, wait_until};
pub use reply::{Degraded, INVALID_CREDENTIALS, Reply};
pub use request::RequestDescriptor;
pub use scanner::ScannerClient;
pub use session::{AUTH_HEADER, Session, SessionManager};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportErrorKind};

/// Typed scanner operations.
///
/// Unlike the raw `get`/`post`/`put`/`delete` calls, these surface every
/// failure as an error.
#[async_trait]
pub trait ScannerApi: Send + Sync {
    /// Scanner readiness
    async fn server_status(&self) -> Result<ServerStatus>;

    /// Scanner version and build information
    async fn server_properties(&self) -> Result<ServerProperties>;

    /// List scans, optionally limited to one folder
    async fn list_scans(&self, folder_id: Option<u64>) -> Result<Vec<ScanSummary>>;

    /// Get a single scan
    async fn scan_details(&self, scan_id: &str) -> Result<ScanDetails>;

    /// Create a scan from a template UUID and settings object
    async fn scan_create(&self, template_uuid: &str, settings: &Value) -> Result<Value>;

    /// Launch a scan; returns the run UUID
    async fn scan_launch(&self, scan_id: &str) -> Result<String>;

    /// Request a report export; returns the export file id
    async fn scan_export(&self, scan_id: &str, format: &str) -> Result<String>;

    /// Wait for a scan to reach a terminal status
    async fn scan_wait(&self, scan_id: &str, options: PollOptions) -> Result<ScanStatus>;

    /// Export a report, wait for it to be ready, and download it
    async fn export_and_download(
        &self,
        scan_id: &str,
        format: &str,
        options: PollOptions,
    ) -> Result<Vec<u8>>;
}
