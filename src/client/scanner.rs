//! Scanner client implementation

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{Value, json};

use super::executor::RequestExecutor;
use super::models::{
    ExportFile, LaunchResponse, ScanDetails, ScanList, ScanSummary, ServerProperties, ServerStatus,
};
use super::poll::{PollOptions, PollOutcome, ScanStatus, export_step, scan_step, wait_until};
use super::reply::Reply;
use super::request::RequestDescriptor;
use super::session::SessionManager;
use super::transport::{ReqwestTransport, Transport};
use super::ScannerApi;
use crate::config::ConnectionConfig;
use crate::error::{ApiError, Result};

/// Client for one scanner endpoint.
///
/// Holds a single transport and a single session. Calls may be issued
/// from several tasks; session updates are serialised internally.
pub struct ScannerClient {
    config: ConnectionConfig,
    sessions: SessionManager,
}

impl ScannerClient {
    /// Connect over HTTP(S) using `config`.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Box::new(transport)).await)
    }

    /// Build a client on top of an arbitrary transport.
    ///
    /// Configured credentials are stored; with auto-login they are also
    /// used to log in immediately. A failed auto-login leaves the client
    /// unauthenticated.
    pub async fn with_transport(config: ConnectionConfig, transport: Box<dyn Transport>) -> Self {
        let executor = RequestExecutor::new(transport, config.retries(), config.retry_sleep());
        let sessions = SessionManager::new(executor);

        if let (Some(username), Some(password)) = (config.username(), config.password()) {
            if config.auto_login() {
                sessions.authenticate(username, password).await;
            } else {
                sessions.set_credentials(username, password).await;
            }
        }

        Self { config, sessions }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Poll settings from the connection configuration, without a deadline.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::every(self.config.poll_sleep())
    }

    pub async fn get(&self, descriptor: &RequestDescriptor) -> Reply {
        self.sessions.request(Method::GET, descriptor).await
    }

    pub async fn post(&self, descriptor: &RequestDescriptor) -> Reply {
        self.sessions.request(Method::POST, descriptor).await
    }

    pub async fn put(&self, descriptor: &RequestDescriptor) -> Reply {
        self.sessions.request(Method::PUT, descriptor).await
    }

    pub async fn delete(&self, descriptor: &RequestDescriptor) -> Reply {
        self.sessions.request(Method::DELETE, descriptor).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> bool {
        self.sessions.authenticate(username, password).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated().await
    }

    pub async fn logout(&self) -> Reply {
        self.sessions.logout().await
    }

    /// Wait until the scan reaches a terminal status using the configured
    /// poll interval.
    pub async fn wait_for_scan(&self, scan_id: &str) -> PollOutcome<ScanStatus> {
        self.wait_for_scan_with(scan_id, self.poll_options()).await
    }

    /// Wait until the scan reaches a terminal status.
    ///
    /// A scan details error ends the wait with [`ScanStatus::Error`].
    pub async fn wait_for_scan_with(
        &self,
        scan_id: &str,
        options: PollOptions,
    ) -> PollOutcome<ScanStatus> {
        let descriptor = RequestDescriptor::new(format!("/scans/{scan_id}"));
        let descriptor = &descriptor;

        let outcome = wait_until(
            || async move { scan_step(self.get(descriptor).await) },
            options,
        )
        .await;
        debug!("wait for scan {}: {:?}", scan_id, outcome);
        outcome
    }

    /// Wait for an export to become ready and download it, using the
    /// configured poll interval.
    pub async fn poll_export_and_download(
        &self,
        scan_id: &str,
        file_id: &str,
    ) -> PollOutcome<Vec<u8>> {
        self.poll_export_and_download_with(scan_id, file_id, self.poll_options())
            .await
    }

    /// Wait for an export to become ready and download it.
    ///
    /// Returns `Aborted` when the scanner reports no status for the export
    /// or the download itself yields nothing.
    pub async fn poll_export_and_download_with(
        &self,
        scan_id: &str,
        file_id: &str,
        options: PollOptions,
    ) -> PollOutcome<Vec<u8>> {
        let status = RequestDescriptor::new(format!("/scans/{scan_id}/export/{file_id}/status"));
        let status = &status;

        match wait_until(|| async move { export_step(self.get(status).await) }, options).await {
            PollOutcome::Ready(()) => {}
            PollOutcome::Aborted => {
                warn!("export {} of scan {} has no status", file_id, scan_id);
                return PollOutcome::Aborted;
            }
            PollOutcome::TimedOut => return PollOutcome::TimedOut,
        }

        let download = RequestDescriptor::new(format!("/scans/{scan_id}/export/{file_id}/download"))
            .raw_content();
        match self.get(&download).await.into_bytes() {
            Some(bytes) => {
                info!("downloaded export {} of scan {} ({} bytes)", file_id, scan_id, bytes.len());
                PollOutcome::Ready(bytes)
            }
            None => {
                warn!("download of export {} for scan {} failed", file_id, scan_id);
                PollOutcome::Aborted
            }
        }
    }
}

#[async_trait]
impl ScannerApi for ScannerClient {
    async fn server_status(&self) -> Result<ServerStatus> {
        self.get(&RequestDescriptor::new("/server/status"))
            .await
            .into_typed()
    }

    async fn server_properties(&self) -> Result<ServerProperties> {
        self.get(&RequestDescriptor::new("/server/properties"))
            .await
            .into_typed()
    }

    async fn list_scans(&self, folder_id: Option<u64>) -> Result<Vec<ScanSummary>> {
        let mut descriptor = RequestDescriptor::new("/scans");
        if let Some(folder_id) = folder_id {
            descriptor = descriptor.query("folder_id", folder_id.to_string());
        }

        let list: ScanList = self.get(&descriptor).await.into_typed()?;
        Ok(list.scans.unwrap_or_default())
    }

    async fn scan_details(&self, scan_id: &str) -> Result<ScanDetails> {
        self.get(&RequestDescriptor::new(format!("/scans/{scan_id}")))
            .await
            .into_typed()
    }

    async fn scan_create(&self, template_uuid: &str, settings: &Value) -> Result<Value> {
        let payload = json!({ "uuid": template_uuid, "settings": settings });
        let descriptor = RequestDescriptor::new("/scans").json_body(&payload)?;
        self.post(&descriptor).await.into_result()
    }

    async fn scan_launch(&self, scan_id: &str) -> Result<String> {
        let descriptor = RequestDescriptor::new(format!("/scans/{scan_id}/launch"));
        let launched: LaunchResponse = self.post(&descriptor).await.into_typed()?;
        Ok(launched.scan_uuid)
    }

    async fn scan_export(&self, scan_id: &str, format: &str) -> Result<String> {
        let descriptor = RequestDescriptor::new(format!("/scans/{scan_id}/export"))
            .json_body(&json!({ "format": format }))?;
        let export: ExportFile = self.post(&descriptor).await.into_typed()?;
        Ok(export.file)
    }

    async fn scan_wait(&self, scan_id: &str, options: PollOptions) -> Result<ScanStatus> {
        match self.wait_for_scan_with(scan_id, options).await {
            PollOutcome::Ready(status) => Ok(status),
            PollOutcome::TimedOut => Err(ApiError::Timeout(format!("scan {scan_id}")).into()),
            PollOutcome::Aborted => Err(ApiError::Aborted(format!("scan {scan_id}")).into()),
        }
    }

    async fn export_and_download(
        &self,
        scan_id: &str,
        format: &str,
        options: PollOptions,
    ) -> Result<Vec<u8>> {
        let file_id = self.scan_export(scan_id, format).await?;
        match self
            .poll_export_and_download_with(scan_id, &file_id, options)
            .await
        {
            PollOutcome::Ready(bytes) => Ok(bytes),
            PollOutcome::TimedOut => {
                Err(ApiError::Timeout(format!("export {file_id} of scan {scan_id}")).into())
            }
            PollOutcome::Aborted => {
                Err(ApiError::Aborted(format!("export {file_id} of scan {scan_id}")).into())
            }
        }
    }
}
