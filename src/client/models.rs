//! Scanner resource models
//!
//! Only the fields the client and CLI read are modelled; everything else
//! in the scanner's responses is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept an identifier sent either as a JSON number or a string.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// `GET /server/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    /// `ready`, `loading`, ...
    pub status: String,

    /// Plugin loading progress, when not yet ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
}

/// `GET /server/properties`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nessus_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_build: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nessus_ui_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// One entry of `GET /scans`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub folder_id: Option<u64>,

    #[serde(default)]
    pub enabled: Option<bool>,

    /// Unix timestamp (seconds)
    #[serde(default)]
    pub last_modification_date: Option<i64>,
}

/// `GET /scans` envelope; `scans` is `null` when there are none
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScanList {
    #[serde(default)]
    pub scans: Option<Vec<ScanSummary>>,
}

/// `GET /scans/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDetails {
    pub info: ScanInfo,
}

/// The `info` block of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanInfo {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub targets: Option<String>,

    #[serde(default)]
    pub policy: Option<String>,

    #[serde(default)]
    pub hostcount: Option<u32>,

    /// Unix timestamps (seconds)
    #[serde(default)]
    pub scan_start: Option<i64>,

    #[serde(default)]
    pub scan_end: Option<i64>,
}

/// `POST /scans/{id}/launch`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LaunchResponse {
    pub scan_uuid: String,
}

/// `POST /scans/{id}/export`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExportFile {
    #[serde(deserialize_with = "id_string")]
    pub file: String,
}
