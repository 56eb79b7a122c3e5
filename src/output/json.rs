//! JSON output formatting

use chrono::Utc;
use serde::Serialize;

/// Envelope printed for `--format json`
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: ?Sized> {
    pub data: &'a T,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    /// RFC 3339 time the output was produced
    pub generated_at: String,
    pub version: &'static str,
}

impl<'a, T: ?Sized> Envelope<'a, T> {
    pub fn new(data: &'a T) -> Self {
        Self {
            data,
            meta: Meta {
                generated_at: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

/// Pretty-print `data` inside the envelope.
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[derive(Serialize)]
    struct Scan {
        id: String,
        status: String,
    }

    #[test]
    fn test_envelope_wraps_data() {
        let scans = vec![Scan {
            id: "7".to_string(),
            status: "running".to_string(),
        }];

        let printed: Value = serde_json::from_str(&format_json(&scans).unwrap()).unwrap();

        assert_eq!(printed["data"], json!([{"id": "7", "status": "running"}]));
        assert_eq!(printed["meta"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(printed["meta"]["generated_at"].is_string());
    }

    #[test]
    fn test_envelope_single_object() {
        let printed: Value =
            serde_json::from_str(&format_json(&json!({"status": "ready"})).unwrap()).unwrap();
        assert_eq!(printed["data"]["status"], "ready");
    }

    #[test]
    fn test_envelope_empty_list() {
        let scans: Vec<Scan> = Vec::new();
        assert!(format_json(&scans).unwrap().contains("\"data\": []"));
    }
}
