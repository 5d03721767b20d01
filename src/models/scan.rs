//! Scan result model: security header coverage, WHOIS registration data, and status.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// Security headers checked on every scan, in report order.
pub const SECURITY_HEADERS: [&str; 7] = [
    "Strict-Transport-Security",
    "X-Frame-Options",
    "X-Content-Type-Options",
    "Content-Security-Policy",
    "X-XSS-Protection",
    "Referrer-Policy",
    "Permissions-Policy",
];

/// Overall outcome of a scan, computed once when the scan is assembled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "scan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Success,
    Partial,
    Error,
}

/// Result of probing a domain for the [`SECURITY_HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityHeaders {
    #[serde(default)]
    pub headers_found: BTreeMap<String, String>,
    #[serde(default)]
    pub headers_missing: Vec<String>,
    pub score: String,
    pub error: Option<String>,
}

impl SecurityHeaders {
    /// Result for a domain where neither HTTPS nor HTTP answered.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            headers_found: BTreeMap::new(),
            headers_missing: SECURITY_HEADERS.iter().map(|h| h.to_string()).collect(),
            score: format_score(0),
            error: Some(reason.into()),
        }
    }
}

/// Format a coverage score as `"<found>/7"`.
pub fn format_score(found: usize) -> String {
    format!("{found}/{}", SECURITY_HEADERS.len())
}

/// Normalized WHOIS registration data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisData {
    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
    pub status: Option<String>,
    /// Failure description, only set when the lookup failed.
    pub raw: Option<String>,
}

impl WhoisData {
    /// Record for a failed lookup.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: Some("error".to_string()),
            raw: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.raw.is_some()
    }
}

/// A fully assembled scan that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewScan {
    pub domain: String,
    pub ip_address: Option<String>,
    pub security_headers: SecurityHeaders,
    pub whois_data: WhoisData,
    pub status: ScanStatus,
    pub error_message: Option<String>,
}

/// A persisted scan as stored in the `scans` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Scan {
    pub id: i64,
    pub domain: String,
    pub ip_address: Option<String>,
    pub security_headers: Json<SecurityHeaders>,
    pub whois_data: Json<WhoisData>,
    pub scan_timestamp: DateTime<Utc>,
    pub status: ScanStatus,
    pub error_message: Option<String>,
}

/// Request body for `POST /scan`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScanRequest {
    #[validate(length(min = 3, max = 255))]
    pub domain: String,
}

/// Response body for `GET /history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanHistory {
    pub total: i64,
    pub scans: Vec<Scan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_status_serialization() {
        let json = serde_json::to_string(&ScanStatus::Partial).unwrap();
        assert_eq!(json, "\"partial\"");
        let status: ScanStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, ScanStatus::Error);
    }

    #[test]
    fn unreachable_headers_report_everything_missing() {
        let headers = SecurityHeaders::unreachable("connection refused");
        assert!(headers.headers_found.is_empty());
        assert_eq!(headers.headers_missing, SECURITY_HEADERS.to_vec());
        assert_eq!(headers.score, "0/7");
        assert_eq!(headers.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn failed_whois_keeps_informational_fields_empty() {
        let whois = WhoisData::failed("timed out");
        assert!(whois.is_failed());
        assert_eq!(whois.status.as_deref(), Some("error"));
        assert!(whois.registrar.is_none());
        assert!(whois.creation_date.is_none());
        assert!(whois.expiration_date.is_none());
        assert!(whois.name_servers.is_empty());
    }

    #[test]
    fn stored_json_with_missing_lists_deserializes() {
        let headers: SecurityHeaders =
            serde_json::from_value(serde_json::json!({"score": "0/7", "error": null})).unwrap();
        assert!(headers.headers_missing.is_empty());

        let whois: WhoisData = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(whois, WhoisData::default());
    }

    #[test]
    fn scan_request_length_bounds() {
        let short = ScanRequest {
            domain: "ab".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = ScanRequest {
            domain: "example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let long = ScanRequest {
            domain: "a".repeat(256),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn persisted_scan_serializes_json_columns_inline() {
        let scan = Scan {
            id: 7,
            domain: "example.com".to_string(),
            ip_address: Some("93.184.216.34".to_string()),
            security_headers: Json(SecurityHeaders::unreachable("refused")),
            whois_data: Json(WhoisData::default()),
            scan_timestamp: Utc::now(),
            status: ScanStatus::Success,
            error_message: None,
        };
        let json = serde_json::to_value(&scan).unwrap();
        assert_eq!(json["security_headers"]["score"], "0/7");
        assert!(json["whois_data"]["name_servers"].is_array());
        assert_eq!(json["status"], "success");
    }
}
