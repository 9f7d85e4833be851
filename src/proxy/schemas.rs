//! Wire schemas for the control protocol.
//!
//! # Responsibilities
//! - Define the descriptor types posted by interceptor callbacks
//! - Define the `ModificationSet` answered by the control endpoints
//! - Enforce field bounds before anything reaches the policy
//!
//! # Design Decisions
//! - Serde handles syntactic validation; `validate()` handles semantic bounds
//! - `BTreeMap` keeps header/stat rendering deterministic
//! - Descriptors are immutable snapshots; `ModificationSet` is produced fresh
//!   per call and never persisted

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;

/// Maximum length of an HTTP method string, in characters.
pub const MAX_METHOD_LEN: usize = 10;
/// Maximum length of a host name, in characters.
pub const MAX_HOST_LEN: usize = 255;
/// Maximum length of a URL path, in characters.
pub const MAX_PATH_LEN: usize = 2048;

/// Snapshot of an intercepted request, as submitted by the interceptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub host: String,
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

/// Condensed view of the request that produced a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestSummary {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
}

/// Response details as seen by the interceptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseSummary {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Snapshot of an intercepted response, as submitted by the interceptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseDescriptor {
    pub request: RequestSummary,
    pub response: ResponseSummary,
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

/// Instructions for the interceptor on how to alter a flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModificationSet {
    pub headers_to_add: BTreeMap<String, String>,
    pub headers_to_remove: Vec<String>,
    pub block_request: bool,
    pub block_status: u16,
    pub block_message: String,
    pub include_stats: bool,
    pub stats: BTreeMap<String, Value>,
}

impl Default for ModificationSet {
    fn default() -> Self {
        Self {
            headers_to_add: BTreeMap::new(),
            headers_to_remove: Vec::new(),
            block_request: false,
            block_status: 403,
            block_message: "Blocked by proxy".to_string(),
            include_stats: false,
            stats: BTreeMap::new(),
        }
    }
}

/// Bounds + charset check shared by every textual descriptor field.
fn check_text(
    field: &'static str,
    value: &str,
    max_len: usize,
    required: bool,
    errors: &mut Vec<FieldError>,
) {
    if required && value.is_empty() {
        errors.push(FieldError {
            field,
            message: "must not be empty".to_string(),
        });
        return;
    }
    if value.chars().count() > max_len {
        errors.push(FieldError {
            field,
            message: format!("exceeds maximum length of {} characters", max_len),
        });
    }
    if value.chars().any(|c| c.is_control()) {
        errors.push(FieldError {
            field,
            message: "contains control characters".to_string(),
        });
    }
}

fn check_status(field: &'static str, status: u16, errors: &mut Vec<FieldError>) {
    if !(100..=599).contains(&status) {
        errors.push(FieldError {
            field,
            message: format!("status code {} outside [100, 599]", status),
        });
    }
}

impl RequestDescriptor {
    /// Semantic validation of the descriptor bounds.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_text("method", &self.method, MAX_METHOD_LEN, true, &mut errors);
        check_text("host", &self.host, MAX_HOST_LEN, true, &mut errors);
        check_text("path", &self.path, MAX_PATH_LEN, false, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl ResponseDescriptor {
    /// Semantic validation of the descriptor bounds, including the nested
    /// request summary.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_text(
            "request.method",
            &self.request.method,
            MAX_METHOD_LEN,
            false,
            &mut errors,
        );
        check_text("request.host", &self.request.host, MAX_HOST_LEN, false, &mut errors);
        check_text("request.path", &self.request.path, MAX_PATH_LEN, false, &mut errors);
        check_status("response.status_code", self.response.status_code, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, host: &str, path: &str) -> RequestDescriptor {
        RequestDescriptor {
            method: method.to_string(),
            host: host.to_string(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            stats: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_request_descriptor() {
        assert!(request("GET", "example.com", "/index.html").validate().is_ok());
    }

    #[test]
    fn test_method_too_long() {
        let errors = request("VERYLONGMETHOD", "example.com", "/").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "method");
    }

    #[test]
    fn test_empty_method_and_host() {
        let errors = request("", "", "/").validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["method", "host"]);
    }

    #[test]
    fn test_control_chars_rejected() {
        let errors = request("GET", "example.com", "/a\r\nb").validate().unwrap_err();
        assert_eq!(errors[0].field, "path");
    }

    #[test]
    fn test_path_length_bound() {
        let long_path = format!("/{}", "a".repeat(MAX_PATH_LEN));
        assert!(request("GET", "example.com", &long_path).validate().is_err());
    }

    #[test]
    fn test_length_bounds_count_characters_not_bytes() {
        // Each 'é' is two bytes; a host at exactly the character bound is fine.
        let host = "é".repeat(MAX_HOST_LEN);
        assert!(request("GET", &host, "/").validate().is_ok());

        let host = "é".repeat(MAX_HOST_LEN + 1);
        let errors = request("GET", &host, "/").validate().unwrap_err();
        assert_eq!(errors[0].field, "host");
    }

    #[test]
    fn test_response_status_bounds() {
        let mut desc = ResponseDescriptor {
            request: RequestSummary {
                method: "GET".to_string(),
                host: "example.com".to_string(),
                path: "/".to_string(),
            },
            response: ResponseSummary {
                status_code: 200,
                headers: BTreeMap::new(),
            },
            stats: BTreeMap::new(),
        };
        assert!(desc.validate().is_ok());

        desc.response.status_code = 600;
        let errors = desc.validate().unwrap_err();
        assert_eq!(errors[0].field, "response.status_code");
    }

    #[test]
    fn test_modification_set_defaults() {
        let m = ModificationSet::default();
        assert!(!m.block_request);
        assert_eq!(m.block_status, 403);
        assert_eq!(m.block_message, "Blocked by proxy");
        assert!(!m.include_stats);
        assert!(m.headers_to_add.is_empty());
    }

    #[test]
    fn test_modification_set_deserializes_with_defaults() {
        let m: ModificationSet = serde_json::from_str("{}").unwrap();
        assert_eq!(m.block_status, 403);
    }
}
