//! Service metadata provider.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service name reported by the info endpoints.
pub const SERVICE_NAME: &str = "proxy-control";

/// Revision of the header-mutation contract.
pub const POLICY_REVISION: &str = "v1.0";

/// Revision of the descriptor wire schemas.
pub const SCHEMA_REVISION: &str = "v1";

/// Execution environment the service detects at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceEnvironment {
    Local,
    AwsLambda,
}

/// Static and process-level metadata answered by `/info/*`.
#[derive(Debug)]
pub struct ServiceInfo {
    started_at: DateTime<Utc>,
}

impl ServiceInfo {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    /// Lambda-managed runtimes always set `AWS_REGION`.
    pub fn environment(&self) -> ServiceEnvironment {
        if std::env::var("AWS_REGION").is_ok() {
            ServiceEnvironment::AwsLambda
        } else {
            ServiceEnvironment::Local
        }
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    pub fn hostname(&self) -> String {
        std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
    }
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_crate() {
        let info = ServiceInfo::new();
        assert_eq!(info.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_uptime_non_negative() {
        let info = ServiceInfo::new();
        assert!(info.uptime_secs() >= 0);
    }

    #[test]
    fn test_environment_serializes_kebab_case() {
        let v = serde_json::to_value(ServiceEnvironment::AwsLambda).unwrap();
        assert_eq!(v, "aws-lambda");
    }
}
