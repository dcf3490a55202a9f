//! Driven port for backend reachability checks.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a full health check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Whether the backend answered with a success status.
    pub is_healthy: bool,
    /// User-facing summary.
    pub message: String,
    /// Decoded health payload or failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl HealthReport {
    /// Healthy report with optional payload.
    pub fn healthy(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            is_healthy: true,
            message: message.into(),
            details,
        }
    }

    /// Unhealthy report with optional failure details.
    pub fn unhealthy(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            is_healthy: false,
            message: message.into(),
            details,
        }
    }
}

/// Port for probing `GET /api/system/health`.
///
/// Neither method fails: every transport or status problem is folded into
/// the returned value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Run the full check and describe the outcome.
    async fn check_health(&self) -> HealthReport;

    /// Cheap liveness check aborted after `timeout`; `false` on any failure.
    async fn quick_check(&self, timeout: Duration) -> bool;
}

/// Probe returning a fixed verdict, for tests and detached runs.
#[derive(Debug, Clone)]
pub struct FixtureHealthProbe {
    report: HealthReport,
}

impl FixtureHealthProbe {
    /// Probe that always reports `report`.
    pub fn new(report: HealthReport) -> Self {
        Self { report }
    }
}

#[async_trait]
impl HealthProbe for FixtureHealthProbe {
    async fn check_health(&self) -> HealthReport {
        self.report.clone()
    }

    async fn quick_check(&self, _timeout: Duration) -> bool {
        self.report.is_healthy
    }
}
