//! Reqwest-backed health probe for `GET /api/system/health`.
//!
//! The probe never attaches credentials and never fails: transport and
//! status problems are folded into the report.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::gateway::{compose_url, has_json_content_type};
use crate::domain::Locale;
use crate::domain::ports::{HealthProbe, HealthReport};

const HEALTH_ENDPOINT: &str = "/api/system/health";

/// Health probe bound to one backend.
pub struct HttpHealthProbe {
    client: Client,
    url: String,
    locale: Locale,
}

impl HttpHealthProbe {
    /// Build a probe whose full check is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration, locale: Locale) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: compose_url(base_url, HEALTH_ENDPOINT),
            locale,
        })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check_health(&self) -> HealthReport {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(error) => return self.transport_failure(&error),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "backend health check returned an error status");
            return HealthReport::unhealthy(
                self.locale.backend_error_status(status.as_u16()),
                Some(json!({
                    "status": status.as_u16(),
                    "statusText": status.canonical_reason().unwrap_or_default(),
                })),
            );
        }

        let is_json = has_json_content_type(response.headers());
        let details = match response.bytes().await {
            Ok(body) if is_json => serde_json::from_slice::<Value>(&body).ok(),
            Ok(_) => None,
            Err(error) => return self.transport_failure(&error),
        };
        debug!(status = status.as_u16(), "backend healthy");
        HealthReport::healthy(self.locale.backend_healthy(), details)
    }

    async fn quick_check(&self, timeout: Duration) -> bool {
        match self.client.get(&self.url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(%error, "quick health check failed");
                false
            }
        }
    }
}

impl HttpHealthProbe {
    fn transport_failure(&self, error: &reqwest::Error) -> HealthReport {
        warn!(%error, "backend health check could not complete");
        let message = if error.is_connect() || error.is_timeout() {
            self.locale.backend_unreachable()
        } else {
            self.locale.backend_unknown_failure()
        };
        HealthReport::unhealthy(message, Some(json!({ "error": error.to_string() })))
    }
}
