//! Portal client configuration loaded via OrthoConfig.
//!
//! Apart from the request timeout every field is optional; accessors apply
//! defaults. Values that fail to parse fall back to the default with a
//! warning instead of aborting start-up. Command-line flags are merged last
//! through [`PortalSettings::with_overrides`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::domain::Locale;
use crate::domain::ports::{DetachedSessionStore, SessionStore};
use crate::outbound::storage::FileSessionStore;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8086";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 3_000;
const SESSION_DIR_NAME: &str = ".cscore-portal";

/// Configuration values for the portal client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Base address of the grading backend.
    pub api_base_url: Option<String>,
    /// Budget for every gateway call, in milliseconds.
    #[ortho_config(default = 30_000)]
    pub request_timeout_ms: u64,
    /// Budget for the quick health check, in milliseconds.
    pub health_timeout_ms: Option<u64>,
    /// Directory holding the stored session.
    pub session_dir: Option<PathBuf>,
    /// Message catalogue locale (`vi` or `en`).
    pub locale: Option<String>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            health_timeout_ms: None,
            session_dir: None,
            locale: None,
        }
    }
}

/// Values given on the command line; each one set wins over env and file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    /// Replacement backend base address.
    pub api_base_url: Option<String>,
    /// Replacement message catalogue locale.
    pub locale: Option<String>,
}

impl PortalSettings {
    /// Merge command-line values over the loaded settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(url) = overrides.api_base_url {
            self.api_base_url = Some(url);
        }
        if let Some(locale) = overrides.locale {
            self.locale = Some(locale);
        }
        self
    }

    /// Backend base address, falling back to the default when unset or
    /// invalid.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in default cannot be parsed.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        let Some(raw) = self.api_base_url.as_deref() else {
            return Url::parse(DEFAULT_API_BASE_URL);
        };
        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
            Ok(url) => {
                warn!(scheme = url.scheme(), "api_base_url must be http(s); using default");
                Url::parse(DEFAULT_API_BASE_URL)
            }
            Err(error) => {
                warn!(%error, value = raw, "invalid api_base_url; using default");
                Url::parse(DEFAULT_API_BASE_URL)
            }
        }
    }

    /// Per-request timeout for gateway calls.
    pub fn request_timeout(&self) -> Duration {
        positive_millis(
            Some(self.request_timeout_ms),
            DEFAULT_REQUEST_TIMEOUT_MS,
            "request_timeout_ms",
        )
    }

    /// Timeout for the quick health check.
    pub fn health_timeout(&self) -> Duration {
        positive_millis(
            self.health_timeout_ms,
            DEFAULT_HEALTH_TIMEOUT_MS,
            "health_timeout_ms",
        )
    }

    /// Message catalogue locale.
    pub fn locale(&self) -> Locale {
        let Some(tag) = self.locale.as_deref() else {
            return Locale::default();
        };
        tag.parse().unwrap_or_else(|error| {
            warn!(%error, "unsupported locale; using default");
            Locale::default()
        })
    }

    /// Session directory: the configured one, else `$HOME/.cscore-portal`.
    /// `None` when neither is available as a UTF-8 path.
    pub fn session_dir(&self) -> Option<Utf8PathBuf> {
        let path = self.session_dir.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(SESSION_DIR_NAME))
        })?;
        Utf8PathBuf::from_path_buf(path)
            .map_err(|path| warn!(path = %path.display(), "session directory is not UTF-8"))
            .ok()
    }

    /// Session store for this configuration. Runs detached when no usable
    /// directory exists, so the client behaves as permanently signed out
    /// rather than failing.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        let Some(root) = self.session_dir() else {
            warn!("no session directory available; sessions will not persist");
            return Arc::new(DetachedSessionStore);
        };
        match FileSessionStore::open(&root) {
            Ok(store) => Arc::new(store),
            Err(error) => {
                warn!(%error, "session store unavailable; sessions will not persist");
                Arc::new(DetachedSessionStore)
            }
        }
    }
}

fn positive_millis(value: Option<u64>, default: u64, key: &str) -> Duration {
    match value {
        Some(0) => {
            warn!(key, "timeout must be positive; using default");
            Duration::from_millis(default)
        }
        Some(millis) => Duration::from_millis(millis),
        None => Duration::from_millis(default),
    }
}
