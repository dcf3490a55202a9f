//! Classified gateway errors.
//!
//! Every outbound call resolves to either a payload or an [`ApiError`] whose
//! [`ApiErrorKind`] is drawn from a closed taxonomy. The message is always
//! user-presentable: either the server's own `message`/`error` text or the
//! locale's canned fallback for the kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Locale;

/// Stable failure category for a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ApiErrorKind {
    /// HTTP 400.
    InvalidInput,
    /// HTTP 401; the stored credential is no longer accepted.
    SessionExpired,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 500, or a 2xx payload that could not be decoded.
    ServerFault,
    /// HTTP 503.
    ServiceUnavailable,
    /// Connection-level failure, including timeouts.
    NetworkUnreachable,
    /// Any other non-success status.
    UnknownHttpError {
        /// Numeric HTTP status.
        status: u16,
    },
}

impl ApiErrorKind {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidInput,
            401 => Self::SessionExpired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::ServerFault,
            503 => Self::ServiceUnavailable,
            other => Self::UnknownHttpError { status: other },
        }
    }

    /// Status code associated with the kind, when there is one.
    pub fn status(self) -> Option<u16> {
        match self {
            Self::InvalidInput => Some(400),
            Self::SessionExpired => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::ServerFault => Some(500),
            Self::ServiceUnavailable => Some(503),
            Self::NetworkUnreachable => None,
            Self::UnknownHttpError { status } => Some(status),
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("invalid_input"),
            Self::SessionExpired => f.write_str("session_expired"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::NotFound => f.write_str("not_found"),
            Self::ServerFault => f.write_str("server_fault"),
            Self::ServiceUnavailable => f.write_str("service_unavailable"),
            Self::NetworkUnreachable => f.write_str("network_unreachable"),
            Self::UnknownHttpError { status } => write!(f, "unknown_http_error({status})"),
        }
    }
}

/// Classified gateway failure.
///
/// ## Invariants
/// - `message` is never blank; blank server text is replaced by the canned
///   fallback for `kind`.
///
/// # Examples
/// ```
/// use portal::domain::{ApiError, ApiErrorKind, Locale};
///
/// let err = ApiError::from_status(401, None, Locale::En);
/// assert_eq!(err.kind(), ApiErrorKind::SessionExpired);
/// assert_eq!(err.message(), "Your session has expired. Please sign in again.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
}

impl ApiError {
    /// Build an error, substituting the locale fallback for blank text.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>, locale: Locale) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::fallback(kind, locale);
        }
        Self { kind, message }
    }

    /// Build an error carrying the locale's canned text for `kind`.
    pub fn fallback(kind: ApiErrorKind, locale: Locale) -> Self {
        Self {
            kind,
            message: locale.fallback_message(kind),
        }
    }

    /// Classify a non-success status, preferring the server's message.
    pub fn from_status(status: u16, server_message: Option<&str>, locale: Locale) -> Self {
        let kind = ApiErrorKind::from_status(status);
        match server_message {
            Some(text) => Self::new(kind, text, locale),
            None => Self::fallback(kind, locale),
        }
    }

    /// Connection-level failure with the fixed user-facing text.
    pub fn network_unreachable(locale: Locale) -> Self {
        Self::fallback(ApiErrorKind::NetworkUnreachable, locale)
    }

    /// A 2xx payload that did not match the caller's expected shape.
    pub fn unexpected_response(locale: Locale) -> Self {
        Self {
            kind: ApiErrorKind::ServerFault,
            message: locale.unexpected_response().to_owned(),
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// User-presentable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the backend rejected the stored credential.
    pub fn is_session_expired(&self) -> bool {
        self.kind == ApiErrorKind::SessionExpired
    }
}
