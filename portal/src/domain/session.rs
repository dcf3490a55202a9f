//! Observable session state.
//!
//! `is_authenticated` is derived from the user slot rather than stored, so
//! the two can never disagree.

use serde::Serialize;

use crate::domain::User;

/// Snapshot of the client session as seen by guards and views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::resolving()
    }
}

impl SessionState {
    /// Initial state before the store has been read.
    pub fn resolving() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
        }
    }

    /// Settled, unauthenticated, with no error.
    pub fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
            error: None,
        }
    }

    /// Settled and authenticated as `user`.
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            loading: false,
            error: None,
        }
    }

    /// Settled, unauthenticated, with an inline error for the sign-in form.
    pub fn sign_in_failed(message: impl Into<String>) -> Self {
        Self {
            user: None,
            loading: false,
            error: Some(message.into()),
        }
    }

    /// State while a sign-in request is in flight. Any previous error is
    /// cleared; the current user, if any, is kept until the attempt settles.
    #[must_use]
    pub fn begin_sign_in(&self) -> Self {
        Self {
            user: self.user.clone(),
            loading: true,
            error: None,
        }
    }

    /// Same state with an inline error attached.
    #[must_use]
    pub fn with_error(&self, message: impl Into<String>) -> Self {
        Self {
            user: self.user.clone(),
            loading: self.loading,
            error: Some(message.into()),
        }
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Hydration or sign-in in progress.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last sign-in error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
