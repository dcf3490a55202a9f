//! Process-wide session lifecycle.
//!
//! [`SessionService`] owns the observable [`SessionState`] and is its only
//! writer. State is published through a `tokio::sync::watch` channel so
//! guards and views can subscribe. Every transition that depends on storage
//! is published only after the store write has completed.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::ports::{ApiGateway, SessionStore};
use crate::domain::{
    AccessPolicy, ApiError, AuthService, Locale, SessionError, SessionState, SignInCredentials,
    User,
};

/// Injectable owner of the session state machine.
pub struct SessionService<S: ?Sized, G: ?Sized> {
    auth: AuthService<S, G>,
    state: watch::Sender<SessionState>,
    sign_in_in_flight: AtomicBool,
}

impl<S, G> SessionService<S, G>
where
    S: SessionStore + ?Sized,
    G: ApiGateway + ?Sized,
{
    /// Create a service in the resolving state. Call [`Self::init`] to
    /// hydrate it from storage.
    pub fn new(auth: AuthService<S, G>) -> Self {
        let (state, _) = watch::channel(SessionState::resolving());
        Self {
            auth,
            state,
            sign_in_in_flight: AtomicBool::new(false),
        }
    }

    /// Underlying authentication service.
    pub fn auth(&self) -> &AuthService<S, G> {
        &self.auth
    }

    /// Hydrate state from the stored snapshot and settle loading.
    pub fn init(&self) -> SessionState {
        let next = match self.auth.get_current_user() {
            Some(user) => {
                info!(user = %user.username(), role = %user.role(), "session restored");
                SessionState::signed_in(user)
            }
            None => {
                info!("no stored session");
                SessionState::signed_out()
            }
        };
        self.publish(next.clone());
        next
    }

    /// Validate form input, sign in, and publish the outcome.
    ///
    /// A second call while one is in flight fails with
    /// [`SessionError::SignInInProgress`] and leaves state untouched. On any
    /// other failure the stored snapshot is cleared and the state carries
    /// the inline error. Dropping the future before it settles republishes
    /// the state seen before the attempt.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<User, SessionError> {
        let Some(_in_flight) = InFlight::acquire(&self.sign_in_in_flight) else {
            warn!("sign-in rejected: another attempt is in progress");
            return Err(SessionError::SignInInProgress);
        };
        let locale = self.auth.locale();

        let credentials = match SignInCredentials::try_from_parts(identifier, password) {
            Ok(credentials) => credentials,
            Err(error) => {
                let error = SessionError::from(error);
                let next = self.state.borrow().with_error(error.user_message(locale));
                self.publish(next);
                return Err(error);
            }
        };

        let prior = self.state();
        self.publish(prior.begin_sign_in());
        let pending = PendingAttempt::arm(&self.state, prior);

        let outcome = self.auth.sign_in(&credentials).await;
        pending.disarm();
        match outcome {
            Ok(user) => {
                self.publish(SessionState::signed_in(user.clone()));
                Ok(user)
            }
            Err(error) => {
                self.auth.sign_out();
                warn!(%error, "sign-in failed");
                self.publish(SessionState::sign_in_failed(error.user_message(locale)));
                Err(error)
            }
        }
    }

    /// Clear storage and publish the signed-out state.
    pub fn sign_out(&self) {
        self.auth.sign_out();
        self.publish(SessionState::signed_out());
        info!("signed out");
    }

    /// Sign out when a gateway call reports an expired session. Returns
    /// whether the session was torn down.
    pub fn react_to(&self, error: &ApiError) -> bool {
        if !error.is_session_expired() {
            return false;
        }
        info!("backend rejected the stored credential; signing out");
        self.sign_out();
        true
    }

    /// Receiver observing every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the current state is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Default landing route for the current state.
    pub fn default_redirect_path(&self) -> crate::domain::Route {
        AccessPolicy::for_session(&self.state.borrow()).default_redirect_path()
    }

    /// Locale used for inline messages.
    pub fn locale(&self) -> Locale {
        self.auth.locale()
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

/// Marks a sign-in as running until dropped, including when the owning
/// future is cancelled.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Restores the pre-attempt state if a sign-in future is dropped while the
/// request is pending.
struct PendingAttempt<'a> {
    state: &'a watch::Sender<SessionState>,
    prior: Option<SessionState>,
}

impl<'a> PendingAttempt<'a> {
    const fn arm(state: &'a watch::Sender<SessionState>, prior: SessionState) -> Self {
        Self {
            state,
            prior: Some(prior),
        }
    }

    fn disarm(mut self) {
        self.prior = None;
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            warn!("sign-in abandoned before it settled; restoring previous state");
            self.state.send_replace(prior);
        }
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
