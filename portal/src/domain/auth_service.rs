//! Authentication use cases over the gateway and session store.
//!
//! The service is the only writer of the session store. Gateway errors are
//! propagated unchanged; nothing here retries.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{ApiGateway, ApiGatewayExt, SessionStore, SessionStoreError};
use crate::domain::{
    AccessPolicy, ApiError, CreateUserRequest, Credential, Locale, LoginValidationError,
    MessageResponse, Role, SignInCredentials, SignInResponse, User,
};

const SIGN_IN_ENDPOINT: &str = "/api/auth/signin";
const ADMIN_USERS_ENDPOINT: &str = "/api/admin/users";

/// Errors produced by authentication and session use cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The gateway classified a failure; the message is user-presentable.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The session store rejected a write.
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    /// Sign-in form values were rejected before any network call.
    #[error(transparent)]
    InvalidCredentials(#[from] LoginValidationError),
    /// Another sign-in is still running.
    #[error("a sign-in attempt is already in progress")]
    SignInInProgress,
    /// The backend accepted the credentials but returned an unusable grant.
    #[error("sign-in response was malformed: {message}")]
    MalformedGrant {
        /// What was wrong with the grant.
        message: String,
    },
}

impl SessionError {
    /// Text shown inline on the sign-in form.
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            Self::Api(error) => error.message().to_owned(),
            Self::InvalidCredentials(_) => locale.fields_required().to_owned(),
            Self::SignInInProgress => locale.sign_in_in_progress().to_owned(),
            Self::Store(_) | Self::MalformedGrant { .. } => locale.sign_in_failed().to_owned(),
        }
    }
}

/// Sign-in, sign-out, and synchronous session reads.
pub struct AuthService<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S: ?Sized, G: ?Sized> Clone for AuthService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<S: ?Sized, G: ?Sized> AuthService<S, G> {
    /// Create a service over the given store and gateway.
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Shared gateway handle, for callers issuing data requests.
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }
}

impl<S, G> AuthService<S, G>
where
    S: SessionStore + ?Sized,
    G: ApiGateway + ?Sized,
{
    /// Locale of the underlying gateway.
    pub fn locale(&self) -> Locale {
        self.gateway.locale()
    }

    /// Exchange credentials for a token and profile, then persist both.
    ///
    /// The store write completes before this returns, so any state derived
    /// from the returned user is already backed by storage.
    pub async fn sign_in(&self, credentials: &SignInCredentials) -> Result<User, SessionError> {
        let grant: SignInResponse = self
            .gateway
            .post(SIGN_IN_ENDPOINT, Some(&credentials.to_request_body()))
            .await?;
        let snapshot = grant
            .into_snapshot()
            .map_err(|error| SessionError::MalformedGrant {
                message: error.to_string(),
            })?;
        self.store.set(&snapshot)?;
        info!(
            user = %snapshot.user.username(),
            role = %snapshot.user.role(),
            "signed in"
        );
        Ok(snapshot.user)
    }

    /// Clear the stored session. Never fails and never touches the network.
    pub fn sign_out(&self) {
        if let Err(error) = self.store.clear() {
            warn!(%error, "failed to clear stored session");
        }
    }

    /// Stored profile, if a complete snapshot exists.
    pub fn get_current_user(&self) -> Option<User> {
        self.read_snapshot().map(|snapshot| snapshot.user)
    }

    /// Stored credential, if a complete snapshot exists.
    pub fn get_token(&self) -> Option<Credential> {
        self.read_snapshot().map(|snapshot| snapshot.token)
    }

    /// Whether a complete snapshot is stored.
    pub fn is_authenticated(&self) -> bool {
        self.read_snapshot().is_some()
    }

    /// Whether the stored user has exactly `role`; false when signed out.
    pub fn has_role(&self, role: Role) -> bool {
        let user = self.get_current_user();
        AccessPolicy::for_user(user.as_ref()).has_role(role)
    }

    /// Whether the stored user has one of `roles`; false when signed out.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        let user = self.get_current_user();
        AccessPolicy::for_user(user.as_ref()).has_any_role(roles)
    }

    /// Create an account through the admin endpoint.
    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<MessageResponse, ApiError> {
        let response: MessageResponse = self
            .gateway
            .post(ADMIN_USERS_ENDPOINT, Some(request))
            .await?;
        info!(username = %request.username, role = %request.role, "user created");
        Ok(response)
    }

    fn read_snapshot(&self) -> Option<crate::domain::SessionSnapshot> {
        self.store.get().unwrap_or_else(|error| {
            warn!(%error, "stored session unreadable; treating as signed out");
            None
        })
    }
}
