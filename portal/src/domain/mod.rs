//! Session and authorization core of the grading portal.
//!
//! Purpose: define the user and role model, the closed error taxonomy, the
//! access policy, and the services that own session state. Nothing in this
//! module performs I/O directly; adapters plug in through [`ports`].
//!
//! Public surface:
//! - `AuthService`: sign-in, sign-out, and synchronous session reads.
//! - `SessionService`: the observable session state machine.
//! - `AccessPolicy`: role-derived capabilities.
//! - `RouteGuard` and `authorize`: render-or-redirect decisions.

pub mod ports;

mod access;
mod auth;
mod auth_service;
mod error;
mod guard;
mod messages;
mod routes;
mod session;
mod session_service;
mod user;

pub use self::access::AccessPolicy;
pub use self::auth::{
    CreateUserRequest, Credential, EmptyCredentialError, LoginValidationError, MessageResponse,
    SessionSnapshot, SignInCredentials, SignInResponse,
};
pub use self::auth_service::{AuthService, SessionError};
pub use self::error::{ApiError, ApiErrorKind};
pub use self::guard::{
    Decision, GuardPolicy, GuardState, Rendered, RouteGuard, SignInPageGuard, authorize,
};
pub use self::messages::{Locale, UnsupportedLocaleError};
pub use self::routes::Route;
pub use self::session::SessionState;
pub use self::session_service::SessionService;
pub use self::user::{Role, UnknownRoleError, User, UserId, UserParts};
