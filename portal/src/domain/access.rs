//! Role-derived capabilities.
//!
//! [`AccessPolicy`] is a value computed from the current session; every
//! method is total and side-effect free. Capabilities are spelled out per
//! role with exhaustive matches instead of a privilege ordering, so shared
//! views and role consoles can diverge without special cases.

use crate::domain::{Locale, Role, Route, SessionState, User};

/// Capabilities of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessPolicy<'a> {
    user: Option<&'a User>,
}

impl<'a> AccessPolicy<'a> {
    /// Policy for an optional signed-in user.
    pub fn for_user(user: Option<&'a User>) -> Self {
        Self { user }
    }

    /// Policy for the given session state.
    pub fn for_session(state: &'a SessionState) -> Self {
        Self::for_user(state.user())
    }

    /// Current role, if signed in.
    pub fn role(&self) -> Option<Role> {
        self.user.map(User::role)
    }

    /// Whether the current role is exactly `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    /// Whether the current role is one of `roles`. Always false when signed
    /// out.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|current| roles.contains(&current))
    }

    /// Signed in as an administrator.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Signed in as a teacher.
    pub fn is_teacher(&self) -> bool {
        self.has_role(Role::Teacher)
    }

    /// Signed in as a student.
    pub fn is_student(&self) -> bool {
        self.has_role(Role::Student)
    }

    /// Administrator console access.
    pub fn can_access_admin(&self) -> bool {
        self.role().is_some_and(|role| match role {
            Role::Admin => true,
            Role::Teacher | Role::Student => false,
        })
    }

    /// Teacher console access.
    pub fn can_access_teacher(&self) -> bool {
        self.role().is_some_and(|role| match role {
            Role::Teacher | Role::Admin => true,
            Role::Student => false,
        })
    }

    /// Student-facing views (course listings, assignments).
    pub fn can_access_student(&self) -> bool {
        self.role().is_some_and(|role| match role {
            Role::Student | Role::Teacher | Role::Admin => true,
        })
    }

    /// Where to send the user after sign-in or when they hit a page that
    /// has no meaning for them.
    pub fn default_redirect_path(&self) -> Route {
        self.role().map_or(Route::SignIn, Route::landing_for)
    }

    /// Label for `role`, or for the current role when `role` is `None`.
    pub fn display_label(&self, role: Option<Role>, locale: Locale) -> &'static str {
        locale.role_label(role.or_else(|| self.role()))
    }

    /// Name shown in page chrome; empty when signed out.
    pub fn display_name(&self) -> &'a str {
        self.user.map_or("", User::display_name)
    }
}
