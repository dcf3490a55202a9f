//! Navigation targets produced by the route guard and access policy.

use std::fmt;

use crate::domain::Role;

/// Closed set of navigation destinations the session core can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public landing page.
    Home,
    /// Sign-in form.
    SignIn,
    /// Shown after a role check fails.
    Unauthorized,
    /// Administrator console.
    AdminLanding,
    /// Teacher console.
    TeacherLanding,
    /// Student dashboard.
    StudentLanding,
}

impl Route {
    /// Path component for the route.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::SignIn => "/login",
            Self::Unauthorized => "/unauthorized",
            Self::AdminLanding => "/admin",
            Self::TeacherLanding => "/teacher",
            Self::StudentLanding => "/student",
        }
    }

    /// Landing route for a role.
    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminLanding,
            Role::Teacher => Self::TeacherLanding,
            Role::Student => Self::StudentLanding,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
