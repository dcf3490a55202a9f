//! Protected view table for the terminal client.
//!
//! Each entry names a path prefix and the access rule guarding it. A prefix
//! matches the exact path and any sub-path below it (`/admin/users`), never a
//! sibling that merely shares characters (`/administrator`).

use crate::domain::Role;

/// How a view is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may view.
    Public,
    /// The sign-in form; signed-in users are sent to their landing route.
    SignInPage,
    /// Signed-in users only. An empty role list admits any role.
    Guarded(&'static [Role]),
}

/// One routable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    /// Path prefix served by the view.
    pub prefix: &'static str,
    /// Heading shown when rendered.
    pub title: &'static str,
    /// Access rule.
    pub access: Access,
}

const STAFF_AND_STUDENTS: &[Role] = &[Role::Student, Role::Teacher, Role::Admin];

/// Every view the client knows about.
pub const VIEWS: &[View] = &[
    View {
        prefix: "/",
        title: "CScore grading portal",
        access: Access::Public,
    },
    View {
        prefix: "/login",
        title: "Sign in",
        access: Access::SignInPage,
    },
    View {
        prefix: "/unauthorized",
        title: "You do not have access to this page",
        access: Access::Public,
    },
    View {
        prefix: "/admin",
        title: "Administration",
        access: Access::Guarded(&[Role::Admin]),
    },
    View {
        prefix: "/teacher",
        title: "Teaching dashboard",
        access: Access::Guarded(&[Role::Teacher]),
    },
    View {
        prefix: "/student",
        title: "Student dashboard",
        access: Access::Guarded(STAFF_AND_STUDENTS),
    },
    View {
        prefix: "/notifications",
        title: "Notifications",
        access: Access::Guarded(&[]),
    },
    View {
        prefix: "/settings",
        title: "Account settings",
        access: Access::Guarded(&[]),
    },
];

/// Find the view serving `path`, preferring the longest matching prefix.
pub fn resolve(path: &str) -> Option<&'static View> {
    let path = normalise(path);
    VIEWS
        .iter()
        .filter(|view| matches_prefix(view.prefix, path))
        .max_by_key(|view| view.prefix.len())
}

fn normalise(path: &str) -> &str {
    let trimmed = path.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    match without_query.trim_end_matches('/') {
        "" => "/",
        other => other,
    }
}

fn matches_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for view resolution.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", "/")]
    #[case("", "/")]
    #[case("/admin", "/admin")]
    #[case("/admin/users/", "/admin")]
    #[case("/teacher/courses/7?tab=grades", "/teacher")]
    #[case("/student", "/student")]
    #[case("/notifications", "/notifications")]
    #[case("/login", "/login")]
    fn resolves_known_paths(#[case] path: &str, #[case] prefix: &str) {
        assert_eq!(resolve(path).map(|view| view.prefix), Some(prefix));
    }

    #[rstest]
    #[case("/administrator")]
    #[case("/teachers")]
    #[case("/unknown")]
    fn rejects_unknown_paths(#[case] path: &str) {
        assert_eq!(resolve(path), None);
    }

    #[test]
    fn role_consoles_are_guarded_as_documented() {
        let roles = |path: &str| match resolve(path).map(|view| view.access) {
            Some(Access::Guarded(roles)) => Some(roles),
            _ => None,
        };
        assert_eq!(roles("/admin"), Some([Role::Admin].as_slice()));
        assert_eq!(roles("/teacher"), Some([Role::Teacher].as_slice()));
        assert_eq!(roles("/student"), Some(STAFF_AND_STUDENTS));
        assert!(roles("/settings").is_some_and(<[Role]>::is_empty));
        assert_eq!(roles("/"), None);
    }
}
