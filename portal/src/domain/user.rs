//! User profile and role model.
//!
//! A [`User`] is the profile snapshot returned by the sign-in endpoint. It is
//! immutable for the lifetime of a session; a new sign-in replaces it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of portal roles.
///
/// Capabilities are defined per role in
/// [`AccessPolicy`](crate::domain::AccessPolicy) rather than by a total
/// ordering, so adding a role forces every capability match to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Course teacher.
    Teacher,
    /// Portal administrator.
    Admin,
}

impl Role {
    /// Every role, in ascending privilege order.
    pub const ALL: [Self; 3] = [Self::Student, Self::Teacher, Self::Admin];

    /// Wire representation used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{value}'")]
pub struct UnknownRoleError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownRoleError {
                value: value.to_owned(),
            })
    }
}

/// Backend-assigned numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw backend identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated user profile.
///
/// ## Invariants
/// - `role` is one of the closed [`Role`] set; unknown roles fail to decode.
/// - Serialised with camelCase keys so the stored snapshot matches the
///   backend's profile shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    student_id: Option<String>,
    role: Role,
}

/// Field bundle used to construct a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParts {
    /// Backend identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Full display name; may be blank.
    pub full_name: String,
    /// Student number, present for students.
    pub student_id: Option<String>,
    /// Role granted by the backend.
    pub role: Role,
}

impl User {
    /// Build a profile from its parts.
    pub fn new(parts: UserParts) -> Self {
        let UserParts {
            id,
            username,
            email,
            full_name,
            student_id,
            role,
        } = parts;
        Self {
            id,
            username,
            email,
            full_name,
            student_id,
            role,
        }
    }

    /// Backend identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Full name as recorded by the backend.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Student number, if any.
    pub fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    /// Granted role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Name shown in page chrome: the full name, or the username when the
    /// full name is blank.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}
