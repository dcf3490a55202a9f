//! Authentication primitives: sign-in credentials, bearer credentials, and
//! the persisted session snapshot.
//!
//! Keep form parsing outside the services by exposing constructors that
//! validate string inputs before anything talks to a port.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{Role, User, UserId, UserParts};

/// Domain error returned when sign-in form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username or email was missing or blank once trimmed.
    #[error("username or email must not be empty")]
    EmptyIdentifier,
    /// Password was blank once trimmed.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `username_or_email` is trimmed and non-empty.
/// - `password` is non-blank but is sent exactly as typed.
///
/// # Examples
/// ```
/// use portal::domain::SignInCredentials;
///
/// let creds = SignInCredentials::try_from_parts(" teacher1 ", "validpass").unwrap();
/// assert_eq!(creds.username_or_email(), "teacher1");
/// assert_eq!(creds.password(), "validpass");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    username_or_email: String,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(
        username_or_email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let normalized = username_or_email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }
        if password.trim().is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username_or_email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username or email used to look the account up.
    pub fn username_or_email(&self) -> &str {
        &self.username_or_email
    }

    /// Password as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Request body for `POST /api/auth/signin`.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "usernameOrEmail": self.username_or_email,
            "password": self.password.as_str(),
        })
    }
}

impl fmt::Debug for SignInCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInCredentials")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer credential issued by the backend.
///
/// The client never inspects its structure. `Debug` output is redacted so
/// the token cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential(Zeroizing<String>);

/// Error returned when a credential string is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("credential must not be empty")]
pub struct EmptyCredentialError;

impl Credential {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyCredentialError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(EmptyCredentialError);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Complete `Authorization` header value.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl TryFrom<String> for Credential {
    type Error = EmptyCredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credential> for String {
    fn from(value: Credential) -> Self {
        value.expose().to_owned()
    }
}

/// A session at rest: the credential and the profile it was issued for.
///
/// Stores persist both entries together; a snapshot is never half-present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bearer credential, stored under the `token` key.
    pub token: Credential,
    /// Profile snapshot, stored under the `user` key.
    pub user: User,
}

impl SessionSnapshot {
    /// Pair a credential with its profile.
    pub fn new(token: Credential, user: User) -> Self {
        Self { token, user }
    }
}

/// Successful `POST /api/auth/signin` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    /// Bearer token.
    pub token: String,
    /// Token scheme reported by the backend, normally `Bearer`.
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    /// User identifier.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Full name.
    #[serde(default)]
    pub full_name: String,
    /// Student number.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Granted role.
    pub role: Role,
}

impl SignInResponse {
    /// Split the payload into a storable snapshot.
    pub fn into_snapshot(self) -> Result<SessionSnapshot, EmptyCredentialError> {
        let token = Credential::new(self.token)?;
        let user = User::new(UserParts {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            student_id: self.student_id,
            role: self.role,
        });
        Ok(SessionSnapshot::new(token, user))
    }
}

/// Admin request body for `POST /api/admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Full name.
    pub full_name: String,
    /// Student number, for student accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Role to grant.
    pub role: Role,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    /// Server-provided text.
    pub message: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyIdentifier)]
    #[case("   ", "pw", LoginValidationError::EmptyIdentifier)]
    #[case("teacher1", "", LoginValidationError::EmptyPassword)]
    #[case("teacher1", "   ", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] identifier: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = SignInCredentials::try_from_parts(identifier, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn request_body_uses_backend_field_names() {
        let creds = SignInCredentials::try_from_parts("teacher1", "validpass").expect("valid");
        assert_eq!(
            creds.to_request_body(),
            serde_json::json!({ "usernameOrEmail": "teacher1", "password": "validpass" })
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = SignInCredentials::try_from_parts("teacher1", "validpass").expect("valid");
        let token = Credential::new("abc").expect("token");
        assert!(!format!("{creds:?}").contains("validpass"));
        assert_eq!(format!("{token:?}"), "Credential(<redacted>)");
    }

    #[test]
    fn sign_in_payload_becomes_snapshot() {
        let payload: SignInResponse = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "type": "Bearer",
            "id": 12,
            "username": "teacher1",
            "email": "teacher1@example.edu",
            "fullName": "Nguyen Van A",
            "role": "TEACHER"
        }))
        .expect("payload decodes");

        let snapshot = payload.into_snapshot().expect("token present");
        assert_eq!(snapshot.token.expose(), "abc");
        assert_eq!(snapshot.user.role(), Role::Teacher);
        assert_eq!(snapshot.user.id(), UserId::new(12));
        assert_eq!(snapshot.user.student_id(), None);
    }

    #[test]
    fn blank_token_cannot_form_a_snapshot() {
        let payload: SignInResponse = serde_json::from_value(serde_json::json!({
            "token": "",
            "id": 1,
            "username": "s1",
            "email": "s1@example.edu",
            "role": "STUDENT"
        }))
        .expect("payload decodes");

        assert_eq!(payload.into_snapshot(), Err(EmptyCredentialError));
    }

    #[test]
    fn snapshot_round_trips_with_token_and_user_keys() {
        let snapshot = SessionSnapshot::new(
            Credential::new("abc").expect("token"),
            User::new(UserParts {
                id: UserId::new(3),
                username: "student1".to_owned(),
                email: "student1@example.edu".to_owned(),
                full_name: "Tran Thi B".to_owned(),
                student_id: Some("SV001".to_owned()),
                role: Role::Student,
            }),
        );
        let value = serde_json::to_value(&snapshot).expect("serialise");
        assert_eq!(value["token"], "abc");
        assert_eq!(value["user"]["studentId"], "SV001");
        let decoded: SessionSnapshot = serde_json::from_value(value).expect("decode");
        assert_eq!(decoded, snapshot);
    }
}
