//! User directory data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyName,
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a single '@'"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::UnknownRole => write!(f, "role must be USER or ADMIN"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated email address used as the login identifier.
///
/// ## Invariants
/// - Trimmed, non-empty, and contains exactly one `@` with text on both
///   sides. Full RFC validation is deliberately out of scope; the mail
///   system is the authority on deliverability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from string input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role controlling which actions the authorization table permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Storage representation used by the persistence layer and sessions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory account record.
///
/// ## Invariants
/// - `email` is unique across the directory (enforced by storage).
/// - `name` is non-empty once trimmed.
///
/// The password digest lives alongside the account but is only ever read
/// by the login service; it never crosses the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    name: String,
    phone: Option<String>,
    role: Role,
    password_digest: String,
}

impl User {
    /// Build a user from validated components.
    pub fn new(
        id: UserId,
        email: Email,
        name: impl Into<String>,
        phone: Option<String>,
        role: Role,
        password_digest: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            id,
            email,
            name,
            phone,
            role,
            password_digest: password_digest.into(),
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Stored password digest, compared by the login service only.
    pub fn password_digest(&self) -> &str {
        self.password_digest.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("@missing-local", UserValidationError::InvalidEmail)]
    #[case("missing-domain@", UserValidationError::InvalidEmail)]
    #[case("two@@ats", UserValidationError::InvalidEmail)]
    fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = Email::new(raw).expect_err("malformed email must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn email_trims_surrounding_whitespace() {
        let email = Email::new("  student@example.edu  ").expect("valid email");
        assert_eq!(email.as_ref(), "student@example.edu");
    }

    #[rstest]
    #[case("USER", Role::User)]
    #[case("ADMIN", Role::Admin)]
    fn role_round_trips_storage_form(#[case] raw: &str, #[case] expected: Role) {
        let role = Role::parse(raw).expect("known role");
        assert_eq!(role, expected);
        assert_eq!(role.as_str(), raw);
    }

    #[rstest]
    fn role_rejects_unknown_values() {
        assert_eq!(
            Role::parse("SUPERUSER").expect_err("unknown role"),
            UserValidationError::UnknownRole
        );
    }

    #[rstest]
    fn user_rejects_blank_name() {
        let err = User::new(
            UserId::random(),
            Email::new("a@b.example").expect("email"),
            "   ",
            None,
            Role::User,
            "digest",
        )
        .expect_err("blank name must fail");
        assert_eq!(err, UserValidationError::EmptyName);
    }

    #[rstest]
    fn user_id_rejects_non_uuid_input() {
        assert_eq!(
            UserId::new("not-a-uuid").expect_err("invalid id"),
            UserValidationError::InvalidId
        );
    }
}
