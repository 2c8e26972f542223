//! User account model and validated field newtypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum length for email addresses and user names.
pub const USER_FIELD_MAX: usize = 128;
/// Minimum accepted password length for registration and self-update.
pub const PASSWORD_MIN: usize = 5;

/// Validation errors returned by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email does not have a `local@domain` shape.
    InvalidEmail,
    /// Email exceeds [`USER_FIELD_MAX`] characters.
    EmailTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Name exceeds [`USER_FIELD_MAX`] characters.
    NameTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// Password is shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort {
        /// Permitted minimum.
        min: usize,
    },
    /// Role string is not a known role.
    InvalidRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidRole => write!(f, "role must be either editor or reader"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Access role carried by every user account.
///
/// Authorization is a pure function of this two-variant enumeration and the
/// request method; there is no per-resource permission state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May create, modify, and delete books and pages.
    Editor,
    /// Read-only access; the default for self-service registration.
    #[default]
    Reader,
}

impl Role {
    /// Stable string form used in tokens and persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Reader => "reader",
        }
    }

    /// True when the role may perform write operations.
    pub fn is_editor(self) -> bool {
        matches!(self, Self::Editor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(Self::Editor),
            "reader" => Ok(Self::Reader),
            _ => Err(UserValidationError::InvalidRole),
        }
    }
}

/// Normalised email address.
///
/// ## Invariants
/// - Non-empty local and domain parts separated by a single trailing `@`.
/// - The domain part is lowercased on construction; the local part keeps its
///   case so credential lookups stay byte-exact with what the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, normalise, and construct an email address.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::EmailTooLong {
                max: USER_FIELD_MAX,
            });
        }
        let Some((local, domain)) = trimmed.rsplit_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || !domain.contains('.')
            || domain.chars().any(char::is_whitespace)
            || local.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human-readable name shown on the user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a user name.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, UserValidationError> {
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_FIELD_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Registered user account.
///
/// ## Invariants
/// - `email` is unique across the store (enforced by the repository).
/// - `role` is assigned at creation and never changed through self-service.
/// - `password_hash` is an argon2 PHC string, never a plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    email: EmailAddress,
    name: UserName,
    role: Role,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    password_hash: String,
}

impl User {
    /// Materialise a user from persisted parts.
    pub fn from_parts(id: Uuid, draft: NewUser) -> Self {
        let NewUser {
            email,
            name,
            role,
            is_staff,
            is_superuser,
            password_hash,
        } = draft;
        Self {
            id,
            email,
            name,
            role,
            is_active: true,
            is_staff,
            is_superuser,
            password_hash,
        }
    }

    /// Stable account identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Access role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Administrative staff flag, orthogonal to [`Role`].
    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    /// Administrative superuser flag, orthogonal to [`Role`].
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Stored argon2 PHC hash.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Replace the active flag, used when rehydrating from persistence.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Draft for a user account about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Normalised email address.
    pub email: EmailAddress,
    /// Display name.
    pub name: UserName,
    /// Access role; registration always produces [`Role::Reader`].
    pub role: Role,
    /// Administrative staff flag.
    pub is_staff: bool,
    /// Administrative superuser flag.
    pub is_superuser: bool,
    /// Argon2 PHC hash of the supplied password.
    pub password_hash: String,
}

impl NewUser {
    /// Draft a self-registered reader account.
    pub fn reader(email: EmailAddress, name: UserName, password_hash: String) -> Self {
        Self {
            email,
            name,
            role: Role::Reader,
            is_staff: false,
            is_superuser: false,
            password_hash,
        }
    }

    /// Draft an editor account via the privileged creation path.
    pub fn editor(email: EmailAddress, name: UserName, password_hash: String) -> Self {
        Self {
            role: Role::Editor,
            ..Self::reader(email, name, password_hash)
        }
    }

    /// Draft a superuser account; role stays [`Role::Reader`], the
    /// administrative flags are what distinguish it.
    pub fn superuser(email: EmailAddress, name: UserName, password_hash: String) -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
            ..Self::reader(email, name, password_hash)
        }
    }
}

/// Partial update applied to an existing account by its owner.
///
/// Role is deliberately absent: the self-service path can never change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// Replacement email, if requested.
    pub email: Option<EmailAddress>,
    /// Replacement name, if requested.
    pub name: Option<UserName>,
    /// Replacement password hash, if the password was rotated.
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test1@EXAMPLE.com", "test1@example.com")]
    #[case("Test2@Example.com", "Test2@example.com")]
    #[case("TEST3@EXAMPLE.COM", "TEST3@example.com")]
    #[case("test4@example.COM", "test4@example.com")]
    fn email_domain_is_lowercased(#[case] raw: &str, #[case] expected: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("@example.com", UserValidationError::InvalidEmail)]
    #[case("user@", UserValidationError::InvalidEmail)]
    #[case("user@nodot", UserValidationError::InvalidEmail)]
    fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid email must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn role_defaults_to_reader() {
        assert_eq!(Role::default(), Role::Reader);
    }

    #[rstest]
    #[case("editor", Ok(Role::Editor))]
    #[case("reader", Ok(Role::Reader))]
    #[case("admin", Err(UserValidationError::InvalidRole))]
    #[case("EDITOR", Err(UserValidationError::InvalidRole))]
    fn role_parses_known_values(
        #[case] raw: &str,
        #[case] expected: Result<Role, UserValidationError>,
    ) {
        assert_eq!(raw.parse::<Role>(), expected);
    }

    #[test]
    fn reader_draft_has_no_privileges() {
        let draft = NewUser::reader(
            EmailAddress::new("user@example.com").expect("email"),
            UserName::new("Test User").expect("name"),
            "$argon2id$stub".into(),
        );
        assert_eq!(draft.role, Role::Reader);
        assert!(!draft.is_staff);
        assert!(!draft.is_superuser);
    }

    #[test]
    fn editor_draft_only_changes_role() {
        let draft = NewUser::editor(
            EmailAddress::new("editor@example.com").expect("email"),
            UserName::new("Editor").expect("name"),
            "$argon2id$stub".into(),
        );
        assert_eq!(draft.role, Role::Editor);
        assert!(!draft.is_staff);
        assert!(!draft.is_superuser);
    }

    #[test]
    fn superuser_draft_sets_admin_flags() {
        let draft = NewUser::superuser(
            EmailAddress::new("root@example.com").expect("email"),
            UserName::new("Root").expect("name"),
            "$argon2id$stub".into(),
        );
        assert_eq!(draft.role, Role::Reader);
        assert!(draft.is_staff);
        assert!(draft.is_superuser);
    }

    #[test]
    fn empty_changes_report_empty() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            name: Some(UserName::new("New Name").expect("name")),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
