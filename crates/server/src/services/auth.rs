//! Authentication service.
//!
//! Handles registration and password login. Token issuance lives in
//! [`crate::services::token`]; handlers compose the two.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use enquiry_desk_core::{Email, EmailError, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{User, ValidationError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum display-name length.
const MAX_NAME_LENGTH: usize = 50;

/// Errors from registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is wrong. Deliberately undifferentiated.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The email is already registered.
    #[error("User already exists with this email")]
    UserAlreadyExists,

    /// Self-registration as admin is only open while no admin exists.
    #[error("Admin already exists")]
    AdminAlreadyExists,

    /// Staff accounts are created by administrators, not self-registered.
    #[error("Staff accounts are created by an administrator")]
    StaffRegistrationClosed,

    /// The email format is invalid.
    #[error("Please enter a valid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The display name is missing or too long.
    #[error("{0}")]
    InvalidName(ValidationError),

    /// The password doesn't meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// Database operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// The default role is `user`. Registering as `admin` is permitted only
    /// while no admin exists (first-run bootstrap); `staff` accounts are
    /// created through admin user management instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `InvalidName` / `WeakPassword` for
    /// bad input, `UserAlreadyExists` for a duplicate email, and
    /// `AdminAlreadyExists` / `StaffRegistrationClosed` for role escalation.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        requested_role: Option<Role>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;

        let role = match requested_role {
            None | Some(Role::User) => Role::User,
            Some(Role::Admin) => {
                if self.users.count_by_role(Role::Admin).await? > 0 {
                    return Err(AuthError::AdminAlreadyExists);
                }
                Role::Admin
            }
            Some(Role::Staff) => return Err(AuthError::StaffRegistrationClosed),
        };

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&name, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_auth_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate a display name.
fn validate_name(name: &str) -> Result<String, AuthError> {
    crate::models::required_text(name, "Name", MAX_NAME_LENGTH).map_err(AuthError::InvalidName)
}

/// Validate password meets requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter42").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter42", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("hunter42").unwrap();
        let second = hash_password("hunter42").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_password_minimum() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longer-password").is_ok());
    }

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("Jane").is_ok());
        assert!(matches!(
            validate_name("  "),
            Err(AuthError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name(&"n".repeat(51)),
            Err(AuthError::InvalidName(_))
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
