//! Admin user management service.

use sqlx::PgPool;
use thiserror::Error;

use enquiry_desk_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{UserChanges, UserRepository};
use crate::models::{ListFilter, Pagination, User, ValidationError, required_text};
use crate::services::auth;

/// Maximum display-name length.
const MAX_NAME_LENGTH: usize = 50;

/// Errors from user management operations.
#[derive(Debug, Error)]
pub enum UserAdminError {
    /// The user doesn't exist.
    #[error("User not found")]
    NotFound,

    /// The email is already registered to another account.
    #[error("User already exists with this email")]
    EmailTaken,

    /// The last remaining admin cannot be deleted.
    #[error("Cannot delete the last admin user")]
    LastAdmin,

    /// The input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// Database operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Optional field changes accepted by [`UserService::update`].
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// A page of users with its pagination envelope.
#[derive(Debug)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// User management service (admin surface).
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user management service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Create an account with any role.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::Validation` for bad input and
    /// `UserAdminError::EmailTaken` for a duplicate email.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, UserAdminError> {
        let name = required_text(name, "Name", MAX_NAME_LENGTH)?;
        let email = Email::parse(email).map_err(ValidationError::from)?;
        validate_password(password)?;

        let password_hash = hash(password)?;

        self.users
            .create(&name, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => UserAdminError::EmailTaken,
                other => UserAdminError::Repository(other),
            })
    }

    /// List accounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::Repository` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<UserPage, UserAdminError> {
        let users = self.users.list(filter.limit, filter.offset()).await?;
        let total = self.users.count().await?;

        Ok(UserPage {
            users,
            pagination: Pagination::new(filter, total),
        })
    }

    /// Apply partial changes to an account.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::NotFound` if the user doesn't exist,
    /// `UserAdminError::EmailTaken` if the new email is already used, and
    /// `UserAdminError::Validation` for bad input.
    pub async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, UserAdminError> {
        let name = patch
            .name
            .as_deref()
            .map(|n| required_text(n, "Name", MAX_NAME_LENGTH))
            .transpose()?;
        let email = patch
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(ValidationError::from)?;
        let password_hash = match patch.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash(password)?)
            }
            None => None,
        };

        self.users
            .update(
                id,
                UserChanges {
                    name,
                    email,
                    password_hash,
                    role: patch.role,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserAdminError::NotFound,
                RepositoryError::Conflict(_) => UserAdminError::EmailTaken,
                other => UserAdminError::Repository(other),
            })
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::NotFound` if the user doesn't exist.
    pub async fn update_role(&self, id: UserId, role: Role) -> Result<User, UserAdminError> {
        self.users.update_role(id, role).await.map_err(|e| match e {
            RepositoryError::NotFound => UserAdminError::NotFound,
            other => UserAdminError::Repository(other),
        })
    }

    /// Delete an account, upholding the last-admin invariant.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::NotFound` if the user doesn't exist and
    /// `UserAdminError::LastAdmin` when deleting the only admin.
    pub async fn delete(&self, id: UserId) -> Result<(), UserAdminError> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(UserAdminError::NotFound)?;

        if user.role == Role::Admin && self.users.count_by_role(Role::Admin).await? <= 1 {
            return Err(UserAdminError::LastAdmin);
        }

        self.users.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => UserAdminError::NotFound,
            other => UserAdminError::Repository(other),
        })
    }
}

/// Password check shared with registration.
fn validate_password(password: &str) -> Result<(), UserAdminError> {
    auth::validate_password(password)
        .map_err(|_| UserAdminError::Validation(ValidationError::TooShort("Password", 6)))
}

/// Hash via the shared Argon2id helper.
fn hash(password: &str) -> Result<String, UserAdminError> {
    auth::hash_password(password).map_err(|_| UserAdminError::PasswordHash)
}
