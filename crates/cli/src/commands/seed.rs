//! Database seeding commands.
//!
//! # Usage
//!
//! ```bash
//! desk-cli seed admin -e admin@example.com -n "Admin Name" -p <password>
//! ```

use sqlx::PgPool;
use thiserror::Error;

use enquiry_desk_core::{Email, Role};
use enquiry_desk_server::services::auth::hash_password;

use super::migrate::{MigrationError, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least 6 characters")]
    WeakPassword,

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// An account with that email already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

impl From<MigrationError> for SeedError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::MissingEnvVar(var) => Self::MissingEnvVar(var),
            MigrationError::Database(e) => Self::Database(e),
            MigrationError::Migration(e) => Self::Database(e.into()),
        }
    }
}

/// Create an admin account.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Initial password (min 6 characters)
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `SeedError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn admin(email: &str, name: &str, password: &str) -> Result<i32, SeedError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| SeedError::InvalidEmail(e.to_string()))?;
    if password.len() < 6 {
        return Err(SeedError::WeakPassword);
    }

    let pool = PgPool::connect(&database_url()?).await?;

    tracing::info!("Creating admin account: {} ({})", email, name);

    // Check if the account already exists
    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM app_user WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(SeedError::UserExists(email.into_inner()));
    }

    let password_hash = hash_password(password).map_err(|_| SeedError::PasswordHash)?;

    let user_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO app_user (name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(Role::Admin)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin account created! ID: {}, Email: {}", user_id, email);

    Ok(user_id)
}
