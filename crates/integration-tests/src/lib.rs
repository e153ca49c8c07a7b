//! Integration test helpers for Enquiry Desk.
//!
//! # Running Tests
//!
//! The pure cross-crate tests run everywhere:
//!
//! ```bash
//! cargo test -p enquiry-desk-integration-tests
//! ```
//!
//! The live API tests are `#[ignore]`d because they need a migrated
//! `PostgreSQL` database, a running server, and a seeded admin account:
//!
//! ```bash
//! cargo run -p enquiry-desk-cli -- migrate
//! cargo run -p enquiry-desk-cli -- seed admin \
//!     -e admin@example.com -n "Test Admin" -p admin-password
//! cargo run -p enquiry-desk-server &
//! cargo test -p enquiry-desk-integration-tests -- --ignored
//! ```

use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("DESK_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Credentials of the seeded admin account used by the live tests.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let email = std::env::var("DESK_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());
    let password =
        std::env::var("DESK_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-password".to_string());
    (email, password)
}

/// Create an HTTP client for the tests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email address, so repeated runs don't collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Log in and return the bearer token.
///
/// # Panics
///
/// Panics if the login request fails or returns no token.
pub async fn login(client: &reqwest::Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");

    assert!(
        resp.status().is_success(),
        "login failed for {email}: {}",
        resp.status()
    );

    let body: Value = resp.json().await.expect("login response is not JSON");
    body["token"]
        .as_str()
        .expect("login response has no token")
        .to_owned()
}

/// Create a staff account via the admin API and return `(id, token)`.
///
/// # Panics
///
/// Panics if account creation or login fails.
pub async fn create_staff(client: &reqwest::Client, admin_token: &str) -> (i64, String) {
    let email = unique_email("staff");
    let password = "staff-password";

    let resp = client
        .post(format!("{}/api/users", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": "Test Staff",
            "email": email,
            "password": password,
            "role": "staff",
        }))
        .send()
        .await
        .expect("create staff request failed");
    assert_eq!(resp.status().as_u16(), 201, "staff creation failed");

    let body: Value = resp.json().await.expect("create staff response is not JSON");
    let id = body["user"]["id"].as_i64().expect("staff id missing");

    let token = login(client, &email, password).await;
    (id, token)
}
