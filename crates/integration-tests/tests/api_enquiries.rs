//! Live API tests for the enquiry workflow.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`desk-cli migrate`)
//! - A seeded admin account (`desk-cli seed admin ...`)
//! - The server running (`cargo run -p enquiry-desk-server`)
//!
//! Run with: `cargo test -p enquiry-desk-integration-tests -- --ignored`

use reqwest::StatusCode;
use serde_json::{Value, json};

use enquiry_desk_integration_tests::{
    admin_credentials, base_url, client, create_staff, login, unique_email,
};

/// Create an enquiry via the public endpoint and return its JSON.
async fn create_enquiry(http: &reqwest::Client) -> Value {
    let resp = http
        .post(format!("{}/api/enquiries", base_url()))
        .json(&json!({
            "customerName": "John Doe",
            "email": unique_email("customer"),
            "phone": "1234567890",
            "message": "Test",
        }))
        .send()
        .await
        .expect("create enquiry request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("create response is not JSON");
    body["enquiry"].clone()
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn public_create_defaults_to_new_and_unassigned() {
    let http = client();
    let enquiry = create_enquiry(&http).await;

    assert_eq!(enquiry["status"], "new");
    assert!(enquiry["assignedTo"].is_null());
    assert_eq!(enquiry["customerName"], "John Doe");
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn listing_requires_a_bearer_token() {
    let http = client();

    let resp = http
        .get(format!("{}/api/enquiries", base_url()))
        .send()
        .await
        .expect("list request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (email, password) = admin_credentials();
    let token = login(&http, &email, &password).await;

    let resp = http
        .get(format!("{}/api/enquiries", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("list response is not JSON");
    let total = body["pagination"]["total"].as_i64().expect("total missing");
    let count = body["enquiries"].as_array().expect("enquiries missing").len();
    assert!(total >= i64::try_from(count).expect("count fits in i64"));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn assignment_workflow_end_to_end() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;

    let enquiry = create_enquiry(&http).await;
    let id = enquiry["id"].as_i64().expect("enquiry id missing");

    let (staff_id, staff_token) = create_staff(&http, &admin_token).await;
    let (_, other_staff_token) = create_staff(&http, &admin_token).await;

    // Admin assigns the enquiry; the assignee comes back resolved.
    let resp = http
        .post(format!("{}/api/enquiries/{id}/assign", base_url()))
        .bearer_auth(&admin_token)
        .json(&json!({ "assignedTo": staff_id }))
        .send()
        .await
        .expect("assign request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("assign response is not JSON");
    assert_eq!(body["enquiry"]["assignedTo"]["id"].as_i64(), Some(staff_id));
    assert_eq!(body["enquiry"]["assignedTo"]["name"], "Test Staff");

    // The assigned staff member closes it.
    let resp = http
        .put(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&staff_token)
        .json(&json!({ "status": "closed" }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("update response is not JSON");
    assert_eq!(body["enquiry"]["status"], "closed");

    // A different staff member gets a 403 for the same update.
    let resp = http
        .put(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&other_staff_token)
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Staff cannot touch the assignee field even on their own enquiry.
    let resp = http
        .put(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&staff_token)
        .json(&json!({ "assignedTo": null }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn reassignment_leaves_exactly_one_assignee() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;

    let enquiry = create_enquiry(&http).await;
    let id = enquiry["id"].as_i64().expect("enquiry id missing");

    let (first_staff, _) = create_staff(&http, &admin_token).await;
    let (second_staff, _) = create_staff(&http, &admin_token).await;

    for (path, body) in [
        ("assign", json!({ "assignedTo": first_staff })),
        ("unassign", json!({})),
        ("assign", json!({ "assignedTo": second_staff })),
    ] {
        let resp = http
            .post(format!("{}/api/enquiries/{id}/{path}", base_url()))
            .bearer_auth(&admin_token)
            .json(&body)
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::OK, "{path} failed");
    }

    let resp = http
        .get(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("get request failed");
    let body: Value = resp.json().await.expect("get response is not JSON");
    assert_eq!(
        body["enquiry"]["assignedTo"]["id"].as_i64(),
        Some(second_staff)
    );
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn assigning_to_a_regular_user_is_rejected() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;

    let enquiry = create_enquiry(&http).await;
    let id = enquiry["id"].as_i64().expect("enquiry id missing");

    // Create a plain user account.
    let user_email = unique_email("user");
    let resp = http
        .post(format!("{}/api/users", base_url()))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Plain User",
            "email": user_email,
            "password": "user-password",
            "role": "user",
        }))
        .send()
        .await
        .expect("create user request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("create user response is not JSON");
    let user_id = body["user"]["id"].as_i64().expect("user id missing");

    let resp = http
        .post(format!("{}/api/enquiries/{id}/assign", base_url()))
        .bearer_auth(&admin_token)
        .json(&json!({ "assignedTo": user_id }))
        .send()
        .await
        .expect("assign request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn soft_deleted_enquiries_disappear_from_reads() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;

    let enquiry = create_enquiry(&http).await;
    let id = enquiry["id"].as_i64().expect("enquiry id missing");

    let resp = http
        .delete(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("delete request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Single fetch now 404s.
    let resp = http
        .get(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("get request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A second delete also 404s: deletion is terminal.
    let resp = http
        .delete(format!("{}/api/enquiries/{id}", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("delete request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn deleting_the_last_admin_is_rejected() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;

    // Find our own account id via /me.
    let resp = http
        .get(format!("{}/api/auth/me", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("me request failed");
    let body: Value = resp.json().await.expect("me response is not JSON");
    let admin_id = body["user"]["id"].as_i64().expect("admin id missing");

    // Count admins via the staff list; only attempt the deletion when this
    // is the sole admin, which is the seeded default.
    let resp = http
        .get(format!("{}/api/enquiries/staff/list", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("staff list request failed");
    let body: Value = resp.json().await.expect("staff response is not JSON");
    let admins = body["staff"]
        .as_array()
        .expect("staff missing")
        .iter()
        .filter(|member| member["role"] == "admin")
        .count();

    if admins == 1 {
        let resp = http
            .delete(format!("{}/api/users/{admin_id}", base_url()))
            .bearer_auth(&admin_token)
            .send()
            .await
            .expect("delete admin request failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn staff_list_is_admin_only() {
    let http = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&http, &email, &password).await;
    let (_, staff_token) = create_staff(&http, &admin_token).await;

    let resp = http
        .get(format!("{}/api/enquiries/staff/list", base_url()))
        .bearer_auth(&staff_token)
        .send()
        .await
        .expect("staff list request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
