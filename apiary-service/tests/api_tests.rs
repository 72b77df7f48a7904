mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

/// Register through the API and return `(user_id, token, apiary_id)`.
async fn register(app: &TestApp, username: &str, with_apiary: bool) -> (String, String, Value) {
    let mut body = json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "pass_word!",
        "display_name": username.to_uppercase(),
    });
    if with_apiary {
        body["apiary_name"] = json!(format!("{} hives", username));
        body["apiary_location"] = json!("Valle del Cauca");
    }

    let response = app
        .post("/api/auth/register")
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    (
        body["data"]["user"]["id"].as_str().unwrap().to_string(),
        body["data"]["token"].as_str().unwrap().to_string(),
        body["data"]["apiary"]["id"].clone(),
    )
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "Nicola",
            "email": "Nicola@Example.com",
            "password": "pass_word!",
            "apiary_name": "Finca La Esperanza"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["user"]["username"], "nicola");
    assert_eq!(body["data"]["user"]["email"], "nicola@example.com");
    assert_eq!(body["data"]["user"]["display_name"], "nicola");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["apiary"]["name"], "Finca La Esperanza");
    assert_eq!(body["data"]["apiary"]["owner_id"], body["data"]["user"]["id"]);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    register(&app, "nicola", false).await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola2",
            "email": "NICOLA@example.com",
            "password": "pass_word!2"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already"));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.harness.store.user_count(), 0);
}

#[tokio::test]
async fn test_login_failures_look_identical() {
    let app = TestApp::spawn().await;
    register(&app, "nicola", false).await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({ "identifier": "nicola", "password": "wrong_password" }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_user = app
        .post("/api/auth/login")
        .json(&json!({ "identifier": "ghost@example.com", "password": "pass_word!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let first: Value = wrong_password.json().await.unwrap();
    let second: Value = unknown_user.json().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_login_and_fetch_profile() {
    let app = TestApp::spawn().await;
    let (user_id, _, _) = register(&app, "nicola", false).await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "identifier": "nicola@example.com", "password": "pass_word!" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();

    let response = app
        .get_authenticated("/api/users/me", token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], user_id);
    assert_eq!(body["data"]["display_name"], "NICOLA");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::spawn().await;

    let missing = app
        .get("/api/users/me")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .get_authenticated("/api/users/me", "not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, token, _) = register(&app, "nicola", false).await;

    app.harness.clock.advance(chrono::Duration::hours(2));

    let response = app
        .get_authenticated("/api/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Session expired");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::spawn().await;
    let (_, token, _) = register(&app, "nicola", false).await;

    let response = app
        .patch_authenticated("/api/users/me", &token)
        .json(&json!({ "display_name": "Nicola D.", "phone": "+57 300-555-1234" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["display_name"], "Nicola D.");
    assert_eq!(body["data"]["phone"], "+57 300-555-1234");

    let invalid = app
        .patch_authenticated("/api/users/me", &token)
        .json(&json!({ "phone": "call me maybe" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_forgot_password_always_accepted() {
    let app = TestApp::spawn().await;
    register(&app, "nicola", false).await;

    let known = app
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown = app
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "ghost@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(known.status(), StatusCode::ACCEPTED);
    assert_eq!(unknown.status(), StatusCode::ACCEPTED);
    let first: Value = known.json().await.unwrap();
    let second: Value = unknown.json().await.unwrap();
    assert_eq!(first, second);

    assert_eq!(app.harness.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let app = TestApp::spawn().await;
    register(&app, "nicola", false).await;

    app.post("/api/auth/forgot-password")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    let token = app
        .harness
        .mailer
        .last_token_for("nicola@example.com")
        .unwrap();

    let valid = app
        .post("/api/auth/reset-password/validate")
        .json(&json!({ "token": token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(valid.status(), StatusCode::OK);

    let reset = app
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "brand_new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(reset.status(), StatusCode::OK);

    let replay = app
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "another_pw_1" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let login = app
        .post("/api/auth/login")
        .json(&json!({ "identifier": "nicola", "password": "brand_new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let app = TestApp::spawn().await;
    let (_, token, _) = register(&app, "nicola", false).await;

    let wrong = app
        .post_authenticated("/api/users/me/password", &token)
        .json(&json!({ "current_password": "nope_nope", "new_password": "brand_new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let right = app
        .post_authenticated("/api/users/me/password", &token)
        .json(&json!({ "current_password": "pass_word!", "new_password": "brand_new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(right.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_grant_check_and_revoke_access() {
    let app = TestApp::spawn().await;
    let (_, owner_token, apiary) = register(&app, "owner", true).await;
    let apiary = apiary.as_str().unwrap().to_string();
    let (bee_id, bee_token, _) = register(&app, "bee", false).await;

    let denied = app
        .get_authenticated(&format!("/api/apiaries/{}/access?level=read", apiary), &bee_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let granted = app
        .put_authenticated(&format!("/api/apiaries/{}/grants/{}", apiary, bee_id), &owner_token)
        .json(&json!({ "permission_level": "write" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(granted.status(), StatusCode::OK);
    let body: Value = granted.json().await.unwrap();
    assert_eq!(body["data"]["permission_level"], "write");

    let allowed = app
        .get_authenticated(&format!("/api/apiaries/{}/access?level=write", apiary), &bee_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(allowed.status(), StatusCode::OK);
    let body: Value = allowed.json().await.unwrap();
    assert_eq!(body["data"]["permission_level"], "write");

    let escalation = app
        .put_authenticated(&format!("/api/apiaries/{}/grants/{}", apiary, bee_id), &bee_token)
        .json(&json!({ "permission_level": "admin" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(escalation.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let grants = app
        .get_authenticated(&format!("/api/apiaries/{}/grants", apiary), &bee_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(grants.status(), StatusCode::OK);
    let body: Value = grants.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let revoked = app
        .delete_authenticated(&format!("/api/apiaries/{}/grants/{}", apiary, bee_id), &owner_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(revoked.status(), StatusCode::OK);

    let after = app
        .get_authenticated(&format!("/api/apiaries/{}/access", apiary), &bee_token)
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = after.json().await.unwrap();
    assert_eq!(body["data"]["permission_level"], "none");
}

#[tokio::test]
async fn test_create_apiary_makes_caller_owner() {
    let app = TestApp::spawn().await;
    let (user_id, token, _) = register(&app, "nicola", false).await;

    let response = app
        .post_authenticated("/api/apiaries", &token)
        .json(&json!({ "name": "Second yard" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["owner_id"], user_id);

    let access = app
        .get_authenticated(
            &format!(
                "/api/apiaries/{}/access?level=admin",
                body["data"]["id"].as_str().unwrap()
            ),
            &token,
        )
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(access.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_apiary_id_is_unprocessable() {
    let app = TestApp::spawn().await;
    let (_, token, _) = register(&app, "nicola", false).await;

    let response = app
        .get_authenticated("/api/apiaries/not-a-uuid/grants", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
