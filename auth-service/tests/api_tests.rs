mod common;

use common::TestApp;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn register_returns_verifiable_token() {
    let app = TestApp::spawn().await;

    let token = app.register("alice", "alice@x.com", "pw123").await;

    let claims = app
        .jwt_handler
        .verify(&token)
        .expect("issued token did not verify");
    assert_eq!(claims.username, "alice");
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice2@x.com",
            "password": "pw456",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice2",
            "email": "alice@x.com",
            "password": "pw456",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "not-an-email",
            "password": "pw123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn login_succeeds_only_with_registered_password() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "pw123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let token = body["data"]["accessToken"].as_str().unwrap();
    let claims = app.jwt_handler.verify(token).unwrap();
    assert_eq!(claims.username, "alice");

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "pw124" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn login_rejects_unknown_user() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": "pw123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn validate_token_endpoint_answers_boolean() {
    let app = TestApp::spawn().await;
    let token = app.register("alice", "alice@x.com", "pw123").await;

    let response = app
        .post("/api/auth/validate-token")
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["valid"], true);

    // Garbage never yields an error status, only a false verdict.
    let response = app
        .post("/api/auth/validate-token")
        .json(&json!({ "token": "garbage" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["valid"], false);
}

#[tokio::test]
async fn profile_returns_caller_identity() {
    let app = TestApp::spawn().await;
    let token = app.register("alice", "alice@x.com", "pw123").await;

    let response = app
        .get("/api/auth/profile")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "alice");

    let claims = app.jwt_handler.verify(&token).unwrap();
    assert_eq!(body["data"]["userId"], claims.sub.as_str());
}

#[tokio::test]
async fn profile_requires_valid_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/auth/profile").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .get("/api/auth/profile")
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}
