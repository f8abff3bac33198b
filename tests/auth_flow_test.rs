//! Password login, token refresh and role grants flowing into tokens.

mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, response_json, TestApp};
use serde_json::{json, Value};

async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await;
    let status = response.status();
    (status, response_json(response).await)
}

#[tokio::test]
async fn login_issues_a_usable_token_pair() {
    let app = TestApp::new().await;

    let (status, pair) = login(&app, "Admin@PrintShop.test", "correct-horse-battery").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pair["token_type"], "Bearer");
    let access = pair["access_token"].as_str().expect("access token");

    let me = app
        .request(Method::GET, "/api/v1/users/me", None, Some(access))
        .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body = response_json(me).await;
    assert_eq!(body["data"]["email"], "admin@printshop.test");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = login(&app, "admin@printshop.test", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_INVALID_CREDENTIALS");
}

#[tokio::test]
async fn refresh_token_yields_a_new_pair_but_cannot_call_the_api() {
    let app = TestApp::new().await;
    let (_, pair) = login(&app, "admin@printshop.test", "correct-horse-battery").await;
    let refresh = pair["refresh_token"].as_str().expect("refresh token");

    let direct = app
        .request(Method::GET, "/api/v1/users/me", None, Some(refresh))
        .await;
    assert_eq!(direct.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let renewed = response_json(response).await;
    assert!(renewed["access_token"].is_string());

    // An access token is not accepted where a refresh token is expected.
    let access = pair["access_token"].as_str().expect("access token");
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": access })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_tokens_are_rejected() {
    let app = TestApp::new().await;
    for token in ["", "garbage", "a.b.c"] {
        let response = app
            .request(Method::GET, "/api/v1/orders", None, Some(token))
            .await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "token {:?} was accepted",
            token
        );
    }
}

#[tokio::test]
async fn role_permissions_reach_the_token() {
    let app = TestApp::new().await;

    let role = app
        .call_ok(
            Method::POST,
            "/api/v1/roles",
            Some(json!({
                "name": "front-desk",
                "description": "Counter staff",
                "permissions": ["companies:read", "orders:read"]
            })),
            StatusCode::CREATED,
        )
        .await;
    let mut granted: Vec<String> = role["permissions"]
        .as_array()
        .expect("permissions")
        .iter()
        .filter_map(|p| p.as_str().map(str::to_string))
        .collect();
    granted.sort();
    assert_eq!(granted, vec!["companies:read", "orders:read"]);

    app.call_ok(
        Method::POST,
        "/api/v1/users",
        Some(json!({
            "name": "Dana Desk",
            "email": "dana@printshop.test",
            "password": "front-desk-pass",
            "role_ids": [id_of(&role)]
        })),
        StatusCode::CREATED,
    )
    .await;

    let (status, pair) = login(&app, "dana@printshop.test", "front-desk-pass").await;
    assert_eq!(status, StatusCode::OK);
    let token = pair["access_token"].as_str().expect("access token");

    let read = app
        .request(Method::GET, "/api/v1/companies", None, Some(token))
        .await;
    assert_eq!(read.status(), StatusCode::OK);

    let write = app
        .request(
            Method::POST,
            "/api/v1/companies",
            Some(json!({ "name": "Blocked Co" })),
            Some(token),
        )
        .await;
    assert_eq!(write.status(), StatusCode::FORBIDDEN);
}
