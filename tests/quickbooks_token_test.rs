//! QuickBooks access token upkeep against a mock token endpoint.

mod common;

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use common::{quickbooks_against, TestApp, QB_REALM};
use printshop_api::{entities::user, errors::ServiceError};
use sea_orm::EntityTrait;
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

const TOKEN_PATH: &str = "/oauth2/v1/tokens/bearer";

fn refreshed_token() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "access-new",
        "refresh_token": "refresh-new",
        "expires_in": 3600,
        "token_type": "bearer"
    }))
}

async fn app_against(server: &MockServer) -> TestApp {
    let uri = server.uri();
    TestApp::with_config(|cfg| quickbooks_against(cfg, &uri)).await
}

#[tokio::test]
async fn token_outside_the_window_is_used_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(refreshed_token())
        .expect(0)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    app.connect_quickbooks(app.admin_id, Utc::now() + ChronoDuration::minutes(45))
        .await;

    let creds = app
        .state
        .services
        .quickbooks_tokens
        .access_token(app.admin_id)
        .await
        .expect("credentials");
    assert_eq!(creds.access_token, "access-old");
    assert_eq!(creds.realm_id, QB_REALM);
}

#[tokio::test]
async fn token_inside_the_window_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-old"))
        .respond_with(refreshed_token())
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    app.connect_quickbooks(app.admin_id, Utc::now() + ChronoDuration::minutes(10))
        .await;

    let tokens = &app.state.services.quickbooks_tokens;
    let first = tokens.access_token(app.admin_id).await.expect("refreshed");
    assert_eq!(first.access_token, "access-new");
    let second = tokens.access_token(app.admin_id).await.expect("cached");
    assert_eq!(second.access_token, "access-new");

    let stored = user::Entity::find_by_id(app.admin_id)
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("user");
    assert_eq!(stored.quickbooks_refresh_token.as_deref(), Some("refresh-new"));
    let expiry = stored.quickbooks_token_expiry.expect("expiry stored");
    assert!(expiry > Utc::now() + ChronoDuration::minutes(50));
}

#[tokio::test]
async fn concurrent_callers_share_a_single_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(refreshed_token().set_delay(Duration::from_millis(150)))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    app.connect_quickbooks(app.admin_id, Utc::now() - ChronoDuration::minutes(1))
        .await;

    let tokens = app.state.services.quickbooks_tokens.clone();
    let calls = (0..8).map(|_| {
        let tokens = tokens.clone();
        let user_id = app.admin_id;
        async move { tokens.access_token(user_id).await }
    });
    let results = futures::future::join_all(calls).await;

    for result in results {
        assert_eq!(result.expect("credentials").access_token, "access-new");
    }
    assert_eq!(tokens.active_guards(), 0);
}

#[tokio::test]
async fn rejected_refresh_keeps_the_stored_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    app.connect_quickbooks(app.admin_id, Utc::now() + ChronoDuration::minutes(5))
        .await;

    let err = app
        .state
        .services
        .quickbooks_tokens
        .access_token(app.admin_id)
        .await
        .expect_err("refresh should fail");
    assert!(matches!(err, ServiceError::ExternalServiceError(ref m) if m.contains("invalid_grant")));

    let stored = user::Entity::find_by_id(app.admin_id)
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("user");
    assert_eq!(stored.quickbooks_access_token.as_deref(), Some("access-old"));
    assert_eq!(stored.quickbooks_refresh_token.as_deref(), Some("refresh-old"));
}

#[tokio::test]
async fn unconnected_user_is_unauthorized() {
    let server = MockServer::start().await;
    let app = app_against(&server).await;

    let err = app
        .state
        .services
        .quickbooks_tokens
        .access_token(app.admin_id)
        .await
        .expect_err("no connection");
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}
