//! Order emails through a mock SendGrid endpoint.

mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, TestApp};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn app_with_sendgrid(server: &MockServer) -> TestApp {
    let uri = server.uri();
    TestApp::with_config(|cfg| {
        cfg.email.sendgrid_api_key = Some("SG.test-key".to_string());
        cfg.email.sendgrid_api_base = uri;
        cfg.email.order_status_template_id = "d-status".to_string();
        cfg.email.order_confirmation_template_id = "d-confirm".to_string();
    })
    .await
}

#[tokio::test]
async fn status_email_goes_to_the_office_address() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer SG.test-key"))
        .and(body_partial_json(json!({
            "template_id": "d-status",
            "personalizations": [{
                "to": [{ "email": "office@example.com" }],
                "dynamic_template_data": { "status": "Shipped" }
            }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_sendgrid(&server).await;
    let office_id = app.seed_office("Mail Rd").await;
    let order = app.seed_order(&office_id).await;

    let updated = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", id_of(&order)),
            Some(json!({ "status": "Shipped", "send_email": true })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["status"], "Shipped");
    assert_eq!(updated["email_sent"], true);
}

#[tokio::test]
async fn failed_status_email_does_not_undo_the_change() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let app = app_with_sendgrid(&server).await;
    let office_id = app.seed_office("Outage Ave").await;
    let order = app.seed_order(&office_id).await;
    let id = id_of(&order);

    let updated = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", id),
            Some(json!({ "status": "Completed", "send_email": true })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["status"], "Completed");
    assert_eq!(updated["email_sent"], false);

    let current = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}", id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(current["status"], "Completed");
}

#[tokio::test]
async fn confirmation_reports_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_sendgrid(&server).await;
    let office_id = app.seed_office("Confirm Ct").await;
    let order = app.seed_order(&office_id).await;

    let response = app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{}/send-confirmation", id_of(&order)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn confirmation_goes_to_the_order_contact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(body_partial_json(json!({
            "template_id": "d-confirm",
            "personalizations": [{ "to": [{ "email": "buyer@example.com" }] }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_sendgrid(&server).await;
    let office_id = app.seed_office("Contact Ln").await;
    let work_order = app.seed_work_order(&office_id).await;
    let order = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/work-orders/{}/convert", id_of(&work_order)),
            None,
            StatusCode::CREATED,
        )
        .await;

    let sent = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/orders/{}/send-confirmation", id_of(&order)),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(sent["to"], "buyer@example.com");
}
