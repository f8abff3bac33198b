//! Invoice creation with the QuickBooks push, failure bookkeeping and the
//! reconcile pass that retries it.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration as ChronoDuration, Utc};
use common::{decimal, id_of, quickbooks_against, TestApp, QB_REALM};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn company_path(entity: &str) -> String {
    format!("/v3/company/{}/{}", QB_REALM, entity)
}

async fn mount_quickbooks_outage(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(company_path("customer")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "Fault": { "Error": [{ "Message": "Service unavailable", "code": "3100" }] }
        })))
        .mount(server)
        .await;
}

async fn mount_quickbooks_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(company_path("customer")))
        .and(header("authorization", "Bearer access-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Customer": { "Id": "C1", "DisplayName": "Ledger Rd", "Active": true }
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(company_path("invoice")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Invoice": { "Id": "I9", "DocNumber": "1001", "TotalAmt": 60.0, "Balance": 60.0 }
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn connected_app(server: &MockServer) -> TestApp {
    let uri = server.uri();
    let app = TestApp::with_config(|cfg| {
        quickbooks_against(cfg, &uri);
        cfg.default_tax_rate = 0.0;
    })
    .await;
    app.connect_quickbooks(app.admin_id, Utc::now() + ChronoDuration::days(30))
        .await;
    app
}

#[tokio::test]
async fn failed_push_is_recorded_then_reconciled() {
    let server = MockServer::start().await;
    mount_quickbooks_outage(&server).await;
    let app = connected_app(&server).await;

    let office_id = app.seed_office("Ledger Rd").await;
    let order = app.seed_order(&office_id).await;

    let invoice = app
        .call_ok(
            Method::POST,
            "/api/v1/invoices",
            Some(json!({ "order_id": order["id"], "sync_to_quickbooks": true })),
            StatusCode::CREATED,
        )
        .await;
    let invoice_id = id_of(&invoice);
    assert_eq!(invoice["quickbooks_sync_status"], "Failed");
    assert_eq!(invoice["sync_attempts"], 1);
    assert!(invoice["quickbooks_invoice_id"].is_null());
    assert!(invoice["quickbooks_sync_error"]
        .as_str()
        .unwrap_or_default()
        .contains("Service unavailable"));
    assert_eq!(decimal(&invoice["total"]), dec!(60));
    assert_eq!(invoice["items"].as_array().expect("items").len(), 1);

    server.reset().await;
    mount_quickbooks_ok(&server).await;

    let summary = app
        .call_ok(
            Method::POST,
            "/api/v1/quickbooks/invoices/reconcile",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(summary, json!({ "attempted": 1, "synced": 1, "failed": 0 }));

    let synced = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/invoices/{}", invoice_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(synced["quickbooks_sync_status"], "Synced");
    assert_eq!(synced["quickbooks_invoice_id"], "I9");
    assert_eq!(synced["sync_attempts"], 2);
    assert!(synced["quickbooks_sync_error"].is_null());

    let office = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/offices/{}", office_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(office["quickbooks_customer_id"], "C1");

    // Nothing left to retry.
    let idle = app.state.services.invoices.reconcile(5).await.expect("reconcile");
    assert_eq!(idle.attempted, 0);
}

#[tokio::test]
async fn reconcile_stops_after_max_attempts() {
    let server = MockServer::start().await;
    mount_quickbooks_outage(&server).await;
    let app = connected_app(&server).await;

    let office_id = app.seed_office("Retry Row").await;
    let order = app.seed_order(&office_id).await;
    app.call_ok(
        Method::POST,
        "/api/v1/invoices",
        Some(json!({ "order_id": order["id"], "sync_to_quickbooks": true })),
        StatusCode::CREATED,
    )
    .await;

    let invoices = &app.state.services.invoices;
    let second = invoices.reconcile(2).await.expect("second attempt");
    assert_eq!((second.attempted, second.failed), (1, 1));
    let exhausted = invoices.reconcile(2).await.expect("no attempts left");
    assert_eq!(exhausted.attempted, 0);
}

#[tokio::test]
async fn order_is_invoiced_only_once() {
    let server = MockServer::start().await;
    let app = connected_app(&server).await;
    let office_id = app.seed_office("Single St").await;
    let order = app.seed_order(&office_id).await;
    let body = json!({ "order_id": order["id"] });

    let invoice = app
        .call_ok(Method::POST, "/api/v1/invoices", Some(body.clone()), StatusCode::CREATED)
        .await;
    assert_eq!(invoice["quickbooks_sync_status"], "NotRequested");
    assert_eq!(invoice["sync_attempts"], 0);

    let again = app.call(Method::POST, "/api/v1/invoices", Some(body)).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let source = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}", id_of(&order)),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(source["date_invoiced"].is_string());
}
