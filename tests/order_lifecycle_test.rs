//! Work order to order promotion, duplication, payments and typesetting.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, id_of, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn work_order_converts_once() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Convert Ave").await;
    let work_order = app.seed_work_order(&office_id).await;
    let wo_id = id_of(&work_order);
    let convert_uri = format!("/api/v1/work-orders/{}/convert", wo_id);

    let order = app
        .call_ok(Method::POST, &convert_uri, None, StatusCode::CREATED)
        .await;
    assert_eq!(order["work_order_id"], wo_id.as_str());
    assert_eq!(order["office_id"], office_id.as_str());
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["purchase_order_number"], "PO-77");

    let items = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}/items", id_of(&order)),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(items.as_array().expect("items").len(), 2);

    let again = app.call(Method::POST, &convert_uri, None).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let detail = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/work-orders/{}", wo_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(detail["order_id"], order["id"]);
}

#[tokio::test]
async fn duplicated_order_gets_a_new_number_and_pending_status() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Copy Lane").await;
    let source = app.seed_order(&office_id).await;
    let source_id = id_of(&source);

    app.call_ok(
        Method::PUT,
        &format!("/api/v1/orders/{}/status", source_id),
        Some(json!({ "status": "Completed" })),
        StatusCode::OK,
    )
    .await;

    let copy = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/orders/{}/duplicate", source_id),
            None,
            StatusCode::CREATED,
        )
        .await;

    assert_ne!(copy["id"], source["id"]);
    assert_ne!(copy["order_number"], source["order_number"]);
    assert_eq!(copy["status"], "Pending");
    assert!(copy["work_order_id"].is_null());
    assert!(copy["date_invoiced"].is_null());
    let items = copy["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["description"], "Business cards");
    assert_eq!(items[0]["status"], "Pending");
}

#[tokio::test]
async fn order_numbers_are_sequential() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Sequence St").await;
    let first = app.seed_order(&office_id).await;
    let second = app.seed_order(&office_id).await;

    let a = first["order_number"].as_i64().expect("number");
    let b = second["order_number"].as_i64().expect("number");
    assert_eq!(b, a + 1);

    let by_number = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/by-number/{}", b),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(by_number["id"], second["id"]);
}

#[tokio::test]
async fn company_quickbooks_id_must_be_unique() {
    let app = TestApp::new().await;
    app.call_ok(
        Method::POST,
        "/api/v1/companies",
        Some(json!({ "name": "Acme", "quickbooks_id": "QB-1" })),
        StatusCode::CREATED,
    )
    .await;

    let response = app
        .call(
            Method::POST,
            "/api/v1/companies",
            Some(json!({ "name": "Acme Again", "quickbooks_id": "QB-1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap_or_default().contains("QB-1"));
}

#[tokio::test]
async fn payments_reduce_the_balance_due() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Ledger Rd").await;
    let order = app.seed_order(&office_id).await;
    let order_id = id_of(&order);

    app.call_ok(
        Method::POST,
        &format!("/api/v1/orders/{}/payments", order_id),
        Some(json!({ "amount": "25.00", "payment_type": "Check", "transaction_id": "1042" })),
        StatusCode::CREATED,
    )
    .await;

    let balance = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}/balance", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["payment_count"], 1);
    assert_eq!(decimal(&balance["balance_due"]), dec!(35));

    let rejected = app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{}/payments", order_id),
            Some(json!({ "amount": "0", "payment_type": "Cash" })),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn proof_approval_approves_the_typesetting_job() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Proof Pl").await;
    let work_order = app.seed_work_order(&office_id).await;

    let job = app
        .call_ok(
            Method::POST,
            "/api/v1/typesetting",
            Some(json!({
                "work_order_id": work_order["id"],
                "plate_direction": "head to head",
                "options": [{ "option": "Bleed", "selected": true }]
            })),
            StatusCode::CREATED,
        )
        .await;
    let job_id = id_of(&job);
    assert_eq!(job["status"], "InProgress");

    let proof = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/typesetting/{}/proofs", job_id),
            Some(json!({
                "proof_method": "PDF",
                "artwork": [{ "file_url": "/uploads/logo.pdf" }]
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(proof["proof_number"], 1);

    let waiting = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/typesetting/{}", job_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(waiting["status"], "WaitingApproval");

    let approved = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/typesetting-proofs/{}/approve", id_of(&proof)),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(approved["status"], "Approved");
    assert_eq!(approved["approved"], true);
    assert_eq!(approved["proofs"][0]["approved"], true);
    assert_eq!(approved["options"][0]["option"], "Bleed");
}
