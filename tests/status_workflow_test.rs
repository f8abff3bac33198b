//! Status changes over HTTP: any-to-any writes, rejected values and the audit trail.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use common::{decimal, id_of, response_json, TestApp};
use printshop_api::models::{
    OrderItemStatus, OrderStatus, StatusValue, StockStatus, WorkOrderItemStatus, WorkOrderStatus,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

const MONEY_FIELDS: &[&str] = &["total_cost", "total_amount", "deposit", "cost", "amount"];

/// Asserts that every field other than `status` and `updated_at` is unchanged.
fn assert_only_status_changed(before: &Value, after: &Value) {
    let before = before.as_object().expect("record object");
    let after = after.as_object().expect("record object");
    assert_eq!(
        before.keys().collect::<Vec<_>>(),
        after.keys().collect::<Vec<_>>()
    );
    for (key, old) in before {
        if key == "status" || key == "updated_at" {
            continue;
        }
        let new = &after[key];
        if MONEY_FIELDS.contains(&key.as_str()) && !old.is_null() {
            assert_eq!(decimal(old), decimal(new), "{} changed", key);
            continue;
        }
        let old_time = old.as_str().and_then(|s| s.parse::<DateTime<Utc>>().ok());
        let new_time = new.as_str().and_then(|s| s.parse::<DateTime<Utc>>().ok());
        match (old_time, new_time) {
            (Some(a), Some(b)) => assert_eq!(a, b, "{} changed", key),
            _ => assert_eq!(old, new, "{} changed", key),
        }
    }
}

/// Finds the status-bearing field of the record with `id` inside a response:
/// the record itself, an array of records, or a detail with an `items` list.
fn status_of(body: &Value, id: &str, field: &str) -> Value {
    if body["id"] == id {
        return body[field].clone();
    }
    let rows = body
        .as_array()
        .or_else(|| body["items"].as_array())
        .expect("record list");
    rows.iter()
        .find(|row| row["id"] == id)
        .map(|row| row[field].clone())
        .expect("record in list")
}

/// Writes every member forward then backward, starting from `current`, and
/// re-reads after each write. Returns how many writes changed the value.
async fn write_every_status<S: StatusValue>(
    app: &TestApp,
    mut current: S,
    status_uri: &str,
    read_uri: &str,
    id: &str,
    field: &str,
) -> usize {
    let sequence: Vec<S> = S::ALL.iter().chain(S::ALL.iter().rev()).copied().collect();
    let mut changes = 0;
    for status in sequence {
        let written = app
            .call_ok(
                Method::PUT,
                status_uri,
                Some(json!({ "status": status.to_string() })),
                StatusCode::OK,
            )
            .await;
        assert_eq!(
            status_of(&written, id, field),
            status.to_string(),
            "{} -> {}",
            current,
            status
        );

        let read = app.call_ok(Method::GET, read_uri, None, StatusCode::OK).await;
        assert_eq!(status_of(&read, id, field), status.to_string());

        if status != current {
            changes += 1;
        }
        current = status;
    }
    changes
}

async fn history_len(app: &TestApp, uri: &str) -> usize {
    app.call_ok(Method::GET, uri, None, StatusCode::OK)
        .await
        .as_array()
        .expect("history rows")
        .len()
}

async fn create_paper(app: &TestApp) -> Value {
    app.call_ok(
        Method::POST,
        "/api/v1/paper-products",
        Some(json!({
            "brand": "Mohawk",
            "paper_type": "Superfine",
            "size": "8.5x11",
            "weight_lb": 80
        })),
        StatusCode::CREATED,
    )
    .await
}

#[tokio::test]
async fn approving_a_work_order_changes_only_its_status() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Downtown").await;
    let created = app.seed_work_order(&office_id).await;
    let id = id_of(&created);
    assert_eq!(created["status"], "Pending");

    let updated = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/work-orders/{}/status", id),
            Some(json!({ "status": "Approved", "note": "customer signed off" })),
            StatusCode::OK,
        )
        .await;

    assert_eq!(updated["status"], "Approved");
    assert_only_status_changed(&created, &updated);
    assert_eq!(updated["version"], created["version"]);
    assert_eq!(decimal(&updated["total_amount"]), dec!(165));

    let reread = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/work-orders/{}", id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(reread["status"], "Approved");
    assert_eq!(reread["version"], created["version"]);

    let history = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/work-orders/{}/status-history", id),
            None,
            StatusCode::OK,
        )
        .await;
    let rows = history.as_array().expect("history rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["from_status"], "Pending");
    assert_eq!(rows[0]["to_status"], "Approved");
    assert_eq!(rows[0]["note"], "customer signed off");
    assert_eq!(rows[0]["changed_by_id"], app.admin_id.to_string());
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Uptown").await;
    let order = app.seed_order(&office_id).await;
    let id = id_of(&order);

    let response = app
        .call(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", id),
            Some(json!({ "status": "Teleported" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Teleported"));

    let history = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}/status-history", id),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(history.as_array().expect("rows").is_empty());
}

#[tokio::test]
async fn order_status_change_reports_email_outcome() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Mill Street").await;
    let order = app.seed_order(&office_id).await;

    let updated = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", id_of(&order)),
            Some(json!({ "status": "Completed", "send_email": true })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["status"], "Completed");
    // Without a SendGrid key the message is logged, which counts as sent.
    assert_eq!(updated["email_sent"], true);
}

#[tokio::test]
async fn item_status_moves_independently_of_its_order() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Riverside").await;
    let order = app.seed_order(&office_id).await;
    let order_id = id_of(&order);

    let items = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}/items", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    let item_id = id_of(&items[0]);

    let item = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/order-items/{}/status", item_id),
            Some(json!({ "status": "press" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(item["status"], "Press");

    let parent = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(parent["status"], "Pending");

    let history = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/order-items/{}/status-history", item_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(history[0]["to_status"], "Press");
}

#[tokio::test]
async fn work_order_and_its_items_accept_every_status_in_any_order() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Any Way").await;
    let work_order = app.seed_work_order(&office_id).await;
    let id = id_of(&work_order);
    let detail_uri = format!("/api/v1/work-orders/{}", id);

    let changes = write_every_status(
        &app,
        WorkOrderStatus::INITIAL,
        &format!("/api/v1/work-orders/{}/status", id),
        &detail_uri,
        &id,
        "status",
    )
    .await;
    let history_uri = format!("/api/v1/work-orders/{}/status-history", id);
    assert_eq!(history_len(&app, &history_uri).await, changes);

    let detail = app.call_ok(Method::GET, &detail_uri, None, StatusCode::OK).await;
    let item_id = id_of(&detail["items"][0]);
    let changes = write_every_status(
        &app,
        WorkOrderItemStatus::INITIAL,
        &format!("/api/v1/work-order-items/{}/status", item_id),
        &detail_uri,
        &item_id,
        "status",
    )
    .await;
    let history_uri = format!("/api/v1/work-order-items/{}/status-history", item_id);
    assert_eq!(history_len(&app, &history_uri).await, changes);
}

#[tokio::test]
async fn order_and_its_items_accept_every_status_in_any_order() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Back Track").await;
    let order = app.seed_order(&office_id).await;
    let id = id_of(&order);

    let changes = write_every_status(
        &app,
        OrderStatus::INITIAL,
        &format!("/api/v1/orders/{}/status", id),
        &format!("/api/v1/orders/{}", id),
        &id,
        "status",
    )
    .await;
    let history_uri = format!("/api/v1/orders/{}/status-history", id);
    assert_eq!(history_len(&app, &history_uri).await, changes);

    // PaymentReceived and Cancelled can both be left again.
    for status in ["PaymentReceived", "Pending", "Cancelled", "Shipped"] {
        let updated = app
            .call_ok(
                Method::PUT,
                &format!("/api/v1/orders/{}/status", id),
                Some(json!({ "status": status })),
                StatusCode::OK,
            )
            .await;
        assert_eq!(updated["status"], status);
    }

    let items_uri = format!("/api/v1/orders/{}/items", id);
    let items = app.call_ok(Method::GET, &items_uri, None, StatusCode::OK).await;
    let item_id = id_of(&items[0]);
    let changes = write_every_status(
        &app,
        OrderItemStatus::INITIAL,
        &format!("/api/v1/order-items/{}/status", item_id),
        &items_uri,
        &item_id,
        "status",
    )
    .await;
    let history_uri = format!("/api/v1/order-items/{}/status-history", item_id);
    assert_eq!(history_len(&app, &history_uri).await, changes);
}

#[tokio::test]
async fn stock_status_write_touches_nothing_else() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Paper Row").await;
    let work_order = app.seed_work_order(&office_id).await;
    let detail = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/work-orders/{}", id_of(&work_order)),
            None,
            StatusCode::OK,
        )
        .await;
    let item_id = id_of(&detail["items"][0]);
    let paper = create_paper(&app).await;

    let stock = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/work-order-items/{}/stock", item_id),
            Some(json!({
                "paper_product_id": paper["id"],
                "stock_qty": 2000,
                "supplier": "Lindenmeyr"
            })),
            StatusCode::CREATED,
        )
        .await;
    let stock_id = id_of(&stock);
    assert_eq!(stock["stock_status"], "Ordered");
    assert!(stock["received_date"].is_null());

    let received = app
        .call_ok(
            Method::PUT,
            &format!("/api/v1/work-order-item-stock/{}/status", stock_id),
            Some(json!({ "status": "Received" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(received["stock_status"], "Received");
    assert!(received["received_date"].is_null());

    let mut before = stock.clone();
    before["stock_status"] = received["stock_status"].clone();
    assert_only_status_changed(&before, &received);

    let changes = write_every_status(
        &app,
        StockStatus::Received,
        &format!("/api/v1/work-order-item-stock/{}/status", stock_id),
        &format!("/api/v1/work-order-item-stock/{}", stock_id),
        &stock_id,
        "stock_status",
    )
    .await;
    let history_uri = format!("/api/v1/work-order-item-stock/{}/status-history", stock_id);
    // The Received write above plus every change made by the sweep.
    assert_eq!(history_len(&app, &history_uri).await, changes + 1);
}

#[tokio::test]
async fn order_item_stock_accepts_every_status_in_any_order() {
    let app = TestApp::new().await;
    let office_id = app.seed_office("Stock Yard").await;
    let order = app.seed_order(&office_id).await;
    let items = app
        .call_ok(
            Method::GET,
            &format!("/api/v1/orders/{}/items", id_of(&order)),
            None,
            StatusCode::OK,
        )
        .await;
    let item_id = id_of(&items[0]);
    let paper = create_paper(&app).await;

    let stock = app
        .call_ok(
            Method::POST,
            &format!("/api/v1/order-items/{}/stock", item_id),
            Some(json!({ "paper_product_id": paper["id"], "stock_qty": 1000 })),
            StatusCode::CREATED,
        )
        .await;
    let stock_id = id_of(&stock);

    let changes = write_every_status(
        &app,
        StockStatus::INITIAL,
        &format!("/api/v1/order-item-stock/{}/status", stock_id),
        &format!("/api/v1/order-item-stock/{}", stock_id),
        &stock_id,
        "stock_status",
    )
    .await;
    let history_uri = format!("/api/v1/order-item-stock/{}/status-history", stock_id);
    assert_eq!(history_len(&app, &history_uri).await, changes);
}
