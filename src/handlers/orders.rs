use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{actor, created, no_content, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::{order, order_item, order_note, status_transition},
    errors::ServiceError,
    services::{
        inputs::{LineItemInput, NoteRequest, UpdateLineItemRequest},
        orders::{CreateOrderRequest, OrderDetail, OrderFilter, UpdateOrderRequest},
        status::{TrackedEntity, UpdateStatusRequest},
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Order listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub office_id: Option<Uuid>,
    /// Status label, e.g. `Pending` or `Shipped`
    pub status: Option<String>,
}

/// Result of an order status change
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusResponse {
    #[serde(flatten)]
    pub order: order::Model,
    /// Whether the status email went out. False when not requested.
    pub email_sent: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmationSent {
    pub order_id: Uuid,
    pub to: String,
}

/// Creates the router for order endpoints
pub fn order_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/by-number/:number", get(get_order_by_number))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status-history", get(order_status_history))
        .route("/orders/:id/notes", get(list_notes))
        .route("/orders/:id/items", get(list_items))
        .route("/order-items/:item_id/status-history", get(item_status_history))
        .with_permission(perm::ORDERS_READ);

    let create = Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id/duplicate", post(duplicate_order))
        .with_permission(perm::ORDERS_CREATE);

    let update = Router::new()
        .route("/orders/:id", put(update_order))
        .route("/orders/:id/status", put(update_order_status))
        .route("/orders/:id/notes", post(add_note))
        .route("/orders/:id/items", post(add_item))
        .route("/orders/:id/send-confirmation", post(send_confirmation))
        .route("/order-items/:item_id", put(update_item).delete(delete_item))
        .route("/order-items/:item_id/status", put(update_item_status))
        .with_permission(perm::ORDERS_UPDATE);

    let delete = Router::new()
        .route("/orders/:id", axum::routing::delete(delete_order))
        .with_permission(perm::ORDERS_DELETE);

    read.merge(create).merge(update).merge(delete)
}

/// Address for customer-facing order mail: the order contact, else the office.
async fn order_recipient(state: &AppState, order: &order::Model) -> Result<Option<String>, ServiceError> {
    if let Some(email) = order.contact_email.clone().filter(|e| !e.trim().is_empty()) {
        return Ok(Some(email));
    }
    let office = state.services.offices.find_office(order.office_id).await?;
    Ok(office.email.filter(|e| !e.trim().is_empty()))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = order::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Office not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .create_order(request, actor(&auth_user))
        .await?;
    Ok(created(order))
}

/// Get an order with items, notes, payments, invoice and shipping
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderDetail),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetail>>, ServiceError> {
    Ok(ok(state.services.orders.get_order(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/by-number/{number}",
    params(("number" = i32, Path, description = "Order number")),
    responses(
        (status = 200, description = "Order found", body = OrderDetail),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(number): Path<i32>,
) -> Result<Json<ApiResponse<OrderDetail>>, ServiceError> {
    Ok(ok(state.services.orders.get_by_number(number).await?))
}

/// List orders with pagination
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "One page of orders"),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<order::Model>>>, ServiceError> {
    let filter = OrderFilter {
        office_id: query.office_id,
        status: query.status,
    };
    let page = state
        .services
        .orders
        .list_orders(filter, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = order::Model),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    Ok(ok(state.services.orders.update_order(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order is still referenced", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_order(id).await?;
    Ok(no_content())
}

/// Update order status, optionally mailing the customer
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderStatusResponse),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderStatusResponse>>, ServiceError> {
    let send_email = request.send_email;
    let order = state
        .services
        .orders
        .update_status(id, request, actor(&auth_user))
        .await?;

    let mut email_sent = false;
    if send_email {
        match order_recipient(&state, &order).await {
            Ok(Some(to)) => {
                match state
                    .services
                    .email
                    .send_order_status(&to, order.order_number, &order.status.to_string())
                    .await
                {
                    Ok(()) => email_sent = true,
                    Err(e) => error!(order_id = %id, error = %e, "Order status email failed"),
                }
            }
            Ok(None) => warn!(order_id = %id, "No recipient for order status email"),
            Err(e) => error!(order_id = %id, error = %e, "Could not resolve order status recipient"),
        }
    }

    Ok(ok(OrderStatusResponse { order, email_sent }))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/status-history",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "orders"
)]
pub async fn order_status_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::Order, id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/notes",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = NoteRequest,
    responses((status = 201, description = "Note added", body = order_note::Model)),
    tag = "orders"
)]
pub async fn add_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<NoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let note = state
        .services
        .orders
        .add_note(id, request, actor(&auth_user))
        .await?;
    Ok(created(note))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/notes",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Notes, oldest first", body = Vec<order_note::Model>)),
    tag = "orders"
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<order_note::Model>>>, ServiceError> {
    Ok(ok(state.services.orders.list_notes(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Order items", body = Vec<order_item::Model>)),
    tag = "orders"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<order_item::Model>>>, ServiceError> {
    state.services.orders.find_order(id).await?;
    Ok(ok(state.services.orders.list_items(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = LineItemInput,
    responses((status = 201, description = "Item added", body = order_item::Model)),
    tag = "orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(line): Json<LineItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .orders
        .add_item(id, line, actor(&auth_user))
        .await?;
    Ok(created(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/order-items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    request_body = UpdateLineItemRequest,
    responses((status = 200, description = "Item updated", body = order_item::Model)),
    tag = "orders"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateLineItemRequest>,
) -> Result<Json<ApiResponse<order_item::Model>>, ServiceError> {
    Ok(ok(state.services.orders.update_item(item_id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order-items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    responses((status = 204, description = "Item deleted")),
    tag = "orders"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_item(item_id).await?;
    Ok(no_content())
}

#[utoipa::path(
    put,
    path = "/api/v1/order-items/{item_id}/status",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = order_item::Model),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_item_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<order_item::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .orders
        .update_item_status(item_id, request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/order-items/{item_id}/status-history",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "orders"
)]
pub async fn item_status_history(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::OrderItem, item_id)
        .await?))
}

/// Copy an order and its items into a new Pending order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/duplicate",
    params(("id" = Uuid, Path, description = "Source order id")),
    responses(
        (status = 201, description = "Duplicate created", body = OrderDetail),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn duplicate_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state
        .services
        .orders
        .duplicate_order(id, actor(&auth_user))
        .await?;
    Ok(created(detail))
}

/// Mail the order confirmation to the customer
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/send-confirmation",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Confirmation sent", body = ConfirmationSent),
        (status = 400, description = "No recipient on file", body = crate::errors::ErrorResponse),
        (status = 502, description = "Email provider failed", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn send_confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ConfirmationSent>>, ServiceError> {
    let detail = state.services.orders.get_order(id).await?;
    let to = order_recipient(&state, &detail.order).await?.ok_or_else(|| {
        ServiceError::ValidationError("Order has no contact or office email".to_string())
    })?;

    let payload = serde_json::to_value(&detail)
        .map_err(|e| ServiceError::InternalError(format!("Could not render order: {}", e)))?;
    state
        .services
        .email
        .send_order_confirmation(&to, detail.order.order_number, payload)
        .await?;

    info!(order_id = %id, "Order confirmation sent");
    Ok(ok(ConfirmationSent { order_id: id, to }))
}
