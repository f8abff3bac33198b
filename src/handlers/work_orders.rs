use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{actor, created, no_content, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::{order, status_transition, work_order, work_order_item, work_order_note},
    errors::ServiceError,
    services::{
        inputs::{LineItemInput, NoteRequest, UpdateLineItemRequest},
        status::{TrackedEntity, UpdateStatusRequest},
        work_orders::{
            CreateWorkOrderRequest, UpdateWorkOrderRequest, WorkOrderDetail, WorkOrderFilter,
        },
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Work order listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct WorkOrderQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub office_id: Option<Uuid>,
    /// Status label, e.g. `Pending` or `Approved`
    pub status: Option<String>,
}

/// Creates the router for work order endpoints
pub fn work_order_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/work-orders", get(list_work_orders))
        .route("/work-orders/by-number/:number", get(get_work_order_by_number))
        .route("/work-orders/:id", get(get_work_order))
        .route("/work-orders/:id/status-history", get(work_order_status_history))
        .route("/work-orders/:id/notes", get(list_notes))
        .route("/work-order-items/:item_id/status-history", get(item_status_history))
        .with_permission(perm::WORKORDERS_READ);

    let create = Router::new()
        .route("/work-orders", post(create_work_order))
        .with_permission(perm::WORKORDERS_CREATE);

    let update = Router::new()
        .route("/work-orders/:id", put(update_work_order))
        .route("/work-orders/:id/status", put(update_work_order_status))
        .route("/work-orders/:id/notes", post(add_note))
        .route("/work-orders/:id/items", post(add_item))
        .route(
            "/work-order-items/:item_id",
            put(update_item).delete(delete_item),
        )
        .route("/work-order-items/:item_id/status", put(update_item_status))
        .with_permission(perm::WORKORDERS_UPDATE);

    let delete = Router::new()
        .route("/work-orders/:id", axum::routing::delete(delete_work_order))
        .with_permission(perm::WORKORDERS_DELETE);

    // Promotion writes an order, so it needs both grants.
    let convert = Router::new()
        .route("/work-orders/:id/convert", post(convert_to_order))
        .with_permission(perm::ORDERS_CREATE)
        .with_permission(perm::WORKORDERS_UPDATE);

    read.merge(create).merge(update).merge(delete).merge(convert)
}

/// Create a new work order
#[utoipa::path(
    post,
    path = "/api/v1/work-orders",
    request_body = CreateWorkOrderRequest,
    responses(
        (status = 201, description = "Work order created", body = work_order::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Office not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn create_work_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateWorkOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let work_order = state
        .services
        .work_orders
        .create_work_order(request, actor(&auth_user))
        .await?;
    Ok(created(work_order))
}

/// Get a work order with its items, notes, typesetting and shipping
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Work order found", body = WorkOrderDetail),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WorkOrderDetail>>, ServiceError> {
    Ok(ok(state.services.work_orders.get_work_order(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-orders/by-number/{number}",
    params(("number" = i32, Path, description = "Work order number")),
    responses(
        (status = 200, description = "Work order found", body = WorkOrderDetail),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn get_work_order_by_number(
    State(state): State<AppState>,
    Path(number): Path<i32>,
) -> Result<Json<ApiResponse<WorkOrderDetail>>, ServiceError> {
    Ok(ok(state.services.work_orders.get_by_number(number).await?))
}

/// List work orders, newest number first
#[utoipa::path(
    get,
    path = "/api/v1/work-orders",
    params(WorkOrderQuery),
    responses(
        (status = 200, description = "One page of work orders"),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(query): Query<WorkOrderQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<work_order::Model>>>, ServiceError> {
    let filter = WorkOrderFilter {
        office_id: query.office_id,
        status: query.status,
    };
    let page = state
        .services
        .work_orders
        .list_work_orders(filter, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = UpdateWorkOrderRequest,
    responses(
        (status = 200, description = "Work order updated", body = work_order::Model),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkOrderRequest>,
) -> Result<Json<ApiResponse<work_order::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .work_orders
        .update_work_order(id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work-orders/{id}",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 204, description = "Work order deleted"),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Work order already converted", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.work_orders.delete_work_order(id).await?;
    Ok(no_content())
}

/// Move a work order to a new status
#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}/status",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = work_order::Model),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn update_work_order_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<work_order::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .work_orders
        .update_status(id, request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}/status-history",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "work-orders"
)]
pub async fn work_order_status_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::WorkOrder, id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-orders/{id}/notes",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = NoteRequest,
    responses((status = 201, description = "Note added", body = work_order_note::Model)),
    tag = "work-orders"
)]
pub async fn add_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<NoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let note = state
        .services
        .work_orders
        .add_note(id, request, actor(&auth_user))
        .await?;
    Ok(created(note))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}/notes",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses((status = 200, description = "Notes, oldest first", body = Vec<work_order_note::Model>)),
    tag = "work-orders"
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<work_order_note::Model>>>, ServiceError> {
    Ok(ok(state.services.work_orders.list_notes(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-orders/{id}/items",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = LineItemInput,
    responses((status = 201, description = "Item added", body = work_order_item::Model)),
    tag = "work-orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(line): Json<LineItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .work_orders
        .add_item(id, line, actor(&auth_user))
        .await?;
    Ok(created(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/work-order-items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    request_body = UpdateLineItemRequest,
    responses((status = 200, description = "Item updated", body = work_order_item::Model)),
    tag = "work-orders"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateLineItemRequest>,
) -> Result<Json<ApiResponse<work_order_item::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .work_orders
        .update_item(item_id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work-order-items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    responses((status = 204, description = "Item deleted")),
    tag = "work-orders"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.work_orders.delete_item(item_id).await?;
    Ok(no_content())
}

#[utoipa::path(
    put,
    path = "/api/v1/work-order-items/{item_id}/status",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = work_order_item::Model),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn update_item_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<work_order_item::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .work_orders
        .update_item_status(item_id, request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-order-items/{item_id}/status-history",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "work-orders"
)]
pub async fn item_status_history(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::WorkOrderItem, item_id)
        .await?))
}

/// Promote a work order into an order
#[utoipa::path(
    post,
    path = "/api/v1/work-orders/{id}/convert",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 201, description = "Order created from the work order", body = order::Model),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Work order already converted", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn convert_to_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .work_orders
        .convert_to_order(id, actor(&auth_user))
        .await?;
    Ok(created(order))
}
