use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{actor, created, no_content, ok};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::{order_item_stock, status_transition, work_order_item_stock},
    errors::ServiceError,
    services::{
        status::{TrackedEntity, UpdateStatusRequest},
        stocks::{CreateStockRequest, UpdateStockRequest},
    },
    ApiResponse, AppState,
};

/// Paper stock ordered against order items and work order items.
pub fn stock_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/order-items/:item_id/stock", get(list_order_item_stock))
        .route("/order-item-stock/:id", get(get_order_item_stock))
        .route(
            "/order-item-stock/:id/status-history",
            get(order_item_stock_history),
        )
        .route(
            "/work-order-items/:item_id/stock",
            get(list_work_order_item_stock),
        )
        .route("/work-order-item-stock/:id", get(get_work_order_item_stock))
        .route(
            "/work-order-item-stock/:id/status-history",
            get(work_order_item_stock_history),
        )
        .with_permission(perm::STOCK_READ);

    let manage = Router::new()
        .route("/order-items/:item_id/stock", post(create_order_item_stock))
        .route(
            "/order-item-stock/:id",
            put(update_order_item_stock).delete(delete_order_item_stock),
        )
        .route(
            "/order-item-stock/:id/status",
            put(update_order_item_stock_status),
        )
        .route(
            "/work-order-items/:item_id/stock",
            post(create_work_order_item_stock),
        )
        .route(
            "/work-order-item-stock/:id",
            put(update_work_order_item_stock).delete(delete_work_order_item_stock),
        )
        .route(
            "/work-order-item-stock/:id/status",
            put(update_work_order_item_stock_status),
        )
        .with_permission(perm::STOCK_MANAGE);

    read.merge(manage)
}

// Order item stock

#[utoipa::path(
    post,
    path = "/api/v1/order-items/{item_id}/stock",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "Stock ordered", body = order_item_stock::Model),
        (status = 404, description = "Order item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn create_order_item_stock(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<CreateStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let stock = state
        .services
        .stocks
        .create_order_item_stock(item_id, request, actor(&auth_user))
        .await?;
    Ok(created(stock))
}

#[utoipa::path(
    get,
    path = "/api/v1/order-items/{item_id}/stock",
    params(("item_id" = Uuid, Path, description = "Order item id")),
    responses((status = 200, description = "Stock for the item", body = Vec<order_item_stock::Model>)),
    tag = "stock"
)]
pub async fn list_order_item_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<order_item_stock::Model>>>, ServiceError> {
    Ok(ok(state.services.stocks.list_order_item_stocks(item_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses(
        (status = 200, description = "Stock found", body = order_item_stock::Model),
        (status = 404, description = "Stock not found", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn get_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<order_item_stock::Model>>, ServiceError> {
    Ok(ok(state.services.stocks.find_order_item_stock(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    request_body = UpdateStockRequest,
    responses((status = 200, description = "Stock updated", body = order_item_stock::Model)),
    tag = "stock"
)]
pub async fn update_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStockRequest>,
) -> Result<Json<ApiResponse<order_item_stock::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .stocks
        .update_order_item_stock(id, request)
        .await?))
}

/// Move order item stock along Ordered → Received
#[utoipa::path(
    put,
    path = "/api/v1/order-item-stock/{id}/status",
    params(("id" = Uuid, Path, description = "Stock id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = order_item_stock::Model),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn update_order_item_stock_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<order_item_stock::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .stocks
        .update_order_item_stock_status(id, request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/order-item-stock/{id}/status-history",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "stock"
)]
pub async fn order_item_stock_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::OrderItemStock, id)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses((status = 204, description = "Stock deleted")),
    tag = "stock"
)]
pub async fn delete_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.stocks.delete_order_item_stock(id).await?;
    Ok(no_content())
}

// Work order item stock

#[utoipa::path(
    post,
    path = "/api/v1/work-order-items/{item_id}/stock",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "Stock ordered", body = work_order_item_stock::Model),
        (status = 404, description = "Work order item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn create_work_order_item_stock(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<CreateStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let stock = state
        .services
        .stocks
        .create_work_order_item_stock(item_id, request, actor(&auth_user))
        .await?;
    Ok(created(stock))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-order-items/{item_id}/stock",
    params(("item_id" = Uuid, Path, description = "Work order item id")),
    responses((status = 200, description = "Stock for the item", body = Vec<work_order_item_stock::Model>)),
    tag = "stock"
)]
pub async fn list_work_order_item_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<work_order_item_stock::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .stocks
        .list_work_order_item_stocks(item_id)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses(
        (status = 200, description = "Stock found", body = work_order_item_stock::Model),
        (status = 404, description = "Stock not found", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn get_work_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<work_order_item_stock::Model>>, ServiceError> {
    Ok(ok(state.services.stocks.find_work_order_item_stock(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/work-order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    request_body = UpdateStockRequest,
    responses((status = 200, description = "Stock updated", body = work_order_item_stock::Model)),
    tag = "stock"
)]
pub async fn update_work_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStockRequest>,
) -> Result<Json<ApiResponse<work_order_item_stock::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .stocks
        .update_work_order_item_stock(id, request)
        .await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/work-order-item-stock/{id}/status",
    params(("id" = Uuid, Path, description = "Stock id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = work_order_item_stock::Model),
        (status = 400, description = "Unknown status or transition not allowed", body = crate::errors::ErrorResponse),
    ),
    tag = "stock"
)]
pub async fn update_work_order_item_stock_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<work_order_item_stock::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .stocks
        .update_work_order_item_stock_status(id, request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-order-item-stock/{id}/status-history",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses((status = 200, description = "Transitions, oldest first", body = Vec<status_transition::Model>)),
    tag = "stock"
)]
pub async fn work_order_item_stock_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<status_transition::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .status_history
        .history(TrackedEntity::WorkOrderItemStock, id)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work-order-item-stock/{id}",
    params(("id" = Uuid, Path, description = "Stock id")),
    responses((status = 204, description = "Stock deleted")),
    tag = "stock"
)]
pub async fn delete_work_order_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.stocks.delete_work_order_item_stock(id).await?;
    Ok(no_content())
}
