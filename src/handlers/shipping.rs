use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{actor, no_content, ok};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::shipping_info,
    errors::ServiceError,
    services::shipping::{ShippingInfoRequest, ShippingParent},
    ApiResponse, AppState,
};

pub fn shipping_routes() -> Router<AppState> {
    let work_order_read = Router::new()
        .route("/work-orders/:id/shipping", get(get_work_order_shipping))
        .with_permission(perm::WORKORDERS_READ);
    let work_order_write = Router::new()
        .route("/work-orders/:id/shipping", put(upsert_work_order_shipping))
        .with_permission(perm::WORKORDERS_UPDATE);

    let order_read = Router::new()
        .route("/orders/:id/shipping", get(get_order_shipping))
        .with_permission(perm::ORDERS_READ);
    let order_write = Router::new()
        .route("/orders/:id/shipping", put(upsert_order_shipping))
        .route("/shipping/:id", delete(delete_shipping))
        .with_permission(perm::ORDERS_UPDATE);

    work_order_read
        .merge(work_order_write)
        .merge(order_read)
        .merge(order_write)
}

async fn shipping_for(
    state: &AppState,
    parent: ShippingParent,
) -> Result<Json<ApiResponse<shipping_info::Model>>, ServiceError> {
    let info = state
        .services
        .shipping
        .get_for(parent)
        .await?
        .ok_or_else(|| ServiceError::NotFound("No shipping information recorded".to_string()))?;
    Ok(ok(info))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}/shipping",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Shipping information", body = shipping_info::Model),
        (status = 404, description = "Nothing recorded", body = crate::errors::ErrorResponse),
    ),
    tag = "shipping"
)]
pub async fn get_work_order_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<shipping_info::Model>>, ServiceError> {
    shipping_for(&state, ShippingParent::WorkOrder(id)).await
}

/// Record or replace how a work order ships
#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}/shipping",
    params(("id" = Uuid, Path, description = "Work order id")),
    request_body = ShippingInfoRequest,
    responses(
        (status = 200, description = "Shipping information saved", body = shipping_info::Model),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "shipping"
)]
pub async fn upsert_work_order_shipping(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ShippingInfoRequest>,
) -> Result<Json<ApiResponse<shipping_info::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .shipping
        .upsert(ShippingParent::WorkOrder(id), request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/shipping",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Shipping information", body = shipping_info::Model),
        (status = 404, description = "Nothing recorded", body = crate::errors::ErrorResponse),
    ),
    tag = "shipping"
)]
pub async fn get_order_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<shipping_info::Model>>, ServiceError> {
    shipping_for(&state, ShippingParent::Order(id)).await
}

/// Record or replace how an order ships
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/shipping",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = ShippingInfoRequest,
    responses(
        (status = 200, description = "Shipping information saved", body = shipping_info::Model),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "shipping"
)]
pub async fn upsert_order_shipping(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ShippingInfoRequest>,
) -> Result<Json<ApiResponse<shipping_info::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .shipping
        .upsert(ShippingParent::Order(id), request, actor(&auth_user))
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shipping/{id}",
    params(("id" = Uuid, Path, description = "Shipping information id")),
    responses((status = 204, description = "Shipping information deleted")),
    tag = "shipping"
)]
pub async fn delete_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.shipping.delete(id).await?;
    Ok(no_content())
}
