use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{actor, created, no_content, ok};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::order_payment,
    errors::ServiceError,
    services::payments::{CreatePaymentRequest, OrderBalance},
    ApiResponse, AppState,
};

/// Creates the router for payment endpoints
pub fn payment_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/orders/:id/payments", get(list_payments))
        .route("/orders/:id/balance", get(order_balance))
        .with_permission(perm::PAYMENTS_READ);

    let manage = Router::new()
        .route("/orders/:id/payments", post(create_payment))
        .route("/payments/:id", delete(delete_payment))
        .with_permission(perm::PAYMENTS_MANAGE);

    read.merge(manage)
}

/// Record a payment against an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = order_payment::Model),
        (status = 400, description = "Invalid amount", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = state
        .services
        .payments
        .create_payment(order_id, request, actor(&auth_user))
        .await?;
    Ok(created(payment))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Payments by date", body = Vec<order_payment::Model>)),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<order_payment::Model>>>, ServiceError> {
    Ok(ok(state.services.payments.list_payments(order_id).await?))
}

/// Total, deposit, payments and balance due for an order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/balance",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Balance summary", body = OrderBalance)),
    tag = "payments"
)]
pub async fn order_balance(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderBalance>>, ServiceError> {
    Ok(ok(state.services.payments.order_balance(order_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payments.delete_payment(id).await?;
    Ok(no_content())
}
