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
    entities::invoice,
    errors::ServiceError,
    models::QuickbooksSyncStatus,
    services::invoices::{
        CreateInvoiceRequest, InvoiceDetail, InvoiceFilter, InvoiceStatusRequest,
        SendInvoiceEmailRequest,
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Invoice listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct InvoiceQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    /// Billing status, e.g. `Draft` or `Paid`
    pub status: Option<String>,
    #[param(value_type = Option<String>)]
    pub sync_status: Option<QuickbooksSyncStatus>,
}

pub fn invoice_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices/:id", get(get_invoice))
        .route("/orders/:id/invoice", get(get_order_invoice))
        .with_permission(perm::INVOICES_READ);

    let manage = Router::new()
        .route("/invoices", post(create_invoice))
        .route("/invoices/:id", axum::routing::delete(delete_invoice))
        .route("/invoices/:id/status", put(update_invoice_status))
        .route("/invoices/:id/email", post(send_invoice_email))
        .with_permission(perm::INVOICES_MANAGE);

    let sync = Router::new()
        .route("/invoices/:id/quickbooks", post(push_to_quickbooks))
        .with_permission(perm::INVOICES_MANAGE)
        .with_permission(perm::QUICKBOOKS_MANAGE);

    read.merge(manage).merge(sync)
}

/// Invoice an order, optionally pushing it to QuickBooks
///
/// The invoice is kept even when the QuickBooks push fails; its
/// `quickbooks_sync_status` reports the outcome.
#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceDetail),
        (status = 400, description = "Order has no items", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already invoiced", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state
        .services
        .invoices
        .create_invoice(request, actor(&auth_user))
        .await?;
    Ok(created(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with items", body = InvoiceDetail),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceDetail>>, ServiceError> {
    Ok(ok(state.services.invoices.get_invoice(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/invoice",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Invoice for the order", body = InvoiceDetail),
        (status = 404, description = "Order not invoiced", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn get_order_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceDetail>>, ServiceError> {
    Ok(ok(state.services.invoices.get_for_order(order_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(InvoiceQuery),
    responses((status = 200, description = "One page of invoices")),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<invoice::Model>>>, ServiceError> {
    let filter = InvoiceFilter {
        status: query.status,
        sync_status: query.sync_status,
    };
    let page = state
        .services
        .invoices
        .list_invoices(filter, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}/status",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoiceStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = invoice::Model),
        (status = 400, description = "Unknown status or invoice cancelled", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InvoiceStatusRequest>,
) -> Result<Json<ApiResponse<invoice::Model>>, ServiceError> {
    Ok(ok(state.services.invoices.update_status(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 409, description = "Invoice already in QuickBooks", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.invoices.delete_invoice(id).await?;
    Ok(no_content())
}

/// Push one invoice to QuickBooks with the caller's connection
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/quickbooks",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Sync attempted; see quickbooks_sync_status", body = invoice::Model),
        (status = 401, description = "QuickBooks not connected", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn push_to_quickbooks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<invoice::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .invoices
        .push_to_quickbooks(id, auth_user.user_id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/email",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = SendInvoiceEmailRequest,
    responses(
        (status = 200, description = "Invoice emailed", body = invoice::Model),
        (status = 400, description = "No recipient", body = crate::errors::ErrorResponse),
        (status = 502, description = "Email provider failed", body = crate::errors::ErrorResponse),
    ),
    tag = "invoices"
)]
pub async fn send_invoice_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendInvoiceEmailRequest>,
) -> Result<Json<ApiResponse<invoice::Model>>, ServiceError> {
    Ok(ok(state.services.invoices.send_email(id, request).await?))
}
