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
    entities::{address, office},
    errors::ServiceError,
    services::{
        addresses::{CreateAddressRequest, UpdateAddressRequest},
        offices::{CreateOfficeRequest, OfficeDetail, UpdateOfficeRequest},
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Office listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct OfficeQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub company_id: Option<Uuid>,
    pub search: Option<String>,
}

pub fn office_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/offices", get(list_offices))
        .route("/offices/walk-in", get(walk_in_office))
        .route("/offices/:id", get(get_office))
        .route("/offices/:id/addresses", get(list_addresses))
        .with_permission(perm::OFFICES_READ);

    let manage = Router::new()
        .route("/offices", post(create_office))
        .route("/offices/:id", put(update_office).delete(delete_office))
        .route("/offices/:id/addresses", post(create_address))
        .route("/addresses/:id", put(update_address).delete(delete_address))
        .with_permission(perm::OFFICES_MANAGE);

    read.merge(manage)
}

/// Create an office under a company
#[utoipa::path(
    post,
    path = "/api/v1/offices",
    request_body = CreateOfficeRequest,
    responses(
        (status = 201, description = "Office created", body = office::Model),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "QuickBooks customer already linked", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn create_office(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateOfficeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let office = state
        .services
        .offices
        .create_office(request, actor(&auth_user))
        .await?;
    Ok(created(office))
}

/// Get an office with its company and addresses
#[utoipa::path(
    get,
    path = "/api/v1/offices/{id}",
    params(("id" = Uuid, Path, description = "Office id")),
    responses(
        (status = 200, description = "Office found", body = OfficeDetail),
        (status = 404, description = "Office not found", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn get_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OfficeDetail>>, ServiceError> {
    Ok(ok(state.services.offices.get_office(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/offices",
    params(OfficeQuery),
    responses((status = 200, description = "One page of offices")),
    tag = "offices"
)]
pub async fn list_offices(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<office::Model>>>, ServiceError> {
    let page = state
        .services
        .offices
        .list_offices(query.company_id, query.search, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

/// The office counter sales are filed under
#[utoipa::path(
    get,
    path = "/api/v1/offices/walk-in",
    responses(
        (status = 200, description = "Walk-in office", body = office::Model),
        (status = 404, description = "No walk-in office configured", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn walk_in_office(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<office::Model>>, ServiceError> {
    Ok(ok(state.services.offices.walk_in_office().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/offices/{id}",
    params(("id" = Uuid, Path, description = "Office id")),
    request_body = UpdateOfficeRequest,
    responses(
        (status = 200, description = "Office updated", body = office::Model),
        (status = 404, description = "Office not found", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn update_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOfficeRequest>,
) -> Result<Json<ApiResponse<office::Model>>, ServiceError> {
    Ok(ok(state.services.offices.update_office(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/offices/{id}",
    params(("id" = Uuid, Path, description = "Office id")),
    responses(
        (status = 204, description = "Office deleted"),
        (status = 409, description = "Office still referenced by jobs", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn delete_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.offices.delete_office(id).await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/api/v1/offices/{id}/addresses",
    params(("id" = Uuid, Path, description = "Office id")),
    responses((status = 200, description = "Addresses of the office", body = Vec<address::Model>)),
    tag = "offices"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(office_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<address::Model>>>, ServiceError> {
    Ok(ok(state.services.addresses.list_for_office(office_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/offices/{id}/addresses",
    params(("id" = Uuid, Path, description = "Office id")),
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = address::Model),
        (status = 404, description = "Office not found", body = crate::errors::ErrorResponse),
    ),
    tag = "offices"
)]
pub async fn create_address(
    State(state): State<AppState>,
    Path(office_id): Path<Uuid>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let address = state
        .services
        .addresses
        .create_address(office_id, request)
        .await?;
    Ok(created(address))
}

#[utoipa::path(
    put,
    path = "/api/v1/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address id")),
    request_body = UpdateAddressRequest,
    responses((status = 200, description = "Address updated", body = address::Model)),
    tag = "offices"
)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAddressRequest>,
) -> Result<Json<ApiResponse<address::Model>>, ServiceError> {
    Ok(ok(state.services.addresses.update_address(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address id")),
    responses((status = 204, description = "Address deleted")),
    tag = "offices"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.addresses.delete_address(id).await?;
    Ok(no_content())
}
