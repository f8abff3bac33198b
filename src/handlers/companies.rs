use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, no_content, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt},
    entities::company,
    errors::ServiceError,
    services::companies::{CompanyDetail, CreateCompanyRequest, UpdateCompanyRequest},
    ApiResponse, AppState, ListQuery, PaginatedResponse,
};

pub fn company_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/companies", get(list_companies))
        .route("/companies/:id", get(get_company))
        .with_permission(perm::COMPANIES_READ);

    let manage = Router::new()
        .route("/companies", axum::routing::post(create_company))
        .route(
            "/companies/:id",
            axum::routing::put(update_company).delete(delete_company),
        )
        .with_permission(perm::COMPANIES_MANAGE);

    read.merge(manage)
}

/// Create a company
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = company::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "QuickBooks id already linked", body = crate::errors::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let company = state.services.companies.create_company(request).await?;
    Ok(created(company))
}

/// Get a company with its offices
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company found", body = CompanyDetail),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompanyDetail>>, ServiceError> {
    Ok(ok(state.services.companies.get_company(id).await?))
}

/// List companies, optionally searching by name
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(ListQuery),
    responses((status = 200, description = "One page of companies")),
    tag = "companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<company::Model>>>, ServiceError> {
    let page = state
        .services
        .companies
        .list_companies(query.search, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = company::Model),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "QuickBooks id already linked", body = crate::errors::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompanyRequest>,
) -> Result<Json<ApiResponse<company::Model>>, ServiceError> {
    Ok(ok(state.services.companies.update_company(id, request).await?))
}

/// Delete a company
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 409, description = "Company still has offices", body = crate::errors::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    state.services.companies.delete_company(id).await?;
    Ok(no_content())
}
