use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, no_content, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt},
    entities::paper_product,
    errors::ServiceError,
    services::paper_products::{CreatePaperProductRequest, UpdatePaperProductRequest},
    ApiResponse, AppState, ListQuery, PaginatedResponse,
};

pub fn paper_product_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/paper-products", get(list_paper_products))
        .route("/paper-products/:id", get(get_paper_product))
        .with_permission(perm::PAPER_READ);

    let manage = Router::new()
        .route("/paper-products", post(create_paper_product))
        .route(
            "/paper-products/:id",
            put(update_paper_product).delete(delete_paper_product),
        )
        .with_permission(perm::PAPER_MANAGE);

    read.merge(manage)
}

#[utoipa::path(
    post,
    path = "/api/v1/paper-products",
    request_body = CreatePaperProductRequest,
    responses(
        (status = 201, description = "Paper product created", body = paper_product::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    tag = "paper-products"
)]
pub async fn create_paper_product(
    State(state): State<AppState>,
    Json(request): Json<CreatePaperProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .paper_products
        .create_paper_product(request)
        .await?;
    Ok(created(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/paper-products/{id}",
    params(("id" = Uuid, Path, description = "Paper product id")),
    responses(
        (status = 200, description = "Paper product found", body = paper_product::Model),
        (status = 404, description = "Paper product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "paper-products"
)]
pub async fn get_paper_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<paper_product::Model>>, ServiceError> {
    Ok(ok(state.services.paper_products.get_paper_product(id).await?))
}

/// List paper stock, searching brand, type and size
#[utoipa::path(
    get,
    path = "/api/v1/paper-products",
    params(ListQuery),
    responses((status = 200, description = "One page of paper products")),
    tag = "paper-products"
)]
pub async fn list_paper_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<paper_product::Model>>>, ServiceError> {
    let page = state
        .services
        .paper_products
        .list_paper_products(query.search, query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/paper-products/{id}",
    params(("id" = Uuid, Path, description = "Paper product id")),
    request_body = UpdatePaperProductRequest,
    responses((status = 200, description = "Paper product updated", body = paper_product::Model)),
    tag = "paper-products"
)]
pub async fn update_paper_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaperProductRequest>,
) -> Result<Json<ApiResponse<paper_product::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .paper_products
        .update_paper_product(id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/paper-products/{id}",
    params(("id" = Uuid, Path, description = "Paper product id")),
    responses(
        (status = 204, description = "Paper product deleted"),
        (status = 409, description = "Paper product referenced by stock", body = crate::errors::ErrorResponse),
    ),
    tag = "paper-products"
)]
pub async fn delete_paper_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.paper_products.delete_paper_product(id).await?;
    Ok(no_content())
}
