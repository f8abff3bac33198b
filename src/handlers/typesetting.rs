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
    entities::{typesetting, typesetting_option, typesetting_proof_artwork},
    errors::ServiceError,
    services::typesetting::{
        ArtworkRequest, CreateProofRequest, CreateTypesettingRequest, OptionRequest, ProofDetail,
        TypesettingDetail, TypesettingParent, UpdateOptionRequest, UpdateTypesettingRequest,
    },
    ApiResponse, AppState,
};

pub fn typesetting_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/typesetting/:id", get(get_typesetting))
        .route("/work-orders/:id/typesetting", get(list_for_work_order))
        .route("/orders/:id/typesetting", get(list_for_order))
        .with_permission(perm::TYPESETTING_READ);

    let manage = Router::new()
        .route("/typesetting", post(create_typesetting))
        .route(
            "/typesetting/:id",
            put(update_typesetting).delete(delete_typesetting),
        )
        .route("/typesetting/:id/options", post(add_option))
        .route(
            "/typesetting-options/:id",
            put(update_option).delete(delete_option),
        )
        .route("/typesetting/:id/proofs", post(add_proof))
        .route("/typesetting-proofs/:id/approve", post(approve_proof))
        .route("/typesetting-proofs/:id/artwork", post(add_artwork))
        .with_permission(perm::TYPESETTING_MANAGE);

    read.merge(manage)
}

/// Open a typesetting job on a work order or an order
#[utoipa::path(
    post,
    path = "/api/v1/typesetting",
    request_body = CreateTypesettingRequest,
    responses(
        (status = 201, description = "Typesetting created", body = TypesettingDetail),
        (status = 400, description = "No parent given", body = crate::errors::ErrorResponse),
        (status = 404, description = "Parent not found", body = crate::errors::ErrorResponse),
    ),
    tag = "typesetting"
)]
pub async fn create_typesetting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateTypesettingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state
        .services
        .typesetting
        .create_typesetting(request, actor(&auth_user))
        .await?;
    Ok(created(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/typesetting/{id}",
    params(("id" = Uuid, Path, description = "Typesetting id")),
    responses(
        (status = 200, description = "Typesetting with options, proofs and artwork", body = TypesettingDetail),
        (status = 404, description = "Typesetting not found", body = crate::errors::ErrorResponse),
    ),
    tag = "typesetting"
)]
pub async fn get_typesetting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TypesettingDetail>>, ServiceError> {
    Ok(ok(state.services.typesetting.get_typesetting(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}/typesetting",
    params(("id" = Uuid, Path, description = "Work order id")),
    responses((status = 200, description = "Typesetting jobs", body = Vec<typesetting::Model>)),
    tag = "typesetting"
)]
pub async fn list_for_work_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<typesetting::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .typesetting
        .list_for(TypesettingParent::WorkOrder(id))
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/typesetting",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Typesetting jobs", body = Vec<typesetting::Model>)),
    tag = "typesetting"
)]
pub async fn list_for_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<typesetting::Model>>>, ServiceError> {
    Ok(ok(state
        .services
        .typesetting
        .list_for(TypesettingParent::Order(id))
        .await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/typesetting/{id}",
    params(("id" = Uuid, Path, description = "Typesetting id")),
    request_body = UpdateTypesettingRequest,
    responses((status = 200, description = "Typesetting updated", body = typesetting::Model)),
    tag = "typesetting"
)]
pub async fn update_typesetting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTypesettingRequest>,
) -> Result<Json<ApiResponse<typesetting::Model>>, ServiceError> {
    Ok(ok(state
        .services
        .typesetting
        .update_typesetting(id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/typesetting/{id}",
    params(("id" = Uuid, Path, description = "Typesetting id")),
    responses((status = 204, description = "Typesetting deleted")),
    tag = "typesetting"
)]
pub async fn delete_typesetting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.typesetting.delete_typesetting(id).await?;
    Ok(no_content())
}

#[utoipa::path(
    post,
    path = "/api/v1/typesetting/{id}/options",
    params(("id" = Uuid, Path, description = "Typesetting id")),
    request_body = OptionRequest,
    responses((status = 201, description = "Option added", body = typesetting_option::Model)),
    tag = "typesetting"
)]
pub async fn add_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OptionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let option = state.services.typesetting.add_option(id, request).await?;
    Ok(created(option))
}

#[utoipa::path(
    put,
    path = "/api/v1/typesetting-options/{id}",
    params(("id" = Uuid, Path, description = "Option id")),
    request_body = UpdateOptionRequest,
    responses((status = 200, description = "Option updated", body = typesetting_option::Model)),
    tag = "typesetting"
)]
pub async fn update_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOptionRequest>,
) -> Result<Json<ApiResponse<typesetting_option::Model>>, ServiceError> {
    Ok(ok(state.services.typesetting.update_option(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/typesetting-options/{id}",
    params(("id" = Uuid, Path, description = "Option id")),
    responses((status = 204, description = "Option deleted")),
    tag = "typesetting"
)]
pub async fn delete_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.typesetting.delete_option(id).await?;
    Ok(no_content())
}

/// Submit a proof; the job waits for customer approval
#[utoipa::path(
    post,
    path = "/api/v1/typesetting/{id}/proofs",
    params(("id" = Uuid, Path, description = "Typesetting id")),
    request_body = CreateProofRequest,
    responses((status = 201, description = "Proof added", body = ProofDetail)),
    tag = "typesetting"
)]
pub async fn add_proof(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateProofRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let proof = state
        .services
        .typesetting
        .add_proof(id, request, actor(&auth_user))
        .await?;
    Ok(created(proof))
}

#[utoipa::path(
    post,
    path = "/api/v1/typesetting-proofs/{id}/approve",
    params(("id" = Uuid, Path, description = "Proof id")),
    responses(
        (status = 200, description = "Proof approved", body = TypesettingDetail),
        (status = 404, description = "Proof not found", body = crate::errors::ErrorResponse),
    ),
    tag = "typesetting"
)]
pub async fn approve_proof(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TypesettingDetail>>, ServiceError> {
    Ok(ok(state.services.typesetting.approve_proof(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/typesetting-proofs/{id}/artwork",
    params(("id" = Uuid, Path, description = "Proof id")),
    request_body = ArtworkRequest,
    responses((status = 201, description = "Artwork attached", body = typesetting_proof_artwork::Model)),
    tag = "typesetting"
)]
pub async fn add_artwork(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ArtworkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let artwork = state.services.typesetting.add_artwork(id, request).await?;
    Ok(created(artwork))
}
