use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{created, no_content, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    entities::{permission, user},
    errors::ServiceError,
    services::{
        roles::{AssignPermissionsRequest, CreateRoleRequest, RoleDetail},
        users::{AssignRolesRequest, CreateUserRequest, UpdateUserRequest, UserDetail},
    },
    ApiResponse, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Acknowledged {
    pub message: String,
}

/// The caller as seen by the permission checks
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Creates the router for user, role and permission endpoints
pub fn user_routes() -> Router<AppState> {
    let me = Router::new()
        .route("/users/me", get(current_user))
        .with_auth();

    let read = Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/roles", get(list_roles))
        .route("/roles/:id", get(get_role))
        .route("/permissions", get(list_permissions))
        .with_permission(perm::USERS_READ);

    let manage = Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/users/:id/send-verification", post(send_verification))
        .with_permission(perm::USERS_MANAGE);

    let roles = Router::new()
        .route("/users/:id/roles", put(assign_roles))
        .route("/roles", post(create_role))
        .route("/roles/:id", axum::routing::delete(delete_role))
        .route("/roles/:id/permissions", put(assign_permissions))
        .with_permission(perm::ROLES_MANAGE);

    // Reached from the link in the verification email.
    let public = Router::new().route("/users/verify-email", get(verify_email));

    me.merge(read).merge(manage).merge(roles).merge(public)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses((status = 200, description = "The authenticated caller", body = CurrentUser)),
    tag = "users"
)]
pub async fn current_user(auth_user: AuthUser) -> Json<ApiResponse<CurrentUser>> {
    ok(CurrentUser {
        user_id: auth_user.user_id,
        name: auth_user.name,
        email: auth_user.email,
        roles: auth_user.roles,
        permissions: auth_user.permissions,
    })
}

/// Create a user, optionally sending the verification email
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDetail),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.create_user(request).await?;
    Ok(created(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User with roles", body = UserDetail),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDetail>>, ServiceError> {
    Ok(ok(state.services.users.get_user(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListQuery),
    responses((status = 200, description = "One page of users")),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<user::Model>>>, ServiceError> {
    let page = state
        .services
        .users
        .list_users(query.page, query.limit)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "User updated", body = user::Model)),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<user::Model>>, ServiceError> {
    Ok(ok(state.services.users.update_user(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 204, description = "User deleted")),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    if auth_user.user_id == id {
        return Err(ServiceError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    state.services.users.delete_user(id).await?;
    Ok(no_content())
}

/// Replace the roles held by a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/roles",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AssignRolesRequest,
    responses((status = 200, description = "Roles assigned", body = UserDetail)),
    tag = "users"
)]
pub async fn assign_roles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRolesRequest>,
) -> Result<Json<ApiResponse<UserDetail>>, ServiceError> {
    Ok(ok(state.services.users.assign_roles(id, request).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/send-verification",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Verification email sent", body = Acknowledged),
        (status = 400, description = "Already verified", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn send_verification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Acknowledged>>, ServiceError> {
    state.services.users.send_verification(id).await?;
    Ok(ok(Acknowledged {
        message: "Verification email sent".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/verify-email",
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = user::Model),
        (status = 400, description = "Token invalid or expired", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<ApiResponse<user::Model>>, ServiceError> {
    Ok(ok(state.services.users.verify_email(&query.token).await?))
}

// Roles and permissions

#[utoipa::path(
    post,
    path = "/api/v1/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleDetail),
        (status = 409, description = "Role name taken", body = crate::errors::ErrorResponse),
    ),
    tag = "roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let role = state.services.roles.create_role(request).await?;
    Ok(created(role))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses((status = 200, description = "Roles with their permissions", body = Vec<RoleDetail>)),
    tag = "roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleDetail>>>, ServiceError> {
    Ok(ok(state.services.roles.list_roles().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses((status = 200, description = "Role with its permissions", body = RoleDetail)),
    tag = "roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RoleDetail>>, ServiceError> {
    Ok(ok(state.services.roles.get_role(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/roles/{id}/permissions",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = AssignPermissionsRequest,
    responses((status = 200, description = "Permissions replaced", body = RoleDetail)),
    tag = "roles"
)]
pub async fn assign_permissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignPermissionsRequest>,
) -> Result<Json<ApiResponse<RoleDetail>>, ServiceError> {
    Ok(ok(state
        .services
        .roles
        .assign_permissions(id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses((status = 204, description = "Role deleted")),
    tag = "roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.roles.delete_role(id).await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    responses((status = 200, description = "Every permission known to the system", body = Vec<permission::Model>)),
    tag = "roles"
)]
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<permission::Model>>>, ServiceError> {
    Ok(ok(state.services.roles.list_permissions().await?))
}
