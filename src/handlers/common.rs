use crate::{auth::AuthUser, services::Page, ApiResponse, PaginatedResponse};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use uuid::Uuid;

/// Standard success response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Standard no content response
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Wraps one page of a list procedure
pub fn paginated<T: Serialize>(page: Page<T>) -> Json<ApiResponse<PaginatedResponse<T>>> {
    Json(ApiResponse::success(page.into()))
}

/// The user recorded as author of a write
pub fn actor(user: &AuthUser) -> Option<Uuid> {
    Some(user.user_id)
}
