use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::warn;

use super::common::created;
use crate::{
    auth::{consts as perm, AuthRouterExt},
    errors::ServiceError,
    services::uploads::StoredUpload,
    AppState,
};

/// Multipart overhead allowed on top of the file itself.
const MULTIPART_SLACK: usize = 64 * 1024;

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_SLACK))
        .with_permission(perm::UPLOADS_CREATE)
}

/// Upload artwork or a document
///
/// Expects a multipart body with the file in the `file` field.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    request_body(content_type = "multipart/form-data", description = "Multipart body with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = StoredUpload),
        (status = 400, description = "Missing file or disallowed type", body = crate::errors::ErrorResponse),
    ),
    tag = "uploads"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Malformed multipart body");
        ServiceError::BadRequest(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ServiceError::BadRequest(format!("Could not read uploaded file: {}", e))
        })?;

        let stored = state
            .services
            .uploads
            .store(&file_name, content_type.as_deref(), &bytes)
            .await?;
        return Ok(created(stored));
    }

    Err(ServiceError::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}
