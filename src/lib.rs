//! Print shop API library
//!
//! Companies and offices, work orders and orders, typesetting, paper stock,
//! payments, invoicing and QuickBooks sync behind an axum HTTP API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::Extension, http::HeaderValue, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use slog::Logger;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use utoipa::{IntoParams, ToSchema};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

pub fn default_page() -> u64 {
    1
}
pub fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> From<services::Page<T>> for PaginatedResponse<T> {
    fn from(page: services::Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn page_converts_with_rounded_up_page_count() {
        let page = services::Page {
            items: vec![1, 2, 3],
            total: 41,
            page: 2,
            limit: 20,
        };
        let response: PaginatedResponse<i32> = page.into();
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items, vec![1, 2, 3]);
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api/v1` route except authentication.
pub fn api_v1_routes(config: &config::AppConfig) -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .merge(handlers::companies::company_routes())
        .merge(handlers::offices::office_routes())
        .merge(handlers::work_orders::work_order_routes())
        .merge(handlers::orders::order_routes())
        .merge(handlers::typesetting::typesetting_routes())
        .merge(handlers::paper_products::paper_product_routes())
        .merge(handlers::stocks::stock_routes())
        .merge(handlers::payments::payment_routes())
        .merge(handlers::invoices::invoice_routes())
        .merge(handlers::shipping::shipping_routes())
        .merge(handlers::users::user_routes())
        .merge(handlers::uploads::upload_routes(config.uploads.max_upload_bytes))
        .merge(handlers::quickbooks::quickbooks_routes())
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "service": "printshop-api",
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

/// CORS from configured origins, permissive in development or when
/// explicitly allowed, `None` when neither is configured.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Full application router: health, `/api/v1`, auth, swagger and uploaded files.
pub fn build_router(
    state: AppState,
    auth_service: Arc<auth::AuthService>,
    cors: CorsLayer,
    logger: &Logger,
) -> Router {
    let access_log = Arc::new(logging::LoggingState::new(logger.clone()));

    let mut app = Router::<AppState>::new()
        .route("/", get(|| async { "printshop-api up" }))
        .merge(health::health_routes())
        .nest("/api/v1", api_v1_routes(&state.config))
        .nest(
            "/api/v1/auth",
            auth::auth_routes().with_state(auth_service.clone()),
        )
        .merge(openapi::swagger_ui());

    let prefix = state.config.uploads.public_url_prefix.trim_end_matches('/');
    if prefix.starts_with('/') && prefix.len() > 1 {
        app = app.nest_service(prefix, ServeDir::new(&state.config.uploads.upload_dir));
    }

    app.layer(axum::middleware::from_fn_with_state(
        access_log,
        logging::logging_middleware,
    ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Auth middleware looks the service up in request extensions
        .layer(Extension(auth_service))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::Page;
    pub use crate::tracing::*;
    pub use crate::{ApiResponse, AppState, PaginatedResponse};
}
