use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::ok;
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    errors::ServiceError,
    services::{
        invoices::ReconcileSummary,
        quickbooks::{AuthorizeResponse, ConnectionStatus, CustomerSyncSummary, InvoiceSyncSummary},
    },
    ApiResponse, AppState,
};

/// Query string Intuit appends when redirecting back
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub realm_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Disconnected {
    pub connected: bool,
}

pub fn quickbooks_routes() -> Router<AppState> {
    let connected = Router::new()
        .route("/quickbooks/authorize", get(authorize))
        .route("/quickbooks/status", get(connection_status))
        .route("/quickbooks/disconnect", post(disconnect))
        .route("/quickbooks/sync/customers", post(sync_customers))
        .route(
            "/quickbooks/offices/:id/sync-invoices",
            post(sync_office_invoices),
        )
        .route("/quickbooks/invoices/reconcile", post(reconcile_invoices))
        .with_permission(perm::QUICKBOOKS_MANAGE);

    // The browser arrives here from Intuit without our bearer token.
    let callback = Router::new().route("/quickbooks/callback", get(callback));

    connected.merge(callback)
}

/// Where the browser lands after the OAuth round trip.
pub(crate) fn settings_redirect(frontend_url: &str, outcome: Result<(), &str>) -> String {
    let base = format!("{}/settings/quickbooks", frontend_url.trim_end_matches('/'));
    let (status, reason) = match outcome {
        Ok(()) => ("connected", None),
        Err(reason) => ("error", Some(reason)),
    };
    match Url::parse(&base) {
        Ok(mut url) => {
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("status", status);
                if let Some(reason) = reason {
                    query.append_pair("reason", reason);
                }
            }
            url.to_string()
        }
        // Relative frontends (same origin) are not valid absolute URLs.
        Err(_) => match reason {
            Some(reason) => format!("{}?status={}&reason={}", base, status, reason),
            None => format!("{}?status={}", base, status),
        },
    }
}

/// Start connecting the caller's QuickBooks company
#[utoipa::path(
    get,
    path = "/api/v1/quickbooks/authorize",
    responses(
        (status = 200, description = "Intuit authorization URL", body = AuthorizeResponse),
        (status = 500, description = "QuickBooks client not configured", body = crate::errors::ErrorResponse),
    ),
    tag = "quickbooks"
)]
pub async fn authorize(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<AuthorizeResponse>>, ServiceError> {
    Ok(ok(state
        .services
        .quickbooks_oauth
        .authorize_url(auth_user.user_id)
        .await?))
}

/// OAuth redirect target
#[utoipa::path(
    get,
    path = "/api/v1/quickbooks/callback",
    params(CallbackQuery),
    responses((status = 303, description = "Redirect to the frontend settings page")),
    tag = "quickbooks"
)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let outcome = state
        .services
        .quickbooks_oauth
        .complete(query.code, query.state, query.realm_id, query.error)
        .await;

    let target = match outcome {
        Ok(user_id) => {
            info!(user_id = %user_id, "QuickBooks connected");
            settings_redirect(&state.config.frontend_url, Ok(()))
        }
        Err(failure) => {
            error!(reason = failure.reason(), "QuickBooks connection failed");
            settings_redirect(&state.config.frontend_url, Err(failure.reason()))
        }
    };
    Redirect::to(&target)
}

#[utoipa::path(
    get,
    path = "/api/v1/quickbooks/status",
    responses((status = 200, description = "Connection state for the caller", body = ConnectionStatus)),
    tag = "quickbooks"
)]
pub async fn connection_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<ConnectionStatus>>, ServiceError> {
    Ok(ok(state
        .services
        .quickbooks_oauth
        .status(auth_user.user_id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/quickbooks/disconnect",
    responses((status = 200, description = "Stored credentials cleared", body = Disconnected)),
    tag = "quickbooks"
)]
pub async fn disconnect(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Disconnected>>, ServiceError> {
    state
        .services
        .quickbooks_oauth
        .disconnect(auth_user.user_id)
        .await?;
    Ok(ok(Disconnected { connected: false }))
}

/// Mirror QuickBooks customers into companies and offices
#[utoipa::path(
    post,
    path = "/api/v1/quickbooks/sync/customers",
    responses(
        (status = 200, description = "Sync summary", body = CustomerSyncSummary),
        (status = 401, description = "QuickBooks not connected", body = crate::errors::ErrorResponse),
        (status = 502, description = "QuickBooks request failed", body = crate::errors::ErrorResponse),
    ),
    tag = "quickbooks"
)]
pub async fn sync_customers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<CustomerSyncSummary>>, ServiceError> {
    Ok(ok(state
        .services
        .quickbooks_sync
        .sync_customers(auth_user.user_id)
        .await?))
}

/// Pull invoice balances for one office's QuickBooks customer
#[utoipa::path(
    post,
    path = "/api/v1/quickbooks/offices/{id}/sync-invoices",
    params(("id" = Uuid, Path, description = "Office id")),
    responses(
        (status = 200, description = "Sync summary", body = InvoiceSyncSummary),
        (status = 400, description = "Office not linked to QuickBooks", body = crate::errors::ErrorResponse),
    ),
    tag = "quickbooks"
)]
pub async fn sync_office_invoices(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(office_id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceSyncSummary>>, ServiceError> {
    Ok(ok(state
        .services
        .quickbooks_sync
        .sync_invoices_for_office(auth_user.user_id, office_id)
        .await?))
}

/// Retry pending and failed invoice pushes now
#[utoipa::path(
    post,
    path = "/api/v1/quickbooks/invoices/reconcile",
    responses((status = 200, description = "Reconcile summary", body = ReconcileSummary)),
    tag = "quickbooks"
)]
pub async fn reconcile_invoices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReconcileSummary>>, ServiceError> {
    let max_attempts = state.config.quickbooks.max_sync_attempts;
    Ok(ok(state.services.invoices.reconcile(max_attempts).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_redirect_carries_status() {
        assert_eq!(
            settings_redirect("https://app.example.com/", Ok(())),
            "https://app.example.com/settings/quickbooks?status=connected"
        );
    }

    #[test]
    fn failed_redirect_carries_reason() {
        assert_eq!(
            settings_redirect("https://app.example.com", Err("invalid_state")),
            "https://app.example.com/settings/quickbooks?status=error&reason=invalid_state"
        );
    }

    #[test]
    fn relative_frontend_still_redirects() {
        assert_eq!(
            settings_redirect("", Err("missing_params")),
            "/settings/quickbooks?status=error&reason=missing_params"
        );
    }
}
