use crate::{
    config::QuickbooksConfig,
    entities::user,
    errors::ServiceError,
    events::{Event, EventSender},
    logging::component_logger,
};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use slog::{info as slog_info, warn as slog_warn, Logger};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};
use tracing::instrument;
use uuid::Uuid;

/// Bearer token plus the company file it is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickbooksCredentials {
    pub access_token: String,
    pub realm_id: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Whether a token expiring at `expiry` must be refreshed before use at `now`.
/// Tokens inside the window, boundary included, are refreshed.
pub fn needs_refresh(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    match expiry {
        Some(expiry) => expiry <= now + window,
        None => true,
    }
}

/// Hands out QuickBooks access tokens, refreshing them at most once per
/// expiry window for each user no matter how many callers ask at once.
pub struct QuickbooksTokenManager {
    db_pool: Arc<DatabaseConnection>,
    http: reqwest::Client,
    config: QuickbooksConfig,
    guards: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl QuickbooksTokenManager {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        config: QuickbooksConfig,
        event_sender: Option<Arc<EventSender>>,
        logger: &Logger,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(20))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            db_pool,
            http,
            config,
            guards: Mutex::new(HashMap::new()),
            event_sender,
            logger: component_logger(logger, "quickbooks.tokens"),
        })
    }

    fn guard_for(&self, user_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = self.guards.lock().unwrap_or_else(|p| p.into_inner());
        guards
            .entry(user_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release(&self, user_id: Uuid, guard: Arc<tokio::sync::Mutex<()>>) {
        drop(guard);
        let mut guards = self.guards.lock().unwrap_or_else(|p| p.into_inner());
        if guards
            .get(&user_id)
            .map_or(false, |g| Arc::strong_count(g) == 1)
        {
            guards.remove(&user_id);
        }
    }

    /// Number of users with a guard currently held or awaited.
    pub fn active_guards(&self) -> usize {
        self.guards.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Returns a usable access token for `user_id`, refreshing it first when it
    /// expires within the configured window.
    #[instrument(skip(self))]
    pub async fn access_token(&self, user_id: Uuid) -> Result<QuickbooksCredentials, ServiceError> {
        let guard = self.guard_for(user_id);
        let result = {
            let _held = guard.lock().await;
            self.current_or_refreshed(user_id).await
        };
        self.release(user_id, guard);
        result
    }

    async fn current_or_refreshed(&self, user_id: Uuid) -> Result<QuickbooksCredentials, ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let (realm_id, refresh_token) = match (
            account.quickbooks_realm_id.clone(),
            account.quickbooks_refresh_token.clone(),
        ) {
            (Some(realm), Some(refresh)) => (realm, refresh),
            _ => {
                return Err(ServiceError::Unauthorized(
                    "QuickBooks not connected".to_string(),
                ))
            }
        };

        let now = Utc::now();
        let window = Duration::seconds(self.config.refresh_window_secs);
        if let Some(access_token) = account.quickbooks_access_token.clone() {
            if !needs_refresh(account.quickbooks_token_expiry, now, window) {
                return Ok(QuickbooksCredentials {
                    access_token,
                    realm_id,
                });
            }
        }

        let refreshed = self.refresh(user_id, &refresh_token).await?;
        let expiry = Utc::now() + Duration::seconds(refreshed.expires_in);

        let mut active: user::ActiveModel = account.into();
        active.quickbooks_access_token = Set(Some(refreshed.access_token.clone()));
        active.quickbooks_refresh_token =
            Set(Some(refreshed.refresh_token.unwrap_or(refresh_token)));
        active.quickbooks_token_expiry = Set(Some(expiry));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;

        counter!("printshop.quickbooks.token_refreshes", 1, "outcome" => "success");
        slog_info!(self.logger, "access token refreshed"; "user_id" => user_id.to_string(), "expires_at" => expiry.to_rfc3339());
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::QuickbooksTokenRefreshed(user_id)).await;
        }

        Ok(QuickbooksCredentials {
            access_token: refreshed.access_token,
            realm_id,
        })
    }

    async fn refresh(&self, user_id: Uuid, refresh_token: &str) -> Result<RefreshResponse, ServiceError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| {
                counter!("printshop.quickbooks.token_refreshes", 1, "outcome" => "error");
                slog_warn!(self.logger, "token refresh request failed"; "user_id" => user_id.to_string(), "error" => e.to_string());
                ServiceError::ExternalServiceError(format!("QuickBooks token refresh failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            counter!("printshop.quickbooks.token_refreshes", 1, "outcome" => "rejected");
            slog_warn!(self.logger, "token refresh rejected";
                "user_id" => user_id.to_string(), "status" => status.as_u16(), "detail" => &detail);
            return Err(ServiceError::ExternalServiceError(format!(
                "QuickBooks token refresh returned {}: {}",
                status, detail
            )));
        }

        response.json::<RefreshResponse>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("Unreadable QuickBooks token response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_threshold_is_inclusive() {
        let now = Utc::now();
        let window = Duration::minutes(30);
        assert!(!needs_refresh(Some(now + Duration::minutes(31)), now, window));
        assert!(needs_refresh(Some(now + Duration::minutes(30)), now, window));
        assert!(needs_refresh(Some(now + Duration::minutes(5)), now, window));
        assert!(needs_refresh(Some(now - Duration::minutes(1)), now, window));
        assert!(needs_refresh(None, now, window));
    }
}
