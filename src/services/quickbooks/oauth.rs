use super::ACCOUNTING_SCOPE;
use crate::{
    config::QuickbooksConfig,
    entities::user,
    errors::ServiceError,
    events::{Event, EventSender},
    logging::component_logger,
};
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use slog::{info as slog_info, warn as slog_warn, Logger};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Default lifetime of a provider access token when the response omits one.
const DEFAULT_TOKEN_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorizeResponse {
    pub authorization_url: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub realm_id: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
}

/// Why an OAuth callback could not complete, reported to the browser as `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFailure {
    MissingParams,
    InvalidState,
    ExchangeFailed,
    ProviderDenied,
}

impl CallbackFailure {
    pub fn reason(self) -> &'static str {
        match self {
            Self::MissingParams => "missing_params",
            Self::InvalidState => "invalid_state",
            Self::ExchangeFailed => "exchange_failed",
            Self::ProviderDenied => "provider_denied",
        }
    }
}

struct PendingAuthorization {
    verifier: PkceCodeVerifier,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

/// CSRF state to PKCE verifier and user, expiring after a fixed lifetime.
pub struct OAuthStateStore {
    pending: RwLock<HashMap<String, PendingAuthorization>>,
    ttl: Duration,
}

impl OAuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn insert(&self, state: String, verifier: PkceCodeVerifier, user_id: Uuid) {
        let now = Utc::now();
        let mut pending = self.pending.write().await;
        let ttl = self.ttl;
        pending.retain(|_, p| now - p.created_at < ttl);
        pending.insert(
            state,
            PendingAuthorization {
                verifier,
                user_id,
                created_at: now,
            },
        );
    }

    /// Removes and returns the entry for `state` if it has not expired.
    async fn take(&self, state: &str) -> Option<(PkceCodeVerifier, Uuid)> {
        let entry = self.pending.write().await.remove(state)?;
        if Utc::now() - entry.created_at >= self.ttl {
            return None;
        }
        Some((entry.verifier, entry.user_id))
    }

    pub async fn len(&self) -> usize {
        self.pending.read().await.len()
    }
}

pub struct QuickbooksOAuth {
    db_pool: Arc<DatabaseConnection>,
    config: QuickbooksConfig,
    states: OAuthStateStore,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl QuickbooksOAuth {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        config: QuickbooksConfig,
        event_sender: Option<Arc<EventSender>>,
        logger: &Logger,
    ) -> Self {
        let ttl = Duration::seconds(config.oauth_state_ttl_secs);
        Self {
            db_pool,
            config,
            states: OAuthStateStore::new(ttl),
            event_sender,
            logger: component_logger(logger, "quickbooks.oauth"),
        }
    }

    fn client(&self) -> Result<BasicClient, ServiceError> {
        if !self.config.is_configured() {
            return Err(ServiceError::BadRequest(
                "QuickBooks integration is not configured".to_string(),
            ));
        }
        let bad = |e: oauth2::url::ParseError| {
            ServiceError::InternalError(format!("Invalid QuickBooks OAuth URL: {}", e))
        };
        Ok(BasicClient::new(
            ClientId::new(self.config.client_id.clone()),
            Some(ClientSecret::new(self.config.client_secret.clone())),
            AuthUrl::new(self.config.auth_url.clone()).map_err(bad)?,
            Some(TokenUrl::new(self.config.token_url.clone()).map_err(bad)?),
        )
        .set_redirect_uri(RedirectUrl::new(self.config.redirect_url.clone()).map_err(bad)?))
    }

    /// Builds the consent URL for `user_id` and remembers the state it carries.
    #[instrument(skip(self))]
    pub async fn authorize_url(&self, user_id: Uuid) -> Result<AuthorizeResponse, ServiceError> {
        let client = self.client()?;
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(ACCOUNTING_SCOPE.to_string()))
            .set_pkce_challenge(challenge)
            .url();

        self.states
            .insert(state.secret().clone(), verifier, user_id)
            .await;
        slog_info!(self.logger, "authorization started"; "user_id" => user_id.to_string());
        Ok(AuthorizeResponse {
            authorization_url: url.to_string(),
            state: state.secret().clone(),
        })
    }

    /// Completes the browser redirect: exchanges the code and stores the tokens
    /// on the user who started the flow.
    #[instrument(skip(self, code, state))]
    pub async fn complete(
        &self,
        code: Option<String>,
        state: Option<String>,
        realm_id: Option<String>,
        provider_error: Option<String>,
    ) -> Result<Uuid, CallbackFailure> {
        if let Some(error) = provider_error {
            slog_warn!(self.logger, "provider denied authorization"; "error" => &error);
            return Err(CallbackFailure::ProviderDenied);
        }
        let (code, state, realm_id) = match (code, state, realm_id) {
            (Some(c), Some(s), Some(r)) if !c.is_empty() && !s.is_empty() && !r.is_empty() => {
                (c, s, r)
            }
            _ => return Err(CallbackFailure::MissingParams),
        };
        let (verifier, user_id) = self
            .states
            .take(&state)
            .await
            .ok_or(CallbackFailure::InvalidState)?;

        let client = self.client().map_err(|_| CallbackFailure::ExchangeFailed)?;
        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                slog_warn!(self.logger, "code exchange failed"; "user_id" => user_id.to_string(), "error" => e.to_string());
                CallbackFailure::ExchangeFailed
            })?;

        let expires_in = token
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(DEFAULT_TOKEN_SECS);
        let stored = self
            .store_tokens(
                user_id,
                token.access_token().secret().clone(),
                token.refresh_token().map(|t| t.secret().clone()),
                Utc::now() + Duration::seconds(expires_in),
                realm_id.clone(),
            )
            .await;
        if let Err(e) = stored {
            slog_warn!(self.logger, "could not persist tokens"; "user_id" => user_id.to_string(), "error" => e.to_string());
            return Err(CallbackFailure::ExchangeFailed);
        }

        slog_info!(self.logger, "company connected"; "user_id" => user_id.to_string(), "realm_id" => &realm_id);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::QuickbooksConnected { user_id, realm_id })
                .await;
        }
        Ok(user_id)
    }

    async fn store_tokens(
        &self,
        user_id: Uuid,
        access_token: String,
        refresh_token: Option<String>,
        expiry: DateTime<Utc>,
        realm_id: String,
    ) -> Result<(), ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        let mut active: user::ActiveModel = account.into();
        active.quickbooks_access_token = Set(Some(access_token));
        active.quickbooks_refresh_token = Set(refresh_token);
        active.quickbooks_token_expiry = Set(Some(expiry));
        active.quickbooks_realm_id = Set(Some(realm_id));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;
        Ok(())
    }

    pub async fn status(&self, user_id: Uuid) -> Result<ConnectionStatus, ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        Ok(ConnectionStatus {
            connected: account.quickbooks_refresh_token.is_some()
                && account.quickbooks_realm_id.is_some(),
            realm_id: account.quickbooks_realm_id,
            token_expiry: account.quickbooks_token_expiry,
        })
    }

    #[instrument(skip(self))]
    pub async fn disconnect(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        let mut active: user::ActiveModel = account.into();
        active.quickbooks_access_token = Set(None);
        active.quickbooks_refresh_token = Set(None);
        active.quickbooks_token_expiry = Set(None);
        active.quickbooks_realm_id = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;
        slog_info!(self.logger, "company disconnected"; "user_id" => user_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_is_single_use() {
        let store = OAuthStateStore::new(Duration::minutes(10));
        let user = Uuid::new_v4();
        store
            .insert("abc".into(), PkceCodeVerifier::new("v".into()), user)
            .await;
        assert_eq!(store.take("abc").await.map(|(_, u)| u), Some(user));
        assert!(store.take("abc").await.is_none());
    }

    #[tokio::test]
    async fn expired_state_is_rejected() {
        let store = OAuthStateStore::new(Duration::zero());
        store
            .insert("old".into(), PkceCodeVerifier::new("v".into()), Uuid::new_v4())
            .await;
        assert!(store.take("old").await.is_none());
    }

    #[test]
    fn failure_reasons_match_redirect_codes() {
        assert_eq!(CallbackFailure::MissingParams.reason(), "missing_params");
        assert_eq!(CallbackFailure::InvalidState.reason(), "invalid_state");
        assert_eq!(CallbackFailure::ExchangeFailed.reason(), "exchange_failed");
        assert_eq!(CallbackFailure::ProviderDenied.reason(), "provider_denied");
    }
}
