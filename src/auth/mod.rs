/*!
 * # Authentication and Authorization Module
 *
 * Staff sign in with email and password and receive a JWT pair (HS256,
 * issuer and audience checked). Each access token carries the user's role
 * names and permission strings; route groups are gated with
 * [`AuthRouterExt::with_permission`].
 */

use crate::services::users::UserService;
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

mod permissions;
mod rbac;

pub use permissions::*;
pub use rbac::*;

const ACCESS_TOKEN: &str = "access";
const REFRESH_TOKEN: &str = "refresh";

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub name: Option<String>,     // User's name
    pub email: Option<String>,    // User's email
    pub roles: Vec<String>,       // Role names
    pub permissions: Vec<String>, // Permission strings granted through roles
    pub jti: String,              // JWT ID
    pub iat: i64,                 // Issued at time
    pub exp: i64,                 // Expiration time
    pub nbf: i64,                 // Not valid before time
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
    pub token_type: String,       // "access" or "refresh"
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the user holds `permission` directly or through a wildcard
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, permission))
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
            refresh_token_expiration,
        }
    }

    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let access = Duration::from_secs(config.jwt_expiration as u64);
        Self::new(
            config.jwt_secret.clone(),
            config.auth_audience.clone(),
            config.auth_issuer.clone(),
            access,
            access * 24,
        )
    }
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuth => "AUTH_MISSING",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::InvalidToken => "AUTH_INVALID_TOKEN",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::TokenCreation(_) => "AUTH_TOKEN_CREATION_FAILED",
            Self::InsufficientPermissions => "AUTH_INSUFFICIENT_PERMISSIONS",
            Self::InternalError(_) => "AUTH_INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            warn!(error = %self, "authentication failure");
            "Authentication service error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Issues and validates tokens for application users
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    users: UserService,
}

impl AuthService {
    pub fn new(config: AuthConfig, users: UserService) -> Self {
        Self { config, users }
    }

    /// Checks a password login and issues a token pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, AuthError> {
        let account = self
            .users
            .authenticate(credentials.email.trim(), &credentials.password)
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;
        self.issue_for(account.id, Some(account.name), Some(account.email))
            .await
    }

    /// Trades a refresh token for a fresh pair, re-reading the user's grants.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.token_type != REFRESH_TOKEN {
            return Err(AuthError::InvalidToken);
        }
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let account = self
            .users
            .find_user(user_id)
            .await
            .map_err(|_| AuthError::InvalidToken)?;
        if !account.is_active {
            return Err(AuthError::InvalidToken);
        }
        self.issue_for(account.id, Some(account.name), Some(account.email))
            .await
    }

    async fn issue_for(
        &self,
        user_id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<TokenPair, AuthError> {
        let grants = self
            .users
            .grants(user_id)
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        self.generate_token(user_id, name, email, grants.roles, grants.permissions)
    }

    /// Generate a JWT pair for a user with the given grants
    pub fn generate_token(
        &self,
        user_id: Uuid,
        name: Option<String>,
        email: Option<String>,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let access_claims = Claims {
            sub: user_id.to_string(),
            name,
            email,
            roles,
            permissions,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
            token_type: ACCESS_TOKEN.to_string(),
        };

        // Refresh tokens carry no grants; they are re-read on refresh
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            name: None,
            email: None,
            roles: vec![],
            permissions: vec![],
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
            token_type: REFRESH_TOKEN.to_string(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::new(Algorithm::HS256), &access_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        let refresh_token = encode(&Header::new(Algorithm::HS256), &refresh_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => {
                debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            }
        })
    }

    /// Validate an access token and extract the caller
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.decode_claims(token)?;
        if claims.token_type != ACCESS_TOKEN {
            return Err(AuthError::InvalidToken);
        }
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthUser {
            user_id,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions,
            token_id: claims.jti,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    // Admins have all permissions
    if user.is_admin() {
        return Ok(next.run(request).await);
    }

    if !user.has_permission(&required_permission) {
        debug!(user_id = %user.user_id, permission = %required_permission, "permission denied");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingAuth)?;
    auth_service.validate_token(token)
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/login", axum::routing::post(login_handler))
        .route("/refresh", axum::routing::post(refresh_token_handler))
        .layer(DefaultBodyLimit::max(1024 * 64))
}

/// Exchange email and password for a token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenPair>, AuthError> {
    Ok(Json(auth_service.login(&credentials).await?))
}

/// Exchange a refresh token for a new pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenPair),
        (status = 401, description = "Invalid refresh token"),
    ),
    tag = "auth"
)]
pub async fn refresh_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(refresh_request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    Ok(Json(auth_service.refresh(&refresh_request.refresh_token).await?))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    fn service() -> AuthService {
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(
            AuthConfig::new(
                "k".repeat(64),
                "printshop-clients".into(),
                "printshop-api".into(),
                Duration::from_secs(900),
                Duration::from_secs(3600),
            ),
            UserService::new(db, None),
        )
    }

    #[test]
    fn access_token_round_trips_grants() {
        let auth = service();
        let id = Uuid::new_v4();
        let pair = auth
            .generate_token(id, None, None, vec!["staff".into()], vec!["orders:read".into()])
            .unwrap();
        let user = auth.validate_token(&pair.access_token).unwrap();
        assert_eq!(user.user_id, id);
        assert!(user.has_permission("orders:read"));
        assert!(!user.is_admin());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let auth = service();
        let pair = auth
            .generate_token(Uuid::new_v4(), None, None, vec![], vec![])
            .unwrap();
        assert!(matches!(
            auth.validate_token(&pair.refresh_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let auth = service();
        let mut other = service();
        other.config.jwt_audience = "someone-else".into();
        let pair = other
            .generate_token(Uuid::new_v4(), None, None, vec![], vec![])
            .unwrap();
        assert!(auth.validate_token(&pair.access_token).is_err());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AuthError::MissingAuth.code(), "AUTH_MISSING");
        assert_eq!(
            AuthError::InsufficientPermissions.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
