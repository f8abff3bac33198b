use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

pub const QUICKBOOKS_AUTH_URL: &str = "https://appcenter.intuit.com/connect/oauth2";
pub const QUICKBOOKS_TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
pub const QUICKBOOKS_SANDBOX_API: &str = "https://sandbox-quickbooks.api.intuit.com";
pub const QUICKBOOKS_PRODUCTION_API: &str = "https://quickbooks.api.intuit.com";

/// QuickBooks Online integration settings
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct QuickbooksConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default)]
    pub redirect_url: String,

    /// "sandbox" or "production"
    #[serde(default = "default_quickbooks_environment")]
    #[validate(custom = "validate_quickbooks_environment")]
    pub environment: String,

    #[serde(default = "default_quickbooks_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_quickbooks_token_url")]
    pub token_url: String,

    /// Overrides the REST host derived from `environment`
    #[serde(default)]
    pub api_base: Option<String>,

    #[serde(default = "default_minor_version")]
    pub minor_version: u32,

    /// Tokens expiring within this window are refreshed before use
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: i64,

    /// Period of the invoice reconciliation job; 0 disables it
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,

    #[serde(default = "default_max_sync_attempts")]
    #[validate(range(min = 1, max = 50))]
    pub max_sync_attempts: i32,

    /// How long an authorize state stays valid
    #[serde(default = "default_oauth_state_ttl_secs")]
    pub oauth_state_ttl_secs: i64,
}

impl Default for QuickbooksConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            environment: default_quickbooks_environment(),
            auth_url: default_quickbooks_auth_url(),
            token_url: default_quickbooks_token_url(),
            api_base: None,
            minor_version: default_minor_version(),
            refresh_window_secs: default_refresh_window_secs(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
            max_sync_attempts: default_max_sync_attempts(),
            oauth_state_ttl_secs: default_oauth_state_ttl_secs(),
        }
    }
}

impl QuickbooksConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    pub fn api_base(&self) -> String {
        match &self.api_base {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ if self.environment.eq_ignore_ascii_case("production") => {
                QUICKBOOKS_PRODUCTION_API.to_string()
            }
            _ => QUICKBOOKS_SANDBOX_API.to_string(),
        }
    }
}

/// Outbound email settings (SendGrid dynamic templates)
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmailConfig {
    /// When unset, emails are logged instead of sent
    #[serde(default)]
    pub sendgrid_api_key: Option<String>,

    #[serde(default = "default_sendgrid_api_base")]
    pub sendgrid_api_base: String,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    #[serde(default)]
    pub verification_template_id: String,

    #[serde(default)]
    pub order_confirmation_template_id: String,

    #[serde(default)]
    pub order_status_template_id: String,

    #[serde(default)]
    pub invoice_template_id: String,
}

/// File upload storage settings
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct UploadConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_public_url_prefix")]
    pub public_url_prefix: String,

    #[serde(default = "default_max_upload_bytes")]
    #[validate(range(min = 1024))]
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            public_url_prefix: default_public_url_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    pub database_url: String,

    /// JWT secret key (minimum 64 characters)
    #[validate(length(min = 64), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    #[validate(range(min = 300, max = 86400))]
    pub jwt_expiration: usize,

    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1024))]
    pub port: u16,

    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Base URL of the browser app; OAuth callbacks redirect here
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Tax rate applied to new invoices when the request omits one
    #[serde(default = "default_tax_rate")]
    #[validate(custom = "validate_tax_rate")]
    pub default_tax_rate: f64,

    /// First work order, order and invoice number
    #[serde(default = "default_number_base")]
    pub number_base: i32,

    #[serde(default = "default_event_channel_capacity")]
    #[validate(range(min = 1))]
    pub event_channel_capacity: usize,

    #[serde(default)]
    #[validate]
    pub quickbooks: QuickbooksConfig,

    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    #[validate]
    pub uploads: UploadConfig,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the essentials
    pub fn new(database_url: String, jwt_secret: String, environment: String) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration: default_jwt_expiration(),
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            frontend_url: default_frontend_url(),
            default_tax_rate: default_tax_rate(),
            number_base: default_number_base(),
            event_channel_capacity: default_event_channel_capacity(),
            quickbooks: QuickbooksConfig::default(),
            email: EmailConfig {
                sendgrid_api_base: default_sendgrid_api_base(),
                from_email: default_from_email(),
                from_name: default_from_name(),
                ..Default::default()
            },
            uploads: UploadConfig::default(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Checks that cross-field rules hold outside development
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && !self.has_cors_allowed_origins() && !self.cors_allow_any_origin
        {
            let mut err = ValidationError::new("cors_allowed_origins");
            err.message =
                Some("Set cors_allowed_origins or cors_allow_any_origin outside development".into());
            errors.add("cors_allowed_origins", err);
        }

        if self.quickbooks.is_configured() && self.quickbooks.redirect_url.trim().is_empty() {
            let mut err = ValidationError::new("quickbooks");
            err.message = Some("quickbooks.redirect_url is required with client credentials".into());
            errors.add("quickbooks", err);
        }

        if self.is_production() && self.quickbooks.is_configured() {
            if !self.quickbooks.environment.eq_ignore_ascii_case("production") {
                tracing::warn!("QuickBooks is configured against the sandbox in production");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_jwt_expiration() -> usize {
    3600
}

fn default_auth_issuer() -> String {
    "printshop-auth".to_string()
}

fn default_auth_audience() -> String {
    "printshop-api".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_tax_rate() -> f64 {
    0.0
}

fn default_number_base() -> i32 {
    1000
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_quickbooks_environment() -> String {
    "sandbox".to_string()
}

fn default_quickbooks_auth_url() -> String {
    QUICKBOOKS_AUTH_URL.to_string()
}

fn default_quickbooks_token_url() -> String {
    QUICKBOOKS_TOKEN_URL.to_string()
}

fn default_minor_version() -> u32 {
    65
}

fn default_refresh_window_secs() -> i64 {
    30 * 60
}

fn default_reconcile_interval_secs() -> u64 {
    300
}

fn default_max_sync_attempts() -> i32 {
    5
}

fn default_oauth_state_ttl_secs() -> i64 {
    600
}

fn default_sendgrid_api_base() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_from_email() -> String {
    "orders@localhost".to_string()
}

fn default_from_name() -> String {
    "Print Shop".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_public_url_prefix() -> String {
    "/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_quickbooks_environment(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "sandbox" | "production" => Ok(()),
        _ => {
            let mut err = ValidationError::new("environment");
            err.message = Some("Must be one of: sandbox, production".into());
            Err(err)
        }
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 64 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 64 characters".into());
        return Err(err);
    }

    if let Some(first) = trimmed.chars().next() {
        if trimmed.chars().all(|c| c == first) {
            let mut err = ValidationError::new("jwt_secret");
            err.message = Some("JWT secret cannot be a repeated character sequence".into());
            return Err(err);
        }
    }

    let lower = trimmed.to_ascii_lowercase();
    let weak_fragments = ["changeme", "password", "12345", "abcdef"];
    if weak_fragments.iter().any(|pattern| lower.contains(pattern)) {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret appears to be weak".into());
        return Err(err);
    }

    let unique_chars: std::collections::HashSet<char> = trimmed.chars().collect();
    if unique_chars.len() < 10 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must have at least 10 unique characters".into());
        return Err(err);
    }

    Ok(())
}

fn validate_tax_rate(rate: f64) -> Result<(), ValidationError> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        let mut err = ValidationError::new("default_tax_rate");
        err.message = Some("default_tax_rate must be between 0.0 and 1.0".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("printshop_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Sources are layered in this order:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{RUN_ENV}.toml`
/// 4. Environment variables (`APP__*`, nested keys joined by `__`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on defaults and environment variables",
            CONFIG_DIR
        );
    }

    // jwt_secret has no default and must come from a file or APP__JWT_SECRET.
    let config = Config::builder()
        .set_default("database_url", "sqlite://printshop.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    if config.get_string("jwt_secret").is_err() {
        error!("JWT secret is not configured. Set APP__JWT_SECRET (minimum 64 characters).");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "jwt_secret is required but not configured".into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint check failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str =
        "k3J9xQ2vT7mN4pL8wR1zY6bH0cF5gD2sA9eU3iO7tK4nM8qW1xZ6vB0jP5rL2hG7";

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            SECRET.into(),
            "production".into(),
        )
    }

    #[test]
    fn defaults_pass_field_validation() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.quickbooks.refresh_window_secs, 1800);
        assert_eq!(cfg.number_base, 1000);
    }

    #[test]
    fn weak_jwt_secret_is_rejected() {
        let mut cfg = base_config();
        cfg.jwt_secret = "a".repeat(80);
        assert!(cfg.validate().is_err());

        cfg.jwt_secret = format!("{}changeme", SECRET);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tax_rate_must_be_a_fraction() {
        let mut cfg = base_config();
        cfg.default_tax_rate = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());

        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some("https://shop.example.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn quickbooks_credentials_require_redirect() {
        let mut cfg = base_config();
        cfg.environment = "development".into();
        cfg.quickbooks.client_id = "id".into();
        cfg.quickbooks.client_secret = "secret".into();
        assert!(cfg.validate_additional_constraints().is_err());

        cfg.quickbooks.redirect_url = "http://localhost:8080/api/v1/quickbooks/callback".into();
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn api_base_follows_environment() {
        let mut qb = QuickbooksConfig::default();
        assert_eq!(qb.api_base(), QUICKBOOKS_SANDBOX_API);
        qb.environment = "production".into();
        assert_eq!(qb.api_base(), QUICKBOOKS_PRODUCTION_API);
        qb.api_base = Some("http://127.0.0.1:9999/".into());
        assert_eq!(qb.api_base(), "http://127.0.0.1:9999");
    }
}
