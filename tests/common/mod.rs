#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use printshop_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::user,
    events::{self, EventSender},
    handlers::AppServices,
    logging,
    services::users::CreateUserRequest,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const QB_REALM: &str = "4620816365";
pub const JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Application harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub admin_id: Uuid,
    admin_token: String,
    _dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("printshop_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            JWT_SECRET.to_string(),
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;
        cfg.uploads.upload_dir = dir.path().join("uploads").display().to_string();
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let logger = logging::discard_logger();
        let services =
            AppServices::new(db_arc.clone(), &cfg, Some(event_sender.clone()), &logger)
                .expect("services build");
        let auth_service = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&cfg),
            services.users.as_ref().clone(),
        ));

        let admin = services
            .users
            .create_user(CreateUserRequest {
                name: "Test Admin".to_string(),
                email: "admin@printshop.test".to_string(),
                password: "correct-horse-battery".to_string(),
                role_ids: vec![],
                send_verification: false,
            })
            .await
            .expect("seed admin user");
        let admin_id = admin.user.id;
        let admin_token = auth_service
            .generate_token(
                admin_id,
                Some("Test Admin".to_string()),
                Some("admin@printshop.test".to_string()),
                vec!["admin".to_string()],
                vec![],
            )
            .expect("admin token")
            .access_token;

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };
        let cors = printshop_api::cors_layer(&cfg).expect("permissive cors in tests");
        let router =
            printshop_api::build_router(state.clone(), auth_service.clone(), cors, &logger);

        Self {
            router,
            state,
            auth_service,
            admin_id,
            admin_token,
            _dir: dir,
            _event_task: event_task,
        }
    }

    pub fn token(&self) -> &str {
        &self.admin_token
    }

    /// Token for a non-admin caller holding exactly `permissions`.
    pub fn token_with_permissions(&self, permissions: &[&str]) -> String {
        self.auth_service
            .generate_token(
                Uuid::new_v4(),
                Some("Limited User".to_string()),
                None,
                vec!["staff".to_string()],
                permissions.iter().map(|p| p.to_string()).collect(),
            )
            .expect("limited token")
            .access_token
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request")
    }

    pub async fn request_raw(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated request as the admin.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Admin request that must return `expected`; yields the `data` payload.
    pub async fn call_ok(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let response = self.call(method.clone(), uri, body).await;
        let status = response.status();
        let json = response_json(response).await;
        assert_eq!(status, expected, "{} {} returned {}", method, uri, json);
        json["data"].clone()
    }

    /// Company plus one office; returns the office id.
    pub async fn seed_office(&self, name: &str) -> String {
        let company = self
            .call_ok(
                Method::POST,
                "/api/v1/companies",
                Some(json!({ "name": format!("{} Co", name) })),
                StatusCode::CREATED,
            )
            .await;
        let office = self
            .call_ok(
                Method::POST,
                "/api/v1/offices",
                Some(json!({
                    "company_id": company["id"],
                    "name": name,
                    "email": "office@example.com",
                })),
                StatusCode::CREATED,
            )
            .await;
        id_of(&office)
    }

    /// Work order with two items; returns the created work order.
    pub async fn seed_work_order(&self, office_id: &str) -> Value {
        self.call_ok(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({
                "office_id": office_id,
                "purchase_order_number": "PO-77",
                "contact_email": "buyer@example.com",
                "items": [
                    { "description": "Letterhead, 2 colour", "quantity": 500, "cost": "40.00", "amount": "95.00" },
                    { "description": "Envelopes #10", "quantity": 500, "cost": "30.00", "amount": "70.00" }
                ]
            })),
            StatusCode::CREATED,
        )
        .await
    }

    /// Order with one item; returns the created order.
    pub async fn seed_order(&self, office_id: &str) -> Value {
        self.call_ok(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "office_id": office_id,
                "items": [
                    { "description": "Business cards", "quantity": 1000, "cost": "20.00", "amount": "60.00" }
                ]
            })),
            StatusCode::CREATED,
        )
        .await
    }
}

impl TestApp {
    /// Stores a QuickBooks connection on `user_id` as if OAuth had completed.
    pub async fn connect_quickbooks(&self, user_id: Uuid, expiry: DateTime<Utc>) {
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.state.db)
            .await
            .expect("load user")
            .expect("user exists");
        let mut active: user::ActiveModel = account.into();
        active.quickbooks_access_token = Set(Some("access-old".to_string()));
        active.quickbooks_refresh_token = Set(Some("refresh-old".to_string()));
        active.quickbooks_token_expiry = Set(Some(expiry));
        active.quickbooks_realm_id = Set(Some(QB_REALM.to_string()));
        active.update(&*self.state.db).await.expect("store connection");
    }
}

/// Points the QuickBooks integration at a mock server.
pub fn quickbooks_against(cfg: &mut AppConfig, server_uri: &str) {
    cfg.quickbooks.client_id = "qb-client".to_string();
    cfg.quickbooks.client_secret = "qb-secret".to_string();
    cfg.quickbooks.redirect_url = "http://localhost/callback".to_string();
    cfg.quickbooks.token_url = format!("{}/oauth2/v1/tokens/bearer", server_uri);
    cfg.quickbooks.api_base = Some(server_uri.to_string());
    cfg.quickbooks.refresh_window_secs = 1800;
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}

/// Reads a money field whether it serialized as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal: {}", other),
    }
}
