//! Seeds a fresh database with what the API needs to be usable
//!
//! Run with: cargo run --bin seed-data -- --admin-email admin@example.com --admin-password ...
//!
//! This creates:
//! - the built-in roles with their permissions
//! - the walk-in company and office used for counter sales
//! - an administrator account

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use tracing::info;
use uuid::Uuid;

use printshop_api::{
    auth::DEFAULT_ROLES,
    config::AppConfig,
    db,
    errors::ServiceError,
    services::{
        companies::{CompanyService, CreateCompanyRequest},
        offices::{CreateOfficeRequest, OfficeService},
        roles::{CreateRoleRequest, RoleService},
        users::{CreateUserRequest, UserService},
    },
};

#[derive(Parser)]
#[command(name = "seed-data", about = "Seed roles, the walk-in office and an admin user", version)]
struct Cli {
    #[arg(long, env = "APP__DATABASE_URL", help = "Database connection string")]
    database_url: String,
    #[arg(long, default_value = "admin@example.com", help = "Email for the admin account")]
    admin_email: String,
    #[arg(long, env = "SEED_ADMIN_PASSWORD", help = "Password for the admin account")]
    admin_password: String,
    #[arg(long, default_value = "Administrator")]
    admin_name: String,
    #[arg(long, default_value = "Walk-in Customer", help = "Name of the walk-in company and office")]
    walk_in_name: String,
    #[arg(long, help = "Skip running migrations first")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    let cli = Cli::parse();

    let cfg = AppConfig::new(
        cli.database_url.clone(),
        "seed-only-secret-not-used-for-tokens-000000".to_string(),
        "development".to_string(),
    );
    let pool = Arc::new(db::establish_connection_from_app_config(&cfg).await?);
    if !cli.skip_migrations {
        db::run_migrations(&pool).await?;
        info!("Migrations applied");
    }

    let role_ids = seed_roles(&RoleService::new(pool.clone())).await?;
    seed_walk_in(pool.clone(), &cli.walk_in_name).await?;

    let admin_role = role_ids
        .get(printshop_api::auth::ADMIN_ROLE)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("admin role missing after seeding"))?;
    let users = UserService::new(pool, None);
    match users
        .create_user(CreateUserRequest {
            name: cli.admin_name,
            email: cli.admin_email.clone(),
            password: cli.admin_password,
            role_ids: vec![admin_role],
            send_verification: false,
        })
        .await
    {
        Ok(detail) => info!(user_id = %detail.user.id, email = %cli.admin_email, "Admin user created"),
        Err(ServiceError::Conflict(_)) => info!(email = %cli.admin_email, "Admin user already exists"),
        Err(e) => return Err(e.into()),
    }

    info!("Seed complete");
    Ok(())
}

/// Creates missing built-in roles and returns every role id by name.
async fn seed_roles(roles: &RoleService) -> anyhow::Result<HashMap<String, Uuid>> {
    let mut by_name: HashMap<String, Uuid> = roles
        .list_roles()
        .await?
        .into_iter()
        .map(|detail| (detail.role.name, detail.role.id))
        .collect();

    for template in DEFAULT_ROLES.values() {
        if by_name.contains_key(template.name) {
            info!(role = template.name, "Role already present");
            continue;
        }
        let created = roles
            .create_role(CreateRoleRequest {
                name: template.name.to_string(),
                description: Some(template.description.to_string()),
                permissions: template.permissions.clone(),
            })
            .await?;
        info!(role = template.name, permissions = created.permissions.len(), "Role created");
        by_name.insert(created.role.name, created.role.id);
    }
    Ok(by_name)
}

async fn seed_walk_in(pool: Arc<db::DbPool>, name: &str) -> anyhow::Result<()> {
    let offices = OfficeService::new(pool.clone(), None);
    match offices.walk_in_office().await {
        Ok(office) => {
            info!(office_id = %office.id, "Walk-in office already present");
            return Ok(());
        }
        Err(ServiceError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let company = CompanyService::new(pool, None)
        .create_company(CreateCompanyRequest {
            name: name.to_string(),
            quickbooks_id: None,
            is_active: true,
        })
        .await?;
    let office = offices
        .create_office(
            CreateOfficeRequest {
                company_id: company.id,
                name: name.to_string(),
                phone: None,
                fax: None,
                email: None,
                is_active: true,
                is_walk_in_office: true,
                quickbooks_customer_id: None,
            },
            None,
        )
        .await?;
    info!(office_id = %office.id, "Walk-in office created");
    Ok(())
}
