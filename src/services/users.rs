use crate::{
    entities::{permission, role, role_permission, user, user_role},
    errors::ServiceError,
    services::{email::EmailService, page_window, Page},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const VERIFICATION_TTL_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn verification_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub send_verification: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignRolesRequest {
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: user::Model,
    pub roles: Vec<role::Model>,
}

/// Role names and permission names granted to a user, for token claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DatabaseConnection>,
    email: Option<EmailService>,
}

impl UserService {
    pub fn new(db_pool: Arc<DatabaseConnection>, email: Option<EmailService>) -> Self {
        Self { db_pool, email }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserDetail, ServiceError> {
        request.validate()?;
        let email = request.email.trim().to_ascii_lowercase();
        let db = &*self.db_pool;
        if user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let txn = db.begin().await?;
        user::ActiveModel {
            id: Set(id),
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            is_active: Set(true),
            email_verified: Set(false),
            verification_token: Set(None),
            verification_expires_at: Set(None),
            quickbooks_access_token: Set(None),
            quickbooks_refresh_token: Set(None),
            quickbooks_token_expiry: Set(None),
            quickbooks_realm_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "User"))?;

        for role_id in request.role_ids.iter().copied().collect::<BTreeSet<_>>() {
            if role::Entity::find_by_id(role_id).one(&txn).await?.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Role {} does not exist",
                    role_id
                )));
            }
            user_role::ActiveModel {
                user_id: Set(id),
                role_id: Set(role_id),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;
        info!(user_id = %id, "User created");

        if request.send_verification {
            if let Err(e) = self.send_verification(id).await {
                warn!(user_id = %id, error = %e, "Verification email not sent");
            }
        }
        self.get_user(id).await
    }

    pub async fn find_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserDetail, ServiceError> {
        let user = self.find_user(id).await?;
        let roles = role::Entity::find()
            .join(JoinType::InnerJoin, role::Relation::UserRole.def())
            .filter(user_role::Column::UserId.eq(id))
            .order_by_asc(role::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(UserDetail { user, roles })
    }

    pub async fn list_users(&self, page: u64, limit: u64) -> Result<Page<user::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let paginator = user::Entity::find()
            .order_by_asc(user::Column::Name)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<user::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_user(id).await?;
        let mut active: user::ActiveModel = existing.clone().into();

        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = request.email {
            let email = email.trim().to_ascii_lowercase();
            if email != existing.email {
                active.email = Set(email);
                active.email_verified = Set(false);
            }
        }
        if let Some(password) = request.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "User"))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = user::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "User"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Replaces the user's role set.
    #[instrument(skip(self, request))]
    pub async fn assign_roles(
        &self,
        user_id: Uuid,
        request: AssignRolesRequest,
    ) -> Result<UserDetail, ServiceError> {
        let txn = self.db_pool.begin().await?;
        if user::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(ServiceError::NotFound(format!("User {} not found", user_id)));
        }

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        for role_id in request.role_ids.into_iter().collect::<BTreeSet<_>>() {
            if role::Entity::find_by_id(role_id).one(&txn).await?.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Role {} does not exist",
                    role_id
                )));
            }
            user_role::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(role_id),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;
        self.get_user(user_id).await
    }

    /// Issues a fresh verification token and emails the link.
    #[instrument(skip(self))]
    pub async fn send_verification(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find_user(user_id).await?;
        if existing.email_verified {
            return Err(ServiceError::BadRequest("Email is already verified".to_string()));
        }
        let email = self
            .email
            .as_ref()
            .ok_or_else(|| ServiceError::InternalError("Email is not configured".to_string()))?;

        let token = verification_token();
        let (to, name) = (existing.email.clone(), existing.name.clone());
        let mut active: user::ActiveModel = existing.into();
        active.verification_token = Set(Some(token.clone()));
        active.verification_expires_at = Set(Some(Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS)));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;

        email.send_verification(&to, &name, &token).await
    }

    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<user::Model, ServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::BadRequest("Verification token is required".to_string()));
        }
        let existing = user::Entity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::BadRequest("Invalid verification token".to_string()))?;
        if existing
            .verification_expires_at
            .map_or(true, |expires| expires < Utc::now())
        {
            return Err(ServiceError::BadRequest("Verification token has expired".to_string()));
        }

        let mut active: user::ActiveModel = existing.into();
        active.email_verified = Set(true);
        active.verification_token = Set(None);
        active.verification_expires_at = Set(None);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Checks credentials for login. Unknown email, wrong password and inactive
    /// accounts all fail the same way.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<user::Model, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_ascii_lowercase()))
            .one(&*self.db_pool)
            .await?;
        match found {
            Some(u) if u.is_active && verify_password(password, &u.password_hash) => Ok(u),
            _ => Err(ServiceError::Unauthorized("Invalid email or password".to_string())),
        }
    }

    pub async fn grants(&self, user_id: Uuid) -> Result<Grants, ServiceError> {
        let db = &*self.db_pool;
        let roles = role::Entity::find()
            .join(JoinType::InnerJoin, role::Relation::UserRole.def())
            .filter(user_role::Column::UserId.eq(user_id))
            .all(db)
            .await?;
        let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
        let permissions = if role_ids.is_empty() {
            Vec::new()
        } else {
            permission::Entity::find()
                .join(JoinType::InnerJoin, permission::Relation::RolePermission.def())
                .filter(role_permission::Column::RoleId.is_in(role_ids))
                .all(db)
                .await?
        };

        let roles: BTreeSet<String> = roles.into_iter().map(|r| r.name).collect();
        let permissions: BTreeSet<String> = permissions.into_iter().map(|p| p.name).collect();
        Ok(Grants {
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn verification_tokens_are_random() {
        let a = verification_token();
        let b = verification_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
