use crate::{
    entities::{permission, role, role_permission},
    errors::ServiceError,
    services::clean,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Permission names, e.g. `orders:update`
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignPermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: role::Model,
    pub permissions: Vec<String>,
}

/// Resolves permission names to ids, creating rows for names not seen before.
async fn resolve_permissions<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<Uuid>, ServiceError> {
    let wanted: BTreeSet<String> = names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    for name in &wanted {
        if !name.contains(':') {
            return Err(ServiceError::ValidationError(format!(
                "Permission {} must look like resource:action",
                name
            )));
        }
    }

    let mut ids = Vec::with_capacity(wanted.len());
    for name in wanted {
        let existing = permission::Entity::find()
            .filter(permission::Column::Name.eq(name.clone()))
            .one(conn)
            .await?;
        let id = match existing {
            Some(p) => p.id,
            None => {
                permission::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name),
                    description: Set(None),
                }
                .insert(conn)
                .await?
                .id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

async fn replace_grants<C: ConnectionTrait>(
    conn: &C,
    role_id: Uuid,
    permission_ids: Vec<Uuid>,
) -> Result<(), ServiceError> {
    role_permission::Entity::delete_many()
        .filter(role_permission::Column::RoleId.eq(role_id))
        .exec(conn)
        .await?;
    for permission_id in permission_ids {
        role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct RoleService {
    db_pool: Arc<DatabaseConnection>,
}

impl RoleService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_role(&self, request: CreateRoleRequest) -> Result<RoleDetail, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;
        let role = role::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(clean(request.description)),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "Role"))?;

        let ids = resolve_permissions(&txn, &request.permissions).await?;
        replace_grants(&txn, role.id, ids).await?;
        txn.commit().await?;

        info!(role_id = %role.id, "Role created");
        self.get_role(role.id).await
    }

    async fn permission_names(&self, role_id: Uuid) -> Result<Vec<String>, ServiceError> {
        Ok(permission::Entity::find()
            .join(JoinType::InnerJoin, permission::Relation::RolePermission.def())
            .filter(role_permission::Column::RoleId.eq(role_id))
            .order_by_asc(permission::Column::Name)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect())
    }

    pub async fn get_role(&self, id: Uuid) -> Result<RoleDetail, ServiceError> {
        let role = role::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {} not found", id)))?;
        let permissions = self.permission_names(id).await?;
        Ok(RoleDetail { role, permissions })
    }

    /// Lists every role with its permission names.
    pub async fn list_roles(&self) -> Result<Vec<RoleDetail>, ServiceError> {
        let db = &*self.db_pool;
        let roles = role::Entity::find()
            .order_by_asc(role::Column::Name)
            .all(db)
            .await?;
        let names: HashMap<Uuid, String> = permission::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let mut grants: HashMap<Uuid, Vec<String>> = HashMap::new();
        for link in role_permission::Entity::find().all(db).await? {
            if let Some(name) = names.get(&link.permission_id) {
                grants.entry(link.role_id).or_default().push(name.clone());
            }
        }

        Ok(roles
            .into_iter()
            .map(|role| {
                let mut permissions = grants.remove(&role.id).unwrap_or_default();
                permissions.sort();
                RoleDetail { role, permissions }
            })
            .collect())
    }

    /// Replaces the role's permission set.
    #[instrument(skip(self, request))]
    pub async fn assign_permissions(
        &self,
        role_id: Uuid,
        request: AssignPermissionsRequest,
    ) -> Result<RoleDetail, ServiceError> {
        let txn = self.db_pool.begin().await?;
        if role::Entity::find_by_id(role_id).one(&txn).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Role {} not found", role_id)));
        }
        let ids = resolve_permissions(&txn, &request.permissions).await?;
        replace_grants(&txn, role_id, ids).await?;
        txn.commit().await?;
        self.get_role(role_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = role::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Role"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Role {} not found", id)));
        }
        Ok(())
    }

    pub async fn list_permissions(&self) -> Result<Vec<permission::Model>, ServiceError> {
        Ok(permission::Entity::find()
            .order_by_asc(permission::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }
}
