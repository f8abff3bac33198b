use crate::{
    entities::{address, office},
    errors::ServiceError,
    models::AddressType,
    services::clean,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_country() -> String {
    "US".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 255))]
    pub line1: String,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: String,
    #[serde(default = "default_country")]
    #[validate(length(min = 2, max = 100))]
    pub country: String,
    #[validate(length(max = 40))]
    pub telephone_number: Option<String>,
    pub address_type: AddressType,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 255))]
    pub line1: Option<String>,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 40))]
    pub telephone_number: Option<String>,
    pub address_type: Option<AddressType>,
}

#[derive(Clone)]
pub struct AddressService {
    db_pool: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_address(
        &self,
        office_id: Uuid,
        request: CreateAddressRequest,
    ) -> Result<address::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        office::Entity::find_by_id(office_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Office {} not found", office_id)))?;

        let now = Utc::now();
        let model = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            office_id: Set(office_id),
            line1: Set(request.line1),
            line2: Set(clean(request.line2)),
            city: Set(request.city),
            state: Set(request.state),
            zip_code: Set(request.zip_code),
            country: Set(request.country),
            telephone_number: Set(clean(request.telephone_number)),
            address_type: Set(request.address_type),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        Ok(model)
    }

    pub async fn list_for_office(&self, office_id: Uuid) -> Result<Vec<address::Model>, ServiceError> {
        Ok(address::Entity::find()
            .filter(address::Column::OfficeId.eq(office_id))
            .order_by_asc(address::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_address(
        &self,
        id: Uuid,
        request: UpdateAddressRequest,
    ) -> Result<address::Model, ServiceError> {
        request.validate()?;
        let existing = address::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Address {} not found", id)))?;

        let mut active: address::ActiveModel = existing.into();
        if let Some(v) = request.line1 {
            active.line1 = Set(v);
        }
        if request.line2.is_some() {
            active.line2 = Set(clean(request.line2));
        }
        if let Some(v) = request.city {
            active.city = Set(v);
        }
        if let Some(v) = request.state {
            active.state = Set(v);
        }
        if let Some(v) = request.zip_code {
            active.zip_code = Set(v);
        }
        if let Some(v) = request.country {
            active.country = Set(v);
        }
        if request.telephone_number.is_some() {
            active.telephone_number = Set(clean(request.telephone_number));
        }
        if let Some(v) = request.address_type {
            active.address_type = Set(v);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = address::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Address"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Address {} not found", id)));
        }
        Ok(())
    }
}
