use crate::{
    entities::{address, company, office},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{clean, page_window, Page},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOfficeRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Office name is required"))]
    pub name: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 40))]
    pub fax: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_walk_in_office: bool,
    #[validate(length(min = 1, max = 64))]
    pub quickbooks_customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOfficeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 40))]
    pub fax: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_walk_in_office: Option<bool>,
    #[validate(length(min = 1, max = 64))]
    pub quickbooks_customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OfficeDetail {
    #[serde(flatten)]
    pub office: office::Model,
    pub company: company::Model,
    pub addresses: Vec<address::Model>,
}

#[derive(Clone)]
pub struct OfficeService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl OfficeService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(company_id = %request.company_id))]
    pub async fn create_office(
        &self,
        request: CreateOfficeRequest,
        actor: Option<Uuid>,
    ) -> Result<office::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        if company::Entity::find_by_id(request.company_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::ValidationError(format!(
                "Company {} does not exist",
                request.company_id
            )));
        }

        let now = Utc::now();
        let model = office::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(request.company_id),
            name: Set(request.name.trim().to_string()),
            phone: Set(clean(request.phone)),
            fax: Set(clean(request.fax)),
            email: Set(clean(request.email)),
            is_active: Set(request.is_active),
            is_walk_in_office: Set(request.is_walk_in_office),
            quickbooks_customer_id: Set(clean(request.quickbooks_customer_id)),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_write(e, "Office"))?;

        info!(office_id = %model.id, "Office created");
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::OfficeCreated(model.id)).await;
        }
        Ok(model)
    }

    pub async fn find_office(&self, id: Uuid) -> Result<office::Model, ServiceError> {
        office::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Office {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_office(&self, id: Uuid) -> Result<OfficeDetail, ServiceError> {
        let db = &*self.db_pool;
        let office = self.find_office(id).await?;
        let company = company::Entity::find_by_id(office.company_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("Office {} has no company", office.id))
            })?;
        let addresses = office
            .find_related(address::Entity)
            .order_by_asc(address::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(OfficeDetail {
            office,
            company,
            addresses,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_offices(
        &self,
        company_id: Option<Uuid>,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<Page<office::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query = office::Entity::find().order_by_asc(office::Column::Name);
        if let Some(company_id) = company_id {
            query = query.filter(office::Column::CompanyId.eq(company_id));
        }
        if let Some(term) = clean(search) {
            query = query.filter(office::Column::Name.contains(&term));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// The office used for counter sales.
    #[instrument(skip(self))]
    pub async fn walk_in_office(&self) -> Result<office::Model, ServiceError> {
        office::Entity::find()
            .filter(office::Column::IsWalkInOffice.eq(true))
            .order_by_asc(office::Column::CreatedAt)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No walk-in office configured".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn update_office(
        &self,
        id: Uuid,
        request: UpdateOfficeRequest,
    ) -> Result<office::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_office(id).await?;

        let mut active: office::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.phone.is_some() {
            active.phone = Set(clean(request.phone));
        }
        if request.fax.is_some() {
            active.fax = Set(clean(request.fax));
        }
        if request.email.is_some() {
            active.email = Set(clean(request.email));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(walk_in) = request.is_walk_in_office {
            active.is_walk_in_office = Set(walk_in);
        }
        if request.quickbooks_customer_id.is_some() {
            active.quickbooks_customer_id = Set(clean(request.quickbooks_customer_id));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Office"))
    }

    #[instrument(skip(self))]
    pub async fn delete_office(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = office::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Office"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Office {} not found", id)));
        }
        info!(office_id = %id, "Office deleted");
        Ok(())
    }
}
