use crate::{
    entities::{company, office},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{clean, page_window, Page},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Company name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub quickbooks_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub quickbooks_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: company::Model,
    pub offices: Vec<office::Model>,
}

#[derive(Clone)]
pub struct CompanyService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl CompanyService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Rejects a QuickBooks id already held by another company.
    async fn ensure_quickbooks_id_free(
        &self,
        quickbooks_id: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query =
            company::Entity::find().filter(company::Column::QuickbooksId.eq(quickbooks_id));
        if let Some(id) = except {
            query = query.filter(company::Column::Id.ne(id));
        }
        if query.one(&*self.db_pool).await?.is_some() {
            warn!(quickbooks_id, "QuickBooks id already linked to a company");
            return Err(ServiceError::Conflict(format!(
                "A company with QuickBooks id {} already exists",
                quickbooks_id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_company(
        &self,
        request: CreateCompanyRequest,
    ) -> Result<company::Model, ServiceError> {
        request.validate()?;
        let quickbooks_id = clean(request.quickbooks_id);
        if let Some(qb) = quickbooks_id.as_deref() {
            self.ensure_quickbooks_id_free(qb, None).await?;
        }

        let now = Utc::now();
        let model = company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            quickbooks_id: Set(quickbooks_id),
            is_active: Set(request.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "Company"))?;

        info!(company_id = %model.id, "Company created");
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::CompanyCreated(model.id)).await;
        }
        Ok(model)
    }

    pub async fn find_company(&self, id: Uuid) -> Result<company::Model, ServiceError> {
        company::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Company {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_company(&self, id: Uuid) -> Result<CompanyDetail, ServiceError> {
        let company = self.find_company(id).await?;
        let offices = office::Entity::find()
            .filter(office::Column::CompanyId.eq(id))
            .order_by_asc(office::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(CompanyDetail { company, offices })
    }

    #[instrument(skip(self))]
    pub async fn list_companies(
        &self,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<Page<company::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query = company::Entity::find().order_by_asc(company::Column::Name);
        if let Some(term) = clean(search) {
            query = query.filter(company::Column::Name.contains(&term));
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

    #[instrument(skip(self, request))]
    pub async fn update_company(
        &self,
        id: Uuid,
        request: UpdateCompanyRequest,
    ) -> Result<company::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_company(id).await?;

        let mut active: company::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(qb) = request.quickbooks_id {
            let qb = clean(Some(qb));
            if let Some(value) = qb.as_deref() {
                self.ensure_quickbooks_id_free(value, Some(id)).await?;
            }
            active.quickbooks_id = Set(qb);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Company"))
    }

    /// Deletes a company. Companies that still own offices are refused.
    #[instrument(skip(self))]
    pub async fn delete_company(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = company::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Company"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Company {} not found", id)));
        }
        info!(company_id = %id, "Company deleted");
        Ok(())
    }
}
