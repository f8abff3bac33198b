use crate::{
    entities::paper_product,
    errors::ServiceError,
    services::{clean, inputs::non_negative, page_window, Page},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePaperProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(length(min = 1, max = 100))]
    pub paper_type: String,
    #[validate(length(max = 100))]
    pub finish: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub size: String,
    #[validate(range(min = 1))]
    pub weight_lb: Option<i32>,
    #[validate(custom = "non_negative")]
    pub caliper: Option<Decimal>,
    #[validate(length(max = 100))]
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePaperProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub paper_type: Option<String>,
    #[validate(length(max = 100))]
    pub finish: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub size: Option<String>,
    #[validate(range(min = 1))]
    pub weight_lb: Option<i32>,
    #[validate(custom = "non_negative")]
    pub caliper: Option<Decimal>,
    #[validate(length(max = 100))]
    pub reference_id: Option<String>,
}

#[derive(Clone)]
pub struct PaperProductService {
    db_pool: Arc<DatabaseConnection>,
}

impl PaperProductService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(brand = %request.brand))]
    pub async fn create_paper_product(
        &self,
        request: CreatePaperProductRequest,
    ) -> Result<paper_product::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let model = paper_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand: Set(request.brand.trim().to_string()),
            paper_type: Set(request.paper_type.trim().to_string()),
            finish: Set(clean(request.finish)),
            size: Set(request.size.trim().to_string()),
            weight_lb: Set(request.weight_lb),
            caliper: Set(request.caliper),
            reference_id: Set(clean(request.reference_id)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;
        info!(paper_product_id = %model.id, "Paper product created");
        Ok(model)
    }

    pub async fn get_paper_product(&self, id: Uuid) -> Result<paper_product::Model, ServiceError> {
        paper_product::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Paper product {} not found", id)))
    }

    /// Lists products, optionally matching `search` against brand, type and size.
    pub async fn list_paper_products(
        &self,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<Page<paper_product::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query = paper_product::Entity::find()
            .order_by_asc(paper_product::Column::Brand)
            .order_by_asc(paper_product::Column::PaperType);
        if let Some(term) = clean(search) {
            query = query.filter(
                Condition::any()
                    .add(paper_product::Column::Brand.contains(&term))
                    .add(paper_product::Column::PaperType.contains(&term))
                    .add(paper_product::Column::Size.contains(&term)),
            );
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
    pub async fn update_paper_product(
        &self,
        id: Uuid,
        request: UpdatePaperProductRequest,
    ) -> Result<paper_product::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_paper_product(id).await?;
        let mut active: paper_product::ActiveModel = existing.into();
        if let Some(v) = request.brand {
            active.brand = Set(v.trim().to_string());
        }
        if let Some(v) = request.paper_type {
            active.paper_type = Set(v.trim().to_string());
        }
        if request.finish.is_some() {
            active.finish = Set(clean(request.finish));
        }
        if let Some(v) = request.size {
            active.size = Set(v.trim().to_string());
        }
        if request.weight_lb.is_some() {
            active.weight_lb = Set(request.weight_lb);
        }
        if request.caliper.is_some() {
            active.caliper = Set(request.caliper);
        }
        if request.reference_id.is_some() {
            active.reference_id = Set(clean(request.reference_id));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_paper_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = paper_product::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Paper product"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Paper product {} not found", id)));
        }
        Ok(())
    }
}
