use crate::{
    entities::{address, order, shipping_info, work_order},
    errors::ServiceError,
    models::ShippingMethod,
    services::{clean, inputs::non_negative},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shipping details keyed by the record they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingParent {
    WorkOrder(Uuid),
    Order(Uuid),
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ShippingInfoRequest {
    pub address_id: Option<Uuid>,
    pub shipping_method: Option<ShippingMethod>,
    #[validate(length(max = 255))]
    pub shipping_other: Option<String>,
    #[validate(custom = "non_negative")]
    pub shipping_cost: Option<Decimal>,
    pub ship_date: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[validate(range(min = 0))]
    pub number_of_packages: Option<i32>,
    #[validate(length(max = 100))]
    pub tracking_number: Option<String>,
    #[validate(length(max = 5000))]
    pub instructions: Option<String>,
}

#[derive(Clone)]
pub struct ShippingService {
    db_pool: Arc<DatabaseConnection>,
}

impl ShippingService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    async fn ensure_parent(&self, parent: ShippingParent) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let exists = match parent {
            ShippingParent::WorkOrder(id) => work_order::Entity::find_by_id(id).one(db).await?.is_some(),
            ShippingParent::Order(id) => order::Entity::find_by_id(id).one(db).await?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(match parent {
                ShippingParent::WorkOrder(id) => {
                    ServiceError::NotFound(format!("Work order {} not found", id))
                }
                ShippingParent::Order(id) => ServiceError::NotFound(format!("Order {} not found", id)),
            })
        }
    }

    pub async fn get_for(
        &self,
        parent: ShippingParent,
    ) -> Result<Option<shipping_info::Model>, ServiceError> {
        let query = match parent {
            ShippingParent::WorkOrder(id) => {
                shipping_info::Entity::find().filter(shipping_info::Column::WorkOrderId.eq(id))
            }
            ShippingParent::Order(id) => {
                shipping_info::Entity::find().filter(shipping_info::Column::OrderId.eq(id))
            }
        };
        Ok(query.one(&*self.db_pool).await?)
    }

    /// Creates the shipping record for a parent, or updates the existing one.
    #[instrument(skip(self, request))]
    pub async fn upsert(
        &self,
        parent: ShippingParent,
        request: ShippingInfoRequest,
        actor: Option<Uuid>,
    ) -> Result<shipping_info::Model, ServiceError> {
        request.validate()?;
        self.ensure_parent(parent).await?;
        let db = &*self.db_pool;
        if let Some(address_id) = request.address_id {
            if address::Entity::find_by_id(address_id).one(db).await?.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Address {} does not exist",
                    address_id
                )));
            }
        }

        let now = Utc::now();
        match self.get_for(parent).await? {
            Some(existing) => {
                let mut active: shipping_info::ActiveModel = existing.into();
                if request.address_id.is_some() {
                    active.address_id = Set(request.address_id);
                }
                if let Some(method) = request.shipping_method {
                    active.shipping_method = Set(method);
                }
                if request.shipping_other.is_some() {
                    active.shipping_other = Set(clean(request.shipping_other));
                }
                if request.shipping_cost.is_some() {
                    active.shipping_cost = Set(request.shipping_cost);
                }
                if request.ship_date.is_some() {
                    active.ship_date = Set(request.ship_date);
                }
                if request.estimated_delivery.is_some() {
                    active.estimated_delivery = Set(request.estimated_delivery);
                }
                if request.number_of_packages.is_some() {
                    active.number_of_packages = Set(request.number_of_packages);
                }
                if request.tracking_number.is_some() {
                    active.tracking_number = Set(clean(request.tracking_number));
                }
                if request.instructions.is_some() {
                    active.instructions = Set(clean(request.instructions));
                }
                active.updated_at = Set(now);
                Ok(active.update(db).await?)
            }
            None => {
                let (work_order_id, order_id) = match parent {
                    ShippingParent::WorkOrder(id) => (Some(id), None),
                    ShippingParent::Order(id) => (None, Some(id)),
                };
                let model = shipping_info::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    work_order_id: Set(work_order_id),
                    order_id: Set(order_id),
                    address_id: Set(request.address_id),
                    shipping_method: Set(request.shipping_method.unwrap_or(ShippingMethod::Other)),
                    shipping_other: Set(clean(request.shipping_other)),
                    shipping_cost: Set(request.shipping_cost),
                    ship_date: Set(request.ship_date),
                    estimated_delivery: Set(request.estimated_delivery),
                    number_of_packages: Set(request.number_of_packages),
                    tracking_number: Set(clean(request.tracking_number)),
                    instructions: Set(clean(request.instructions)),
                    created_by_id: Set(actor),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
                info!(shipping_info_id = %model.id, ?parent, "Shipping info created");
                Ok(model)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = shipping_info::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Shipping info {} not found",
                id
            )));
        }
        Ok(())
    }
}
