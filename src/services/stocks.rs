//! Paper stock lines attached to order items and work order items.

use crate::{
    entities::{order_item, order_item_stock, paper_product, work_order_item, work_order_item_stock},
    errors::ServiceError,
    events::EventSender,
    models::{StatusValue, StockStatus},
    services::{
        clean,
        inputs::non_negative,
        status::{announce_transition, record_transition, TrackedEntity, UpdateStatusRequest},
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStockRequest {
    pub paper_product_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stock_qty: i32,
    #[validate(custom = "non_negative")]
    pub cost_per_m: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStockRequest {
    pub paper_product_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stock_qty: Option<i32>,
    #[validate(custom = "non_negative")]
    pub cost_per_m: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Cost of a stock line priced per thousand sheets.
pub(crate) fn extended_cost(stock_qty: i32, cost_per_m: Option<Decimal>) -> Option<Decimal> {
    cost_per_m.map(|per_m| (Decimal::from(stock_qty) * per_m / Decimal::from(1000)).round_dp(2))
}

async fn ensure_paper_product<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(id) = id {
        if paper_product::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Paper product {} does not exist",
                id
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl StockService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_order_item_stock(
        &self,
        order_item_id: Uuid,
        request: CreateStockRequest,
        actor: Option<Uuid>,
    ) -> Result<order_item_stock::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        if order_item::Entity::find_by_id(order_item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Order item {} not found",
                order_item_id
            )));
        }
        ensure_paper_product(db, request.paper_product_id).await?;

        let now = Utc::now();
        let model = order_item_stock::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_item_id: Set(order_item_id),
            paper_product_id: Set(request.paper_product_id),
            stock_qty: Set(request.stock_qty),
            cost_per_m: Set(request.cost_per_m),
            total_cost: Set(request
                .total_cost
                .or_else(|| extended_cost(request.stock_qty, request.cost_per_m))),
            supplier: Set(clean(request.supplier)),
            ordered_date: Set(request.ordered_date),
            expected_date: Set(request.expected_date),
            received_date: Set(None),
            notes: Set(clean(request.notes)),
            stock_status: Set(StockStatus::INITIAL),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        info!(stock_id = %model.id, order_item_id = %order_item_id, "Order item stock created");
        Ok(model)
    }

    pub async fn list_order_item_stocks(
        &self,
        order_item_id: Uuid,
    ) -> Result<Vec<order_item_stock::Model>, ServiceError> {
        Ok(order_item_stock::Entity::find()
            .filter(order_item_stock::Column::OrderItemId.eq(order_item_id))
            .order_by_asc(order_item_stock::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn find_order_item_stock(
        &self,
        id: Uuid,
    ) -> Result<order_item_stock::Model, ServiceError> {
        order_item_stock::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item stock {} not found", id)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_order_item_stock(
        &self,
        id: Uuid,
        request: UpdateStockRequest,
    ) -> Result<order_item_stock::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_order_item_stock(id).await?;
        ensure_paper_product(&*self.db_pool, request.paper_product_id).await?;

        let qty = request.stock_qty.unwrap_or(existing.stock_qty);
        let per_m = request.cost_per_m.or(existing.cost_per_m);
        let recompute = request.stock_qty.is_some() || request.cost_per_m.is_some();

        let mut active: order_item_stock::ActiveModel = existing.into();
        if request.paper_product_id.is_some() {
            active.paper_product_id = Set(request.paper_product_id);
        }
        active.stock_qty = Set(qty);
        active.cost_per_m = Set(per_m);
        if request.total_cost.is_some() {
            active.total_cost = Set(request.total_cost);
        } else if recompute {
            active.total_cost = Set(extended_cost(qty, per_m));
        }
        if request.supplier.is_some() {
            active.supplier = Set(clean(request.supplier));
        }
        if request.ordered_date.is_some() {
            active.ordered_date = Set(request.ordered_date);
        }
        if request.expected_date.is_some() {
            active.expected_date = Set(request.expected_date);
        }
        if request.received_date.is_some() {
            active.received_date = Set(request.received_date);
        }
        if request.notes.is_some() {
            active.notes = Set(clean(request.notes));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Overwrites the status of an order item stock line and audits the change.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_order_item_stock_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<order_item_stock::Model, ServiceError> {
        request.validate()?;
        let target = StockStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let existing = order_item_stock::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item stock {} not found", id)))?;
        let from = existing.stock_status;
        let to = target;
        if from == to {
            return Ok(existing);
        }

        let mut active: order_item_stock::ActiveModel = existing.into();
        active.stock_status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        record_transition(
            &txn,
            TrackedEntity::OrderItemStock,
            id,
            &from.to_string(),
            &to.to_string(),
            actor,
            clean(request.note),
        )
        .await?;
        txn.commit().await?;

        announce_transition(
            self.event_sender.as_ref(),
            TrackedEntity::OrderItemStock,
            id,
            &from.to_string(),
            &to.to_string(),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_order_item_stock(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = order_item_stock::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Order item stock {} not found",
                id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_work_order_item_stock(
        &self,
        work_order_item_id: Uuid,
        request: CreateStockRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order_item_stock::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        if work_order_item::Entity::find_by_id(work_order_item_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "Work order item {} not found",
                work_order_item_id
            )));
        }
        ensure_paper_product(db, request.paper_product_id).await?;

        let now = Utc::now();
        let model = work_order_item_stock::ActiveModel {
            id: Set(Uuid::new_v4()),
            work_order_item_id: Set(work_order_item_id),
            paper_product_id: Set(request.paper_product_id),
            stock_qty: Set(request.stock_qty),
            cost_per_m: Set(request.cost_per_m),
            total_cost: Set(request
                .total_cost
                .or_else(|| extended_cost(request.stock_qty, request.cost_per_m))),
            supplier: Set(clean(request.supplier)),
            ordered_date: Set(request.ordered_date),
            expected_date: Set(request.expected_date),
            received_date: Set(None),
            notes: Set(clean(request.notes)),
            stock_status: Set(StockStatus::INITIAL),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        info!(stock_id = %model.id, work_order_item_id = %work_order_item_id, "Work order item stock created");
        Ok(model)
    }

    pub async fn list_work_order_item_stocks(
        &self,
        work_order_item_id: Uuid,
    ) -> Result<Vec<work_order_item_stock::Model>, ServiceError> {
        Ok(work_order_item_stock::Entity::find()
            .filter(work_order_item_stock::Column::WorkOrderItemId.eq(work_order_item_id))
            .order_by_asc(work_order_item_stock::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn find_work_order_item_stock(
        &self,
        id: Uuid,
    ) -> Result<work_order_item_stock::Model, ServiceError> {
        work_order_item_stock::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Work order item stock {} not found", id))
            })
    }

    #[instrument(skip(self, request))]
    pub async fn update_work_order_item_stock(
        &self,
        id: Uuid,
        request: UpdateStockRequest,
    ) -> Result<work_order_item_stock::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_work_order_item_stock(id).await?;
        ensure_paper_product(&*self.db_pool, request.paper_product_id).await?;

        let qty = request.stock_qty.unwrap_or(existing.stock_qty);
        let per_m = request.cost_per_m.or(existing.cost_per_m);
        let recompute = request.stock_qty.is_some() || request.cost_per_m.is_some();

        let mut active: work_order_item_stock::ActiveModel = existing.into();
        if request.paper_product_id.is_some() {
            active.paper_product_id = Set(request.paper_product_id);
        }
        active.stock_qty = Set(qty);
        active.cost_per_m = Set(per_m);
        if request.total_cost.is_some() {
            active.total_cost = Set(request.total_cost);
        } else if recompute {
            active.total_cost = Set(extended_cost(qty, per_m));
        }
        if request.supplier.is_some() {
            active.supplier = Set(clean(request.supplier));
        }
        if request.ordered_date.is_some() {
            active.ordered_date = Set(request.ordered_date);
        }
        if request.expected_date.is_some() {
            active.expected_date = Set(request.expected_date);
        }
        if request.received_date.is_some() {
            active.received_date = Set(request.received_date);
        }
        if request.notes.is_some() {
            active.notes = Set(clean(request.notes));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_work_order_item_stock_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order_item_stock::Model, ServiceError> {
        request.validate()?;
        let target = StockStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let existing = work_order_item_stock::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Work order item stock {} not found", id))
            })?;
        let from = existing.stock_status;
        let to = target;
        if from == to {
            return Ok(existing);
        }

        let mut active: work_order_item_stock::ActiveModel = existing.into();
        active.stock_status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        record_transition(
            &txn,
            TrackedEntity::WorkOrderItemStock,
            id,
            &from.to_string(),
            &to.to_string(),
            actor,
            clean(request.note),
        )
        .await?;
        txn.commit().await?;

        announce_transition(
            self.event_sender.as_ref(),
            TrackedEntity::WorkOrderItemStock,
            id,
            &from.to_string(),
            &to.to_string(),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_work_order_item_stock(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = work_order_item_stock::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Work order item stock {} not found",
                id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn extended_cost_prices_per_thousand() {
        assert_eq!(extended_cost(2500, Some(dec!(42.00))), Some(dec!(105.00)));
        assert_eq!(extended_cost(333, Some(dec!(10))), Some(dec!(3.33)));
        assert_eq!(extended_cost(100, None), None);
    }
}
