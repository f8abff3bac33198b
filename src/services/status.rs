use crate::{
    entities::status_transition,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Kinds of records whose status changes are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackedEntity {
    Order,
    WorkOrder,
    OrderItem,
    WorkOrderItem,
    OrderItemStock,
    WorkOrderItemStock,
}

impl TrackedEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::WorkOrder => "work_order",
            Self::OrderItem => "order_item",
            Self::WorkOrderItem => "work_order_item",
            Self::OrderItemStock => "order_item_stock",
            Self::WorkOrderItemStock => "work_order_item_stock",
        }
    }
}

/// Body of every status-update procedure. The status arrives as text so that
/// values outside the enumeration are rejected with a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, max = 32, message = "Status is required"))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    /// Only honoured for order status changes.
    #[serde(default)]
    pub send_email: bool,
}

/// Outcome of a status write, used to decide whether to audit and notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransition<S> {
    pub from: S,
    pub to: S,
}

impl<S: PartialEq> AppliedTransition<S> {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Inserts the audit row for an applied transition. Call inside the same
/// transaction that wrote the new status.
pub(crate) async fn record_transition<C: ConnectionTrait>(
    conn: &C,
    entity: TrackedEntity,
    entity_id: Uuid,
    from: &str,
    to: &str,
    changed_by: Option<Uuid>,
    note: Option<String>,
) -> Result<(), ServiceError> {
    status_transition::ActiveModel {
        id: Set(Uuid::new_v4()),
        entity_type: Set(entity.as_str().to_string()),
        entity_id: Set(entity_id),
        from_status: Set(from.to_string()),
        to_status: Set(to.to_string()),
        changed_by_id: Set(changed_by),
        note: Set(note),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    counter!("printshop.status_transitions", 1, "entity" => entity.as_str());
    Ok(())
}

/// Emits the status-changed event after commit.
pub(crate) async fn announce_transition(
    events: Option<&Arc<EventSender>>,
    entity: TrackedEntity,
    entity_id: Uuid,
    from: &str,
    to: &str,
) {
    info!(
        entity = entity.as_str(),
        entity_id = %entity_id,
        from,
        to,
        "Status changed"
    );
    if let Some(sender) = events {
        sender
            .send_or_log(Event::StatusChanged {
                entity_type: entity.as_str().to_string(),
                entity_id,
                from: from.to_string(),
                to: to.to_string(),
            })
            .await;
    }
}

/// Read side of the transition audit log.
#[derive(Clone)]
pub struct StatusHistoryService {
    db_pool: Arc<DatabaseConnection>,
}

impl StatusHistoryService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Lists transitions for one record, oldest first.
    #[instrument(skip(self), fields(entity = entity.as_str(), entity_id = %entity_id))]
    pub async fn history(
        &self,
        entity: TrackedEntity,
        entity_id: Uuid,
    ) -> Result<Vec<status_transition::Model>, ServiceError> {
        let rows = status_transition::Entity::find()
            .filter(status_transition::Column::EntityType.eq(entity.as_str()))
            .filter(status_transition::Column::EntityId.eq(entity_id))
            .order_by_asc(status_transition::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_entity_labels_are_stable() {
        assert_eq!(TrackedEntity::Order.as_str(), "order");
        assert_eq!(
            TrackedEntity::WorkOrderItemStock.as_str(),
            "work_order_item_stock"
        );
    }

    #[test]
    fn send_email_defaults_to_false() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"Shipped"}"#).unwrap();
        assert!(!req.send_email);
        assert!(req.validate().is_ok());

        let empty: UpdateStatusRequest = serde_json::from_str(r#"{"status":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn applied_transition_reports_change() {
        let same = AppliedTransition { from: 1, to: 1 };
        assert!(!same.changed());
        let moved = AppliedTransition { from: 1, to: 2 };
        assert!(moved.changed());
    }
}
