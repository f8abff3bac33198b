use crate::models::WorkOrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = WorkOrder)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub work_order_number: i32,
    pub office_id: Uuid,
    pub status: WorkOrderStatus,
    pub date_in: DateTime<Utc>,
    pub in_hands_date: Option<DateTime<Utc>>,
    pub estimate_number: Option<String>,
    pub purchase_order_number: Option<String>,
    pub contact_email: Option<String>,
    pub total_cost: Decimal,
    pub total_amount: Decimal,
    pub deposit: Decimal,
    pub notes: Option<String>,
    pub version: i32,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::office::Entity",
        from = "Column::OfficeId",
        to = "super::office::Column::Id"
    )]
    Office,
    #[sea_orm(has_many = "super::work_order_item::Entity")]
    WorkOrderItem,
    #[sea_orm(has_many = "super::work_order_note::Entity")]
    WorkOrderNote,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl Related<super::work_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderItem.def()
    }
}

impl Related<super::work_order_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderNote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
