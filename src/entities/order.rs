use crate::models::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Order)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: i32,
    pub office_id: Uuid,
    /// Set when the order was promoted from a work order.
    #[sea_orm(unique)]
    pub work_order_id: Option<Uuid>,
    pub status: OrderStatus,
    pub in_hands_date: Option<DateTime<Utc>>,
    pub date_invoiced: Option<DateTime<Utc>>,
    pub contact_email: Option<String>,
    pub purchase_order_number: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_order::Column::Id"
    )]
    WorkOrder,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
    #[sea_orm(has_many = "super::order_note::Entity")]
    OrderNote,
    #[sea_orm(has_many = "super::order_payment::Entity")]
    OrderPayment,
    #[sea_orm(has_one = "super::invoice::Entity")]
    Invoice,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl Related<super::order_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderNote.def()
    }
}

impl Related<super::order_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPayment.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
