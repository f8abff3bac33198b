use crate::models::{InvoiceStatus, QuickbooksSyncStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Invoice)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: i32,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub date_issued: DateTime<Utc>,
    pub date_due: Option<DateTime<Utc>>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub quickbooks_invoice_id: Option<String>,
    pub quickbooks_sync_status: QuickbooksSyncStatus,
    pub quickbooks_sync_error: Option<String>,
    pub quickbooks_synced_at: Option<DateTime<Utc>>,
    pub sync_attempts: i32,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItem,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
