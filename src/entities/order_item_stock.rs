use crate::models::StockStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Paper stock tracked against an order item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = OrderItemStock)]
#[sea_orm(table_name = "order_item_stocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_item_id: Uuid,
    pub paper_product_id: Option<Uuid>,
    pub stock_qty: i32,
    pub cost_per_m: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub stock_status: StockStatus,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_item::Entity",
        from = "Column::OrderItemId",
        to = "super::order_item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::paper_product::Entity",
        from = "Column::PaperProductId",
        to = "super::paper_product::Column::Id"
    )]
    PaperProduct,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::paper_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaperProduct.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
