use crate::models::TypesettingStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Typesetting)]
#[sea_orm(table_name = "typesettings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub work_order_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub date_in: DateTime<Utc>,
    pub time_in: Option<String>,
    pub cost: Option<Decimal>,
    /// Minutes of prep work.
    pub prep_time: Option<i32>,
    pub plate_direction: Option<String>,
    pub follow_up_notes: Option<String>,
    pub approved: bool,
    pub status: TypesettingStatus,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::typesetting_option::Entity")]
    TypesettingOption,
    #[sea_orm(has_many = "super::typesetting_proof::Entity")]
    TypesettingProof,
}

impl Related<super::typesetting_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TypesettingOption.def()
    }
}

impl Related<super::typesetting_proof::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TypesettingProof.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
