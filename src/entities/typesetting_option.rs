use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = TypesettingOption)]
#[sea_orm(table_name = "typesetting_options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub typesetting_id: Uuid,
    pub option: String,
    pub selected: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::typesetting::Entity",
        from = "Column::TypesettingId",
        to = "super::typesetting::Column::Id"
    )]
    Typesetting,
}

impl Related<super::typesetting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Typesetting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
