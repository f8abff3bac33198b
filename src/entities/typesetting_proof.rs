use crate::models::ProofMethod;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = TypesettingProof)]
#[sea_orm(table_name = "typesetting_proofs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub typesetting_id: Uuid,
    pub proof_number: i32,
    pub proof_method: ProofMethod,
    pub date_submitted: DateTime<Utc>,
    pub notes: Option<String>,
    pub approved: bool,
    pub created_by_id: Option<Uuid>,
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
    #[sea_orm(has_many = "super::typesetting_proof_artwork::Entity")]
    Artwork,
}

impl Related<super::typesetting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Typesetting.def()
    }
}

impl Related<super::typesetting_proof_artwork::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artwork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
