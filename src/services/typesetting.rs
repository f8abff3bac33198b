use crate::{
    entities::{
        order, typesetting, typesetting_option, typesetting_proof, typesetting_proof_artwork,
        work_order,
    },
    errors::ServiceError,
    models::{ProofMethod, TypesettingStatus},
    services::{clean, inputs::non_negative},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTypesettingRequest {
    pub work_order_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub date_in: Option<DateTime<Utc>>,
    #[validate(length(max = 20))]
    pub time_in: Option<String>,
    #[validate(custom = "non_negative")]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub prep_time: Option<i32>,
    #[validate(length(max = 100))]
    pub plate_direction: Option<String>,
    pub follow_up_notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub options: Vec<OptionRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTypesettingRequest {
    pub date_in: Option<DateTime<Utc>>,
    #[validate(length(max = 20))]
    pub time_in: Option<String>,
    #[validate(custom = "non_negative")]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub prep_time: Option<i32>,
    #[validate(length(max = 100))]
    pub plate_direction: Option<String>,
    pub follow_up_notes: Option<String>,
    pub status: Option<TypesettingStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OptionRequest {
    #[validate(length(min = 1, max = 255))]
    pub option: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOptionRequest {
    #[validate(length(min = 1, max = 255))]
    pub option: Option<String>,
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ArtworkRequest {
    #[validate(length(min = 1, max = 1024))]
    pub file_url: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProofRequest {
    pub proof_method: ProofMethod,
    pub date_submitted: Option<DateTime<Utc>>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub artwork: Vec<ArtworkRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProofDetail {
    #[serde(flatten)]
    pub proof: typesetting_proof::Model,
    pub artwork: Vec<typesetting_proof_artwork::Model>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TypesettingDetail {
    #[serde(flatten)]
    pub typesetting: typesetting::Model,
    pub options: Vec<typesetting_option::Model>,
    pub proofs: Vec<ProofDetail>,
}

/// Which record a typesetting job hangs off when listing.
#[derive(Debug, Clone, Copy)]
pub enum TypesettingParent {
    WorkOrder(Uuid),
    Order(Uuid),
}

fn option_model(typesetting_id: Uuid, request: OptionRequest) -> typesetting_option::ActiveModel {
    typesetting_option::ActiveModel {
        id: Set(Uuid::new_v4()),
        typesetting_id: Set(typesetting_id),
        option: Set(request.option.trim().to_string()),
        selected: Set(request.selected),
        created_at: Set(Utc::now()),
    }
}

async fn insert_artwork<C: ConnectionTrait>(
    conn: &C,
    proof_id: Uuid,
    request: ArtworkRequest,
) -> Result<typesetting_proof_artwork::Model, ServiceError> {
    Ok(typesetting_proof_artwork::ActiveModel {
        id: Set(Uuid::new_v4()),
        proof_id: Set(proof_id),
        file_url: Set(request.file_url.trim().to_string()),
        description: Set(clean(request.description)),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?)
}

#[derive(Clone)]
pub struct TypesettingService {
    db_pool: Arc<DatabaseConnection>,
}

impl TypesettingService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Creates a typesetting job for exactly one work order or order.
    #[instrument(skip(self, request))]
    pub async fn create_typesetting(
        &self,
        request: CreateTypesettingRequest,
        actor: Option<Uuid>,
    ) -> Result<TypesettingDetail, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;

        match (request.work_order_id, request.order_id) {
            (Some(id), None) => {
                if work_order::Entity::find_by_id(id).one(&txn).await?.is_none() {
                    return Err(ServiceError::NotFound(format!("Work order {} not found", id)));
                }
            }
            (None, Some(id)) => {
                if order::Entity::find_by_id(id).one(&txn).await?.is_none() {
                    return Err(ServiceError::NotFound(format!("Order {} not found", id)));
                }
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "Typesetting needs exactly one of work_order_id or order_id".to_string(),
                ))
            }
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        typesetting::ActiveModel {
            id: Set(id),
            work_order_id: Set(request.work_order_id),
            order_id: Set(request.order_id),
            date_in: Set(request.date_in.unwrap_or(now)),
            time_in: Set(clean(request.time_in)),
            cost: Set(request.cost),
            prep_time: Set(request.prep_time),
            plate_direction: Set(clean(request.plate_direction)),
            follow_up_notes: Set(clean(request.follow_up_notes)),
            approved: Set(false),
            status: Set(TypesettingStatus::InProgress),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for option in request.options {
            option_model(id, option).insert(&txn).await?;
        }
        txn.commit().await?;

        info!(typesetting_id = %id, "Typesetting created");
        self.get_typesetting(id).await
    }

    async fn find_typesetting(&self, id: Uuid) -> Result<typesetting::Model, ServiceError> {
        typesetting::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Typesetting {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_typesetting(&self, id: Uuid) -> Result<TypesettingDetail, ServiceError> {
        let db = &*self.db_pool;
        let typesetting = self.find_typesetting(id).await?;
        let options = typesetting_option::Entity::find()
            .filter(typesetting_option::Column::TypesettingId.eq(id))
            .order_by_asc(typesetting_option::Column::CreatedAt)
            .all(db)
            .await?;
        let proofs = typesetting_proof::Entity::find()
            .filter(typesetting_proof::Column::TypesettingId.eq(id))
            .order_by_asc(typesetting_proof::Column::ProofNumber)
            .all(db)
            .await?;

        let proof_ids: Vec<Uuid> = proofs.iter().map(|p| p.id).collect();
        let mut artwork: HashMap<Uuid, Vec<typesetting_proof_artwork::Model>> = HashMap::new();
        if !proof_ids.is_empty() {
            for item in typesetting_proof_artwork::Entity::find()
                .filter(typesetting_proof_artwork::Column::ProofId.is_in(proof_ids))
                .order_by_asc(typesetting_proof_artwork::Column::CreatedAt)
                .all(db)
                .await?
            {
                artwork.entry(item.proof_id).or_default().push(item);
            }
        }

        let proofs = proofs
            .into_iter()
            .map(|proof| ProofDetail {
                artwork: artwork.remove(&proof.id).unwrap_or_default(),
                proof,
            })
            .collect();

        Ok(TypesettingDetail {
            typesetting,
            options,
            proofs,
        })
    }

    pub async fn list_for(
        &self,
        parent: TypesettingParent,
    ) -> Result<Vec<typesetting::Model>, ServiceError> {
        let query = match parent {
            TypesettingParent::WorkOrder(id) => {
                typesetting::Entity::find().filter(typesetting::Column::WorkOrderId.eq(id))
            }
            TypesettingParent::Order(id) => {
                typesetting::Entity::find().filter(typesetting::Column::OrderId.eq(id))
            }
        };
        Ok(query
            .order_by_asc(typesetting::Column::DateIn)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_typesetting(
        &self,
        id: Uuid,
        request: UpdateTypesettingRequest,
    ) -> Result<typesetting::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_typesetting(id).await?;
        let mut active: typesetting::ActiveModel = existing.into();
        if let Some(v) = request.date_in {
            active.date_in = Set(v);
        }
        if request.time_in.is_some() {
            active.time_in = Set(clean(request.time_in));
        }
        if request.cost.is_some() {
            active.cost = Set(request.cost);
        }
        if request.prep_time.is_some() {
            active.prep_time = Set(request.prep_time);
        }
        if request.plate_direction.is_some() {
            active.plate_direction = Set(clean(request.plate_direction));
        }
        if request.follow_up_notes.is_some() {
            active.follow_up_notes = Set(clean(request.follow_up_notes));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_typesetting(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = typesetting::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Typesetting {} not found", id)));
        }
        Ok(())
    }

    pub async fn add_option(
        &self,
        typesetting_id: Uuid,
        request: OptionRequest,
    ) -> Result<typesetting_option::Model, ServiceError> {
        request.validate()?;
        self.find_typesetting(typesetting_id).await?;
        Ok(option_model(typesetting_id, request)
            .insert(&*self.db_pool)
            .await?)
    }

    pub async fn update_option(
        &self,
        option_id: Uuid,
        request: UpdateOptionRequest,
    ) -> Result<typesetting_option::Model, ServiceError> {
        request.validate()?;
        let existing = typesetting_option::Entity::find_by_id(option_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Typesetting option {} not found", option_id))
            })?;
        let mut active: typesetting_option::ActiveModel = existing.into();
        if let Some(v) = request.option {
            active.option = Set(v.trim().to_string());
        }
        if let Some(v) = request.selected {
            active.selected = Set(v);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    pub async fn delete_option(&self, option_id: Uuid) -> Result<(), ServiceError> {
        let result = typesetting_option::Entity::delete_by_id(option_id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Typesetting option {} not found",
                option_id
            )));
        }
        Ok(())
    }

    /// Adds the next numbered proof, with any artwork references, and moves
    /// the job to `WaitingApproval`.
    #[instrument(skip(self, request))]
    pub async fn add_proof(
        &self,
        typesetting_id: Uuid,
        request: CreateProofRequest,
        actor: Option<Uuid>,
    ) -> Result<ProofDetail, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;
        let parent = typesetting::Entity::find_by_id(typesetting_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Typesetting {} not found", typesetting_id))
            })?;

        let current: Option<Option<i32>> = typesetting_proof::Entity::find()
            .select_only()
            .column_as(Expr::col(typesetting_proof::Column::ProofNumber).max(), "max_number")
            .filter(typesetting_proof::Column::TypesettingId.eq(typesetting_id))
            .into_tuple()
            .one(&txn)
            .await?;
        let proof_number = current.flatten().unwrap_or(0) + 1;

        let now = Utc::now();
        let proof = typesetting_proof::ActiveModel {
            id: Set(Uuid::new_v4()),
            typesetting_id: Set(typesetting_id),
            proof_number: Set(proof_number),
            proof_method: Set(request.proof_method),
            date_submitted: Set(request.date_submitted.unwrap_or(now)),
            notes: Set(clean(request.notes)),
            approved: Set(false),
            created_by_id: Set(actor),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut artwork = Vec::with_capacity(request.artwork.len());
        for item in request.artwork {
            artwork.push(insert_artwork(&txn, proof.id, item).await?);
        }

        if parent.status == TypesettingStatus::InProgress {
            let mut active: typesetting::ActiveModel = parent.into();
            active.status = Set(TypesettingStatus::WaitingApproval);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }
        txn.commit().await?;

        info!(typesetting_id = %typesetting_id, proof_number, "Proof added");
        Ok(ProofDetail { proof, artwork })
    }

    /// Marks a proof approved and the owning job approved.
    #[instrument(skip(self))]
    pub async fn approve_proof(&self, proof_id: Uuid) -> Result<TypesettingDetail, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let proof = typesetting_proof::Entity::find_by_id(proof_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Proof {} not found", proof_id)))?;
        let typesetting_id = proof.typesetting_id;
        let parent = typesetting::Entity::find_by_id(typesetting_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Typesetting {} not found", typesetting_id))
            })?;
        if parent.status == TypesettingStatus::Cancelled {
            return Err(ServiceError::InvalidStatus(
                "Cannot approve a proof on a cancelled typesetting job".to_string(),
            ));
        }

        let mut active: typesetting_proof::ActiveModel = proof.into();
        active.approved = Set(true);
        active.update(&txn).await?;

        let mut job: typesetting::ActiveModel = parent.into();
        job.approved = Set(true);
        job.status = Set(TypesettingStatus::Approved);
        job.updated_at = Set(Utc::now());
        job.update(&txn).await?;
        txn.commit().await?;

        info!(proof_id = %proof_id, typesetting_id = %typesetting_id, "Proof approved");
        self.get_typesetting(typesetting_id).await
    }

    pub async fn add_artwork(
        &self,
        proof_id: Uuid,
        request: ArtworkRequest,
    ) -> Result<typesetting_proof_artwork::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        if typesetting_proof::Entity::find_by_id(proof_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!("Proof {} not found", proof_id)));
        }
        insert_artwork(db, proof_id, request).await
    }
}
