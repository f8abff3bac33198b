use crate::{
    entities::{
        office, order, order_item, shipping_info, typesetting, work_order, work_order_item,
        work_order_note,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderItemStatus, OrderStatus, StatusValue, WorkOrderItemStatus, WorkOrderStatus},
    services::{
        clean,
        inputs::{line_totals, non_negative, LineItemInput, NoteRequest, UpdateLineItemRequest},
        next_number, page_window,
        status::{announce_transition, record_transition, AppliedTransition, TrackedEntity, UpdateStatusRequest},
        Page,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderRequest {
    pub office_id: Uuid,
    pub date_in: Option<DateTime<Utc>>,
    pub in_hands_date: Option<DateTime<Utc>>,
    #[validate(length(max = 50))]
    pub estimate_number: Option<String>,
    #[validate(length(max = 50))]
    pub purchase_order_number: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    /// Defaults to the sum of item costs.
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    /// Defaults to the sum of item amounts.
    #[validate(custom = "non_negative")]
    pub total_amount: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub deposit: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderRequest {
    pub office_id: Option<Uuid>,
    pub date_in: Option<DateTime<Utc>>,
    pub in_hands_date: Option<DateTime<Utc>>,
    #[validate(length(max = 50))]
    pub estimate_number: Option<String>,
    #[validate(length(max = 50))]
    pub purchase_order_number: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub total_amount: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub deposit: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub work_order: work_order::Model,
    pub office: Option<office::Model>,
    pub items: Vec<work_order_item::Model>,
    pub notes_log: Vec<work_order_note::Model>,
    pub typesettings: Vec<typesetting::Model>,
    pub shipping_info: Option<shipping_info::Model>,
    /// The order this work order was promoted into, if any.
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub office_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Loads and overwrites a work order status inside `conn`, auditing any change.
pub(crate) async fn apply_work_order_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    target: WorkOrderStatus,
    actor: Option<Uuid>,
    note: Option<String>,
) -> Result<(work_order::Model, AppliedTransition<WorkOrderStatus>), ServiceError> {
    let existing = work_order::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", id)))?;

    let from = existing.status;
    let to = target;
    let applied = AppliedTransition { from, to };
    if !applied.changed() {
        return Ok((existing, applied));
    }

    let mut active: work_order::ActiveModel = existing.into();
    active.status = Set(to);
    active.updated_at = Set(Utc::now());
    let updated = active.update(conn).await?;

    record_transition(
        conn,
        TrackedEntity::WorkOrder,
        id,
        &from.to_string(),
        &to.to_string(),
        actor,
        note,
    )
    .await?;
    Ok((updated, applied))
}

fn work_order_item_model(
    work_order_id: Uuid,
    line: LineItemInput,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> work_order_item::ActiveModel {
    work_order_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        work_order_id: Set(work_order_id),
        item_number: Set(clean(line.item_number)),
        description: Set(line.description),
        quantity: Set(line.quantity),
        cost: Set(line.cost),
        amount: Set(line.amount),
        ink: Set(clean(line.ink)),
        other: Set(clean(line.other)),
        expected_date: Set(line.expected_date),
        status: Set(WorkOrderItemStatus::INITIAL),
        created_by_id: Set(actor),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
    number_base: i32,
}

impl WorkOrderService {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        event_sender: Option<Arc<EventSender>>,
        number_base: i32,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            number_base,
        }
    }

    #[instrument(skip(self, request), fields(office_id = %request.office_id, items = request.items.len()))]
    pub async fn create_work_order(
        &self,
        request: CreateWorkOrderRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let now = Utc::now();
        let (item_cost, item_amount) = line_totals(&request.items);

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for work order creation");
            ServiceError::DatabaseError(e)
        })?;

        if office::Entity::find_by_id(request.office_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::ValidationError(format!(
                "Office {} does not exist",
                request.office_id
            )));
        }

        let number = next_number::<work_order::Entity, _>(
            &txn,
            work_order::Column::WorkOrderNumber,
            self.number_base,
        )
        .await?;
        let id = Uuid::new_v4();

        let model = work_order::ActiveModel {
            id: Set(id),
            work_order_number: Set(number),
            office_id: Set(request.office_id),
            status: Set(WorkOrderStatus::INITIAL),
            date_in: Set(request.date_in.unwrap_or(now)),
            in_hands_date: Set(request.in_hands_date),
            estimate_number: Set(clean(request.estimate_number)),
            purchase_order_number: Set(clean(request.purchase_order_number)),
            contact_email: Set(clean(request.contact_email)),
            total_cost: Set(request.total_cost.unwrap_or(item_cost)),
            total_amount: Set(request.total_amount.unwrap_or(item_amount)),
            deposit: Set(request.deposit.unwrap_or(Decimal::ZERO)),
            notes: Set(clean(request.notes)),
            version: Set(1),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "Work order"))?;

        for line in request.items {
            work_order_item_model(id, line, actor, now).insert(&txn).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, work_order_id = %id, "Failed to commit work order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(work_order_id = %id, work_order_number = number, "Work order created");
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::WorkOrderCreated(id)).await;
        }
        Ok(model)
    }

    pub async fn find_work_order(&self, id: Uuid) -> Result<work_order::Model, ServiceError> {
        work_order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", id)))
    }

    async fn detail(&self, work_order: work_order::Model) -> Result<WorkOrderDetail, ServiceError> {
        let db = &*self.db_pool;
        let id = work_order.id;
        let office = office::Entity::find_by_id(work_order.office_id).one(db).await?;
        let items = work_order_item::Entity::find()
            .filter(work_order_item::Column::WorkOrderId.eq(id))
            .order_by_asc(work_order_item::Column::CreatedAt)
            .all(db)
            .await?;
        let notes_log = work_order_note::Entity::find()
            .filter(work_order_note::Column::WorkOrderId.eq(id))
            .order_by_asc(work_order_note::Column::CreatedAt)
            .all(db)
            .await?;
        let typesettings = typesetting::Entity::find()
            .filter(typesetting::Column::WorkOrderId.eq(id))
            .order_by_asc(typesetting::Column::DateIn)
            .all(db)
            .await?;
        let shipping_info = shipping_info::Entity::find()
            .filter(shipping_info::Column::WorkOrderId.eq(id))
            .one(db)
            .await?;
        let order_id = order::Entity::find()
            .filter(order::Column::WorkOrderId.eq(id))
            .one(db)
            .await?
            .map(|o| o.id);

        Ok(WorkOrderDetail {
            work_order,
            office,
            items,
            notes_log,
            typesettings,
            shipping_info,
            order_id,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_work_order(&self, id: Uuid) -> Result<WorkOrderDetail, ServiceError> {
        let work_order = self.find_work_order(id).await?;
        self.detail(work_order).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_number(&self, number: i32) -> Result<WorkOrderDetail, ServiceError> {
        let work_order = work_order::Entity::find()
            .filter(work_order::Column::WorkOrderNumber.eq(number))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order #{} not found", number)))?;
        self.detail(work_order).await
    }

    #[instrument(skip(self, filter))]
    pub async fn list_work_orders(
        &self,
        filter: WorkOrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<work_order::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query =
            work_order::Entity::find().order_by_desc(work_order::Column::WorkOrderNumber);
        if let Some(office_id) = filter.office_id {
            query = query.filter(work_order::Column::OfficeId.eq(office_id));
        }
        if let Some(status) = filter.status.as_deref() {
            let status = WorkOrderStatus::parse_requested(status)?;
            query = query.filter(work_order::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_work_order(
        &self,
        id: Uuid,
        request: UpdateWorkOrderRequest,
    ) -> Result<work_order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.find_work_order(id).await?;

        if let Some(office_id) = request.office_id {
            if office::Entity::find_by_id(office_id).one(db).await?.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Office {} does not exist",
                    office_id
                )));
            }
        }

        let version = existing.version;
        let mut active: work_order::ActiveModel = existing.into();
        if let Some(v) = request.office_id {
            active.office_id = Set(v);
        }
        if let Some(v) = request.date_in {
            active.date_in = Set(v);
        }
        if request.in_hands_date.is_some() {
            active.in_hands_date = Set(request.in_hands_date);
        }
        if request.estimate_number.is_some() {
            active.estimate_number = Set(clean(request.estimate_number));
        }
        if request.purchase_order_number.is_some() {
            active.purchase_order_number = Set(clean(request.purchase_order_number));
        }
        if request.contact_email.is_some() {
            active.contact_email = Set(clean(request.contact_email));
        }
        if let Some(v) = request.total_cost {
            active.total_cost = Set(v);
        }
        if let Some(v) = request.total_amount {
            active.total_amount = Set(v);
        }
        if let Some(v) = request.deposit {
            active.deposit = Set(v);
        }
        if request.notes.is_some() {
            active.notes = Set(clean(request.notes));
        }
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_work_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = work_order::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Work order"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Work order {} not found", id)));
        }
        info!(work_order_id = %id, "Work order deleted");
        Ok(())
    }

    /// Overwrites the work order status and audits the change.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order::Model, ServiceError> {
        request.validate()?;
        let target = WorkOrderStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let (model, applied) =
            apply_work_order_status(&txn, id, target, actor, clean(request.note)).await?;
        txn.commit().await?;

        if applied.changed() {
            announce_transition(
                self.event_sender.as_ref(),
                TrackedEntity::WorkOrder,
                id,
                &applied.from.to_string(),
                &applied.to.to_string(),
            )
            .await;
        }
        Ok(model)
    }

    pub async fn add_note(
        &self,
        work_order_id: Uuid,
        request: NoteRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order_note::Model, ServiceError> {
        request.validate()?;
        self.find_work_order(work_order_id).await?;
        Ok(work_order_note::ActiveModel {
            id: Set(Uuid::new_v4()),
            work_order_id: Set(work_order_id),
            note: Set(request.note.trim().to_string()),
            created_by_id: Set(actor),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?)
    }

    pub async fn list_notes(
        &self,
        work_order_id: Uuid,
    ) -> Result<Vec<work_order_note::Model>, ServiceError> {
        self.find_work_order(work_order_id).await?;
        Ok(work_order_note::Entity::find()
            .filter(work_order_note::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(work_order_note::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, line))]
    pub async fn add_item(
        &self,
        work_order_id: Uuid,
        line: LineItemInput,
        actor: Option<Uuid>,
    ) -> Result<work_order_item::Model, ServiceError> {
        line.validate()?;
        self.find_work_order(work_order_id).await?;
        Ok(work_order_item_model(work_order_id, line, actor, Utc::now())
            .insert(&*self.db_pool)
            .await?)
    }

    async fn find_item(&self, item_id: Uuid) -> Result<work_order_item::Model, ServiceError> {
        work_order_item::Entity::find_by_id(item_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order item {} not found", item_id)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateLineItemRequest,
    ) -> Result<work_order_item::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_item(item_id).await?;

        let mut active: work_order_item::ActiveModel = existing.into();
        if request.item_number.is_some() {
            active.item_number = Set(clean(request.item_number));
        }
        if let Some(v) = request.description {
            active.description = Set(v);
        }
        if let Some(v) = request.quantity {
            active.quantity = Set(v);
        }
        if let Some(v) = request.cost {
            active.cost = Set(v);
        }
        if let Some(v) = request.amount {
            active.amount = Set(v);
        }
        if request.ink.is_some() {
            active.ink = Set(clean(request.ink));
        }
        if request.other.is_some() {
            active.other = Set(clean(request.other));
        }
        if request.expected_date.is_some() {
            active.expected_date = Set(request.expected_date);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let result = work_order_item::Entity::delete_by_id(item_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Work order item"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Work order item {} not found",
                item_id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_item_status(
        &self,
        item_id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<work_order_item::Model, ServiceError> {
        request.validate()?;
        let target = WorkOrderItemStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let existing = work_order_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order item {} not found", item_id)))?;
        let from = existing.status;
        let to = target;
        if from == to {
            return Ok(existing);
        }

        let mut active: work_order_item::ActiveModel = existing.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        record_transition(
            &txn,
            TrackedEntity::WorkOrderItem,
            item_id,
            &from.to_string(),
            &to.to_string(),
            actor,
            clean(request.note),
        )
        .await?;
        txn.commit().await?;

        announce_transition(
            self.event_sender.as_ref(),
            TrackedEntity::WorkOrderItem,
            item_id,
            &from.to_string(),
            &to.to_string(),
        )
        .await;
        Ok(updated)
    }

    /// Promotes a work order into a new order. A work order promotes at most once.
    #[instrument(skip(self))]
    pub async fn convert_to_order(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let work_order = work_order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", id)))?;

        if let Some(existing) = order::Entity::find()
            .filter(order::Column::WorkOrderId.eq(id))
            .one(&txn)
            .await?
        {
            warn!(work_order_id = %id, order_id = %existing.id, "Work order already converted");
            return Err(ServiceError::Conflict(format!(
                "Work order {} was already converted to order #{}",
                work_order.work_order_number, existing.order_number
            )));
        }

        let now = Utc::now();
        let order_number =
            next_number::<order::Entity, _>(&txn, order::Column::OrderNumber, self.number_base)
                .await?;
        let order_id = Uuid::new_v4();

        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            office_id: Set(work_order.office_id),
            work_order_id: Set(Some(id)),
            status: Set(OrderStatus::INITIAL),
            in_hands_date: Set(work_order.in_hands_date),
            date_invoiced: Set(None),
            contact_email: Set(work_order.contact_email.clone()),
            purchase_order_number: Set(work_order.purchase_order_number.clone()),
            total_cost: Set(work_order.total_cost),
            total_amount: Set(work_order.total_amount),
            deposit: Set(work_order.deposit),
            notes: Set(work_order.notes.clone()),
            version: Set(1),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "Order"))?;

        let items = work_order_item::Entity::find()
            .filter(work_order_item::Column::WorkOrderId.eq(id))
            .order_by_asc(work_order_item::Column::CreatedAt)
            .all(&txn)
            .await?;
        for item in items {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                work_order_item_id: Set(Some(item.id)),
                item_number: Set(item.item_number),
                description: Set(item.description),
                quantity: Set(item.quantity),
                cost: Set(item.cost),
                amount: Set(item.amount),
                ink: Set(item.ink),
                other: Set(item.other),
                expected_date: Set(item.expected_date),
                status: Set(OrderItemStatus::INITIAL),
                created_by_id: Set(actor),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        typesetting::Entity::update_many()
            .col_expr(typesetting::Column::OrderId, Expr::value(order_id))
            .filter(typesetting::Column::WorkOrderId.eq(id))
            .exec(&txn)
            .await?;
        shipping_info::Entity::update_many()
            .col_expr(shipping_info::Column::OrderId, Expr::value(order_id))
            .filter(shipping_info::Column::WorkOrderId.eq(id))
            .exec(&txn)
            .await?;

        let note = Some(format!("Converted to order #{}", order_number));
        let (_, applied) =
            apply_work_order_status(&txn, id, WorkOrderStatus::Approved, actor, note).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, work_order_id = %id, "Failed to commit work order conversion");
            ServiceError::DatabaseError(e)
        })?;

        info!(work_order_id = %id, order_id = %order_id, order_number, "Work order converted");
        if applied.changed() {
            announce_transition(
                self.event_sender.as_ref(),
                TrackedEntity::WorkOrder,
                id,
                &applied.from.to_string(),
                &applied.to.to_string(),
            )
            .await;
        }
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::WorkOrderConverted {
                    work_order_id: id,
                    order_id,
                })
                .await;
        }
        Ok(order)
    }
}
