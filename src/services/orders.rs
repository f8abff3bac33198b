use crate::{
    entities::{
        invoice, office, order, order_item, order_note, order_payment, shipping_info, typesetting,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderItemStatus, OrderStatus, StatusValue},
    services::{
        clean,
        inputs::{line_totals, non_negative, LineItemInput, NoteRequest, UpdateLineItemRequest},
        next_number, page_window,
        status::{announce_transition, record_transition, TrackedEntity, UpdateStatusRequest},
        Page,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub office_id: Uuid,
    pub in_hands_date: Option<DateTime<Utc>>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 50))]
    pub purchase_order_number: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
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
pub struct UpdateOrderRequest {
    pub office_id: Option<Uuid>,
    pub in_hands_date: Option<DateTime<Utc>>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 50))]
    pub purchase_order_number: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub total_amount: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub deposit: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub office: Option<office::Model>,
    pub items: Vec<order_item::Model>,
    pub notes_log: Vec<order_note::Model>,
    pub payments: Vec<order_payment::Model>,
    pub invoice: Option<invoice::Model>,
    pub typesettings: Vec<typesetting::Model>,
    pub shipping_info: Option<shipping_info::Model>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub office_id: Option<Uuid>,
    pub status: Option<String>,
}

fn order_item_model(
    order_id: Uuid,
    line: LineItemInput,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> order_item::ActiveModel {
    order_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        work_order_item_id: Set(None),
        item_number: Set(clean(line.item_number)),
        description: Set(line.description),
        quantity: Set(line.quantity),
        cost: Set(line.cost),
        amount: Set(line.amount),
        ink: Set(clean(line.ink)),
        other: Set(clean(line.other)),
        expected_date: Set(line.expected_date),
        status: Set(OrderItemStatus::INITIAL),
        created_by_id: Set(actor),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
    number_base: i32,
}

impl OrderService {
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
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        actor: Option<Uuid>,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let (item_cost, item_amount) = line_totals(&request.items);

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
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

        let number =
            next_number::<order::Entity, _>(&txn, order::Column::OrderNumber, self.number_base)
                .await?;
        let id = Uuid::new_v4();

        let model = order::ActiveModel {
            id: Set(id),
            order_number: Set(number),
            office_id: Set(request.office_id),
            work_order_id: Set(None),
            status: Set(OrderStatus::INITIAL),
            in_hands_date: Set(request.in_hands_date),
            date_invoiced: Set(None),
            contact_email: Set(clean(request.contact_email)),
            purchase_order_number: Set(clean(request.purchase_order_number)),
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
        .map_err(|e| ServiceError::from_write(e, "Order"))?;

        for line in request.items {
            order_item_model(id, line, actor, now).insert(&txn).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, order_number = number, "Order created");
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::OrderCreated(id)).await;
        }
        Ok(model)
    }

    pub async fn find_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    pub async fn list_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    async fn detail(&self, order: order::Model) -> Result<OrderDetail, ServiceError> {
        let db = &*self.db_pool;
        let id = order.id;
        let office = office::Entity::find_by_id(order.office_id).one(db).await?;
        let items = self.list_items(id).await?;
        let notes_log = order_note::Entity::find()
            .filter(order_note::Column::OrderId.eq(id))
            .order_by_asc(order_note::Column::CreatedAt)
            .all(db)
            .await?;
        let payments = order_payment::Entity::find()
            .filter(order_payment::Column::OrderId.eq(id))
            .order_by_asc(order_payment::Column::PaymentDate)
            .all(db)
            .await?;
        let invoice = invoice::Entity::find()
            .filter(invoice::Column::OrderId.eq(id))
            .one(db)
            .await?;
        let typesettings = typesetting::Entity::find()
            .filter(typesetting::Column::OrderId.eq(id))
            .order_by_asc(typesetting::Column::DateIn)
            .all(db)
            .await?;
        let shipping_info = shipping_info::Entity::find()
            .filter(shipping_info::Column::OrderId.eq(id))
            .one(db)
            .await?;

        Ok(OrderDetail {
            order,
            office,
            items,
            notes_log,
            payments,
            invoice,
            typesettings,
            shipping_info,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = self.find_order(id).await?;
        self.detail(order).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_number(&self, number: i32) -> Result<OrderDetail, ServiceError> {
        let order = order::Entity::find()
            .filter(order::Column::OrderNumber.eq(number))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order #{} not found", number)))?;
        self.detail(order).await
    }

    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<order::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query = order::Entity::find().order_by_desc(order::Column::OrderNumber);
        if let Some(office_id) = filter.office_id {
            query = query.filter(order::Column::OfficeId.eq(office_id));
        }
        if let Some(status) = filter.status.as_deref() {
            let status = OrderStatus::parse_requested(status)?;
            query = query.filter(order::Column::Status.eq(status));
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
    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.find_order(id).await?;

        if let Some(office_id) = request.office_id {
            if office::Entity::find_by_id(office_id).one(db).await?.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "Office {} does not exist",
                    office_id
                )));
            }
        }

        let version = existing.version;
        let mut active: order::ActiveModel = existing.into();
        if let Some(v) = request.office_id {
            active.office_id = Set(v);
        }
        if request.in_hands_date.is_some() {
            active.in_hands_date = Set(request.in_hands_date);
        }
        if request.contact_email.is_some() {
            active.contact_email = Set(clean(request.contact_email));
        }
        if request.purchase_order_number.is_some() {
            active.purchase_order_number = Set(clean(request.purchase_order_number));
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

    /// Deletes an order. Orders with an invoice are refused.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = order::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Order"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Order {} not found", id)));
        }
        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Moves an order to a new status. Sending the status email is left to the caller.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let target = OrderStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let existing = order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let from = existing.status;
        let to = target;
        if from == to {
            return Ok(existing);
        }

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        record_transition(
            &txn,
            TrackedEntity::Order,
            id,
            &from.to_string(),
            &to.to_string(),
            actor,
            clean(request.note),
        )
        .await?;
        txn.commit().await?;

        announce_transition(
            self.event_sender.as_ref(),
            TrackedEntity::Order,
            id,
            &from.to_string(),
            &to.to_string(),
        )
        .await;
        Ok(updated)
    }

    pub async fn add_note(
        &self,
        order_id: Uuid,
        request: NoteRequest,
        actor: Option<Uuid>,
    ) -> Result<order_note::Model, ServiceError> {
        request.validate()?;
        self.find_order(order_id).await?;
        Ok(order_note::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            note: Set(request.note.trim().to_string()),
            created_by_id: Set(actor),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?)
    }

    pub async fn list_notes(&self, order_id: Uuid) -> Result<Vec<order_note::Model>, ServiceError> {
        self.find_order(order_id).await?;
        Ok(order_note::Entity::find()
            .filter(order_note::Column::OrderId.eq(order_id))
            .order_by_asc(order_note::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, line))]
    pub async fn add_item(
        &self,
        order_id: Uuid,
        line: LineItemInput,
        actor: Option<Uuid>,
    ) -> Result<order_item::Model, ServiceError> {
        line.validate()?;
        self.find_order(order_id).await?;
        Ok(order_item_model(order_id, line, actor, Utc::now())
            .insert(&*self.db_pool)
            .await?)
    }

    pub async fn find_item(&self, item_id: Uuid) -> Result<order_item::Model, ServiceError> {
        order_item::Entity::find_by_id(item_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item {} not found", item_id)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateLineItemRequest,
    ) -> Result<order_item::Model, ServiceError> {
        request.validate()?;
        let existing = self.find_item(item_id).await?;

        let mut active: order_item::ActiveModel = existing.into();
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
        let result = order_item::Entity::delete_by_id(item_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "Order item"))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Order item {} not found", item_id)));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_item_status(
        &self,
        item_id: Uuid,
        request: UpdateStatusRequest,
        actor: Option<Uuid>,
    ) -> Result<order_item::Model, ServiceError> {
        request.validate()?;
        let target = OrderItemStatus::parse_requested(&request.status)?;

        let txn = self.db_pool.begin().await?;
        let existing = order_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item {} not found", item_id)))?;
        let from = existing.status;
        let to = target;
        if from == to {
            return Ok(existing);
        }

        let mut active: order_item::ActiveModel = existing.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        record_transition(
            &txn,
            TrackedEntity::OrderItem,
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
            TrackedEntity::OrderItem,
            item_id,
            &from.to_string(),
            &to.to_string(),
        )
        .await;
        Ok(updated)
    }

    /// Copies an order and its items into a fresh Pending order.
    #[instrument(skip(self))]
    pub async fn duplicate_order(
        &self,
        source_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<OrderDetail, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let source = order::Entity::find_by_id(source_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", source_id)))?;

        let now = Utc::now();
        let number =
            next_number::<order::Entity, _>(&txn, order::Column::OrderNumber, self.number_base)
                .await?;
        let id = Uuid::new_v4();

        order::ActiveModel {
            id: Set(id),
            order_number: Set(number),
            office_id: Set(source.office_id),
            work_order_id: Set(None),
            status: Set(OrderStatus::INITIAL),
            in_hands_date: Set(source.in_hands_date),
            date_invoiced: Set(None),
            contact_email: Set(source.contact_email.clone()),
            purchase_order_number: Set(source.purchase_order_number.clone()),
            total_cost: Set(source.total_cost),
            total_amount: Set(source.total_amount),
            deposit: Set(source.deposit),
            notes: Set(source.notes.clone()),
            version: Set(1),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "Order"))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(source_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&txn)
            .await?;
        for item in items {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(id),
                work_order_item_id: Set(None),
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

        txn.commit().await.map_err(|e| {
            error!(error = %e, source_id = %source_id, "Failed to commit order duplication");
            ServiceError::DatabaseError(e)
        })?;

        info!(source_id = %source_id, order_id = %id, order_number = number, "Order duplicated");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::OrderDuplicated {
                    source_id,
                    order_id: id,
                })
                .await;
        }
        self.get_order(id).await
    }
}
