use crate::{
    entities::{invoice, invoice_item, office, order, order_item},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{InvoiceStatus, QuickbooksSyncStatus},
    services::{
        clean,
        email::EmailService,
        next_number, page_window,
        quickbooks::{
            client::{InvoiceLine, NewInvoice, Reference},
            QuickbooksSync,
        },
        Page,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn rate_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() || *value > Decimal::ONE {
        return Err(ValidationError::new("tax_rate_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    pub order_id: Uuid,
    pub date_due: Option<DateTime<Utc>>,
    /// Fraction between 0 and 1; defaults to the configured rate.
    #[validate(custom = "rate_in_range")]
    pub tax_rate: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub sync_to_quickbooks: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InvoiceStatusRequest {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SendInvoiceEmailRequest {
    /// Defaults to the order contact, then the office email.
    #[validate(email)]
    pub to: Option<String>,
    /// Invoice PDF, base64 encoded.
    pub pdf_base64: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InvoiceFilter {
    pub status: Option<String>,
    pub sync_status: Option<QuickbooksSyncStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub items: Vec<invoice_item::Model>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReconcileSummary {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Totals for an invoice over `items` at `tax_rate`; tax is rounded to cents.
pub fn compute_totals(items: &[order_item::Model], tax_rate: Decimal) -> InvoiceTotals {
    let subtotal: Decimal = items.iter().map(|i| i.amount).sum();
    let tax_amount = (subtotal * tax_rate).round_dp(2);
    InvoiceTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// Price of one unit of an order line.
pub fn unit_price(item: &order_item::Model) -> Decimal {
    if item.quantity > 0 {
        (item.amount / Decimal::from(item.quantity)).round_dp(4)
    } else {
        item.amount
    }
}

/// Converts the configured tax rate, falling back to zero for values that do
/// not fit a decimal.
pub fn configured_tax_rate(rate: f64) -> Decimal {
    Decimal::from_f64(rate).unwrap_or(Decimal::ZERO).round_dp(6)
}

/// QuickBooks representation of a local invoice.
pub fn quickbooks_invoice(
    invoice: &invoice::Model,
    items: &[invoice_item::Model],
    customer_id: String,
) -> NewInvoice {
    let mut line: Vec<InvoiceLine> = items
        .iter()
        .map(|item| {
            InvoiceLine::sales_item(
                item.description.clone(),
                item.quantity,
                item.unit_price,
                item.total,
            )
        })
        .collect();
    if !invoice.tax_amount.is_zero() {
        line.push(InvoiceLine::sales_item(
            "Sales tax".to_string(),
            1,
            invoice.tax_amount,
            invoice.tax_amount,
        ));
    }
    NewInvoice {
        customer_ref: Reference {
            value: customer_id,
            name: None,
        },
        doc_number: invoice.invoice_number.to_string(),
        txn_date: invoice.date_issued.date_naive(),
        due_date: invoice.date_due.map(|d| d.date_naive()),
        line,
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
    quickbooks: Option<Arc<QuickbooksSync>>,
    email: EmailService,
    number_base: i32,
    default_tax_rate: Decimal,
}

impl InvoiceService {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        event_sender: Option<Arc<EventSender>>,
        quickbooks: Option<Arc<QuickbooksSync>>,
        email: EmailService,
        number_base: i32,
        default_tax_rate: Decimal,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            quickbooks,
            email,
            number_base,
            default_tax_rate,
        }
    }

    /// Creates an invoice for an order and, when asked, pushes it to
    /// QuickBooks. The local invoice survives a failed push; its sync state
    /// records the outcome for the reconciliation job.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, sync = request.sync_to_quickbooks))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
        actor: Option<Uuid>,
    ) -> Result<InvoiceDetail, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let tax_rate = request.tax_rate.unwrap_or(self.default_tax_rate);

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for invoice creation");
            ServiceError::DatabaseError(e)
        })?;

        let source = order::Entity::find_by_id(request.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", request.order_id)))?;

        if invoice::Entity::find()
            .filter(invoice::Column::OrderId.eq(source.id))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Order {} already has an invoice",
                source.order_number
            )));
        }

        let lines = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(source.id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Order {} has no items to invoice",
                source.order_number
            )));
        }

        let totals = compute_totals(&lines, tax_rate);
        let number = next_number::<invoice::Entity, _>(
            &txn,
            invoice::Column::InvoiceNumber,
            self.number_base,
        )
        .await?;
        let id = Uuid::new_v4();
        let sync_status = if request.sync_to_quickbooks {
            QuickbooksSyncStatus::Pending
        } else {
            QuickbooksSyncStatus::NotRequested
        };

        let created = invoice::ActiveModel {
            id: Set(id),
            invoice_number: Set(number),
            order_id: Set(source.id),
            date_issued: Set(now),
            date_due: Set(request.date_due),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(tax_rate),
            tax_amount: Set(totals.tax_amount),
            total: Set(totals.total),
            status: Set(InvoiceStatus::Draft),
            notes: Set(clean(request.notes)),
            quickbooks_invoice_id: Set(None),
            quickbooks_sync_status: Set(sync_status),
            quickbooks_sync_error: Set(None),
            quickbooks_synced_at: Set(None),
            sync_attempts: Set(0),
            created_by_id: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "Invoice"))?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = invoice_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(id),
                order_item_id: Set(Some(line.id)),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price(line)),
                total: Set(line.amount),
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        let mut source_active: order::ActiveModel = source.into();
        source_active.date_invoiced = Set(Some(now));
        source_active.updated_at = Set(now);
        source_active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, invoice_id = %id, "Failed to commit invoice creation");
            ServiceError::DatabaseError(e)
        })?;

        counter!("printshop.invoices.created", 1);
        info!(invoice_id = %id, invoice_number = number, total = %totals.total, "Invoice created");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::InvoiceCreated {
                    invoice_id: id,
                    order_id: request.order_id,
                })
                .await;
        }

        let invoice = if request.sync_to_quickbooks {
            self.attempt_sync(created, &items, actor).await?
        } else {
            created
        };
        Ok(InvoiceDetail { invoice, items })
    }

    /// Pushes one invoice and records the outcome on it. Remote failures are
    /// stored rather than returned.
    async fn attempt_sync(
        &self,
        invoice: invoice::Model,
        items: &[invoice_item::Model],
        user_id: Option<Uuid>,
    ) -> Result<invoice::Model, ServiceError> {
        if invoice.quickbooks_sync_status == QuickbooksSyncStatus::Synced {
            return Ok(invoice);
        }
        match self.push_remote(&invoice, items, user_id).await {
            Ok(remote_id) => self.record_synced(invoice, remote_id).await,
            Err(e) => self.record_failure(invoice, e.to_string()).await,
        }
    }

    async fn push_remote(
        &self,
        invoice: &invoice::Model,
        items: &[invoice_item::Model],
        user_id: Option<Uuid>,
    ) -> Result<String, ServiceError> {
        let sync = self.quickbooks.as_ref().ok_or_else(|| {
            ServiceError::BadRequest("QuickBooks integration is not configured".to_string())
        })?;
        let user_id = user_id.ok_or_else(|| {
            ServiceError::Unauthorized("No QuickBooks user recorded for this invoice".to_string())
        })?;
        let source = order::Entity::find_by_id(invoice.order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", invoice.order_id)))?;

        let creds = sync.credentials(user_id).await?;
        let customer_id = sync.ensure_customer(&creds, source.office_id).await?;
        let created = sync
            .client()
            .create_invoice(&creds, &quickbooks_invoice(invoice, items, customer_id))
            .await?;
        Ok(created.id)
    }

    async fn record_synced(
        &self,
        invoice: invoice::Model,
        remote_id: String,
    ) -> Result<invoice::Model, ServiceError> {
        let id = invoice.id;
        let attempts = invoice.sync_attempts;
        let now = Utc::now();
        let mut active: invoice::ActiveModel = invoice.into();
        active.quickbooks_invoice_id = Set(Some(remote_id.clone()));
        active.quickbooks_sync_status = Set(QuickbooksSyncStatus::Synced);
        active.quickbooks_sync_error = Set(None);
        active.quickbooks_synced_at = Set(Some(now));
        active.sync_attempts = Set(attempts + 1);
        active.updated_at = Set(now);
        let updated = active.update(&*self.db_pool).await?;

        counter!("printshop.invoices.sync", 1, "outcome" => "synced");
        info!(invoice_id = %id, quickbooks_invoice_id = %remote_id, "Invoice synced to QuickBooks");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::InvoiceSynced {
                    invoice_id: id,
                    quickbooks_invoice_id: remote_id,
                })
                .await;
        }
        Ok(updated)
    }

    async fn record_failure(
        &self,
        invoice: invoice::Model,
        message: String,
    ) -> Result<invoice::Model, ServiceError> {
        let id = invoice.id;
        let attempts = invoice.sync_attempts;
        let mut active: invoice::ActiveModel = invoice.into();
        active.quickbooks_sync_status = Set(QuickbooksSyncStatus::Failed);
        active.quickbooks_sync_error = Set(Some(message.clone()));
        active.sync_attempts = Set(attempts + 1);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        counter!("printshop.invoices.sync", 1, "outcome" => "failed");
        warn!(invoice_id = %id, attempts = attempts + 1, error = %message, "Invoice sync failed");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::InvoiceSyncFailed {
                    invoice_id: id,
                    error: message,
                })
                .await;
        }
        Ok(updated)
    }

    /// Pushes an invoice to QuickBooks on demand with the caller's connection.
    #[instrument(skip(self))]
    pub async fn push_to_quickbooks(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<invoice::Model, ServiceError> {
        let found = self.find_invoice(id).await?;
        if found.quickbooks_sync_status == QuickbooksSyncStatus::Synced {
            return Ok(found);
        }
        let items = self.items_for(id).await?;
        let mut active: invoice::ActiveModel = found.into();
        active.quickbooks_sync_status = Set(QuickbooksSyncStatus::Pending);
        let pending = active.update(&*self.db_pool).await?;
        self.attempt_sync(pending, &items, Some(user_id)).await
    }

    /// Retries every pending or failed invoice that still has attempts left,
    /// using the connection of the user who created it.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, max_attempts: i32) -> Result<ReconcileSummary, ServiceError> {
        let due = invoice::Entity::find()
            .filter(
                Condition::any()
                    .add(invoice::Column::QuickbooksSyncStatus.eq(QuickbooksSyncStatus::Pending))
                    .add(invoice::Column::QuickbooksSyncStatus.eq(QuickbooksSyncStatus::Failed)),
            )
            .filter(invoice::Column::SyncAttempts.lt(max_attempts))
            .order_by_asc(invoice::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        let mut summary = ReconcileSummary::default();
        for pending in due {
            summary.attempted += 1;
            let items = self.items_for(pending.id).await?;
            let user = pending.created_by_id;
            let outcome = self.attempt_sync(pending, &items, user).await?;
            if outcome.quickbooks_sync_status == QuickbooksSyncStatus::Synced {
                summary.synced += 1;
            } else {
                summary.failed += 1;
            }
        }

        if summary.attempted > 0 {
            info!(?summary, "Invoice reconciliation finished");
        }
        Ok(summary)
    }

    pub async fn find_invoice(&self, id: Uuid) -> Result<invoice::Model, ServiceError> {
        invoice::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))
    }

    async fn items_for(&self, invoice_id: Uuid) -> Result<Vec<invoice_item::Model>, ServiceError> {
        Ok(invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceDetail, ServiceError> {
        let invoice = self.find_invoice(id).await?;
        let items = self.items_for(id).await?;
        Ok(InvoiceDetail { invoice, items })
    }

    pub async fn get_for_order(&self, order_id: Uuid) -> Result<InvoiceDetail, ServiceError> {
        let invoice = invoice::Entity::find()
            .filter(invoice::Column::OrderId.eq(order_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} has no invoice", order_id)))?;
        let items = self.items_for(invoice.id).await?;
        Ok(InvoiceDetail { invoice, items })
    }

    pub async fn list_invoices(
        &self,
        filter: InvoiceFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<invoice::Model>, ServiceError> {
        let (page, limit) = page_window(page, limit);
        let mut query = invoice::Entity::find();
        if let Some(status) = filter.status.as_deref() {
            let status = InvoiceStatus::from_str(status.trim()).map_err(|_| {
                ServiceError::ValidationError(format!("'{}' is not a valid invoice status", status))
            })?;
            query = query.filter(invoice::Column::Status.eq(status));
        }
        if let Some(sync_status) = filter.sync_status {
            query = query.filter(invoice::Column::QuickbooksSyncStatus.eq(sync_status));
        }

        let paginator = query
            .order_by_desc(invoice::Column::InvoiceNumber)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Sets the billing status. Cancelled invoices stay cancelled.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: InvoiceStatusRequest,
    ) -> Result<invoice::Model, ServiceError> {
        request.validate()?;
        let target = InvoiceStatus::from_str(request.status.trim()).map_err(|_| {
            ServiceError::ValidationError(format!(
                "'{}' is not a valid invoice status",
                request.status
            ))
        })?;

        let existing = self.find_invoice(id).await?;
        if existing.status == target {
            return Ok(existing);
        }
        if existing.status == InvoiceStatus::Cancelled {
            return Err(ServiceError::InvalidStatus(format!(
                "Invoice {} is cancelled",
                existing.invoice_number
            )));
        }

        let from = existing.status;
        let mut active: invoice::ActiveModel = existing.into();
        active.status = Set(target);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;
        info!(invoice_id = %id, from = %from, to = %target, "Invoice status changed");
        Ok(updated)
    }

    /// Deletes an invoice that never reached QuickBooks and clears the order's
    /// invoiced date.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let existing = invoice::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))?;
        if existing.quickbooks_invoice_id.is_some()
            || existing.quickbooks_sync_status == QuickbooksSyncStatus::Synced
        {
            return Err(ServiceError::Conflict(format!(
                "Invoice {} has been synced to QuickBooks and cannot be deleted",
                existing.invoice_number
            )));
        }

        invoice_item::Entity::delete_many()
            .filter(invoice_item::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        invoice::Entity::delete_by_id(id).exec(&txn).await?;
        order::Entity::update_many()
            .col_expr(order::Column::DateInvoiced, Expr::value(Option::<DateTime<Utc>>::None))
            .filter(order::Column::Id.eq(existing.order_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Emails the invoice, optionally with its PDF, and marks a draft as sent.
    #[instrument(skip(self, request))]
    pub async fn send_email(
        &self,
        id: Uuid,
        request: SendInvoiceEmailRequest,
    ) -> Result<invoice::Model, ServiceError> {
        request.validate()?;
        let detail = self.get_invoice(id).await?;
        let source = order::Entity::find_by_id(detail.invoice.order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", detail.invoice.order_id))
            })?;

        let recipient = match clean(request.to).or(source.contact_email.clone()) {
            Some(to) => to,
            None => office::Entity::find_by_id(source.office_id)
                .one(&*self.db_pool)
                .await?
                .and_then(|o| o.email)
                .ok_or_else(|| {
                    ServiceError::ValidationError(
                        "No recipient: the order and office have no email address".to_string(),
                    )
                })?,
        };

        let data = serde_json::to_value(&detail)
            .map_err(|e| ServiceError::InternalError(format!("Invoice payload: {}", e)))?;
        self.email
            .send_invoice(
                &recipient,
                detail.invoice.invoice_number,
                data,
                request.pdf_base64.as_deref(),
            )
            .await?;

        if detail.invoice.status != InvoiceStatus::Draft {
            return Ok(detail.invoice);
        }
        let mut active: invoice::ActiveModel = detail.invoice.into();
        active.status = Set(InvoiceStatus::Sent);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItemStatus;
    use rust_decimal_macros::dec;

    fn line(quantity: i32, amount: Decimal) -> order_item::Model {
        let now = Utc::now();
        order_item::Model {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            work_order_item_id: None,
            item_number: None,
            description: "Business cards".into(),
            quantity,
            cost: Decimal::ZERO,
            amount,
            ink: None,
            other: None,
            expected_date: None,
            status: OrderItemStatus::Pending,
            created_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn totals_round_tax_to_cents() {
        let items = vec![line(500, dec!(45.00)), line(2, dec!(19.99))];
        let totals = compute_totals(&items, dec!(0.0825));
        assert_eq!(totals.subtotal, dec!(64.99));
        assert_eq!(totals.tax_amount, dec!(5.36));
        assert_eq!(totals.total, dec!(70.35));
    }

    #[test]
    fn zero_rate_means_no_tax() {
        let totals = compute_totals(&[line(1, dec!(10))], Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total, dec!(10));
    }

    #[test]
    fn unit_price_divides_amount_by_quantity() {
        assert_eq!(unit_price(&line(500, dec!(45.00))), dec!(0.09));
        assert_eq!(unit_price(&line(0, dec!(12.00))), dec!(12.00));
    }

    #[test]
    fn configured_rate_converts_from_float() {
        assert_eq!(configured_tax_rate(0.0825), dec!(0.0825));
        assert_eq!(configured_tax_rate(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn rate_validation_rejects_out_of_range() {
        assert!(rate_in_range(&dec!(0.07)).is_ok());
        assert!(rate_in_range(&dec!(1)).is_ok());
        assert!(rate_in_range(&dec!(1.01)).is_err());
        assert!(rate_in_range(&dec!(-0.01)).is_err());
    }

    #[test]
    fn tax_becomes_its_own_quickbooks_line() {
        let now = Utc::now();
        let invoice = invoice::Model {
            id: Uuid::new_v4(),
            invoice_number: 1004,
            order_id: Uuid::new_v4(),
            date_issued: now,
            date_due: None,
            subtotal: dec!(100),
            tax_rate: dec!(0.05),
            tax_amount: dec!(5),
            total: dec!(105),
            status: InvoiceStatus::Draft,
            notes: None,
            quickbooks_invoice_id: None,
            quickbooks_sync_status: QuickbooksSyncStatus::Pending,
            quickbooks_sync_error: None,
            quickbooks_synced_at: None,
            sync_attempts: 0,
            created_by_id: None,
            created_at: now,
            updated_at: now,
        };
        let items = vec![invoice_item::Model {
            id: Uuid::new_v4(),
            invoice_id: invoice.id,
            order_item_id: None,
            description: "Flyers".into(),
            quantity: 4,
            unit_price: dec!(25),
            total: dec!(100),
        }];
        let remote = quickbooks_invoice(&invoice, &items, "77".into());
        assert_eq!(remote.doc_number, "1004");
        assert_eq!(remote.customer_ref.value, "77");
        assert_eq!(remote.line.len(), 2);
        assert_eq!(remote.line[1].amount, dec!(5));
    }
}
