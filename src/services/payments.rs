use crate::{
    entities::{order, order_payment},
    errors::ServiceError,
    events::{Event, EventSender},
    models::PaymentType,
    services::{clean, inputs::non_negative},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value)?;
    if value.is_zero() {
        return Err(ValidationError::new("zero_amount"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    #[validate(custom = "positive")]
    pub amount: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_type: PaymentType,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// What has been paid against an order and what is still owed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderBalance {
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub deposit: Decimal,
    pub payments_total: Decimal,
    pub payment_count: usize,
    pub balance_due: Decimal,
}

impl OrderBalance {
    pub fn compute(order: &order::Model, payments: &[order_payment::Model]) -> Self {
        let payments_total: Decimal = payments.iter().map(|p| p.amount).sum();
        Self {
            order_id: order.id,
            total_amount: order.total_amount,
            deposit: order.deposit,
            payments_total,
            payment_count: payments.len(),
            balance_due: order.total_amount - order.deposit - payments_total,
        }
    }
}

#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn find_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Records a payment against an order.
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn create_payment(
        &self,
        order_id: Uuid,
        request: CreatePaymentRequest,
        actor: Option<Uuid>,
    ) -> Result<order_payment::Model, ServiceError> {
        request.validate()?;
        self.find_order(order_id).await?;

        let now = Utc::now();
        let payment = order_payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            amount: Set(request.amount),
            payment_date: Set(request.payment_date.unwrap_or(now)),
            payment_type: Set(request.payment_type),
            transaction_id: Set(clean(request.transaction_id)),
            notes: Set(clean(request.notes)),
            created_by_id: Set(actor),
            created_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        counter!("printshop.payments.recorded", 1, "type" => payment.payment_type.to_string());
        info!(order_id = %order_id, payment_id = %payment.id, "Payment recorded");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::PaymentRecorded {
                    order_id,
                    payment_id: payment.id,
                })
                .await;
        }
        Ok(payment)
    }

    pub async fn list_payments(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_payment::Model>, ServiceError> {
        self.find_order(order_id).await?;
        Ok(order_payment::Entity::find()
            .filter(order_payment::Column::OrderId.eq(order_id))
            .order_by_asc(order_payment::Column::PaymentDate)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_payment(&self, payment_id: Uuid) -> Result<(), ServiceError> {
        let result = order_payment::Entity::delete_by_id(payment_id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Payment {} not found",
                payment_id
            )));
        }
        info!(payment_id = %payment_id, "Payment deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn order_balance(&self, order_id: Uuid) -> Result<OrderBalance, ServiceError> {
        let order = self.find_order(order_id).await?;
        let payments = order_payment::Entity::find()
            .filter(order_payment::Column::OrderId.eq(order_id))
            .all(&*self.db_pool)
            .await?;
        Ok(OrderBalance::compute(&order, &payments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use rust_decimal_macros::dec;

    fn order(total: Decimal, deposit: Decimal) -> order::Model {
        let now = Utc::now();
        order::Model {
            id: Uuid::new_v4(),
            order_number: 1000,
            office_id: Uuid::new_v4(),
            work_order_id: None,
            status: OrderStatus::Pending,
            in_hands_date: None,
            date_invoiced: None,
            contact_email: None,
            purchase_order_number: None,
            total_cost: Decimal::ZERO,
            total_amount: total,
            deposit,
            notes: None,
            version: 1,
            created_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(order_id: Uuid, amount: Decimal) -> order_payment::Model {
        order_payment::Model {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_date: Utc::now(),
            payment_type: PaymentType::Check,
            transaction_id: None,
            notes: None,
            created_by_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn balance_subtracts_deposit_and_payments() {
        let o = order(dec!(250.00), dec!(50.00));
        let payments = vec![payment(o.id, dec!(75.50)), payment(o.id, dec!(24.50))];
        let balance = OrderBalance::compute(&o, &payments);
        assert_eq!(balance.payments_total, dec!(100.00));
        assert_eq!(balance.payment_count, 2);
        assert_eq!(balance.balance_due, dec!(100.00));
    }

    #[test]
    fn zero_payment_is_invalid() {
        let request = CreatePaymentRequest {
            amount: Decimal::ZERO,
            payment_date: None,
            payment_type: PaymentType::Cash,
            transaction_id: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }
}
