//! Request shapes shared by work orders and orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

/// A line on a work order or order.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LineItemInput {
    #[validate(length(max = 50))]
    pub item_number: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Item description is required"))]
    pub description: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub cost: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub amount: Decimal,
    #[validate(length(max = 255))]
    pub ink: Option<String>,
    #[validate(length(max = 255))]
    pub other: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLineItemRequest {
    #[validate(length(max = 50))]
    pub item_number: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(custom = "non_negative")]
    pub cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub amount: Option<Decimal>,
    #[validate(length(max = 255))]
    pub ink: Option<String>,
    #[validate(length(max = 255))]
    pub other: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NoteRequest {
    #[validate(length(min = 1, max = 5000, message = "Note cannot be empty"))]
    pub note: String,
}

/// Sums `(cost, amount)` over a set of lines.
pub(crate) fn line_totals<'a, I>(lines: I) -> (Decimal, Decimal)
where
    I: IntoIterator<Item = &'a LineItemInput>,
{
    lines
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(cost, amount), line| {
            (cost + line.cost, amount + line.amount)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(cost: Decimal, amount: Decimal) -> LineItemInput {
        LineItemInput {
            item_number: None,
            description: "Business cards".into(),
            quantity: 500,
            cost,
            amount,
            ink: Some("4/0".into()),
            other: None,
            expected_date: None,
        }
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(line(dec!(-1), dec!(10)).validate().is_err());
        assert!(line(dec!(0), dec!(0)).validate().is_ok());
    }

    #[test]
    fn totals_sum_cost_and_amount() {
        let lines = vec![line(dec!(12.50), dec!(40)), line(dec!(7.25), dec!(19.99))];
        assert_eq!(line_totals(&lines), (dec!(19.75), dec!(59.99)));
    }

    #[test]
    fn blank_description_fails() {
        let mut l = line(dec!(1), dec!(2));
        l.description = String::new();
        assert!(l.validate().is_err());
    }
}
