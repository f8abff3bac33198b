use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Enumerated lifecycle status stored in a single column. Any member may be
/// written over any other, including backward moves; every change is audited
/// by the caller.
pub trait StatusValue: Copy + Eq + fmt::Display + FromStr + 'static {
    /// Label used in error messages and the transition audit log.
    const ENTITY: &'static str;

    /// Every member of the enumeration.
    const ALL: &'static [Self];

    /// Status a freshly created record starts in.
    const INITIAL: Self;

    /// Parses a requested status, rejecting values outside the enumeration.
    fn parse_requested(value: &str) -> Result<Self, crate::errors::ServiceError> {
        Self::from_str(value.trim()).map_err(|_| {
            let allowed = Self::ALL
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            crate::errors::ServiceError::ValidationError(format!(
                "'{}' is not a valid {} status (expected one of: {})",
                value,
                Self::ENTITY,
                allowed
            ))
        })
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(ascii_case_insensitive)]
pub enum WorkOrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl StatusValue for WorkOrderStatus {
    const ENTITY: &'static str = "work order";
    const ALL: &'static [Self] = &[Self::Pending, Self::Approved, Self::Cancelled];
    const INITIAL: Self = Self::Pending;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(ascii_case_insensitive)]
pub enum WorkOrderItemStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl StatusValue for WorkOrderItemStatus {
    const ENTITY: &'static str = "work order item";
    const ALL: &'static [Self] = &[Self::Pending, Self::Approved, Self::Cancelled];
    const INITIAL: Self = Self::Pending;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Invoiced")]
    Invoiced,
    #[sea_orm(string_value = "PaymentReceived")]
    PaymentReceived,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl StatusValue for OrderStatus {
    const ENTITY: &'static str = "order";
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Completed,
        Self::Shipped,
        Self::Invoiced,
        Self::PaymentReceived,
        Self::Cancelled,
    ];
    const INITIAL: Self = Self::Pending;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(ascii_case_insensitive)]
pub enum OrderItemStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Prepress")]
    Prepress,
    #[sea_orm(string_value = "Press")]
    Press,
    #[sea_orm(string_value = "Bindery")]
    Bindery,
    #[sea_orm(string_value = "Shipping")]
    Shipping,
    #[sea_orm(string_value = "Outsourced")]
    Outsourced,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Invoiced")]
    Invoiced,
    #[sea_orm(string_value = "PaymentReceived")]
    PaymentReceived,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl StatusValue for OrderItemStatus {
    const ENTITY: &'static str = "order item";
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Prepress,
        Self::Press,
        Self::Bindery,
        Self::Shipping,
        Self::Outsourced,
        Self::Completed,
        Self::Invoiced,
        Self::PaymentReceived,
        Self::Cancelled,
    ];
    const INITIAL: Self = Self::Pending;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(ascii_case_insensitive)]
pub enum StockStatus {
    #[sea_orm(string_value = "Ordered")]
    Ordered,
    #[sea_orm(string_value = "BackOrdered")]
    BackOrdered,
    #[sea_orm(string_value = "OnHand")]
    OnHand,
    #[sea_orm(string_value = "CustomerProvided")]
    CustomerProvided,
    #[sea_orm(string_value = "Received")]
    Received,
}

impl StatusValue for StockStatus {
    const ENTITY: &'static str = "stock";
    const ALL: &'static [Self] = &[
        Self::Ordered,
        Self::BackOrdered,
        Self::OnHand,
        Self::CustomerProvided,
        Self::Received,
    ];
    const INITIAL: Self = Self::Ordered;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sea_orm::Iterable;

    #[test]
    fn parse_requested_is_case_insensitive_and_strict() {
        assert_eq!(
            OrderStatus::parse_requested("paymentreceived").unwrap(),
            OrderStatus::PaymentReceived
        );
        assert_eq!(
            WorkOrderStatus::parse_requested(" Approved ").unwrap(),
            WorkOrderStatus::Approved
        );
        let err = OrderStatus::parse_requested("Archived").unwrap_err();
        assert!(err.to_string().contains("Archived"));
        assert!(StockStatus::parse_requested("").is_err());
    }

    #[test]
    fn initial_status_is_a_member() {
        assert!(WorkOrderStatus::ALL.contains(&WorkOrderStatus::INITIAL));
        assert!(WorkOrderItemStatus::ALL.contains(&WorkOrderItemStatus::INITIAL));
        assert!(OrderStatus::ALL.contains(&OrderStatus::INITIAL));
        assert!(OrderItemStatus::ALL.contains(&OrderItemStatus::INITIAL));
        assert_eq!(StockStatus::INITIAL, StockStatus::Ordered);
    }

    #[test]
    fn all_lists_every_stored_value() {
        assert_eq!(OrderStatus::ALL.len(), OrderStatus::iter().count());
        assert_eq!(OrderItemStatus::ALL.len(), OrderItemStatus::iter().count());
        assert_eq!(WorkOrderStatus::ALL.len(), WorkOrderStatus::iter().count());
        assert_eq!(WorkOrderItemStatus::ALL.len(), WorkOrderItemStatus::iter().count());
        assert_eq!(StockStatus::ALL.len(), StockStatus::iter().count());
    }

    #[test]
    fn display_matches_stored_value() {
        for &s in OrderItemStatus::ALL {
            assert_eq!(s.to_string(), s.to_value());
        }
        for &s in StockStatus::ALL {
            assert_eq!(s.to_string(), s.to_value());
        }
    }

    fn order_status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::ALL.to_vec())
    }

    fn item_status() -> impl Strategy<Value = OrderItemStatus> {
        prop::sample::select(OrderItemStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn order_status_parses_back_from_display(s in order_status()) {
            prop_assert_eq!(OrderStatus::parse_requested(&s.to_string()).unwrap(), s);
        }

        #[test]
        fn item_status_parses_back_from_lowercase(s in item_status()) {
            let lower = s.to_string().to_lowercase();
            prop_assert_eq!(OrderItemStatus::parse_requested(&lower).unwrap(), s);
        }
    }
}
