use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AddressType {
    #[sea_orm(string_value = "Billing")]
    Billing,
    #[sea_orm(string_value = "Mailing")]
    Mailing,
    #[sea_orm(string_value = "Shipping")]
    Shipping,
    #[sea_orm(string_value = "Other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ShippingMethod {
    #[sea_orm(string_value = "Courier")]
    Courier,
    #[sea_orm(string_value = "Deliver")]
    Deliver,
    #[sea_orm(string_value = "DHL")]
    #[serde(rename = "DHL")]
    #[strum(serialize = "DHL")]
    Dhl,
    #[sea_orm(string_value = "FedEx")]
    FedEx,
    #[sea_orm(string_value = "Other")]
    Other,
    #[sea_orm(string_value = "UPS")]
    #[serde(rename = "UPS")]
    #[strum(serialize = "UPS")]
    Ups,
    #[sea_orm(string_value = "USPS")]
    #[serde(rename = "USPS")]
    #[strum(serialize = "USPS")]
    Usps,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PaymentType {
    #[sea_orm(string_value = "Cash")]
    Cash,
    #[sea_orm(string_value = "Check")]
    Check,
    #[sea_orm(string_value = "CreditCard")]
    CreditCard,
    #[sea_orm(string_value = "ACH")]
    #[serde(rename = "ACH")]
    #[strum(serialize = "ACH")]
    Ach,
    #[sea_orm(string_value = "Other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TypesettingStatus {
    #[sea_orm(string_value = "InProgress")]
    InProgress,
    #[sea_orm(string_value = "WaitingApproval")]
    WaitingApproval,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ProofMethod {
    #[sea_orm(string_value = "Digital")]
    Digital,
    #[sea_orm(string_value = "HardCopy")]
    HardCopy,
    #[sea_orm(string_value = "PDF")]
    #[serde(rename = "PDF")]
    #[strum(serialize = "PDF")]
    Pdf,
    #[sea_orm(string_value = "Other")]
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
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
pub enum InvoiceStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Sent")]
    Sent,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Overdue")]
    Overdue,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Where an invoice stands with respect to QuickBooks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum QuickbooksSyncStatus {
    #[sea_orm(string_value = "NotRequested")]
    NotRequested,
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Synced")]
    Synced,
    #[sea_orm(string_value = "Failed")]
    Failed,
}
