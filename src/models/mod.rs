pub mod enums;
pub mod status;

pub use enums::{
    AddressType, InvoiceStatus, PaymentType, ProofMethod, QuickbooksSyncStatus, ShippingMethod,
    TypesettingStatus,
};
pub use status::{
    OrderItemStatus, OrderStatus, StatusValue, StockStatus, WorkOrderItemStatus,
    WorkOrderStatus,
};
