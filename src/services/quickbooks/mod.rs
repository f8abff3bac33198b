//! QuickBooks Online integration: OAuth connection, token upkeep, REST calls
//! and the customer/invoice sync procedures built on them.

pub mod client;
pub mod oauth;
pub mod sync;
pub mod token;

pub use client::{QbCustomer, QbInvoice, QuickbooksClient};
pub use oauth::{AuthorizeResponse, CallbackFailure, ConnectionStatus, QuickbooksOAuth};
pub use sync::{CustomerSyncSummary, InvoiceSyncSummary, QuickbooksSync};
pub use token::{QuickbooksCredentials, QuickbooksTokenManager};

/// OAuth scope requested when connecting a company file.
pub const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";
