pub mod common;
pub mod companies;
pub mod invoices;
pub mod offices;
pub mod orders;
pub mod paper_products;
pub mod payments;
pub mod quickbooks;
pub mod shipping;
pub mod stocks;
pub mod typesetting;
pub mod uploads;
pub mod users;
pub mod work_orders;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    services::{
        addresses::AddressService,
        companies::CompanyService,
        email::EmailService,
        invoices::{configured_tax_rate, InvoiceService},
        offices::OfficeService,
        orders::OrderService,
        paper_products::PaperProductService,
        payments::PaymentService,
        quickbooks::{QuickbooksClient, QuickbooksOAuth, QuickbooksSync, QuickbooksTokenManager},
        roles::RoleService,
        shipping::ShippingService,
        status::StatusHistoryService,
        stocks::StockService,
        typesetting::TypesettingService,
        uploads::UploadService,
        users::UserService,
        work_orders::WorkOrderService,
    },
};
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub companies: Arc<CompanyService>,
    pub offices: Arc<OfficeService>,
    pub addresses: Arc<AddressService>,
    pub work_orders: Arc<WorkOrderService>,
    pub orders: Arc<OrderService>,
    pub typesetting: Arc<TypesettingService>,
    pub paper_products: Arc<PaperProductService>,
    pub stocks: Arc<StockService>,
    pub payments: Arc<PaymentService>,
    pub invoices: Arc<InvoiceService>,
    pub shipping: Arc<ShippingService>,
    pub status_history: Arc<StatusHistoryService>,
    pub users: Arc<UserService>,
    pub roles: Arc<RoleService>,
    pub uploads: Arc<UploadService>,
    pub email: EmailService,
    pub quickbooks_tokens: Arc<QuickbooksTokenManager>,
    pub quickbooks_oauth: Arc<QuickbooksOAuth>,
    pub quickbooks_sync: Arc<QuickbooksSync>,
}

impl AppServices {
    /// Wires every service against one pool, event channel and root logger.
    pub fn new(
        db_pool: Arc<DbPool>,
        config: &AppConfig,
        event_sender: Option<Arc<EventSender>>,
        logger: &Logger,
    ) -> Result<Self, ServiceError> {
        let email = EmailService::from_config(&config.email, &config.frontend_url, logger)?;

        let quickbooks_tokens = Arc::new(QuickbooksTokenManager::new(
            db_pool.clone(),
            config.quickbooks.clone(),
            event_sender.clone(),
            logger,
        )?);
        let quickbooks_sync = Arc::new(QuickbooksSync::new(
            db_pool.clone(),
            quickbooks_tokens.clone(),
            QuickbooksClient::new(&config.quickbooks, logger)?,
        ));
        let quickbooks_oauth = Arc::new(QuickbooksOAuth::new(
            db_pool.clone(),
            config.quickbooks.clone(),
            event_sender.clone(),
            logger,
        ));
        let invoice_sync = config
            .quickbooks
            .is_configured()
            .then(|| quickbooks_sync.clone());

        Ok(Self {
            companies: Arc::new(CompanyService::new(db_pool.clone(), event_sender.clone())),
            offices: Arc::new(OfficeService::new(db_pool.clone(), event_sender.clone())),
            addresses: Arc::new(AddressService::new(db_pool.clone())),
            work_orders: Arc::new(WorkOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.number_base,
            )),
            orders: Arc::new(OrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.number_base,
            )),
            typesetting: Arc::new(TypesettingService::new(db_pool.clone())),
            paper_products: Arc::new(PaperProductService::new(db_pool.clone())),
            stocks: Arc::new(StockService::new(db_pool.clone(), event_sender.clone())),
            payments: Arc::new(PaymentService::new(db_pool.clone(), event_sender.clone())),
            invoices: Arc::new(InvoiceService::new(
                db_pool.clone(),
                event_sender,
                invoice_sync,
                email.clone(),
                config.number_base,
                configured_tax_rate(config.default_tax_rate),
            )),
            shipping: Arc::new(ShippingService::new(db_pool.clone())),
            status_history: Arc::new(StatusHistoryService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool.clone(), Some(email.clone()))),
            roles: Arc::new(RoleService::new(db_pool)),
            uploads: Arc::new(UploadService::new(config.uploads.clone())),
            email,
            quickbooks_tokens,
            quickbooks_oauth,
            quickbooks_sync,
        })
    }
}
