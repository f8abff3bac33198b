use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Print Shop API",
        version = "1.0.0",
        description = r#"
# Print Shop API

Back office for a commercial print shop.

## Features

- **Customers**: Companies, their offices and addresses, plus the walk-in account
- **Work orders**: Quotes and jobs that are not yet orders, convertible to orders
- **Orders**: Line items, notes, shipping, payments and status tracking
- **Typesetting**: Layout requests, options, proofs and artwork
- **Stock**: Paper products and per-item stock with receiving status
- **Invoicing**: Invoices with QuickBooks Online sync and email delivery
- **Audit**: Every status change is recorded with the actor and timestamp

## Authentication

Every endpoint except login, token refresh, email verification and the
QuickBooks OAuth callback needs a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Pagination

List endpoints take `page` (default 1) and `limit` (default 20, max 100).
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Sign in and token refresh"),
        (name = "companies", description = "Customer companies"),
        (name = "offices", description = "Company offices and addresses"),
        (name = "work-orders", description = "Work orders, their items and notes"),
        (name = "orders", description = "Orders, their items and notes"),
        (name = "typesetting", description = "Typesetting requests and proofs"),
        (name = "shipping", description = "Shipping details"),
        (name = "paper-products", description = "Paper catalog"),
        (name = "stock", description = "Paper stock per line item"),
        (name = "payments", description = "Order payments"),
        (name = "invoices", description = "Invoices and QuickBooks push"),
        (name = "users", description = "User accounts"),
        (name = "roles", description = "Roles and permissions"),
        (name = "uploads", description = "File uploads"),
        (name = "quickbooks", description = "QuickBooks connection and sync")
    ),
    paths(
        // Authentication
        crate::auth::login_handler,
        crate::auth::refresh_token_handler,

        // Companies
        crate::handlers::companies::create_company,
        crate::handlers::companies::get_company,
        crate::handlers::companies::list_companies,
        crate::handlers::companies::update_company,
        crate::handlers::companies::delete_company,

        // Offices and addresses
        crate::handlers::offices::create_office,
        crate::handlers::offices::get_office,
        crate::handlers::offices::list_offices,
        crate::handlers::offices::walk_in_office,
        crate::handlers::offices::update_office,
        crate::handlers::offices::delete_office,
        crate::handlers::offices::list_addresses,
        crate::handlers::offices::create_address,
        crate::handlers::offices::update_address,
        crate::handlers::offices::delete_address,

        // Work orders
        crate::handlers::work_orders::create_work_order,
        crate::handlers::work_orders::get_work_order,
        crate::handlers::work_orders::get_work_order_by_number,
        crate::handlers::work_orders::list_work_orders,
        crate::handlers::work_orders::update_work_order,
        crate::handlers::work_orders::delete_work_order,
        crate::handlers::work_orders::update_work_order_status,
        crate::handlers::work_orders::work_order_status_history,
        crate::handlers::work_orders::add_note,
        crate::handlers::work_orders::list_notes,
        crate::handlers::work_orders::add_item,
        crate::handlers::work_orders::update_item,
        crate::handlers::work_orders::delete_item,
        crate::handlers::work_orders::update_item_status,
        crate::handlers::work_orders::item_status_history,
        crate::handlers::work_orders::convert_to_order,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_number,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::order_status_history,
        crate::handlers::orders::add_note,
        crate::handlers::orders::list_notes,
        crate::handlers::orders::list_items,
        crate::handlers::orders::add_item,
        crate::handlers::orders::update_item,
        crate::handlers::orders::delete_item,
        crate::handlers::orders::update_item_status,
        crate::handlers::orders::item_status_history,
        crate::handlers::orders::duplicate_order,
        crate::handlers::orders::send_confirmation,

        // Typesetting
        crate::handlers::typesetting::create_typesetting,
        crate::handlers::typesetting::get_typesetting,
        crate::handlers::typesetting::list_for_work_order,
        crate::handlers::typesetting::list_for_order,
        crate::handlers::typesetting::update_typesetting,
        crate::handlers::typesetting::delete_typesetting,
        crate::handlers::typesetting::add_option,
        crate::handlers::typesetting::update_option,
        crate::handlers::typesetting::delete_option,
        crate::handlers::typesetting::add_proof,
        crate::handlers::typesetting::approve_proof,
        crate::handlers::typesetting::add_artwork,

        // Shipping
        crate::handlers::shipping::get_work_order_shipping,
        crate::handlers::shipping::upsert_work_order_shipping,
        crate::handlers::shipping::get_order_shipping,
        crate::handlers::shipping::upsert_order_shipping,
        crate::handlers::shipping::delete_shipping,

        // Paper products
        crate::handlers::paper_products::create_paper_product,
        crate::handlers::paper_products::get_paper_product,
        crate::handlers::paper_products::list_paper_products,
        crate::handlers::paper_products::update_paper_product,
        crate::handlers::paper_products::delete_paper_product,

        // Stock
        crate::handlers::stocks::create_order_item_stock,
        crate::handlers::stocks::list_order_item_stock,
        crate::handlers::stocks::get_order_item_stock,
        crate::handlers::stocks::update_order_item_stock,
        crate::handlers::stocks::update_order_item_stock_status,
        crate::handlers::stocks::order_item_stock_history,
        crate::handlers::stocks::delete_order_item_stock,
        crate::handlers::stocks::create_work_order_item_stock,
        crate::handlers::stocks::list_work_order_item_stock,
        crate::handlers::stocks::get_work_order_item_stock,
        crate::handlers::stocks::update_work_order_item_stock,
        crate::handlers::stocks::update_work_order_item_stock_status,
        crate::handlers::stocks::work_order_item_stock_history,
        crate::handlers::stocks::delete_work_order_item_stock,

        // Payments
        crate::handlers::payments::create_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::order_balance,
        crate::handlers::payments::delete_payment,

        // Invoices
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::get_order_invoice,
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::update_invoice_status,
        crate::handlers::invoices::delete_invoice,
        crate::handlers::invoices::push_to_quickbooks,
        crate::handlers::invoices::send_invoice_email,

        // Users and roles
        crate::handlers::users::current_user,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::list_users,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::assign_roles,
        crate::handlers::users::send_verification,
        crate::handlers::users::verify_email,
        crate::handlers::users::create_role,
        crate::handlers::users::list_roles,
        crate::handlers::users::get_role,
        crate::handlers::users::assign_permissions,
        crate::handlers::users::delete_role,
        crate::handlers::users::list_permissions,

        // Uploads
        crate::handlers::uploads::upload_file,

        // QuickBooks
        crate::handlers::quickbooks::authorize,
        crate::handlers::quickbooks::callback,
        crate::handlers::quickbooks::connection_status,
        crate::handlers::quickbooks::disconnect,
        crate::handlers::quickbooks::sync_customers,
        crate::handlers::quickbooks::sync_office_invoices,
        crate::handlers::quickbooks::reconcile_invoices,
    ),
    components(
        schemas(
            // Common types
            crate::ListQuery,
            crate::errors::ErrorResponse,
            crate::auth::TokenPair,
            crate::auth::LoginCredentials,
            crate::auth::RefreshTokenRequest,

            // Stored records
            crate::entities::address::Model,
            crate::entities::company::Model,
            crate::entities::invoice::Model,
            crate::entities::invoice_item::Model,
            crate::entities::office::Model,
            crate::entities::order::Model,
            crate::entities::order_item::Model,
            crate::entities::order_item_stock::Model,
            crate::entities::order_note::Model,
            crate::entities::order_payment::Model,
            crate::entities::paper_product::Model,
            crate::entities::permission::Model,
            crate::entities::role::Model,
            crate::entities::shipping_info::Model,
            crate::entities::status_transition::Model,
            crate::entities::typesetting::Model,
            crate::entities::typesetting_option::Model,
            crate::entities::typesetting_proof::Model,
            crate::entities::typesetting_proof_artwork::Model,
            crate::entities::user::Model,
            crate::entities::work_order::Model,
            crate::entities::work_order_item::Model,
            crate::entities::work_order_item_stock::Model,
            crate::entities::work_order_note::Model,

            // Status and enum values
            crate::models::WorkOrderStatus,
            crate::models::WorkOrderItemStatus,
            crate::models::OrderStatus,
            crate::models::OrderItemStatus,
            crate::models::StockStatus,
            crate::models::AddressType,
            crate::models::ShippingMethod,
            crate::models::PaymentType,
            crate::models::TypesettingStatus,
            crate::models::ProofMethod,
            crate::models::InvoiceStatus,
            crate::models::QuickbooksSyncStatus,

            // Requests and composite responses
            crate::services::companies::CreateCompanyRequest,
            crate::services::companies::UpdateCompanyRequest,
            crate::services::companies::CompanyDetail,
            crate::services::offices::CreateOfficeRequest,
            crate::services::offices::UpdateOfficeRequest,
            crate::services::offices::OfficeDetail,
            crate::services::addresses::CreateAddressRequest,
            crate::services::addresses::UpdateAddressRequest,
            crate::services::inputs::LineItemInput,
            crate::services::inputs::UpdateLineItemRequest,
            crate::services::inputs::NoteRequest,
            crate::services::status::UpdateStatusRequest,
            crate::services::work_orders::CreateWorkOrderRequest,
            crate::services::work_orders::UpdateWorkOrderRequest,
            crate::services::work_orders::WorkOrderDetail,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::OrderDetail,
            crate::handlers::orders::OrderStatusResponse,
            crate::handlers::orders::ConfirmationSent,
            crate::services::typesetting::CreateTypesettingRequest,
            crate::services::typesetting::UpdateTypesettingRequest,
            crate::services::typesetting::OptionRequest,
            crate::services::typesetting::UpdateOptionRequest,
            crate::services::typesetting::ArtworkRequest,
            crate::services::typesetting::CreateProofRequest,
            crate::services::typesetting::ProofDetail,
            crate::services::typesetting::TypesettingDetail,
            crate::services::shipping::ShippingInfoRequest,
            crate::services::paper_products::CreatePaperProductRequest,
            crate::services::paper_products::UpdatePaperProductRequest,
            crate::services::stocks::CreateStockRequest,
            crate::services::stocks::UpdateStockRequest,
            crate::services::payments::CreatePaymentRequest,
            crate::services::payments::OrderBalance,
            crate::services::invoices::CreateInvoiceRequest,
            crate::services::invoices::InvoiceStatusRequest,
            crate::services::invoices::SendInvoiceEmailRequest,
            crate::services::invoices::InvoiceDetail,
            crate::services::invoices::ReconcileSummary,
            crate::services::users::CreateUserRequest,
            crate::services::users::UpdateUserRequest,
            crate::services::users::AssignRolesRequest,
            crate::services::users::UserDetail,
            crate::services::roles::CreateRoleRequest,
            crate::services::roles::AssignPermissionsRequest,
            crate::services::roles::RoleDetail,
            crate::handlers::users::Acknowledged,
            crate::handlers::users::CurrentUser,
            crate::services::uploads::StoredUpload,
            crate::services::quickbooks::AuthorizeResponse,
            crate::services::quickbooks::ConnectionStatus,
            crate::services::quickbooks::CustomerSyncSummary,
            crate::services::quickbooks::InvoiceSyncSummary,
            crate::handlers::quickbooks::Disconnected
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Print Shop API"));
        assert!(json.contains("/api/v1/work-orders/{id}/convert"));
        assert!(json.contains("/api/v1/invoices/{id}/quickbooks"));
        assert!(json.contains("/api/v1/auth/login"));
    }
}
