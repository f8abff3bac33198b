use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customer_tables::Migration),
            Box::new(m20240101_000002_create_access_tables::Migration),
            Box::new(m20240101_000003_create_work_order_tables::Migration),
            Box::new(m20240101_000004_create_order_tables::Migration),
            Box::new(m20240101_000005_create_invoice_tables::Migration),
            Box::new(m20240101_000006_create_prepress_and_shipping_tables::Migration),
            Box::new(m20240101_000007_create_stock_tables::Migration),
            Box::new(m20240101_000008_create_status_transitions_table::Migration),
        ]
    }
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn ts_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn money_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(14, 2)
        .not_null()
        .default(0)
        .to_owned()
}

mod idens {
    use sea_orm_migration::prelude::*;

    #[derive(DeriveIden)]
    pub enum Companies {
        Table,
        Id,
        Name,
        QuickbooksId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Offices {
        Table,
        Id,
        CompanyId,
        Name,
        Phone,
        Fax,
        Email,
        IsActive,
        IsWalkInOffice,
        QuickbooksCustomerId,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Addresses {
        Table,
        Id,
        OfficeId,
        Line1,
        Line2,
        City,
        State,
        ZipCode,
        Country,
        TelephoneNumber,
        AddressType,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        IsActive,
        EmailVerified,
        VerificationToken,
        VerificationExpiresAt,
        QuickbooksAccessToken,
        QuickbooksRefreshToken,
        QuickbooksTokenExpiry,
        QuickbooksRealmId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Roles {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Permissions {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden)]
    pub enum UserRoles {
        Table,
        UserId,
        RoleId,
    }

    #[derive(DeriveIden)]
    pub enum RolePermissions {
        Table,
        RoleId,
        PermissionId,
    }

    #[derive(DeriveIden)]
    pub enum WorkOrders {
        Table,
        Id,
        WorkOrderNumber,
        OfficeId,
        Status,
        DateIn,
        InHandsDate,
        EstimateNumber,
        PurchaseOrderNumber,
        ContactEmail,
        TotalCost,
        TotalAmount,
        Deposit,
        Notes,
        Version,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    /// Shared by `work_order_items` and `order_items`.
    #[derive(DeriveIden, Clone, Copy)]
    pub enum ItemCols {
        Id,
        WorkOrderItemId,
        ItemNumber,
        Description,
        Quantity,
        Cost,
        Amount,
        Ink,
        Other,
        ExpectedDate,
        Status,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum WorkOrderItems {
        Table,
        WorkOrderId,
    }

    #[derive(DeriveIden)]
    pub enum WorkOrderNotes {
        Table,
        Id,
        WorkOrderId,
        Note,
        CreatedById,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Orders {
        Table,
        Id,
        OrderNumber,
        OfficeId,
        WorkOrderId,
        Status,
        InHandsDate,
        DateInvoiced,
        ContactEmail,
        PurchaseOrderNumber,
        TotalCost,
        TotalAmount,
        Deposit,
        Notes,
        Version,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum OrderItems {
        Table,
        OrderId,
    }

    #[derive(DeriveIden)]
    pub enum OrderNotes {
        Table,
        Id,
        OrderId,
        Note,
        CreatedById,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum OrderPayments {
        Table,
        Id,
        OrderId,
        Amount,
        PaymentDate,
        PaymentType,
        TransactionId,
        Notes,
        CreatedById,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        OrderId,
        DateIssued,
        DateDue,
        Subtotal,
        TaxRate,
        TaxAmount,
        Total,
        Status,
        Notes,
        QuickbooksInvoiceId,
        QuickbooksSyncStatus,
        QuickbooksSyncError,
        QuickbooksSyncedAt,
        SyncAttempts,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum InvoiceItems {
        Table,
        Id,
        InvoiceId,
        OrderItemId,
        Description,
        Quantity,
        UnitPrice,
        Total,
    }

    #[derive(DeriveIden)]
    pub enum ShippingInfos {
        Table,
        Id,
        WorkOrderId,
        OrderId,
        AddressId,
        ShippingMethod,
        ShippingOther,
        ShippingCost,
        ShipDate,
        EstimatedDelivery,
        NumberOfPackages,
        TrackingNumber,
        Instructions,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Typesettings {
        Table,
        Id,
        WorkOrderId,
        OrderId,
        DateIn,
        TimeIn,
        Cost,
        PrepTime,
        PlateDirection,
        FollowUpNotes,
        Approved,
        Status,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum TypesettingOptions {
        Table,
        Id,
        TypesettingId,
        Option,
        Selected,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum TypesettingProofs {
        Table,
        Id,
        TypesettingId,
        ProofNumber,
        ProofMethod,
        DateSubmitted,
        Notes,
        Approved,
        CreatedById,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum TypesettingProofArtworks {
        Table,
        Id,
        ProofId,
        FileUrl,
        Description,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum PaperProducts {
        Table,
        Id,
        Brand,
        PaperType,
        Finish,
        Size,
        WeightLb,
        Caliper,
        ReferenceId,
        CreatedAt,
        UpdatedAt,
    }

    /// Shared by `order_item_stocks` and `work_order_item_stocks`.
    #[derive(DeriveIden)]
    pub enum StockCols {
        Id,
        PaperProductId,
        StockQty,
        CostPerM,
        TotalCost,
        Supplier,
        OrderedDate,
        ExpectedDate,
        ReceivedDate,
        Notes,
        StockStatus,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum OrderItemStocks {
        Table,
        OrderItemId,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum WorkOrderItemStocks {
        Table,
        WorkOrderItemId,
    }

    #[derive(DeriveIden)]
    pub enum StatusTransitions {
        Table,
        Id,
        EntityType,
        EntityId,
        FromStatus,
        ToStatus,
        ChangedById,
        Note,
        CreatedAt,
    }
}

mod m20240101_000001_create_customer_tables {
    use super::idens::*;
    use super::{id_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customer_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(&mut id_col(Companies::Id))
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(ColumnDef::new(Companies::QuickbooksId).string().null())
                        .col(
                            ColumnDef::new(Companies::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(&mut ts_col(Companies::CreatedAt))
                        .col(&mut ts_col(Companies::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_companies_quickbooks_id")
                        .table(Companies::Table)
                        .col(Companies::QuickbooksId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Offices::Table)
                        .if_not_exists()
                        .col(&mut id_col(Offices::Id))
                        .col(ColumnDef::new(Offices::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Offices::Name).string().not_null())
                        .col(ColumnDef::new(Offices::Phone).string().null())
                        .col(ColumnDef::new(Offices::Fax).string().null())
                        .col(ColumnDef::new(Offices::Email).string().null())
                        .col(
                            ColumnDef::new(Offices::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Offices::IsWalkInOffice)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Offices::QuickbooksCustomerId)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Offices::CreatedById).uuid().null())
                        .col(&mut ts_col(Offices::CreatedAt))
                        .col(&mut ts_col(Offices::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_offices_company_id")
                                .from(Offices::Table, Offices::CompanyId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_offices_company_id")
                        .table(Offices::Table)
                        .col(Offices::CompanyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Addresses::Table)
                        .if_not_exists()
                        .col(&mut id_col(Addresses::Id))
                        .col(ColumnDef::new(Addresses::OfficeId).uuid().not_null())
                        .col(ColumnDef::new(Addresses::Line1).string().not_null())
                        .col(ColumnDef::new(Addresses::Line2).string().null())
                        .col(ColumnDef::new(Addresses::City).string().not_null())
                        .col(ColumnDef::new(Addresses::State).string().not_null())
                        .col(ColumnDef::new(Addresses::ZipCode).string().not_null())
                        .col(ColumnDef::new(Addresses::Country).string().not_null())
                        .col(ColumnDef::new(Addresses::TelephoneNumber).string().null())
                        .col(
                            ColumnDef::new(Addresses::AddressType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(&mut ts_col(Addresses::CreatedAt))
                        .col(&mut ts_col(Addresses::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_addresses_office_id")
                                .from(Addresses::Table, Addresses::OfficeId)
                                .to(Offices::Table, Offices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Addresses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Offices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_access_tables {
    use super::idens::*;
    use super::{id_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_access_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(&mut id_col(Users::Id))
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::EmailVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::VerificationToken).string().null())
                        .col(
                            ColumnDef::new(Users::VerificationExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Users::QuickbooksAccessToken).text().null())
                        .col(ColumnDef::new(Users::QuickbooksRefreshToken).text().null())
                        .col(
                            ColumnDef::new(Users::QuickbooksTokenExpiry)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Users::QuickbooksRealmId).string().null())
                        .col(&mut ts_col(Users::CreatedAt))
                        .col(&mut ts_col(Users::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(&mut id_col(Roles::Id))
                        .col(
                            ColumnDef::new(Roles::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Roles::Description).string().null())
                        .col(&mut ts_col(Roles::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Permissions::Table)
                        .if_not_exists()
                        .col(&mut id_col(Permissions::Id))
                        .col(
                            ColumnDef::new(Permissions::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Permissions::Description).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserRoles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserRoles::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserRoles::RoleId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(UserRoles::UserId)
                                .col(UserRoles::RoleId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_roles_user_id")
                                .from(UserRoles::Table, UserRoles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_roles_role_id")
                                .from(UserRoles::Table, UserRoles::RoleId)
                                .to(Roles::Table, Roles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RolePermissions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RolePermissions::RoleId).uuid().not_null())
                        .col(
                            ColumnDef::new(RolePermissions::PermissionId)
                                .uuid()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(RolePermissions::RoleId)
                                .col(RolePermissions::PermissionId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_role_permissions_role_id")
                                .from(RolePermissions::Table, RolePermissions::RoleId)
                                .to(Roles::Table, Roles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_role_permissions_permission_id")
                                .from(RolePermissions::Table, RolePermissions::PermissionId)
                                .to(Permissions::Table, Permissions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(UserRoles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Permissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_work_order_tables {
    use super::idens::*;
    use super::{id_col, money_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_work_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(&mut id_col(WorkOrders::Id))
                        .col(
                            ColumnDef::new(WorkOrders::WorkOrderNumber)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(WorkOrders::OfficeId).uuid().not_null())
                        .col(ColumnDef::new(WorkOrders::Status).string_len(32).not_null())
                        .col(&mut ts_col(WorkOrders::DateIn))
                        .col(
                            ColumnDef::new(WorkOrders::InHandsDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(WorkOrders::EstimateNumber).string().null())
                        .col(
                            ColumnDef::new(WorkOrders::PurchaseOrderNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(WorkOrders::ContactEmail).string().null())
                        .col(&mut money_col(WorkOrders::TotalCost))
                        .col(&mut money_col(WorkOrders::TotalAmount))
                        .col(&mut money_col(WorkOrders::Deposit))
                        .col(ColumnDef::new(WorkOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(WorkOrders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(WorkOrders::CreatedById).uuid().null())
                        .col(&mut ts_col(WorkOrders::CreatedAt))
                        .col(&mut ts_col(WorkOrders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_office_id")
                                .from(WorkOrders::Table, WorkOrders::OfficeId)
                                .to(Offices::Table, Offices::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_orders_office_status")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::OfficeId)
                        .col(WorkOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderItems::Table)
                        .if_not_exists()
                        .col(&mut id_col(ItemCols::Id))
                        .col(ColumnDef::new(WorkOrderItems::WorkOrderId).uuid().not_null())
                        .col(ColumnDef::new(ItemCols::ItemNumber).string().null())
                        .col(ColumnDef::new(ItemCols::Description).text().not_null())
                        .col(
                            ColumnDef::new(ItemCols::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut money_col(ItemCols::Cost))
                        .col(&mut money_col(ItemCols::Amount))
                        .col(ColumnDef::new(ItemCols::Ink).string().null())
                        .col(ColumnDef::new(ItemCols::Other).string().null())
                        .col(
                            ColumnDef::new(ItemCols::ExpectedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ItemCols::Status).string_len(32).not_null())
                        .col(ColumnDef::new(ItemCols::CreatedById).uuid().null())
                        .col(&mut ts_col(ItemCols::CreatedAt))
                        .col(&mut ts_col(ItemCols::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_order_items_work_order_id")
                                .from(WorkOrderItems::Table, WorkOrderItems::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderNotes::Table)
                        .if_not_exists()
                        .col(&mut id_col(WorkOrderNotes::Id))
                        .col(ColumnDef::new(WorkOrderNotes::WorkOrderId).uuid().not_null())
                        .col(ColumnDef::new(WorkOrderNotes::Note).text().not_null())
                        .col(ColumnDef::new(WorkOrderNotes::CreatedById).uuid().null())
                        .col(&mut ts_col(WorkOrderNotes::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_order_notes_work_order_id")
                                .from(WorkOrderNotes::Table, WorkOrderNotes::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrderNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_order_tables {
    use super::idens::*;
    use super::{id_col, money_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(&mut id_col(Orders::Id))
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OfficeId).uuid().not_null())
                        .col(ColumnDef::new(Orders::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Orders::InHandsDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DateInvoiced)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::ContactEmail).string().null())
                        .col(ColumnDef::new(Orders::PurchaseOrderNumber).string().null())
                        .col(&mut money_col(Orders::TotalCost))
                        .col(&mut money_col(Orders::TotalAmount))
                        .col(&mut money_col(Orders::Deposit))
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Orders::CreatedById).uuid().null())
                        .col(&mut ts_col(Orders::CreatedAt))
                        .col(&mut ts_col(Orders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_office_id")
                                .from(Orders::Table, Orders::OfficeId)
                                .to(Offices::Table, Offices::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_work_order_id")
                                .from(Orders::Table, Orders::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            // A work order promotes into at most one order.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_work_order_id")
                        .table(Orders::Table)
                        .col(Orders::WorkOrderId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_office_status")
                        .table(Orders::Table)
                        .col(Orders::OfficeId)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(&mut id_col(ItemCols::Id))
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ItemCols::WorkOrderItemId).uuid().null())
                        .col(ColumnDef::new(ItemCols::ItemNumber).string().null())
                        .col(ColumnDef::new(ItemCols::Description).text().not_null())
                        .col(
                            ColumnDef::new(ItemCols::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut money_col(ItemCols::Cost))
                        .col(&mut money_col(ItemCols::Amount))
                        .col(ColumnDef::new(ItemCols::Ink).string().null())
                        .col(ColumnDef::new(ItemCols::Other).string().null())
                        .col(
                            ColumnDef::new(ItemCols::ExpectedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ItemCols::Status).string_len(32).not_null())
                        .col(ColumnDef::new(ItemCols::CreatedById).uuid().null())
                        .col(&mut ts_col(ItemCols::CreatedAt))
                        .col(&mut ts_col(ItemCols::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_work_order_item_id")
                                .from(OrderItems::Table, ItemCols::WorkOrderItemId)
                                .to(WorkOrderItems::Table, ItemCols::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderNotes::Table)
                        .if_not_exists()
                        .col(&mut id_col(OrderNotes::Id))
                        .col(ColumnDef::new(OrderNotes::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderNotes::Note).text().not_null())
                        .col(ColumnDef::new(OrderNotes::CreatedById).uuid().null())
                        .col(&mut ts_col(OrderNotes::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_notes_order_id")
                                .from(OrderNotes::Table, OrderNotes::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderPayments::Table)
                        .if_not_exists()
                        .col(&mut id_col(OrderPayments::Id))
                        .col(ColumnDef::new(OrderPayments::OrderId).uuid().not_null())
                        .col(&mut money_col(OrderPayments::Amount))
                        .col(&mut ts_col(OrderPayments::PaymentDate))
                        .col(
                            ColumnDef::new(OrderPayments::PaymentType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPayments::TransactionId).string().null())
                        .col(ColumnDef::new(OrderPayments::Notes).text().null())
                        .col(ColumnDef::new(OrderPayments::CreatedById).uuid().null())
                        .col(&mut ts_col(OrderPayments::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_payments_order_id")
                                .from(OrderPayments::Table, OrderPayments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderPayments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_invoice_tables {
    use super::idens::*;
    use super::{id_col, money_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_invoice_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(&mut id_col(Invoices::Id))
                        .col(
                            ColumnDef::new(Invoices::InvoiceNumber)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Invoices::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(&mut ts_col(Invoices::DateIssued))
                        .col(
                            ColumnDef::new(Invoices::DateDue)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(&mut money_col(Invoices::Subtotal))
                        .col(
                            ColumnDef::new(Invoices::TaxRate)
                                .decimal_len(6, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(&mut money_col(Invoices::TaxAmount))
                        .col(&mut money_col(Invoices::Total))
                        .col(ColumnDef::new(Invoices::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Invoices::Notes).text().null())
                        .col(ColumnDef::new(Invoices::QuickbooksInvoiceId).string().null())
                        .col(
                            ColumnDef::new(Invoices::QuickbooksSyncStatus)
                                .string_len(32)
                                .not_null()
                                .default("NotRequested"),
                        )
                        .col(ColumnDef::new(Invoices::QuickbooksSyncError).text().null())
                        .col(
                            ColumnDef::new(Invoices::QuickbooksSyncedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::SyncAttempts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::CreatedById).uuid().null())
                        .col(&mut ts_col(Invoices::CreatedAt))
                        .col(&mut ts_col(Invoices::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_order_id")
                                .from(Invoices::Table, Invoices::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_sync_status")
                        .table(Invoices::Table)
                        .col(Invoices::QuickbooksSyncStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceItems::Table)
                        .if_not_exists()
                        .col(&mut id_col(InvoiceItems::Id))
                        .col(ColumnDef::new(InvoiceItems::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(InvoiceItems::OrderItemId).uuid().null())
                        .col(ColumnDef::new(InvoiceItems::Description).text().not_null())
                        .col(
                            ColumnDef::new(InvoiceItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut money_col(InvoiceItems::UnitPrice))
                        .col(&mut money_col(InvoiceItems::Total))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_items_invoice_id")
                                .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoiceItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000006_create_prepress_and_shipping_tables {
    use super::idens::*;
    use super::{id_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_prepress_and_shipping_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShippingInfos::Table)
                        .if_not_exists()
                        .col(&mut id_col(ShippingInfos::Id))
                        .col(ColumnDef::new(ShippingInfos::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(ShippingInfos::OrderId).uuid().null())
                        .col(ColumnDef::new(ShippingInfos::AddressId).uuid().null())
                        .col(
                            ColumnDef::new(ShippingInfos::ShippingMethod)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShippingInfos::ShippingOther).string().null())
                        .col(
                            ColumnDef::new(ShippingInfos::ShippingCost)
                                .decimal_len(14, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ShippingInfos::ShipDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ShippingInfos::EstimatedDelivery)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ShippingInfos::NumberOfPackages)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(ShippingInfos::TrackingNumber).string().null())
                        .col(ColumnDef::new(ShippingInfos::Instructions).text().null())
                        .col(ColumnDef::new(ShippingInfos::CreatedById).uuid().null())
                        .col(&mut ts_col(ShippingInfos::CreatedAt))
                        .col(&mut ts_col(ShippingInfos::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipping_infos_work_order_id")
                                .from(ShippingInfos::Table, ShippingInfos::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipping_infos_order_id")
                                .from(ShippingInfos::Table, ShippingInfos::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipping_infos_address_id")
                                .from(ShippingInfos::Table, ShippingInfos::AddressId)
                                .to(Addresses::Table, Addresses::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Typesettings::Table)
                        .if_not_exists()
                        .col(&mut id_col(Typesettings::Id))
                        .col(ColumnDef::new(Typesettings::WorkOrderId).uuid().null())
                        .col(ColumnDef::new(Typesettings::OrderId).uuid().null())
                        .col(&mut ts_col(Typesettings::DateIn))
                        .col(ColumnDef::new(Typesettings::TimeIn).string().null())
                        .col(ColumnDef::new(Typesettings::Cost).decimal_len(14, 2).null())
                        .col(ColumnDef::new(Typesettings::PrepTime).integer().null())
                        .col(ColumnDef::new(Typesettings::PlateDirection).string().null())
                        .col(ColumnDef::new(Typesettings::FollowUpNotes).text().null())
                        .col(
                            ColumnDef::new(Typesettings::Approved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Typesettings::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Typesettings::CreatedById).uuid().null())
                        .col(&mut ts_col(Typesettings::CreatedAt))
                        .col(&mut ts_col(Typesettings::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_typesettings_work_order_id")
                                .from(Typesettings::Table, Typesettings::WorkOrderId)
                                .to(WorkOrders::Table, WorkOrders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_typesettings_order_id")
                                .from(Typesettings::Table, Typesettings::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TypesettingOptions::Table)
                        .if_not_exists()
                        .col(&mut id_col(TypesettingOptions::Id))
                        .col(
                            ColumnDef::new(TypesettingOptions::TypesettingId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TypesettingOptions::Option).string().not_null())
                        .col(
                            ColumnDef::new(TypesettingOptions::Selected)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(&mut ts_col(TypesettingOptions::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_typesetting_options_typesetting_id")
                                .from(TypesettingOptions::Table, TypesettingOptions::TypesettingId)
                                .to(Typesettings::Table, Typesettings::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TypesettingProofs::Table)
                        .if_not_exists()
                        .col(&mut id_col(TypesettingProofs::Id))
                        .col(
                            ColumnDef::new(TypesettingProofs::TypesettingId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TypesettingProofs::ProofNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TypesettingProofs::ProofMethod)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(&mut ts_col(TypesettingProofs::DateSubmitted))
                        .col(ColumnDef::new(TypesettingProofs::Notes).text().null())
                        .col(
                            ColumnDef::new(TypesettingProofs::Approved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(TypesettingProofs::CreatedById).uuid().null())
                        .col(&mut ts_col(TypesettingProofs::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_typesetting_proofs_typesetting_id")
                                .from(TypesettingProofs::Table, TypesettingProofs::TypesettingId)
                                .to(Typesettings::Table, Typesettings::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TypesettingProofArtworks::Table)
                        .if_not_exists()
                        .col(&mut id_col(TypesettingProofArtworks::Id))
                        .col(
                            ColumnDef::new(TypesettingProofArtworks::ProofId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TypesettingProofArtworks::FileUrl)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TypesettingProofArtworks::Description)
                                .string()
                                .null(),
                        )
                        .col(&mut ts_col(TypesettingProofArtworks::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_typesetting_proof_artworks_proof_id")
                                .from(
                                    TypesettingProofArtworks::Table,
                                    TypesettingProofArtworks::ProofId,
                                )
                                .to(TypesettingProofs::Table, TypesettingProofs::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TypesettingProofArtworks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TypesettingProofs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TypesettingOptions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Typesettings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ShippingInfos::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000007_create_stock_tables {
    use super::idens::*;
    use super::{id_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_stock_tables"
        }
    }

    fn stock_table<T, C, P>(table: T, item_col: C, parent: P, fk_prefix: &str) -> TableCreateStatement
    where
        T: IntoIden + Copy + 'static,
        C: IntoIden + Copy + 'static,
        P: IntoIden + Copy + 'static,
    {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(&mut id_col(StockCols::Id))
            .col(ColumnDef::new(item_col).uuid().not_null())
            .col(ColumnDef::new(StockCols::PaperProductId).uuid().null())
            .col(
                ColumnDef::new(StockCols::StockQty)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(StockCols::CostPerM).decimal_len(14, 2).null())
            .col(ColumnDef::new(StockCols::TotalCost).decimal_len(14, 2).null())
            .col(ColumnDef::new(StockCols::Supplier).string().null())
            .col(
                ColumnDef::new(StockCols::OrderedDate)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(
                ColumnDef::new(StockCols::ExpectedDate)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(
                ColumnDef::new(StockCols::ReceivedDate)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(ColumnDef::new(StockCols::Notes).text().null())
            .col(ColumnDef::new(StockCols::StockStatus).string_len(32).not_null())
            .col(ColumnDef::new(StockCols::CreatedById).uuid().null())
            .col(&mut ts_col(StockCols::CreatedAt))
            .col(&mut ts_col(StockCols::UpdatedAt))
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_item_id", fk_prefix))
                    .from(table, item_col)
                    .to(parent, ItemCols::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_paper_product_id", fk_prefix))
                    .from(table, StockCols::PaperProductId)
                    .to(PaperProducts::Table, PaperProducts::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaperProducts::Table)
                        .if_not_exists()
                        .col(&mut id_col(PaperProducts::Id))
                        .col(ColumnDef::new(PaperProducts::Brand).string().not_null())
                        .col(ColumnDef::new(PaperProducts::PaperType).string().not_null())
                        .col(ColumnDef::new(PaperProducts::Finish).string().null())
                        .col(ColumnDef::new(PaperProducts::Size).string().not_null())
                        .col(ColumnDef::new(PaperProducts::WeightLb).integer().null())
                        .col(
                            ColumnDef::new(PaperProducts::Caliper)
                                .decimal_len(8, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(PaperProducts::ReferenceId).string().null())
                        .col(&mut ts_col(PaperProducts::CreatedAt))
                        .col(&mut ts_col(PaperProducts::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(stock_table(
                    OrderItemStocks::Table,
                    OrderItemStocks::OrderItemId,
                    OrderItems::Table,
                    "order_item_stocks",
                ))
                .await?;

            manager
                .create_table(stock_table(
                    WorkOrderItemStocks::Table,
                    WorkOrderItemStocks::WorkOrderItemId,
                    WorkOrderItems::Table,
                    "work_order_item_stocks",
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrderItemStocks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItemStocks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaperProducts::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000008_create_status_transitions_table {
    use super::idens::*;
    use super::{id_col, ts_col};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_status_transitions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StatusTransitions::Table)
                        .if_not_exists()
                        .col(&mut id_col(StatusTransitions::Id))
                        .col(
                            ColumnDef::new(StatusTransitions::EntityType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StatusTransitions::EntityId).uuid().not_null())
                        .col(
                            ColumnDef::new(StatusTransitions::FromStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StatusTransitions::ToStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StatusTransitions::ChangedById).uuid().null())
                        .col(ColumnDef::new(StatusTransitions::Note).text().null())
                        .col(&mut ts_col(StatusTransitions::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_status_transitions_entity")
                        .table(StatusTransitions::Table)
                        .col(StatusTransitions::EntityType)
                        .col(StatusTransitions::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StatusTransitions::Table).to_owned())
                .await
        }
    }
}
