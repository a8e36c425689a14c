use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_bom_tables::Migration),
            Box::new(m20240101_000003_create_manufacturing_orders_table::Migration),
            Box::new(m20240101_000004_create_rfq_tables::Migration),
            Box::new(m20240101_000005_create_quotation_tables::Migration),
            Box::new(m20240101_000006_create_vendor_bills_table::Migration),
        ]
    }
}

mod m20240101_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::IdProduct)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::Reference).string().null())
                        .col(ColumnDef::new(Products::SalesPrice).string().not_null())
                        .col(ColumnDef::new(Products::Cost).string().not_null())
                        .col(ColumnDef::new(Products::Tax).string().null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::IdMaterial)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Materials::MaterialName).string().not_null())
                        .col(ColumnDef::new(Materials::SalesPrice).string().not_null())
                        .col(ColumnDef::new(Materials::Cost).string().not_null())
                        .col(ColumnDef::new(Materials::Unit).string().null())
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vendors::IdVendor)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vendors::VendorName).string().not_null())
                        .col(ColumnDef::new(Vendors::Email).string().null())
                        .col(ColumnDef::new(Vendors::Phone).string().null())
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vendors::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::IdCustomer)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::CustomerName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        IdProduct,
        ProductName,
        Reference,
        SalesPrice,
        Cost,
        Tax,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        IdMaterial,
        MaterialName,
        SalesPrice,
        Cost,
        Unit,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        IdVendor,
        VendorName,
        Email,
        Phone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        IdCustomer,
        CustomerName,
        Email,
        Phone,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_bom_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_bom_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Boms::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Boms::IdBom).string().not_null().primary_key())
                        .col(ColumnDef::new(Boms::IdProduct).string().not_null())
                        .col(ColumnDef::new(Boms::ProductName).string().not_null())
                        .col(ColumnDef::new(Boms::ProductReference).string().null())
                        .col(ColumnDef::new(Boms::Quantity).string().not_null())
                        .col(ColumnDef::new(Boms::Status).string().not_null())
                        .col(
                            ColumnDef::new(Boms::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Boms::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Boms::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Line items are removed explicitly before their header, no cascade.
            manager
                .create_table(
                    Table::create()
                        .table(BomMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomMaterials::IdBomMaterial)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BomMaterials::IdBom).string().not_null())
                        .col(ColumnDef::new(BomMaterials::IdMaterial).string().not_null())
                        .col(ColumnDef::new(BomMaterials::MaterialName).string().not_null())
                        .col(ColumnDef::new(BomMaterials::Quantity).string().not_null())
                        .col(ColumnDef::new(BomMaterials::Unit).string().null())
                        .col(
                            ColumnDef::new(BomMaterials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomMaterials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_materials_bom")
                                .from(BomMaterials::Table, BomMaterials::IdBom)
                                .to(Boms::Table, Boms::IdBom),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_bom_materials_id_bom")
                        .table(BomMaterials::Table)
                        .col(BomMaterials::IdBom)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BomMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Boms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Boms {
        Table,
        IdBom,
        IdProduct,
        ProductName,
        ProductReference,
        Quantity,
        Status,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum BomMaterials {
        Table,
        IdBomMaterial,
        IdBom,
        IdMaterial,
        MaterialName,
        Quantity,
        Unit,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_manufacturing_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_manufacturing_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ManufacturingOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ManufacturingOrders::IdMo)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ManufacturingOrders::IdProduct)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ManufacturingOrders::IdBom).string().not_null())
                        .col(
                            ColumnDef::new(ManufacturingOrders::QtyToProduce)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ManufacturingOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(ManufacturingOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ManufacturingOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ManufacturingOrders::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_manufacturing_orders_id_bom")
                        .table(ManufacturingOrders::Table)
                        .col(ManufacturingOrders::IdBom)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ManufacturingOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ManufacturingOrders {
        Table,
        IdMo,
        IdProduct,
        IdBom,
        QtyToProduce,
        Status,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }
}

mod m20240101_000004_create_rfq_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_rfq_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Rfqs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Rfqs::IdRfq).string().not_null().primary_key())
                        .col(ColumnDef::new(Rfqs::IdVendor).string().not_null())
                        .col(ColumnDef::new(Rfqs::OrderDate).string().not_null())
                        .col(ColumnDef::new(Rfqs::Status).string().not_null())
                        .col(
                            ColumnDef::new(Rfqs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Rfqs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Rfqs::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RfqProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RfqProducts::IdRfqProduct)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RfqProducts::IdRfq).string().not_null())
                        .col(ColumnDef::new(RfqProducts::IdProduct).string().not_null())
                        .col(ColumnDef::new(RfqProducts::IdVendor).string().not_null())
                        .col(ColumnDef::new(RfqProducts::ProductName).string().not_null())
                        .col(ColumnDef::new(RfqProducts::Quantity).string().not_null())
                        .col(ColumnDef::new(RfqProducts::UnitPrice).string().not_null())
                        .col(ColumnDef::new(RfqProducts::Tax).string().not_null())
                        .col(ColumnDef::new(RfqProducts::Subtotal).string().not_null())
                        .col(
                            ColumnDef::new(RfqProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RfqProducts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rfq_products_rfq")
                                .from(RfqProducts::Table, RfqProducts::IdRfq)
                                .to(Rfqs::Table, Rfqs::IdRfq),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_rfq_products_rfq_product")
                        .table(RfqProducts::Table)
                        .col(RfqProducts::IdRfq)
                        .col(RfqProducts::IdProduct)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RfqProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Rfqs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Rfqs {
        Table,
        IdRfq,
        IdVendor,
        OrderDate,
        Status,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum RfqProducts {
        Table,
        IdRfqProduct,
        IdRfq,
        IdProduct,
        IdVendor,
        ProductName,
        Quantity,
        UnitPrice,
        Tax,
        Subtotal,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_quotation_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_quotation_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotations::IdQuotation)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Quotations::IdCustomer).string().not_null())
                        .col(ColumnDef::new(Quotations::OrderDate).string().not_null())
                        .col(ColumnDef::new(Quotations::Status).string().not_null())
                        .col(ColumnDef::new(Quotations::Payment).string().null())
                        .col(
                            ColumnDef::new(Quotations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotations::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(QuotationProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QuotationProducts::IdQuotationProduct)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(QuotationProducts::IdQuotation)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(QuotationProducts::IdProduct).string().not_null())
                        .col(ColumnDef::new(QuotationProducts::IdCustomer).string().not_null())
                        .col(
                            ColumnDef::new(QuotationProducts::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(QuotationProducts::Quantity).string().not_null())
                        .col(ColumnDef::new(QuotationProducts::UnitPrice).string().not_null())
                        .col(ColumnDef::new(QuotationProducts::Tax).string().not_null())
                        .col(ColumnDef::new(QuotationProducts::Subtotal).string().not_null())
                        .col(
                            ColumnDef::new(QuotationProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuotationProducts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quotation_products_quotation")
                                .from(QuotationProducts::Table, QuotationProducts::IdQuotation)
                                .to(Quotations::Table, Quotations::IdQuotation),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_quotation_products_quotation_product")
                        .table(QuotationProducts::Table)
                        .col(QuotationProducts::IdQuotation)
                        .col(QuotationProducts::IdProduct)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QuotationProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Quotations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Quotations {
        Table,
        IdQuotation,
        IdCustomer,
        OrderDate,
        Status,
        Payment,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum QuotationProducts {
        Table,
        IdQuotationProduct,
        IdQuotation,
        IdProduct,
        IdCustomer,
        ProductName,
        Quantity,
        UnitPrice,
        Tax,
        Subtotal,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_vendor_bills_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_vendor_bills_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VendorBills::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VendorBills::IdBill)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VendorBills::IdRfq).string().not_null())
                        .col(ColumnDef::new(VendorBills::IdVendor).string().not_null())
                        .col(ColumnDef::new(VendorBills::BillDate).string().not_null())
                        .col(ColumnDef::new(VendorBills::Payment).string().not_null())
                        .col(
                            ColumnDef::new(VendorBills::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VendorBills::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vendor_bills_id_rfq")
                        .table(VendorBills::Table)
                        .col(VendorBills::IdRfq)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VendorBills::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VendorBills {
        Table,
        IdBill,
        IdRfq,
        IdVendor,
        BillDate,
        Payment,
        CreatedAt,
        UpdatedAt,
    }
}
