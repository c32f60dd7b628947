use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241208_000001_create_departments_table::Migration),
            Box::new(m20241208_000002_create_goods_categories_table::Migration),
            Box::new(m20241208_000003_create_measurement_units_table::Migration),
            Box::new(m20241208_000004_create_goods_table::Migration),
            Box::new(m20241208_000005_create_purchase_requests_table::Migration),
            Box::new(m20241208_000006_create_purchase_request_items_table::Migration),
            Box::new(m20241208_000007_create_procurement_logs_table::Migration),
        ]
    }
}

mod m20241208_000001_create_departments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000001_create_departments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Departments::Name).string().not_null())
                        .col(
                            ColumnDef::new(Departments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Departments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Departments {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000002_create_goods_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000002_create_goods_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(GoodsCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsCategories::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(GoodsCategories::Name).string().not_null())
                        .col(
                            ColumnDef::new(GoodsCategories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsCategories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GoodsCategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum GoodsCategories {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000003_create_measurement_units_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000003_create_measurement_units_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MeasurementUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MeasurementUnits::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(MeasurementUnits::Name).string().not_null())
                        .col(
                            ColumnDef::new(MeasurementUnits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MeasurementUnits::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MeasurementUnits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MeasurementUnits {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000004_create_goods_table {
    use super::m20241208_000002_create_goods_categories_table::GoodsCategories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000004_create_goods_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Goods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Goods::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Goods::Name).string().not_null())
                        .col(ColumnDef::new(Goods::CategoryId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Goods::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Goods::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_goods_category")
                                .from(Goods::Table, Goods::CategoryId)
                                .to(GoodsCategories::Table, GoodsCategories::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_goods_category_id")
                        .table(Goods::Table)
                        .col(Goods::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Goods::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Goods {
        Table,
        Id,
        Name,
        CategoryId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000005_create_purchase_requests_table {
    use super::m20241208_000001_create_departments_table::Departments;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000005_create_purchase_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequests::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::RequestType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::RequestDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(PurchaseRequests::Buyer).string().null())
                        .col(
                            ColumnDef::new(PurchaseRequests::DepartmentId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::PurchaseReason)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::PurchaseReasonDetail)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::TotalItems)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseRequests::Notes).text().null())
                        .col(
                            ColumnDef::new(PurchaseRequests::CreatedBy)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseRequests::UpdatedBy).string().null())
                        .col(
                            ColumnDef::new(PurchaseRequests::FollowedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::UpdateStatusBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::UpdateStatusReason)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::ApprovalDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_requests_department")
                                .from(PurchaseRequests::Table, PurchaseRequests::DepartmentId)
                                .to(Departments::Table, Departments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_requests_status")
                        .table(PurchaseRequests::Table)
                        .col(PurchaseRequests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_requests_request_type")
                        .table(PurchaseRequests::Table)
                        .col(PurchaseRequests::RequestType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_requests_department_id")
                        .table(PurchaseRequests::Table)
                        .col(PurchaseRequests::DepartmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseRequests {
        Table,
        Id,
        RequestType,
        RequestDate,
        Status,
        Buyer,
        DepartmentId,
        PurchaseReason,
        PurchaseReasonDetail,
        TotalItems,
        Notes,
        CreatedBy,
        UpdatedBy,
        FollowedBy,
        UpdateStatusBy,
        UpdateStatusReason,
        ApprovalDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000006_create_purchase_request_items_table {
    use super::m20241208_000003_create_measurement_units_table::MeasurementUnits;
    use super::m20241208_000004_create_goods_table::Goods;
    use super::m20241208_000005_create_purchase_requests_table::PurchaseRequests;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000006_create_purchase_request_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequestItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::PurchaseRequestId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::GoodsId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::MeasurementId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_request_items_request")
                                .from(
                                    PurchaseRequestItems::Table,
                                    PurchaseRequestItems::PurchaseRequestId,
                                )
                                .to(PurchaseRequests::Table, PurchaseRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_request_items_goods")
                                .from(
                                    PurchaseRequestItems::Table,
                                    PurchaseRequestItems::GoodsId,
                                )
                                .to(Goods::Table, Goods::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_request_items_measurement")
                                .from(
                                    PurchaseRequestItems::Table,
                                    PurchaseRequestItems::MeasurementId,
                                )
                                .to(MeasurementUnits::Table, MeasurementUnits::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_request_items_request_id")
                        .table(PurchaseRequestItems::Table)
                        .col(PurchaseRequestItems::PurchaseRequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_request_items_goods_id")
                        .table(PurchaseRequestItems::Table)
                        .col(PurchaseRequestItems::GoodsId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseRequestItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseRequestItems {
        Table,
        Id,
        PurchaseRequestId,
        GoodsId,
        Quantity,
        MeasurementId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241208_000007_create_procurement_logs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241208_000007_create_procurement_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No foreign key on purchase_request_id: audit rows must survive
            // deletion of the request they describe.
            manager
                .create_table(
                    Table::create()
                        .table(ProcurementLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProcurementLogs::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProcurementLogs::PurchaseRequestId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProcurementLogs::LogName).string().not_null())
                        .col(
                            ColumnDef::new(ProcurementLogs::LogDescription)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProcurementLogs::Actor).string().null())
                        .col(
                            ColumnDef::new(ProcurementLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_procurement_logs_request_id")
                        .table(ProcurementLogs::Table)
                        .col(ProcurementLogs::PurchaseRequestId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProcurementLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ProcurementLogs {
        Table,
        Id,
        PurchaseRequestId,
        LogName,
        LogDescription,
        Actor,
        CreatedAt,
    }
}
