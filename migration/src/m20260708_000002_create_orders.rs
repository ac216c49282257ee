//! Migration to create sales orders, their frozen line items and point orders
//!
//! One sales order and/or one point order per cart. Totals are integer USD
//! cents; total_cents = subtotal + fee + tax.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesOrders::Table)
                    .if_not_exists()
                    .col(pk_auto(SalesOrders::Id))
                    .col(integer(SalesOrders::CartId))
                    .col(string(SalesOrders::OrderReference))
                    .col(string(SalesOrders::Status).default("Pending"))
                    .col(big_integer(SalesOrders::SubtotalCents).default(0))
                    .col(big_integer(SalesOrders::FeeCents).default(0))
                    .col(big_integer(SalesOrders::TaxCents).default(0))
                    .col(big_integer(SalesOrders::TotalCents).default(0))
                    .col(timestamp_with_time_zone(SalesOrders::CreatedAt))
                    .col(timestamp_with_time_zone(SalesOrders::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_orders_cart_id")
                    .table(SalesOrders::Table)
                    .col(SalesOrders::CartId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_orders_status")
                    .table(SalesOrders::Table)
                    .col(SalesOrders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SalesOrderLineItems::Table)
                    .if_not_exists()
                    .col(pk_auto(SalesOrderLineItems::Id))
                    .col(integer(SalesOrderLineItems::SalesOrderId))
                    .col(string(SalesOrderLineItems::Kind))
                    .col(integer(SalesOrderLineItems::Quantity).default(1))
                    .col(big_integer(SalesOrderLineItems::UnitUsdCents).default(0))
                    .col(integer_null(SalesOrderLineItems::BountyId))
                    .col(integer_null(SalesOrderLineItems::RelatedBidId))
                    .col(timestamp_with_time_zone(SalesOrderLineItems::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_order_line_items_sales_order_id")
                    .table(SalesOrderLineItems::Table)
                    .col(SalesOrderLineItems::SalesOrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointOrders::Table)
                    .if_not_exists()
                    .col(pk_auto(PointOrders::Id))
                    .col(integer(PointOrders::CartId))
                    .col(integer(PointOrders::OrgAccountId))
                    .col(integer(PointOrders::ProductAccountId))
                    .col(big_integer(PointOrders::TotalPoints).default(0))
                    .col(string(PointOrders::Status).default("Pending"))
                    .col(timestamp_with_time_zone(PointOrders::CreatedAt))
                    .col(timestamp_with_time_zone(PointOrders::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_point_orders_cart_id")
                    .table(PointOrders::Table)
                    .col(PointOrders::CartId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesOrderLineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SalesOrders {
    Table,
    Id,
    CartId,
    OrderReference,
    Status,
    SubtotalCents,
    FeeCents,
    TaxCents,
    TotalCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SalesOrderLineItems {
    Table,
    Id,
    SalesOrderId,
    Kind,
    Quantity,
    UnitUsdCents,
    BountyId,
    RelatedBidId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointOrders {
    Table,
    Id,
    CartId,
    OrgAccountId,
    ProductAccountId,
    TotalPoints,
    Status,
    CreatedAt,
    UpdatedAt,
}
