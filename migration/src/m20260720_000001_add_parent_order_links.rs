//! Migration to add parent order links for bid-driven adjustment orders
//!
//! Adjustment orders are additive children; the settled parent order is
//! never mutated.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(SalesOrders::Table)
                    .add_column(integer_null(SalesOrders::ParentSalesOrderId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_orders_parent_sales_order_id")
                    .table(SalesOrders::Table)
                    .col(SalesOrders::ParentSalesOrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PointOrders::Table)
                    .add_column(integer_null(PointOrders::ParentOrderId))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(PointOrders::Table)
                    .drop_column(PointOrders::ParentOrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_sales_orders_parent_sales_order_id")
                    .table(SalesOrders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(SalesOrders::Table)
                    .drop_column(SalesOrders::ParentSalesOrderId)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum SalesOrders {
    Table,
    ParentSalesOrderId,
}

#[derive(DeriveIden)]
enum PointOrders {
    Table,
    ParentOrderId,
}
