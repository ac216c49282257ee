//! Migration to create carts and cart line items
//!
//! Line items share one table tagged by kind: BOUNTY, PLATFORM_FEE,
//! SALES_TAX, INCREASE_ADJUSTMENT, DECREASE_ADJUSTMENT.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(pk_auto(Carts::Id))
                    .col(integer(Carts::PersonId))
                    .col(integer(Carts::OrganisationId))
                    .col(integer(Carts::ProductId))
                    .col(string(Carts::Country).default("US"))
                    .col(string(Carts::Status).default("Open"))
                    .col(timestamp_with_time_zone(Carts::CreatedAt))
                    .col(timestamp_with_time_zone(Carts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carts_person_id")
                    .table(Carts::Table)
                    .col(Carts::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carts_status")
                    .table(Carts::Table)
                    .col(Carts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartLineItems::Table)
                    .if_not_exists()
                    .col(pk_auto(CartLineItems::Id))
                    .col(integer(CartLineItems::CartId))
                    .col(string(CartLineItems::Kind))
                    .col(integer(CartLineItems::Quantity).default(1))
                    .col(big_integer(CartLineItems::UnitUsdCents).default(0))
                    .col(big_integer(CartLineItems::UnitPoints).default(0))
                    .col(integer_null(CartLineItems::BountyId))
                    .col(integer_null(CartLineItems::RelatedBidId))
                    .col(timestamp_with_time_zone(CartLineItems::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_line_items_cart_id")
                    .table(CartLineItems::Table)
                    .col(CartLineItems::CartId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_line_items_cart_kind")
                    .table(CartLineItems::Table)
                    .col(CartLineItems::CartId)
                    .col(CartLineItems::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartLineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    PersonId,
    OrganisationId,
    ProductId,
    Country,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CartLineItems {
    Table,
    Id,
    CartId,
    Kind,
    Quantity,
    UnitUsdCents,
    UnitPoints,
    BountyId,
    RelatedBidId,
    CreatedAt,
}
