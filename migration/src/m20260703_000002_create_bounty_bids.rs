//! Migration to create the bounty_bids table

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BountyBids::Table)
                    .if_not_exists()
                    .col(pk_auto(BountyBids::Id))
                    .col(integer(BountyBids::BountyId))
                    .col(integer(BountyBids::PersonId))
                    .col(big_integer(BountyBids::Amount))
                    .col(string(BountyBids::Status).default("Pending"))
                    .col(text_null(BountyBids::Message))
                    .col(timestamp_with_time_zone(BountyBids::CreatedAt))
                    .col(timestamp_with_time_zone(BountyBids::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // One bid per person per bounty
        manager
            .create_index(
                Index::create()
                    .name("idx_bounty_bids_bounty_person")
                    .table(BountyBids::Table)
                    .col(BountyBids::BountyId)
                    .col(BountyBids::PersonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BountyBids::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BountyBids {
    Table,
    Id,
    BountyId,
    PersonId,
    Amount,
    Status,
    Message,
    CreatedAt,
    UpdatedAt,
}
