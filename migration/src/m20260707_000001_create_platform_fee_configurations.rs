//! Migration to create the time-versioned platform fee configuration table
//!
//! The active row is the one with the latest applies_from <= now.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlatformFeeConfigurations::Table)
                    .if_not_exists()
                    .col(pk_auto(PlatformFeeConfigurations::Id))
                    .col(integer(PlatformFeeConfigurations::Percentage))
                    .col(timestamp_with_time_zone(PlatformFeeConfigurations::AppliesFrom))
                    .col(timestamp_with_time_zone(PlatformFeeConfigurations::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_platform_fee_configurations_applies_from")
                    .table(PlatformFeeConfigurations::Table)
                    .col(PlatformFeeConfigurations::AppliesFrom)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlatformFeeConfigurations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlatformFeeConfigurations {
    Table,
    Id,
    Percentage,
    AppliesFrom,
    CreatedAt,
}
