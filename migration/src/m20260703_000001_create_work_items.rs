//! Migration to create challenges, competitions and bounties
//!
//! Bounty reward_amount is points when reward_type is Points, integer USD
//! cents when reward_type is USD.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Challenges::Table)
                    .if_not_exists()
                    .col(pk_auto(Challenges::Id))
                    .col(integer(Challenges::ProductId))
                    .col(string(Challenges::Title))
                    .col(string(Challenges::Status).default("Draft"))
                    .col(timestamp_with_time_zone(Challenges::CreatedAt))
                    .col(timestamp_with_time_zone(Challenges::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_challenges_product_id")
                    .table(Challenges::Table)
                    .col(Challenges::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Competitions::Table)
                    .if_not_exists()
                    .col(pk_auto(Competitions::Id))
                    .col(integer(Competitions::ProductId))
                    .col(string(Competitions::Title))
                    .col(string(Competitions::Status).default("Draft"))
                    .col(timestamp_with_time_zone(Competitions::CreatedAt))
                    .col(timestamp_with_time_zone(Competitions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_competitions_product_id")
                    .table(Competitions::Table)
                    .col(Competitions::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bounties::Table)
                    .if_not_exists()
                    .col(pk_auto(Bounties::Id))
                    .col(integer(Bounties::ProductId))
                    .col(integer_null(Bounties::ChallengeId))
                    .col(integer_null(Bounties::CompetitionId))
                    .col(string(Bounties::Title))
                    .col(string(Bounties::RewardType).default("Points"))
                    .col(big_integer(Bounties::RewardAmount).default(0))
                    .col(big_integer_null(Bounties::FinalRewardAmount))
                    .col(string(Bounties::Status).default("Available"))
                    .col(timestamp_with_time_zone(Bounties::CreatedAt))
                    .col(timestamp_with_time_zone(Bounties::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bounties_product_id")
                    .table(Bounties::Table)
                    .col(Bounties::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bounties_challenge_id")
                    .table(Bounties::Table)
                    .col(Bounties::ChallengeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bounties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Competitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Challenges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Challenges {
    Table,
    Id,
    ProductId,
    Title,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Competitions {
    Table,
    Id,
    ProductId,
    Title,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bounties {
    Table,
    Id,
    ProductId,
    ChallengeId,
    CompetitionId,
    Title,
    RewardType,
    RewardAmount,
    FinalRewardAmount,
    Status,
    CreatedAt,
    UpdatedAt,
}
