//! Migration to create organisation wallets and their transaction log

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganisationWallets::Table)
                    .if_not_exists()
                    .col(pk_auto(OrganisationWallets::Id))
                    .col(integer(OrganisationWallets::OrganisationId))
                    .col(big_integer(OrganisationWallets::BalanceUsdCents).default(0))
                    .col(timestamp_with_time_zone(OrganisationWallets::CreatedAt))
                    .col(timestamp_with_time_zone(OrganisationWallets::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organisation_wallets_organisation_id")
                    .table(OrganisationWallets::Table)
                    .col(OrganisationWallets::OrganisationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganisationWalletTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(OrganisationWalletTransactions::Id))
                    .col(integer(OrganisationWalletTransactions::WalletId))
                    .col(string(OrganisationWalletTransactions::TransactionType))
                    .col(big_integer(OrganisationWalletTransactions::AmountCents))
                    .col(text(OrganisationWalletTransactions::Description))
                    .col(integer_null(OrganisationWalletTransactions::RelatedSalesOrderId))
                    .col(timestamp_with_time_zone(OrganisationWalletTransactions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_wallet_transactions_wallet_id")
                    .table(OrganisationWalletTransactions::Table)
                    .col(OrganisationWalletTransactions::WalletId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganisationWalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganisationWallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganisationWallets {
    Table,
    Id,
    OrganisationId,
    BalanceUsdCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganisationWalletTransactions {
    Table,
    Id,
    WalletId,
    TransactionType,
    AmountCents,
    Description,
    RelatedSalesOrderId,
    CreatedAt,
}
