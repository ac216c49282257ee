//! Migration to create point accounts, the point transaction ledger and
//! organisation point grants
//!
//! point_transactions rows are append-only; exactly one of org_account_id /
//! product_account_id is set per row.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganisationPointAccounts::Table)
                    .if_not_exists()
                    .col(pk_auto(OrganisationPointAccounts::Id))
                    .col(integer(OrganisationPointAccounts::OrganisationId))
                    .col(big_integer(OrganisationPointAccounts::Balance).default(0))
                    .col(timestamp_with_time_zone(OrganisationPointAccounts::CreatedAt))
                    .col(timestamp_with_time_zone(OrganisationPointAccounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_point_accounts_organisation_id")
                    .table(OrganisationPointAccounts::Table)
                    .col(OrganisationPointAccounts::OrganisationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductPointAccounts::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductPointAccounts::Id))
                    .col(integer(ProductPointAccounts::ProductId))
                    .col(big_integer(ProductPointAccounts::Balance).default(0))
                    .col(timestamp_with_time_zone(ProductPointAccounts::CreatedAt))
                    .col(timestamp_with_time_zone(ProductPointAccounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_point_accounts_product_id")
                    .table(ProductPointAccounts::Table)
                    .col(ProductPointAccounts::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(PointTransactions::Id))
                    .col(integer_null(PointTransactions::OrgAccountId))
                    .col(integer_null(PointTransactions::ProductAccountId))
                    .col(integer_null(PointTransactions::CartId))
                    .col(big_integer(PointTransactions::Amount))
                    .col(string(PointTransactions::TransactionType))
                    .col(text(PointTransactions::Description))
                    .col(timestamp_with_time_zone(PointTransactions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_point_transactions_org_account_id")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::OrgAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_point_transactions_product_account_id")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::ProductAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganisationPointGrants::Table)
                    .if_not_exists()
                    .col(pk_auto(OrganisationPointGrants::Id))
                    .col(integer(OrganisationPointGrants::OrganisationId))
                    .col(big_integer(OrganisationPointGrants::Amount))
                    .col(integer_null(OrganisationPointGrants::GrantedById))
                    .col(text(OrganisationPointGrants::Rationale))
                    .col(timestamp_with_time_zone(OrganisationPointGrants::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_point_grants_organisation_id")
                    .table(OrganisationPointGrants::Table)
                    .col(OrganisationPointGrants::OrganisationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganisationPointGrants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductPointAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganisationPointAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganisationPointAccounts {
    Table,
    Id,
    OrganisationId,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductPointAccounts {
    Table,
    Id,
    ProductId,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    OrgAccountId,
    ProductAccountId,
    CartId,
    Amount,
    TransactionType,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganisationPointGrants {
    Table,
    Id,
    OrganisationId,
    Amount,
    GrantedById,
    Rationale,
    CreatedAt,
}
