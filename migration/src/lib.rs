pub use sea_orm_migration::prelude::*;

mod m20260702_000001_create_persons;
mod m20260702_000002_create_organisations;
mod m20260702_000003_create_products;
mod m20260703_000001_create_work_items;
mod m20260703_000002_create_bounty_bids;
mod m20260706_000001_create_point_accounts;
mod m20260706_000002_create_wallets;
mod m20260707_000001_create_platform_fee_configurations;
mod m20260708_000001_create_carts;
mod m20260708_000002_create_orders;
mod m20260720_000001_add_parent_order_links;
mod m20260728_000001_add_organisation_tax_rate;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260702_000001_create_persons::Migration),
            Box::new(m20260702_000002_create_organisations::Migration),
            Box::new(m20260702_000003_create_products::Migration),
            Box::new(m20260703_000001_create_work_items::Migration),
            Box::new(m20260703_000002_create_bounty_bids::Migration),
            Box::new(m20260706_000001_create_point_accounts::Migration),
            Box::new(m20260706_000002_create_wallets::Migration),
            Box::new(m20260707_000001_create_platform_fee_configurations::Migration),
            Box::new(m20260708_000001_create_carts::Migration),
            Box::new(m20260708_000002_create_orders::Migration),
            Box::new(m20260720_000001_add_parent_order_links::Migration),
            Box::new(m20260728_000001_add_organisation_tax_rate::Migration),
        ]
    }
}
