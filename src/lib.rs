// src/lib.rs

use sea_orm::DatabaseConnection;
use services::payments::PaymentProcessor;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub payments: PaymentProcessor,
}

pub mod entities {
    pub mod prelude;
    pub mod bounties;
    pub mod bounty_bids;
    pub mod cart_line_items;
    pub mod carts;
    pub mod challenges;
    pub mod competitions;
    pub mod organisation_point_accounts;
    pub mod organisation_point_grants;
    pub mod organisation_wallet_transactions;
    pub mod organisation_wallets;
    pub mod organisations;
    pub mod persons;
    pub mod platform_fee_configurations;
    pub mod point_orders;
    pub mod point_transactions;
    pub mod product_point_accounts;
    pub mod products;
    pub mod sales_order_line_items;
    pub mod sales_orders;
}

pub mod services {
    pub mod adjustment;
    pub mod cart;
    pub mod fee_calculator;
    pub mod payments;
    pub mod point_ledger;
    pub mod sales_tax;
    pub mod settlement;
    pub mod wallet;
}

pub mod models;
pub mod handlers;
