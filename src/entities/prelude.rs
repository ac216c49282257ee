pub use super::bounties::Entity as Bounties;
pub use super::bounty_bids::Entity as BountyBids;
pub use super::cart_line_items::Entity as CartLineItems;
pub use super::carts::Entity as Carts;
pub use super::challenges::Entity as Challenges;
pub use super::competitions::Entity as Competitions;
pub use super::organisation_point_accounts::Entity as OrganisationPointAccounts;
pub use super::organisation_point_grants::Entity as OrganisationPointGrants;
pub use super::organisation_wallet_transactions::Entity as OrganisationWalletTransactions;
pub use super::organisation_wallets::Entity as OrganisationWallets;
pub use super::organisations::Entity as Organisations;
pub use super::persons::Entity as Persons;
pub use super::platform_fee_configurations::Entity as PlatformFeeConfigurations;
pub use super::point_orders::Entity as PointOrders;
pub use super::point_transactions::Entity as PointTransactions;
pub use super::product_point_accounts::Entity as ProductPointAccounts;
pub use super::products::Entity as Products;
pub use super::sales_order_line_items::Entity as SalesOrderLineItems;
pub use super::sales_orders::Entity as SalesOrders;
