pub mod bid;
pub mod cart;
pub mod common;
pub mod order;
pub mod point_account;
