pub mod budget;
pub mod budget_item;
pub mod input;
pub mod product_service;
pub mod user;
