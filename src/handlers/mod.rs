pub mod ai;
pub mod auth;
pub mod budget;
pub mod budget_item;
pub mod input;
pub mod pdf;
pub mod product_service;
