pub mod cli;
pub mod config;
pub mod error;
pub mod ingredient_loader;
pub mod models;
pub mod server;
pub mod shopping_list;
pub mod storage;
