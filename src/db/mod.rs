//! Database module - SQLite with sqlx

mod models;
mod pool;
mod store;

pub use pool::*;
pub use store::*;
