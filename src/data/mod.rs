//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Row models and feed cursors

mod database;
mod models;

pub use database::Database;
pub use models::*;
