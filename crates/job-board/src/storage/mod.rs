//! Relational persistence for the board.

mod schema;
mod sqlite;

pub use schema::{Migration, MIGRATIONS};
pub use sqlite::SqliteStore;
