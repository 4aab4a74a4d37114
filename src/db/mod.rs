//! Database module: models and schema for the user table.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and insert payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `UserStorage` handle and its operations

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{AddUserOutcome, AuthOutcome, DbUser, NewUser, render_users};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, UserStorage};
