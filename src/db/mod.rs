//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the option store actor and its handle
//! - `recorded.rs`: per-request query-timing wrapper around the handle

pub mod actor;
pub mod models;
pub mod recorded;
pub mod schema;

pub use models::OptionRow;
pub use recorded::RecordedStore;
pub use schema::SQLITE_INIT;

pub use actor::{OptionStoreHandle, spawn};
