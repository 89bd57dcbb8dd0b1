//! imbue-sqlite: embedded SQLite engine for the imbue recipe apps
//!
//! A thin, dynamically typed layer over SQLite:
//! - Named databases opened under a per-platform storage profile (durable
//!   file, or in-memory with an explicit snapshot file)
//! - One-shot import of bundled JSON seed exports
//! - Write and read statements over loosely typed rows
//!
//! Higher layers decide what the rows mean; this crate only moves them.

pub mod database;
pub mod dataset;
pub mod error;
pub mod value;

pub use database::{SqliteDatabase, StorageMode, StoreProfile};
pub use dataset::{Dataset, ImportMode, SchemaEntry, TableDump};
pub use error::StoreError;
pub use value::{Row, SqlValue};
