//! SQLite storage implementation for the ledger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `ledger-core` and contains:
//! - Database file setup, connection pooling and the single writer actor
//! - Embedded Diesel migrations
//! - Repository implementations for holdings and daily prices
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//!
//! ```text
//!   ledger-core (domain, services)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```
//!
//! Reads go through the pool; every write is serialized through the
//! [`WriteHandle`] and runs in an immediate transaction.

pub mod db;
pub mod errors;
pub mod schema;
mod timestamps;

// Repository implementations
pub mod holdings;
pub mod prices;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use holdings::HoldingRepository;
pub use prices::PriceRepository;

// Re-export from ledger-core for convenience
pub use ledger_core::errors::{Error, Result};
