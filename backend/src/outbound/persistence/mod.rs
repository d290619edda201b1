//! PostgreSQL persistence for customer documents.
//!
//! The adapter only translates between `documents` rows and
//! [`StoredItem`](crate::domain::ports::StoredItem)s; merging and
//! aggregation stay in the domain. Connections come from a `bb8` pool driven
//! by `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use switchgear_pm::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! run_migrations("postgres://localhost/pm").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pm")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::{MIGRATIONS, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
