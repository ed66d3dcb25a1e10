//! Database plumbing for the product catalog: PostgreSQL connections, retries,
//! health checks and scoped transactions.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` - Load [`postgres::PostgresConfig`] through `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::new(url), None).await?;
//! postgres::run_migrations::<Migrator>(&db, "catalog").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod transaction;

pub use common::{DatabaseError, DatabaseResult};

#[cfg(feature = "postgres")]
pub use transaction::{Transaction, scoped, with_transaction};
