//! Database layer
//!
//! Supports SQLite (default, single-file deployment) and MySQL behind the
//! [`DatabasePool`] trait. The driver is selected from configuration.
//!
//! # Usage
//!
//! ```ignore
//! use nextpress::config::DatabaseConfig;
//! use nextpress::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod update;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};

fn database_error(err: &anyhow::Error) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .and_then(|e| e.as_database_error())
}

/// Whether an error was caused by a UNIQUE constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    database_error(err).is_some_and(|e| e.is_unique_violation())
}

/// Whether an error was caused by a FOREIGN KEY constraint violation
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    database_error(err).is_some_and(|e| e.is_foreign_key_violation())
}
