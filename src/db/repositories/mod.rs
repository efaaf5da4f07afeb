//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! exposes an async trait and a `Sqlx*Repository` that serves both SQLite
//! and MySQL.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;

pub mod blog;
pub mod category;
pub mod comment;
pub mod contact;
pub mod dashboard;
pub mod tag;
pub mod user;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use dashboard::{DashboardRepository, SqlxDashboardRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// Run `$body` with `$p` bound to the concrete SQLite or MySQL pool.
///
/// The body is expanded once per backend, so it type-checks against each
/// driver's own executor and row types.
macro_rules! with_pool {
    ($pool:expr, |$p:ident| $body:expr) => {
        match $pool.driver() {
            $crate::config::DatabaseDriver::Sqlite => {
                let $p = $pool.sqlite()?;
                $body
            }
            $crate::config::DatabaseDriver::Mysql => {
                let $p = $pool.mysql()?;
                $body
            }
        }
    };
}

pub(crate) use with_pool;

/// Column accessors shared by the SQLite and MySQL row types
pub(crate) trait DecodeRow: Row {
    fn text(&self, column: &str) -> Result<String>;
    fn opt_text(&self, column: &str) -> Result<Option<String>>;
    fn timestamp(&self, column: &str) -> Result<DateTime<Utc>>;
    fn opt_timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>>;
    fn int(&self, column: &str) -> Result<i64>;
}

macro_rules! impl_decode_row {
    ($row:ty) => {
        impl DecodeRow for $row {
            fn text(&self, column: &str) -> Result<String> {
                self.try_get(column)
                    .with_context(|| format!("Failed to decode column {}", column))
            }

            fn opt_text(&self, column: &str) -> Result<Option<String>> {
                self.try_get(column)
                    .with_context(|| format!("Failed to decode column {}", column))
            }

            fn timestamp(&self, column: &str) -> Result<DateTime<Utc>> {
                self.try_get(column)
                    .with_context(|| format!("Failed to decode column {}", column))
            }

            fn opt_timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>> {
                self.try_get(column)
                    .with_context(|| format!("Failed to decode column {}", column))
            }

            fn int(&self, column: &str) -> Result<i64> {
                self.try_get(column)
                    .with_context(|| format!("Failed to decode column {}", column))
            }
        }
    };
}

impl_decode_row!(sqlx::sqlite::SqliteRow);
impl_decode_row!(sqlx::mysql::MySqlRow);

/// Generate a new primary key
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
