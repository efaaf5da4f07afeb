//! Partial update composition
//!
//! Builds `UPDATE ... SET` statements containing only the columns that were
//! actually supplied, with values bound in order for either backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlConnection, SqliteConnection};

/// A value bound to one `SET` assignment
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

/// Collects `column = ?` assignments for an UPDATE statement
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    columns: Vec<&'static str>,
    values: Vec<BindValue>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Assign a text column (NULL when `value` is `None`)
    pub fn set_text(&mut self, column: &'static str, value: Option<String>) -> &mut Self {
        self.columns.push(column);
        self.values.push(BindValue::Text(value));
        self
    }

    /// Assign a timestamp column
    pub fn set_timestamp(&mut self, column: &'static str, value: Option<DateTime<Utc>>) -> &mut Self {
        self.columns.push(column);
        self.values.push(BindValue::Timestamp(value));
        self
    }

    /// Whether no assignment has been recorded
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render the statement, keyed on a trailing `id = ?` parameter
    pub fn sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        format!("UPDATE {} SET {} WHERE id = ?", self.table, assignments)
    }
}

/// Executes an [`UpdateBuilder`] on a connection, binding the row id last.
///
/// Implemented for both backend connection types so it can run on a pooled
/// connection or inside a transaction.
#[async_trait]
pub trait ApplyUpdate: Send {
    /// Returns the number of rows affected
    async fn apply_update(&mut self, update: &UpdateBuilder, id: &str) -> Result<u64>;
}

#[async_trait]
impl ApplyUpdate for SqliteConnection {
    async fn apply_update(&mut self, update: &UpdateBuilder, id: &str) -> Result<u64> {
        let sql = update.sql();
        let mut query = sqlx::query(&sql);
        for value in &update.values {
            query = match value {
                BindValue::Text(v) => query.bind(v.clone()),
                BindValue::Timestamp(v) => query.bind(*v),
            };
        }
        let result = query
            .bind(id)
            .execute(&mut *self)
            .await
            .with_context(|| format!("Failed to update {}", update.table))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ApplyUpdate for MySqlConnection {
    async fn apply_update(&mut self, update: &UpdateBuilder, id: &str) -> Result<u64> {
        let sql = update.sql();
        let mut query = sqlx::query(&sql);
        for value in &update.values {
            query = match value {
                BindValue::Text(v) => query.bind(v.clone()),
                BindValue::Timestamp(v) => query.bind(*v),
            };
        }
        let result = query
            .bind(id)
            .execute(&mut *self)
            .await
            .with_context(|| format!("Failed to update {}", update.table))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_contains_only_supplied_columns() {
        let mut builder = UpdateBuilder::new("categories");
        builder
            .set_text("name", Some("Rust".to_string()))
            .set_text("description", None);

        assert_eq!(
            builder.sql(),
            "UPDATE categories SET name = ?, description = ? WHERE id = ?"
        );
        assert!(!builder.is_empty());
    }

    #[test]
    fn test_empty_builder() {
        let builder = UpdateBuilder::new("blogs");
        assert!(builder.is_empty());
    }

    #[tokio::test]
    async fn test_apply_update_on_sqlite() {
        let pool = crate::db::create_test_pool().await.unwrap();
        sqlx::query("CREATE TABLE notes (id TEXT PRIMARY KEY, body TEXT, seen_at TIMESTAMP)")
            .execute(pool.sqlite().unwrap())
            .await
            .unwrap();
        sqlx::query("INSERT INTO notes (id, body) VALUES ('n1', 'old')")
            .execute(pool.sqlite().unwrap())
            .await
            .unwrap();

        let now = Utc::now();
        let mut builder = UpdateBuilder::new("notes");
        builder
            .set_text("body", Some("new".to_string()))
            .set_timestamp("seen_at", Some(now));

        let mut conn = pool.sqlite().unwrap().acquire().await.unwrap();
        let affected = conn.apply_update(&builder, "n1").await.unwrap();
        assert_eq!(affected, 1);
        drop(conn);

        let body: String = sqlx::query_scalar("SELECT body FROM notes WHERE id = 'n1'")
            .fetch_one(pool.sqlite().unwrap())
            .await
            .unwrap();
        assert_eq!(body, "new");
    }
}
