use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::domain::{
    duty::{Duty, DutyId},
    repository::DutyRepository,
};

const COLUMNS: &str = "id, name, is_completed, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteDutyRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteDutyRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to the database")?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl DutyRepository for SqliteDutyRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS duties (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 100),
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await
        .context("Failed to create duties table")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Duty>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM duties ORDER BY created_at ASC, rowid ASC"))
            .fetch_all(&*self.pool)
            .await
            .context("Failed to get duties")?;
        rows.into_iter().map(row_to_duty).collect()
    }

    async fn get(&self, id: DutyId) -> Result<Option<Duty>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM duties WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .context("Failed to get duty")?;
        row.map(row_to_duty).transpose()
    }

    async fn create(&self, name: &str) -> Result<Duty> {
        let now = Utc::now();
        let id = DutyId::new();
        sqlx::query(
            "INSERT INTO duties (id, name, is_completed, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(timestamp(now))
        .execute(&*self.pool)
        .await
        .context("Failed to create duty")?;
        Ok(Duty { id, name: name.to_owned(), is_completed: false, created_at: now, updated_at: now })
    }

    async fn update_name(&self, id: DutyId, name: &str) -> Result<Option<Duty>> {
        let row = sqlx::query(&format!("UPDATE duties SET name = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .bind(name)
            .bind(timestamp(Utc::now()))
            .fetch_optional(&*self.pool)
            .await
            .context("Failed to update duty name")?;
        row.map(row_to_duty).transpose()
    }

    async fn update_status(&self, id: DutyId, is_completed: bool) -> Result<Option<Duty>> {
        let row = sqlx::query(&format!("UPDATE duties SET is_completed = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .bind(is_completed)
            .bind(timestamp(Utc::now()))
            .fetch_optional(&*self.pool)
            .await
            .context("Failed to update duty status")?;
        row.map(row_to_duty).transpose()
    }

    async fn delete(&self, id: DutyId) -> Result<Option<Duty>> {
        let row = sqlx::query(&format!("DELETE FROM duties WHERE id = ?1 RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .context("Failed to delete duty")?;
        row.map(row_to_duty).transpose()
    }
}

// Fixed-width nanosecond form keeps text ordering chronological.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid {column} value {raw:?}"))
}

fn row_to_duty(row: SqliteRow) -> Result<Duty> {
    let id_str: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let is_completed: bool = row.try_get("is_completed")?;
    let created_at_str: String = row.try_get("created_at")?;
    let updated_at_str: String = row.try_get("updated_at")?;

    let id = Uuid::parse_str(&id_str).with_context(|| format!("invalid id value {id_str:?}"))?;

    Ok(Duty {
        id: DutyId(id),
        name,
        is_completed,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}
