// Repository layer for database operations

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::StoreConfig;
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the pool without connecting. A down store does not prevent
    /// startup; the first query reports the failure instead.
    pub fn connect_lazy(config: &StoreConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .connect_lazy_with(config.connect_options());
        tracing::debug!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "Store pool configured"
        );
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all pool connections. Called once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create the tasks table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn create_task(&self, input: CreateTask) -> Result<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (title, description, status)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, status, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_task(&self, id: i32) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Full overwrite, no COALESCE: omitted fields land as NULL.
    pub async fn update_task(&self, id: i32, input: UpdateTask) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET
                title = $2,
                description = $3,
                status = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_task(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
