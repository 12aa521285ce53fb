use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::info;

const CREATE_POSTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    content TEXT,
    code TEXT,
    object_key TEXT
)";

/// Database connection pool manager
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool to the given SQLite database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to database...");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_millis(2000))
            .connect(database_url)
            .await
            .context("Failed to open database")?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool. Used by tests that need a single-connection
    /// in-memory database.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the posts table if it does not exist. Safe to call repeatedly.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_POSTS_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create posts table")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

/// Open the database and run the idempotent schema setup.
pub async fn init_database(database_url: &str) -> Result<Database> {
    let db = Database::connect(database_url).await?;
    db.init_schema().await?;
    db.health_check()
        .await
        .context("Database health check failed after initialization")?;
    Ok(db)
}
