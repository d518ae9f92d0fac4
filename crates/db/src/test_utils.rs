//! Helpers for tests that run against a real `PostgreSQL` database.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Tables owned by the migrations, children first.
const TABLES: [&str; 4] = ["answer", "question", "poll", "user"];

/// Connection settings for the test database, read from `TEST_DB_*`.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "polling_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "polling_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "polling_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// URL of the test database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// URL of the maintenance database, used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection, shareable with repositories.
    pub conn: Arc<DatabaseConnection>,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the configured test database and bring its schema up to date.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with explicit settings and bring the schema up to date.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Create a fresh, uniquely named database so tests can run in parallel.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("polling_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        info!(database = %config.database, "Created unique test database");

        Self::with_config(config).await
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// A handle to the connection for repositories and services.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Empty every application table and reset identity sequences.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let tables = TABLES
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("TRUNCATE TABLE {tables} RESTART IDENTITY"),
            ))
            .await?;

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop a database made by [`TestDatabase::create_unique`].
    pub async fn drop_database(self) -> Result<(), DbErr> {
        // Handles still held elsewhere are cut off by the forced drop below
        if let Ok(conn) = Arc::try_unwrap(self.conn) {
            conn.close().await?;
        }

        let admin = Database::connect(&self.config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                    self.config.database
                ),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}
