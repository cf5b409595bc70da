use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the datastore layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify Postgres constraint violations into caller-facing errors.
    /// `entity` names the row kind for RowNotFound.
    pub fn from_sqlx(err: sqlx::Error, entity: &'static str) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound(entity),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // foreign_key_violation
                Some("23503") => DatabaseError::InvalidReference(
                    db.constraint()
                        .map(|c| format!("referenced row does not exist or is still in use ({})", c))
                        .unwrap_or_else(|| "referenced row does not exist or is still in use".to_string()),
                ),
                // unique_violation
                Some("23505") => DatabaseError::Conflict(db.message().to_string()),
                _ => DatabaseError::Sqlx(err),
            },
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Builds the Postgres pool from `DATABASE_URL`
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = Self::database_url()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!("Created database pool for: {}", Self::redacted(&url));
        Ok(pool)
    }

    /// Apply embedded migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn database_url() -> Result<String, DatabaseError> {
        let url = std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        url::Url::parse(&url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        Ok(url)
    }

    /// Host and database only, for logs
    fn redacted(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(parsed) => format!(
                "{}{}",
                parsed.host_str().unwrap_or("localhost"),
                parsed.path()
            ),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
