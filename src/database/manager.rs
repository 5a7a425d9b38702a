use sqlx::error::ErrorKind;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer, classified by what callers can act on
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Unique constraint violated: {constraint:?}")]
    UniqueViolation { constraint: Option<String> },

    #[error("Foreign key constraint violated: {constraint:?}")]
    ForeignKeyViolation { constraint: Option<String> },

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Name of the violated constraint, if this is an integrity violation
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DatabaseError::UniqueViolation { constraint }
            | DatabaseError::ForeignKeyViolation { constraint } => constraint.as_deref(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, DatabaseError::UniqueViolation { .. }) && self.constraint() == Some(constraint)
    }

    pub fn is_foreign_key_violation(&self, constraint: &str) -> bool {
        matches!(self, DatabaseError::ForeignKeyViolation { .. })
            && self.constraint() == Some(constraint)
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let integrity = match &err {
            sqlx::Error::Database(db_err) => {
                Some((db_err.kind(), db_err.constraint().map(str::to_owned)))
            }
            _ => None,
        };

        match integrity {
            Some((ErrorKind::UniqueViolation, constraint)) => {
                DatabaseError::UniqueViolation { constraint }
            }
            Some((ErrorKind::ForeignKeyViolation, constraint)) => {
                DatabaseError::ForeignKeyViolation { constraint }
            }
            _ => match err {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                    DatabaseError::Unavailable(err.to_string())
                }
                other => DatabaseError::Sqlx(other),
            },
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::Migration(err.to_string())
    }
}

/// Connection pool construction and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Connect eagerly; fails fast when the database is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Build a pool that only connects on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options(config).connect_lazy(&config.url)?)
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
