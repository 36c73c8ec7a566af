//! # fx-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `fx-core` domain models. One `SqliteStore` implements every
//! repository port over a shared pool.

mod communities;
mod files;
mod posts;
mod users;
mod votes;

pub mod seed;

use std::str::FromStr;

use fx_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies migrations.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. The pool holds its single connection
    /// forever, otherwise the database would vanish with it.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::debug!("database migrations applied");
        Ok(())
    }
}

/// Maps a driver error onto the domain: unique violations become conflicts,
/// everything else is an internal failure carrying `context`.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return AppError::Conflict(format!("{context}: {}", db.message()));
            }
        }
        AppError::Internal(anyhow::Error::new(err).context(context))
    }
}

/// Wraps a column that failed to parse into the domain type.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use fx_core::models::{Community, User};
    use fx_core::traits::{CommunityRepo, UserRepo};
    use uuid::Uuid;

    use super::SqliteStore;

    pub async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    pub async fn user(store: &SqliteStore, name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: name.into(),
            email: format!("{name}@example.com"),
            password: "$argon2id$stub".into(),
            created_at: now,
            updated_at: now,
        };
        store.create_user(user.clone()).await.unwrap();
        user
    }

    pub async fn community(store: &SqliteStore, name: &str, location: Option<&str>) -> Community {
        let now = Utc::now();
        let community = Community {
            id: Uuid::now_v7(),
            name: name.into(),
            title: format!("{name} residents"),
            location: location.map(str::to_string),
            geography: None,
            banner_image_url: None,
            created_at: now,
            updated_at: now,
        };
        store.create_community(community.clone()).await.unwrap();
        community
    }
}
