use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::models::User;
use fx_core::traits::UserRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{db_error, SqliteStore};

const USER_COLUMNS: &str = "SELECT id, username, email, password, created_at, updated_at FROM users";

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl SqliteStore {
    async fn find_user_where(&self, clause: &str, value: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("{USER_COLUMNS} WHERE {clause} = ?"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading user"))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(db_error("decoding user"))
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting user"))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("{USER_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading user"))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(db_error("decoding user"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user_where("username", username).await
    }
}
