use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::models::{Attachment, File};
use fx_core::traits::FileRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{db_error, SqliteStore};

/// Attachments carry the file's name, so every read joins `files`.
const ATTACHMENT_SELECT: &str = "SELECT a.id, a.post_id, a.file_id, a.caption, a.created_at, \
     f.filename, f.extension FROM attachments a JOIN files f ON f.id = a.file_id";

fn attachment_from_row(row: &SqliteRow) -> std::result::Result<Attachment, sqlx::Error> {
    Ok(Attachment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        file_id: row.try_get("file_id")?,
        caption: row.try_get("caption")?,
        filename: row.try_get("filename")?,
        extension: row.try_get("extension")?,
        created_at: row.try_get("created_at")?,
    })
}

fn file_from_row(row: &SqliteRow) -> std::result::Result<File, sqlx::Error> {
    Ok(File {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        filename: row.try_get("filename")?,
        extension: row.try_get("extension")?,
        data: row.try_get("data")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl FileRepo for SqliteStore {
    async fn create_file(&self, file: File) -> Result<()> {
        sqlx::query(
            "INSERT INTO files (id, user_id, filename, extension, data, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(file.id)
        .bind(file.user_id)
        .bind(&file.filename)
        .bind(&file.extension)
        .bind(&file.data)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting file"))?;
        Ok(())
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<File>> {
        let row = sqlx::query(
            "SELECT id, user_id, filename, extension, data, created_at, updated_at FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("loading file"))?;

        row.as_ref()
            .map(file_from_row)
            .transpose()
            .map_err(db_error("decoding file"))
    }

    async fn attach_file(&self, attachment: Attachment) -> Result<()> {
        sqlx::query(
            "INSERT INTO attachments (id, post_id, file_id, caption, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(attachment.id)
        .bind(attachment.post_id)
        .bind(attachment.file_id)
        .bind(&attachment.caption)
        .bind(attachment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting attachment"))?;
        Ok(())
    }

    async fn find_attachment(&self, id: Uuid) -> Result<Option<Attachment>> {
        let row = sqlx::query(&format!("{ATTACHMENT_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading attachment"))?;
        row.as_ref()
            .map(attachment_from_row)
            .transpose()
            .map_err(db_error("decoding attachment"))
    }

    async fn post_attachments(&self, post_id: Uuid) -> Result<Vec<Attachment>> {
        let rows = sqlx::query(&format!(
            "{ATTACHMENT_SELECT} WHERE a.post_id = ? ORDER BY a.created_at ASC, a.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing attachments"))?;
        rows.iter()
            .map(attachment_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(db_error("decoding attachment"))
    }

    async fn count_file_attachments(&self, file_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attachments WHERE file_id = ?")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting attachments"))
    }

    async fn delete_attachment(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting attachment"))?;
        Ok(())
    }

    async fn delete_file(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting file"))?;
        Ok(())
    }
}
