use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::models::Community;
use fx_core::traits::{CommunityFilter, CommunityRepo};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{db_error, SqliteStore};

const COMMUNITY_COLUMNS: &str = "SELECT id, name, title, location, geography, banner_image_url, created_at, updated_at FROM communities";

fn community_from_row(row: &SqliteRow) -> std::result::Result<Community, sqlx::Error> {
    Ok(Community {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        title: row.try_get("title")?,
        location: row.try_get("location")?,
        geography: row.try_get("geography")?,
        banner_image_url: row.try_get("banner_image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CommunityRepo for SqliteStore {
    async fn create_community(&self, community: Community) -> Result<()> {
        sqlx::query(
            "INSERT INTO communities (id, name, title, location, geography, banner_image_url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(community.id)
        .bind(&community.name)
        .bind(&community.title)
        .bind(&community.location)
        .bind(&community.geography)
        .bind(&community.banner_image_url)
        .bind(community.created_at)
        .bind(community.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting community"))?;
        Ok(())
    }

    async fn find_community(&self, id: Uuid) -> Result<Option<Community>> {
        let row = sqlx::query(&format!("{COMMUNITY_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading community"))?;
        row.as_ref()
            .map(community_from_row)
            .transpose()
            .map_err(db_error("decoding community"))
    }

    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>> {
        let row = sqlx::query(&format!("{COMMUNITY_COLUMNS} WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading community"))?;
        row.as_ref()
            .map(community_from_row)
            .transpose()
            .map_err(db_error("decoding community"))
    }

    async fn list_communities(&self, filter: &CommunityFilter) -> Result<Vec<Community>> {
        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());
        let rows = sqlx::query(&format!(
            "{COMMUNITY_COLUMNS} WHERE ?1 IS NULL OR instr(lower(location), lower(?1)) > 0 ORDER BY title ASC, id ASC"
        ))
        .bind(location)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing communities"))?;

        rows.iter()
            .map(community_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(db_error("decoding community"))
    }
}
