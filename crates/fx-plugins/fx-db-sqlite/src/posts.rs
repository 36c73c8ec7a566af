use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::models::{Author, Post, PostRole, PostWithAuthor};
use fx_core::traits::{PostFilter, PostRepo, SortOrder};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use crate::{db_error, decode_error, SqliteStore};

/// Posts joined with the author's username. Filters are appended after `WHERE 1 = 1`.
const POST_SELECT: &str = "SELECT p.id, p.title, p.body, p.role, p.tags, p.reply_to, p.user_id, \
     p.community_id, p.created_at, p.updated_at, u.username AS author_username \
     FROM posts p JOIN users u ON u.id = p.user_id WHERE 1 = 1";

fn post_from_row(row: &SqliteRow) -> std::result::Result<PostWithAuthor, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let tags: String = row.try_get("tags")?;
    let user_id: Uuid = row.try_get("user_id")?;

    let post = Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        role: role.parse::<PostRole>().map_err(decode_error)?,
        tags: serde_json::from_str(&tags).map_err(decode_error)?,
        reply_to: row.try_get("reply_to")?,
        user_id,
        community_id: row.try_get("community_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };
    Ok(PostWithAuthor {
        post,
        author: Author {
            id: user_id,
            username: row.try_get("author_username")?,
        },
    })
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn insert_post(&self, post: Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags)
            .map_err(|e| anyhow::Error::new(e).context("encoding post tags"))?;
        sqlx::query(
            "INSERT INTO posts (id, title, body, role, tags, reply_to, user_id, community_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.role.as_str())
        .bind(tags)
        .bind(post.reply_to)
        .bind(post.user_id)
        .bind(post.community_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting post"))?;
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostWithAuthor>> {
        let row = sqlx::query(&format!("{POST_SELECT} AND p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("loading post"))?;
        row.as_ref()
            .map(post_from_row)
            .transpose()
            .map_err(db_error("decoding post"))
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostWithAuthor>> {
        let mut query = QueryBuilder::<Sqlite>::new(POST_SELECT);

        if let Some(community_id) = filter.community_id {
            query.push(" AND p.community_id = ").push_bind(community_id);
        }
        if filter.top_level_only {
            query.push(" AND p.reply_to IS NULL");
        }
        if let Some(parents) = &filter.reply_to_any {
            if parents.is_empty() {
                return Ok(Vec::new());
            }
            query.push(" AND p.reply_to IN (");
            let mut ids = query.separated(", ");
            for parent in parents {
                ids.push_bind(*parent);
            }
            ids.push_unseparated(")");
        }
        if let Some(role) = filter.role {
            query.push(" AND p.role = ").push_bind(role.as_str());
        }
        query.push(match filter.order {
            SortOrder::OldestFirst => " ORDER BY p.created_at ASC, p.id ASC",
            SortOrder::NewestFirst => " ORDER BY p.created_at DESC, p.id DESC",
        });
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("listing posts"))?;
        rows.iter()
            .map(post_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(db_error("decoding post"))
    }
}
