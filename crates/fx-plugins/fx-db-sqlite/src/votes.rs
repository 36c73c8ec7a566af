use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::models::{Vote, VoteKind, VoteTally};
use fx_core::traits::VoteRepo;
use sqlx::Row;
use uuid::Uuid;

use crate::{db_error, decode_error, SqliteStore};

#[async_trait]
impl VoteRepo for SqliteStore {
    async fn cast_vote(&self, vote: Vote) -> Result<()> {
        sqlx::query(
            "INSERT INTO votes (id, post_id, user_id, kind, value, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(vote.id)
        .bind(vote.post_id)
        .bind(vote.user_id)
        .bind(vote.kind.as_str())
        .bind(vote.value)
        .bind(vote.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("inserting vote"))?;
        Ok(())
    }

    async fn tally(&self, post_id: Uuid) -> Result<VoteTally> {
        let rows = sqlx::query(
            "SELECT kind, COALESCE(SUM(value), 0) AS total FROM votes WHERE post_id = ? GROUP BY kind",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("tallying votes"))?;

        let mut tally = VoteTally::default();
        for row in rows {
            let kind: String = row.try_get("kind").map_err(db_error("decoding vote"))?;
            let total: i64 = row.try_get("total").map_err(db_error("decoding vote"))?;
            let kind = kind
                .parse::<VoteKind>()
                .map_err(|e| db_error("decoding vote")(decode_error(e)))?;
            match kind {
                VoteKind::Interesting => tally.interesting = total,
                VoteKind::Solved => tally.solved = total,
            }
        }
        Ok(tally)
    }
}
