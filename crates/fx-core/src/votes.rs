use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{User, Vote, VoteKind};
use crate::traits::{PostRepo, VoteRepo};

/// Records one `kind` vote by `user` on an existing post.
pub async fn cast_vote(
    posts: &dyn PostRepo,
    votes: &dyn VoteRepo,
    post_id: Uuid,
    kind: VoteKind,
    user: &User,
) -> Result<Vote> {
    if posts.find_post(post_id).await?.is_none() {
        return Err(AppError::not_found("Post", post_id));
    }

    let vote = Vote {
        id: Uuid::now_v7(),
        post_id,
        user_id: user.id,
        kind,
        value: 1,
        created_at: Utc::now(),
    };
    match votes.cast_vote(vote.clone()).await {
        Ok(()) => {}
        Err(AppError::Conflict(_)) => {
            return Err(AppError::Conflict(format!(
                "You already marked this post as {kind}"
            )))
        }
        Err(other) => return Err(other),
    }
    tracing::info!(%post_id, user_id = %user.id, %kind, "vote cast");

    Ok(vote)
}
