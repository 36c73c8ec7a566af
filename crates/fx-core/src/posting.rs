//! Post creation: field checks, the reply policy, then a single insert.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Post, PostRole, User};
use crate::policy::{check_reply, ParentLookup};
use crate::traits::PostRepo;

pub const TITLE_MAX_CHARS: usize = 128;

/// A proposed post as submitted by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateFields {
    pub title: String,
    pub body: Option<String>,
    pub role: PostRole,
    pub tags: Vec<String>,
    pub reply_to: Option<Uuid>,
    pub community_id: Uuid,
}

/// Splits the comma separated tag field, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates `fields` for `author` and stores the post.
///
/// The parent (if any) is read with its author before the insert. Nothing
/// else is written on success, and nothing at all on failure.
pub async fn create_post(posts: &dyn PostRepo, fields: PostCreateFields, author: &User) -> Result<Post> {
    let title = fields.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }

    let parent = match fields.reply_to {
        Some(parent_id) => posts.find_post(parent_id).await?,
        None => None,
    };
    let lookup = match (fields.reply_to, parent.as_ref()) {
        (None, _) => ParentLookup::NoReplyTarget,
        (Some(_), None) => ParentLookup::NotFound,
        (Some(_), Some(found)) => ParentLookup::Found(found),
    };

    if let Err(violation) = check_reply(fields.role, lookup, author.id) {
        tracing::info!(
            user_id = %author.id,
            role = %fields.role,
            reply_to = ?fields.reply_to,
            %violation,
            "post rejected by reply policy"
        );
        return Err(violation.into());
    }

    let now = Utc::now();
    let post = Post {
        id: Uuid::now_v7(),
        title: title.to_string(),
        body: fields.body.filter(|body| !body.trim().is_empty()),
        role: fields.role,
        tags: fields.tags,
        reply_to: fields.reply_to,
        user_id: author.id,
        community_id: fields.community_id,
        created_at: now,
        updated_at: now,
    };

    posts.insert_post(post.clone()).await?;
    tracing::info!(post_id = %post.id, role = %post.role, user_id = %author.id, "post created");

    Ok(post)
}
