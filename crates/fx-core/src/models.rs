//! # Domain Models
//!
//! These structs represent the core entities of FixIt.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. The password is an argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a User eagerly loaded next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// A neighbourhood, town or interest group that issues are filed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    /// The URL slug (e.g., "leeds-central" for /c/leeds-central)
    pub name: String,
    pub title: String,
    pub location: Option<String>,
    /// WKT point, `POINT(<lon> <lat>)`
    pub geography: Option<String>,
    pub banner_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The part a post plays in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostRole {
    Issue,
    Solution,
    Verification,
    Chat,
}

impl PostRole {
    pub const ALL: [PostRole; 4] = [
        PostRole::Issue,
        PostRole::Solution,
        PostRole::Verification,
        PostRole::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostRole::Issue => "issue",
            PostRole::Solution => "solution",
            PostRole::Verification => "verification",
            PostRole::Chat => "chat",
        }
    }

    /// Maps the create form's `post_type` field. Anything unknown, including
    /// an empty value, is a new issue.
    pub fn from_post_type(post_type: &str) -> Self {
        post_type.trim().parse().unwrap_or(PostRole::Issue)
    }
}

impl fmt::Display for PostRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{0}`")]
pub struct UnknownVariant(pub String);

/// The fundamental unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub role: PostRole,
    pub tags: Vec<String>,
    /// The post this one answers. `None` for top-level posts.
    pub reply_to: Option<Uuid>,
    pub user_id: Uuid,
    pub community_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_top_level(&self) -> bool {
        self.reply_to.is_none()
    }
}

/// A post with its author loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}

/// A stored upload. Content lives in the database next to everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: Uuid,
    /// The uploader, the only user who may delete the file.
    pub user_id: Uuid,
    pub filename: String,
    pub extension: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a File to the Post it illustrates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub file_id: Uuid,
    pub caption: Option<String>,
    pub filename: String,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Interesting,
    Solved,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Interesting => "interesting",
            VoteKind::Solved => "solved",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interesting" => Ok(VoteKind::Interesting),
            "solved" => Ok(VoteKind::Solved),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// One user's vote of one kind on one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub kind: VoteKind,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

/// Summed vote values per kind for a single post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub interesting: i64,
    pub solved: i64,
}
