//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Attachment, Community, File, Post, PostRole, PostWithAuthor, User, Vote, VoteTally,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Which posts `PostRepo::list_posts` returns. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub community_id: Option<Uuid>,
    /// Only posts without a `reply_to`.
    pub top_level_only: bool,
    /// Only posts replying to one of these ids. An empty list matches nothing.
    pub reply_to_any: Option<Vec<Uuid>>,
    pub role: Option<PostRole>,
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl PostFilter {
    /// Top-level posts of a community, newest first.
    pub fn community_front(community_id: Uuid) -> Self {
        Self {
            community_id: Some(community_id),
            top_level_only: true,
            order: SortOrder::NewestFirst,
            ..Self::default()
        }
    }

    /// Direct replies to any of `parents`, oldest first.
    pub fn replies_to(parents: Vec<Uuid>) -> Self {
        Self {
            reply_to_any: Some(parents),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityFilter {
    /// Case-insensitive substring match on `location`.
    pub location: Option<String>,
}

/// Account storage. Backs registration and login.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: User) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommunityRepo: Send + Sync {
    async fn create_community(&self, community: Community) -> Result<()>;
    async fn find_community(&self, id: Uuid) -> Result<Option<Community>>;
    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>>;
    async fn list_communities(&self, filter: &CommunityFilter) -> Result<Vec<Community>>;
}

/// Post persistence. Reads always carry the author.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn insert_post(&self, post: Post) -> Result<()>;
    async fn find_post(&self, id: Uuid) -> Result<Option<PostWithAuthor>>;
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostWithAuthor>>;
}

/// Uploaded files and their links to posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FileRepo: Send + Sync {
    async fn create_file(&self, file: File) -> Result<()>;
    async fn get_file(&self, id: Uuid) -> Result<Option<File>>;
    async fn attach_file(&self, attachment: Attachment) -> Result<()>;
    async fn find_attachment(&self, id: Uuid) -> Result<Option<Attachment>>;
    async fn post_attachments(&self, post_id: Uuid) -> Result<Vec<Attachment>>;
    async fn count_file_attachments(&self, file_id: Uuid) -> Result<i64>;
    async fn delete_attachment(&self, id: Uuid) -> Result<()>;
    async fn delete_file(&self, id: Uuid) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the user already cast this kind
    /// of vote on the post.
    async fn cast_vote(&self, vote: Vote) -> Result<()>;
    async fn tally(&self, post_id: Uuid) -> Result<VoteTally>;
}

/// Credential hashing and session tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Produces a self-describing hash string for storage.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a password against a stored hash. Malformed hashes never match.
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Issues an opaque, tamper-evident token naming the user.
    fn issue_session(&self, user_id: Uuid) -> String;

    /// Returns the user named by a token that is authentic and unexpired.
    fn verify_session(&self, token: &str) -> Option<Uuid>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

/// Outgoing mail. Delivery failures are logged by callers and never block a request.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<()>;
}
