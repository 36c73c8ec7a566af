//! Read-only projection of a post and its replies for the detail page.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Attachment, Community, PostRole, PostWithAuthor, VoteTally};
use crate::traits::{CommunityRepo, FileRepo, PostFilter, PostRepo, VoteRepo};

/// A solution reply with the verifications it received, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionThread {
    pub solution: PostWithAuthor,
    pub verifications: Vec<PostWithAuthor>,
}

impl SolutionThread {
    pub fn verification_count(&self) -> usize {
        self.verifications.len()
    }

    pub fn is_verified(&self) -> bool {
        !self.verifications.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostWithAuthor,
    pub community: Community,
    pub solutions: Vec<SolutionThread>,
    /// Chat replies (and any other free-form replies), oldest first.
    pub chat: Vec<PostWithAuthor>,
    /// Verifications replying to this post directly, newest first. Only a
    /// solution receives these.
    pub verifications: Vec<PostWithAuthor>,
    pub attachments: Vec<Attachment>,
    pub votes: VoteTally,
}

impl PostDetail {
    /// Partitions the direct `replies` by role and files each of
    /// `solution_verifications` under the solution it replies to.
    pub fn assemble(
        post: PostWithAuthor,
        community: Community,
        replies: Vec<PostWithAuthor>,
        solution_verifications: Vec<PostWithAuthor>,
    ) -> Self {
        let mut by_solution: HashMap<Uuid, Vec<PostWithAuthor>> = HashMap::new();
        for verification in solution_verifications {
            if let Some(parent) = verification.post.reply_to {
                by_solution.entry(parent).or_default().push(verification);
            }
        }

        let mut solutions = Vec::new();
        let mut chat = Vec::new();
        let mut verifications = Vec::new();
        for reply in replies {
            match reply.post.role {
                PostRole::Solution => {
                    let mut received = by_solution.remove(&reply.post.id).unwrap_or_default();
                    newest_first(&mut received);
                    solutions.push(SolutionThread {
                        solution: reply,
                        verifications: received,
                    });
                }
                PostRole::Verification => verifications.push(reply),
                PostRole::Chat | PostRole::Issue => chat.push(reply),
            }
        }
        newest_first(&mut verifications);

        Self {
            post,
            community,
            solutions,
            chat,
            verifications,
            attachments: Vec::new(),
            votes: VoteTally::default(),
        }
    }

    pub fn has_verified_solution(&self) -> bool {
        self.solutions.iter().any(SolutionThread::is_verified)
    }
}

fn newest_first(posts: &mut [PostWithAuthor]) {
    posts.sort_by(|a, b| {
        b.post
            .created_at
            .cmp(&a.post.created_at)
            .then_with(|| b.post.id.cmp(&a.post.id))
    });
}

/// The stores the detail page reads from.
#[derive(Clone, Copy)]
pub struct DetailSources<'a> {
    pub posts: &'a dyn PostRepo,
    pub communities: &'a dyn CommunityRepo,
    pub files: &'a dyn FileRepo,
    pub votes: &'a dyn VoteRepo,
}

/// Loads a post with author, community, replies (with authors), the
/// verifications under each solution reply, attachments and votes.
pub async fn load_post_detail(sources: DetailSources<'_>, id: Uuid) -> Result<PostDetail> {
    let post = sources
        .posts
        .find_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))?;

    let community_id = post.post.community_id;
    let community = sources
        .communities
        .find_community(community_id)
        .await?
        .ok_or_else(|| AppError::not_found("Community", community_id))?;

    let replies = sources.posts.list_posts(&PostFilter::replies_to(vec![id])).await?;

    let solution_ids: Vec<Uuid> = replies
        .iter()
        .filter(|reply| reply.post.role == PostRole::Solution)
        .map(|reply| reply.post.id)
        .collect();
    let solution_verifications = if solution_ids.is_empty() {
        Vec::new()
    } else {
        let filter = PostFilter {
            role: Some(PostRole::Verification),
            ..PostFilter::replies_to(solution_ids)
        };
        sources.posts.list_posts(&filter).await?
    };

    let mut detail = PostDetail::assemble(post, community, replies, solution_verifications);
    detail.attachments = sources.files.post_attachments(id).await?;
    detail.votes = sources.votes.tally(id).await?;

    Ok(detail)
}
