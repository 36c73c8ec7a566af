//! # Reply policy
//!
//! Which replies a post may receive. Issues open a conversation, solutions
//! answer a top-level issue, and verifications confirm somebody else's
//! solution. Chat is free-form.
//!
//! These checks are pure; `posting::create_post` performs the parent lookup
//! and hands the outcome in as a [`ParentLookup`].

use uuid::Uuid;

use crate::error::PostRuleViolation;
use crate::models::{PostRole, PostWithAuthor};

/// Outcome of reading the `reply_to` target before insert.
#[derive(Debug, Clone, Copy)]
pub enum ParentLookup<'a> {
    /// The new post names no parent.
    NoReplyTarget,
    /// The named parent does not exist.
    NotFound,
    Found(&'a PostWithAuthor),
}

/// Decides whether `author_id` may post a `role` reply given the parent lookup.
pub fn check_reply(
    role: PostRole,
    parent: ParentLookup<'_>,
    author_id: Uuid,
) -> Result<(), PostRuleViolation> {
    match role {
        PostRole::Issue | PostRole::Chat => check_free_reply(parent),
        PostRole::Solution => check_solution(require_parent(role, parent)?),
        PostRole::Verification => check_verification(require_parent(role, parent)?, author_id),
    }
}

fn require_parent(
    role: PostRole,
    parent: ParentLookup<'_>,
) -> Result<&PostWithAuthor, PostRuleViolation> {
    match parent {
        ParentLookup::NoReplyTarget => Err(PostRuleViolation::MissingReplyTarget(role)),
        ParentLookup::NotFound => Err(PostRuleViolation::ParentNotFound),
        ParentLookup::Found(parent) => Ok(parent),
    }
}

/// Issues and chat carry no protocol constraints, but a named parent must exist.
fn check_free_reply(parent: ParentLookup<'_>) -> Result<(), PostRuleViolation> {
    match parent {
        ParentLookup::NotFound => Err(PostRuleViolation::ParentNotFound),
        ParentLookup::NoReplyTarget | ParentLookup::Found(_) => Ok(()),
    }
}

/// The issue's own author may solve it.
fn check_solution(parent: &PostWithAuthor) -> Result<(), PostRuleViolation> {
    if !parent.post.is_top_level() {
        return Err(PostRuleViolation::ParentNotTopLevel);
    }
    if parent.post.role != PostRole::Issue {
        return Err(PostRuleViolation::ParentNotIssue);
    }
    Ok(())
}

fn check_verification(parent: &PostWithAuthor, author_id: Uuid) -> Result<(), PostRuleViolation> {
    if parent.post.role != PostRole::Solution {
        return Err(PostRuleViolation::ParentNotSolution);
    }
    if parent.author.id == author_id {
        return Err(PostRuleViolation::OwnSolution);
    }
    Ok(())
}
