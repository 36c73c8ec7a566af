//! # AppError
//!
//! Centralized error handling for FixIt.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

use crate::models::PostRole;

/// A reply that breaks the issue → solution → verification protocol.
///
/// Every variant renders its own message so the create form can tell the
/// author exactly which rule was hit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostRuleViolation {
    /// Solution and verification posts must name the post they answer.
    #[error("{0} posts must reply to an existing post")]
    MissingReplyTarget(PostRole),

    #[error("parent post not found")]
    ParentNotFound,

    #[error("solution posts can only reply to top-level posts")]
    ParentNotTopLevel,

    #[error("solution posts can only reply to posts with 'issue' role")]
    ParentNotIssue,

    #[error("verification posts can only reply to solution posts")]
    ParentNotSolution,

    #[error("cannot verify own solution")]
    OwnSolution,
}

impl PostRuleViolation {
    /// The wording shown on the create form.
    pub fn user_message(&self) -> String {
        match self {
            Self::OwnSolution => {
                "Sorry - you can't verify your own solution. Wait till someone notices your good deed"
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// The primary error type for all fx-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Community, Post, File)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure on user input (e.g., missing title, short password)
    #[error("validation error: {0}")]
    Validation(String),

    /// Reply protocol failure
    #[error(transparent)]
    Rule(#[from] PostRuleViolation),

    /// Missing or invalid session, or bad credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists or is still referenced
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, hashing failed)
    #[error("internal service error: {0:#}")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }

    /// The part of the error that is safe to show next to a form.
    pub fn form_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Unauthorized(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Rule(violation) => violation.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// A specialized Result type for FixIt logic.
pub type Result<T> = std::result::Result<T, AppError>;
