//! Request handlers, one module per area of the site.

pub mod auth;
pub mod communities;
pub mod files;
pub mod frontpage;
pub mod posts;
pub mod votes;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path id, answering 400 rather than 404 for malformed input.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid {what} ID")))
}
