use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use fx_core::models::VoteKind;
use fx_core::votes;

use super::parse_id;
use crate::error::ApiError;
use crate::forms::VoteFields;
use crate::pages;
use crate::session::CurrentUser;
use crate::state::AppState;

/// `POST /api/post/{id}/vote`
pub async fn cast(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(fields): Form<VoteFields>,
) -> Result<Response, ApiError> {
    let post_id = parse_id(&id, "post")?;
    let kind: VoteKind = fields
        .kind
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown vote kind {}", fields.kind)))?;

    votes::cast_vote(state.posts.as_ref(), state.votes.as_ref(), post_id, kind, &user).await?;
    Ok(pages::found(&format!("/p/{post_id}")))
}
