use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use fx_core::{media, AppError};

use super::parse_id;
use crate::error::ApiError;
use crate::pages;
use crate::session::CurrentUser;
use crate::state::AppState;

/// `GET /files/{id}`: the stored bytes, typed by file extension.
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "file")?;
    let file = state
        .files
        .get_file(id)
        .await?
        .ok_or_else(|| AppError::not_found("File", id))?;
    let guessed = mime_guess::from_ext(&file.extension).first_or_octet_stream();

    // Only images render inline.
    let (content_type, disposition) = if guessed.type_() == mime_guess::mime::IMAGE {
        (guessed.to_string(), "inline".to_string())
    } else {
        (
            mime_guess::mime::APPLICATION_OCTET_STREAM.to_string(),
            format!("attachment; filename=\"{}\"", file.id),
        )
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        file.data,
    )
        .into_response())
}

/// `POST /api/attachment/{id}/delete`
pub async fn delete_attachment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "attachment")?;
    let post_id =
        media::delete_attachment(state.files.as_ref(), state.posts.as_ref(), id, &user).await?;
    Ok(pages::found(&format!("/p/{post_id}")))
}

/// `POST /api/file/{id}/delete`: the uploader's own files, once no attachment
/// still uses them.
pub async fn delete_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "file")?;
    media::delete_file(state.files.as_ref(), id, &user).await?;
    Ok(pages::found("/"))
}
