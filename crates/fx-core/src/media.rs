//! Uploaded files and the attachments that link them to posts.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Attachment, File, User};
use crate::traits::{FileRepo, PostRepo};

pub const CAPTION_MAX_CHARS: usize = 500;
const FILENAME_MAX_CHARS: usize = 255;

/// Uploads are images shown inline on post pages; nothing else is stored.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Lowercased suffix after the last `.`, empty when there is none.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Returns the trimmed name and its extension.
fn check_filename(filename: &str) -> Result<(&str, String)> {
    let filename = filename.trim();
    if filename.is_empty() || filename.chars().count() > FILENAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "File name must be 1-{FILENAME_MAX_CHARS} characters"
        )));
    }
    let extension = extension_of(filename);
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "Only {} images can be uploaded",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    Ok((filename, extension))
}

pub fn new_file(filename: &str, data: Vec<u8>, uploader: Uuid) -> Result<File> {
    let (filename, extension) = check_filename(filename)?;
    let now = Utc::now();
    Ok(File {
        id: Uuid::now_v7(),
        user_id: uploader,
        filename: filename.to_string(),
        extension,
        data,
        created_at: now,
        updated_at: now,
    })
}

fn clean_caption(caption: Option<&str>) -> Result<Option<String>> {
    let caption = caption.map(str::trim).filter(|c| !c.is_empty());
    if caption.is_some_and(|c| c.chars().count() > CAPTION_MAX_CHARS) {
        return Err(AppError::Validation(format!(
            "Caption must be at most {CAPTION_MAX_CHARS} characters"
        )));
    }
    Ok(caption.map(str::to_string))
}

/// Checks an upload's name and caption without storing anything, so a post
/// can be rejected before it is written.
pub fn validate_upload(filename: &str, caption: Option<&str>) -> Result<()> {
    clean_caption(caption)?;
    check_filename(filename).map(|_| ())
}

/// Stores an upload by `uploader` and attaches it to `post_id`.
pub async fn attach_upload(
    files: &dyn FileRepo,
    post_id: Uuid,
    filename: &str,
    data: Vec<u8>,
    caption: Option<String>,
    uploader: &User,
) -> Result<Attachment> {
    let caption = clean_caption(caption.as_deref())?;
    let file = new_file(filename, data, uploader.id)?;
    let attachment = Attachment {
        id: Uuid::now_v7(),
        post_id,
        file_id: file.id,
        caption,
        filename: file.filename.clone(),
        extension: file.extension.clone(),
        created_at: file.created_at,
    };
    let (file_id, size) = (file.id, file.data.len());
    files.create_file(file).await?;
    files.attach_file(attachment.clone()).await?;
    tracing::info!(%post_id, %file_id, size, "file attached");

    Ok(attachment)
}

/// Deletes a file for its uploader once no attachment references it.
pub async fn delete_file(files: &dyn FileRepo, id: Uuid, user: &User) -> Result<()> {
    let file = files
        .get_file(id)
        .await?
        .ok_or_else(|| AppError::not_found("File", id))?;
    if file.user_id != user.id {
        return Err(AppError::Unauthorized(
            "Only the uploader can delete a file".into(),
        ));
    }
    if files.count_file_attachments(id).await? > 0 {
        return Err(AppError::Conflict(
            "cannot delete file: still has attachments".into(),
        ));
    }
    files.delete_file(id).await?;
    tracing::info!(file_id = %id, user_id = %user.id, "file deleted");
    Ok(())
}

/// Removes an attachment on behalf of the post's author. Returns the post id.
pub async fn delete_attachment(
    files: &dyn FileRepo,
    posts: &dyn PostRepo,
    id: Uuid,
    user: &User,
) -> Result<Uuid> {
    let attachment = files
        .find_attachment(id)
        .await?
        .ok_or_else(|| AppError::not_found("Attachment", id))?;
    let post = posts
        .find_post(attachment.post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", attachment.post_id))?;
    if post.author.id != user.id {
        return Err(AppError::Unauthorized(
            "Only the author of a post can remove its attachments".into(),
        ));
    }

    files.delete_attachment(id).await?;
    tracing::info!(attachment_id = %id, post_id = %attachment.post_id, "attachment removed");
    Ok(attachment.post_id)
}
