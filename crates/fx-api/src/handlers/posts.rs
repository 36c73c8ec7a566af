use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use fx_core::models::PostRole;
use fx_core::posting::{self, PostCreateFields};
use fx_core::{media, thread, AppError};
use fx_ui::{PostCreateTemplate, PostDetailView, PostForm, PostShowTemplate, Viewer};
use uuid::Uuid;

use super::parse_id;
use crate::error::ApiError;
use crate::forms::{MultipartForm, PostFormQuery};
use crate::pages;
use crate::session::MaybeUser;
use crate::state::AppState;

/// `GET /c/{name}/post`: the create form, prefilled for a reply when
/// `reply_to_id` is given.
pub async fn new_form(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(name): Path<String>,
    Query(query): Query<PostFormQuery>,
) -> Result<Response, ApiError> {
    let community = state
        .communities
        .find_community_by_name(&name)
        .await?
        .ok_or_else(|| AppError::not_found("Community", &name))?;

    pages::ok(&PostCreateTemplate {
        viewer: viewer.viewer(),
        form: PostForm {
            community: community.name,
            reply_to_id: query.reply_to_id,
            post_type: query.post_type,
            ..PostForm::default()
        },
    })
}

fn rejected(viewer: Viewer, mut form: PostForm, message: String) -> Result<Response, ApiError> {
    form.error = message;
    pages::render(StatusCode::BAD_REQUEST, &PostCreateTemplate { viewer, form })
}

/// `POST /api/post/create`
///
/// Field checks come before the session check so an anonymous user with an
/// incomplete form still sees what is missing.
pub async fn create(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut multipart = MultipartForm::read(multipart).await?;
    let upload = multipart.take_upload("image");
    let form = PostForm {
        community: multipart.text("community"),
        reply_to_id: multipart.text("reply_to_id"),
        post_type: multipart.text("post_type"),
        title: multipart.text("title"),
        body: multipart.text("body"),
        tags: multipart.text("tags"),
        caption: multipart.text("caption"),
        error: String::new(),
    };
    let viewer = match &user {
        Some(user) => Viewer::signed_in(&user.username),
        None => Viewer::anonymous(),
    };

    if form.title.is_empty() {
        return rejected(viewer, form, "Title is required".into());
    }
    if form.community.is_empty() {
        return rejected(viewer, form, "Community is required".into());
    }
    let Some(user) = user else {
        return Ok(pages::found("/auth/login"));
    };

    let Some(community) = state
        .communities
        .find_community_by_name(&form.community)
        .await?
    else {
        return rejected(viewer, form, "Community not found".into());
    };
    let reply_to = match form.reply_to_id.as_str() {
        "" => None,
        raw => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return rejected(viewer, form, "Invalid reply_to_id format".into()),
        },
    };
    if let Some(upload) = &upload {
        if let Err(err) = media::validate_upload(&upload.filename, Some(form.caption.as_str())) {
            return rejected(viewer, form, err.form_message());
        }
    }

    let fields = PostCreateFields {
        title: form.title.clone(),
        body: Some(form.body.clone()),
        role: PostRole::from_post_type(&form.post_type),
        tags: posting::parse_tags(&form.tags),
        reply_to,
        community_id: community.id,
    };
    let post = match posting::create_post(state.posts.as_ref(), fields, &user).await {
        Ok(post) => post,
        Err(err @ (AppError::Validation(_) | AppError::Rule(_) | AppError::NotFound(..))) => {
            return rejected(viewer, form, err.form_message());
        }
        Err(err) => return Err(err.into()),
    };

    // The post is already stored; an upload failure is logged, not returned.
    if let Some(upload) = upload {
        if let Err(err) = media::attach_upload(
            state.files.as_ref(),
            post.id,
            &upload.filename,
            upload.data,
            Some(form.caption),
            &user,
        )
        .await
        {
            tracing::error!(post_id = %post.id, error = %err, "image upload failed after post was stored");
        }
    }

    Ok(pages::found(&format!(
        "/c/{}?posted_id={}",
        community.name, post.id
    )))
}

/// `GET /p/{id}`: a post with its solutions, discussion and attachments.
pub async fn show(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "post")?;
    let detail = thread::load_post_detail(state.detail_sources(), id).await?;
    let viewer_id = viewer.0.as_ref().map(|user| user.id);

    pages::ok(&PostShowTemplate {
        viewer: viewer.viewer(),
        page: PostDetailView::new(&detail, viewer_id, Utc::now()),
    })
}
