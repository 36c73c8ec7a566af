use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use fx_core::communities::{self, CommunityCreateFields};
use fx_core::traits::PostFilter;
use fx_core::AppError;
use fx_ui::{CommunityCreateTemplate, CommunityForm, CommunityTemplate, CommunityView, PostView};

use crate::error::ApiError;
use crate::forms::{CommunityQuery, MultipartForm};
use crate::pages;
use crate::session::{CurrentUser, MaybeUser};
use crate::state::AppState;

/// `GET /community/new`
pub async fn new_form(user: CurrentUser) -> Result<Response, ApiError> {
    pages::ok(&CommunityCreateTemplate {
        viewer: user.viewer(),
        form: CommunityForm::default(),
    })
}

/// `POST /api/community/create`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = MultipartForm::read(multipart).await?;
    let fields = CommunityCreateFields {
        name: form.text("name"),
        title: form.text("title"),
        location: form.text("location"),
        banner_image_url: form.text("banner_image_url"),
        latitude: form.text("latitude"),
        longitude: form.text("longitude"),
    };

    match communities::create_community(state.communities.as_ref(), fields.clone()).await {
        Ok(community) => {
            tracing::info!(community = %community.name, user_id = %user.0.id, "community created");
            Ok(pages::found(&format!("/c/{}", community.name)))
        }
        Err(err @ (AppError::Validation(_) | AppError::Conflict(_))) => pages::render(
            StatusCode::BAD_REQUEST,
            &CommunityCreateTemplate {
                viewer: user.viewer(),
                form: CommunityForm {
                    name: fields.name,
                    title: fields.title,
                    location: fields.location,
                    banner_image_url: fields.banner_image_url,
                    latitude: fields.latitude,
                    longitude: fields.longitude,
                    error: err.form_message(),
                },
            },
        ),
        Err(err) => Err(err.into()),
    }
}

/// `GET /c/{name}`: the community's top-level posts, newest first.
pub async fn show(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(name): Path<String>,
    Query(query): Query<CommunityQuery>,
) -> Result<Response, ApiError> {
    let community = state
        .communities
        .find_community_by_name(&name)
        .await?
        .ok_or_else(|| AppError::not_found("Community", &name))?;
    let posts = state
        .posts
        .list_posts(&PostFilter::community_front(community.id))
        .await?;

    let posted_id = query.posted_id.unwrap_or_default();
    let now = Utc::now();
    let posts: Vec<PostView> = posts
        .iter()
        .map(|item| {
            let mut view = PostView::new(item, now);
            view.highlighted = !posted_id.is_empty() && view.id == posted_id;
            view
        })
        .collect();

    pages::ok(&CommunityTemplate {
        viewer: viewer.viewer(),
        community: CommunityView::from(&community),
        just_posted: posts.iter().any(|p| p.highlighted),
        posts,
    })
}
