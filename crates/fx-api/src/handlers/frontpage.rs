use axum::extract::{Query, State};
use axum::response::Response;
use fx_core::traits::CommunityFilter;
use fx_ui::{CommunityView, FrontpageTemplate};

use crate::error::ApiError;
use crate::forms::FrontpageQuery;
use crate::pages;
use crate::session::MaybeUser;
use crate::state::AppState;

/// `GET /`: the list of communities, optionally narrowed by location.
pub async fn index(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<FrontpageQuery>,
) -> Result<Response, ApiError> {
    let location = query
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    let communities = state
        .communities
        .list_communities(&CommunityFilter {
            location: location.clone(),
        })
        .await?;

    pages::ok(&FrontpageTemplate {
        viewer: viewer.viewer(),
        app_name: state.settings.app_name.clone(),
        communities: communities.iter().map(CommunityView::from).collect(),
        location: location.unwrap_or_default(),
    })
}
