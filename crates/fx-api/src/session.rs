//! Cookie sessions and the extractors that resolve them to a user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use fx_core::models::User;
use fx_core::AppError;
use fx_ui::Viewer;

use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "fixit_session";

/// The signed-in user, if the request carries a valid session.
///
/// Forged, expired and orphaned tokens all read as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn viewer(&self) -> Viewer {
        match &self.0 {
            Some(user) => Viewer::signed_in(&user.username),
            None => Viewer::anonymous(),
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.auth.verify_session(cookie.value()))
        else {
            return Ok(MaybeUser(None));
        };

        Ok(MaybeUser(state.users.find_user(user_id).await?))
    }
}

/// A signed-in user. Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::signed_in(&self.0.username)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Sign in to continue".into()).into())
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
