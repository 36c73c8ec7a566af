//! # fx-api
//!
//! HTTP surface of FixIt: routes, extractors and the middleware stack. Every
//! handler talks to storage through the port traits held in [`AppState`].

pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::ApiError;
pub use state::{AppState, Settings};

/// Largest accepted request body; uploads are stored in the database.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Page routes and form endpoints, without middleware.
pub fn routes() -> Router<AppState> {
    use handlers::{auth, communities, files, frontpage, posts, votes};

    Router::new()
        .route("/", get(frontpage::index))
        .route("/community/new", get(communities::new_form))
        .route("/api/community/create", post(communities::create))
        .route("/c/{name}", get(communities::show))
        .route("/c/{name}/post", get(posts::new_form))
        .route("/api/post/create", post(posts::create))
        .route("/p/{id}", get(posts::show))
        .route("/api/post/{id}/vote", post(votes::cast))
        .route("/files/{id}", get(files::download))
        .route("/api/attachment/{id}/delete", post(files::delete_attachment))
        .route("/api/file/{id}/delete", post(files::delete_file))
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

/// The complete application with its middleware stack. The binary and the
/// HTTP tests both serve this router.
pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let show_errors = state.settings.show_errors;

    let mut router = routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::nosniff())
        .layer(middleware::referrer_policy())
        .layer(middleware::content_security_policy())
        .layer(CatchPanicLayer::custom(middleware::panic_page));
    if show_errors {
        router = router.layer(axum::middleware::from_fn(middleware::expose_error_details));
    }

    router
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}
