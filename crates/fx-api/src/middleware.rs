//! Cross-cutting layers: panic recovery, error detail exposure and the
//! security headers every page carries.

use std::any::Any;

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ErrorDetail;
use crate::pages::error_page;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; img-src 'self' https: data:; \
     script-src 'self' https://cdn.tailwindcss.com; style-src 'self' 'unsafe-inline'";

/// Renders a caught panic as the generic 500 page.
pub fn panic_page(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    let mut response = error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong",
        "The server hit an unexpected error. Please try again.",
    );
    response.extensions_mut().insert(ErrorDetail(detail));
    response
}

/// Replaces the generic 500 page with one that shows the underlying error.
/// Only installed when `show_errors` is on.
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<ErrorDetail>() {
        Some(ErrorDetail(detail)) => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong",
            detail,
        ),
        None => response,
    }
}

pub fn nosniff() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    )
}

pub fn referrer_policy() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    )
}

pub fn content_security_policy() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    )
}
