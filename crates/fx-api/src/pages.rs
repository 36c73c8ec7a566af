//! Response builders shared by the handlers.

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use fx_ui::{ErrorTemplate, Viewer};

use crate::error::ApiError;

/// Renders `template` with `status`.
pub fn render<T: Template>(status: StatusCode, template: &T) -> Result<Response, ApiError> {
    let body = template
        .render()
        .map_err(|e| anyhow::anyhow!("rendering template: {e}"))
        .map_err(fx_core::AppError::from)?;
    Ok((status, Html(body)).into_response())
}

pub fn ok<T: Template>(template: &T) -> Result<Response, ApiError> {
    render(StatusCode::OK, template)
}

/// A plain 302, which browsers follow with a GET.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// The error page. Falls back to plain text if the template itself fails.
pub fn error_page(status: StatusCode, heading: &str, message: &str) -> Response {
    let page = ErrorTemplate {
        viewer: Viewer::anonymous(),
        status: status.as_u16(),
        heading: heading.to_string(),
        message: message.to_string(),
    };
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "error page failed to render");
            (status, format!("{heading}: {message}")).into_response()
        }
    }
}
