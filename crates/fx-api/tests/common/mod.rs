//! Shared harness: the full router over a fresh in-memory database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use fx_api::{build_router, AppState, Settings};
use fx_auth_simple::{LogMailer, SimpleAuthProvider};
use fx_db_sqlite::SqliteStore;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "fixit-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
}

/// One multipart part.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(Settings {
            app_name: "FixIt".into(),
            root_url: "http://localhost:8080".into(),
            show_errors: false,
        })
        .await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        Self::build(settings, |_, _| {}).await
    }

    /// The default app with some ports swapped out before the router is
    /// built. The closure also gets the store the defaults are wired to.
    pub async fn with_state(customize: impl FnOnce(&mut AppState, Arc<SqliteStore>)) -> Self {
        Self::build(
            Settings {
                app_name: "FixIt".into(),
                root_url: "http://localhost:8080".into(),
                show_errors: false,
            },
            customize,
        )
        .await
    }

    async fn build(settings: Settings, customize: impl FnOnce(&mut AppState, Arc<SqliteStore>)) -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let auth = SimpleAuthProvider::new(&[7u8; 32], chrono::Duration::hours(1)).unwrap();
        let mut state = AppState::from_store(
            store.clone(),
            Arc::new(auth),
            Arc::new(LogMailer::new("FixIt", "noreply@fixit.local")),
            settings,
        );
        customize(&mut state, store.clone());
        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(cookie) = session {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        session: Option<&str>,
    ) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = session {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        parts: &[Part<'_>],
        session: Option<&str>,
    ) -> Response<Body> {
        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = session {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }

    /// Registers `username` and returns the `Cookie` header value for its
    /// session.
    pub async fn sign_up(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let response = self
            .post_form(
                "/auth/register",
                &[
                    ("username", username),
                    ("email", &email),
                    ("password", "correct-horse"),
                    ("confirm_password", "correct-horse"),
                ],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND, "sign up {username}");
        session_cookie(&response).expect("session cookie")
    }

    pub async fn create_community(&self, session: &str, name: &str, location: &str) {
        let title = format!("{name} title");
        let response = self
            .post_multipart(
                "/api/community/create",
                &[
                    Part::Text("name", name),
                    Part::Text("title", &title),
                    Part::Text("location", location),
                ],
                Some(session),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND, "create community {name}");
    }

    /// Submits the create form and returns the new post's id.
    pub async fn create_post(
        &self,
        session: &str,
        community: &str,
        title: &str,
        post_type: &str,
        reply_to: Option<Uuid>,
    ) -> Uuid {
        let reply_to = reply_to.map(|id| id.to_string()).unwrap_or_default();
        let response = self
            .post_multipart(
                "/api/post/create",
                &[
                    Part::Text("community", community),
                    Part::Text("title", title),
                    Part::Text("post_type", post_type),
                    Part::Text("reply_to_id", &reply_to),
                ],
                Some(session),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND, "create post {title}");
        posted_id(&response)
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The `name=value` pair of the session cookie set by `response`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("fixit_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn posted_id(response: &Response<Body>) -> Uuid {
    let location = location(response);
    let (_, id) = location
        .split_once("posted_id=")
        .unwrap_or_else(|| panic!("no posted_id in {location}"));
    Uuid::parse_str(id).unwrap()
}
