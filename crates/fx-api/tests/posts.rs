mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_text, location, posted_id, Part, TestApp};
use fx_core::{Attachment, File, FileRepo};
use fx_db_sqlite::SqliteStore;
use uuid::Uuid;

async fn app_with_community() -> (TestApp, String) {
    let app = TestApp::new().await;
    let alice = app.sign_up("alice").await;
    app.create_community(&alice, "leeds-centre", "Leeds").await;
    (app, alice)
}

#[tokio::test]
async fn new_issue_redirects_to_its_community_and_is_highlighted() {
    let (app, alice) = app_with_community().await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Streetlight out on Briggate"),
                Part::Text("body", "Dark since Tuesday"),
                Part::Text("tags", "lighting, safety"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let target = location(&response);
    let id = posted_id(&response);
    assert_eq!(target, format!("/c/leeds-centre?posted_id={id}"));

    let page = body_text(app.get(&target, None).await).await;
    assert!(page.contains("Streetlight out on Briggate"));
    assert!(page.contains("Your post has been published."));
    assert!(page.contains("ring-green-500"));
    assert!(page.contains("safety"));
}

#[tokio::test]
async fn missing_title_and_community_are_reported_before_sign_in() {
    let (app, _) = app_with_community().await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[Part::Text("community", "leeds-centre")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Title is required"));

    let response = app
        .post_multipart("/api/post/create", &[Part::Text("title", "Pothole")], None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Community is required"));
}

#[tokio::test]
async fn complete_anonymous_posts_are_sent_to_login() {
    let (app, _) = app_with_community().await;
    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Pothole"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn unknown_community_and_bad_reply_ids_rerender_the_form() {
    let (app, alice) = app_with_community().await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "nowhere"),
                Part::Text("title", "Pothole"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Community not found"));

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Fixed it"),
                Part::Text("post_type", "solution"),
                Part::Text("reply_to_id", "not-a-uuid"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = body_text(response).await;
    assert!(page.contains("Invalid reply_to_id format"));
    assert!(page.contains(r#"value="Fixed it""#));
}

#[tokio::test]
async fn solutions_must_answer_an_issue() {
    let (app, alice) = app_with_community().await;
    let chat = app
        .create_post(&alice, "leeds-centre", "Anyone else?", "chat", None)
        .await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Fixed it"),
                Part::Text("post_type", "solution"),
                Part::Text("reply_to_id", &chat.to_string()),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("solution posts can only reply to posts with"));
}

#[tokio::test]
async fn authors_cannot_verify_their_own_solution() {
    let (app, alice) = app_with_community().await;
    let bob = app.sign_up("bob").await;
    let issue = app
        .create_post(&alice, "leeds-centre", "Blocked drain", "", None)
        .await;
    let fix = app
        .create_post(&bob, "leeds-centre", "Cleared the drain", "solution", Some(issue))
        .await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Confirmed"),
                Part::Text("post_type", "verification"),
                Part::Text("reply_to_id", &fix.to_string()),
            ],
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("verify your own solution. Wait till someone notices your good deed"));

    app.create_post(&alice, "leeds-centre", "Confirmed", "verification", Some(fix))
        .await;
}

#[tokio::test]
async fn verifications_show_newest_first_with_one_badge_each() {
    let (app, alice) = app_with_community().await;
    let bob = app.sign_up("bob").await;
    let carol = app.sign_up("carol").await;
    let issue = app
        .create_post(&alice, "leeds-centre", "Broken bench", "issue", None)
        .await;
    let fix = app
        .create_post(&bob, "leeds-centre", "Bench repaired", "solution", Some(issue))
        .await;
    for (session, title) in [
        (&alice, "First check"),
        (&carol, "Second check"),
        (&alice, "Third check"),
    ] {
        app.create_post(session, "leeds-centre", title, "verification", Some(fix))
            .await;
    }

    let issue_page = body_text(app.get(&format!("/p/{issue}"), None).await).await;
    assert!(issue_page.contains("Solutions"));
    assert!(issue_page.contains("Bench repaired"));
    assert!(issue_page.contains("3 verification(s)"));
    assert_eq!(issue_page.matches("✓ Verified").count(), 3);

    let solution_page = body_text(app.get(&format!("/p/{fix}"), None).await).await;
    assert!(solution_page.contains("Verifications"));
    let third = solution_page.find("Third check").unwrap();
    let second = solution_page.find("Second check").unwrap();
    let first = solution_page.find("First check").unwrap();
    assert!(third < second && second < first);
}

#[tokio::test]
async fn issue_page_links_to_solve_and_reply_forms() {
    let (app, alice) = app_with_community().await;
    let issue = app
        .create_post(&alice, "leeds-centre", "Graffiti on bridge", "", None)
        .await;
    app.create_post(&alice, "leeds-centre", "Seen it too", "chat", Some(issue))
        .await;

    let page = body_text(app.get(&format!("/p/{issue}"), None).await).await;
    assert!(page.contains("Solve This"));
    assert!(page.contains(&format!(
        "/c/leeds-centre/post?reply_to_id={issue}&post_type=solution"
    )));
    assert!(page.contains("Discussion"));
    assert!(page.contains("Seen it too"));

    let form = app
        .get(
            &format!("/c/leeds-centre/post?reply_to_id={issue}&post_type=solution"),
            None,
        )
        .await;
    assert_eq!(form.status(), StatusCode::OK);
    let form = body_text(form).await;
    assert!(form.contains("Propose a solution"));
    assert!(form.contains(&issue.to_string()));
}

#[tokio::test]
async fn malformed_and_unknown_post_ids() {
    let app = TestApp::new().await;
    assert_eq!(
        app.get("/p/not-a-uuid", None).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get(&format!("/p/{}", Uuid::now_v7()), None).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn uploaded_images_are_attached_and_served() {
    let (app, alice) = app_with_community().await;
    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Fly tipping"),
                Part::Text("caption", "Behind the library"),
                Part::File {
                    name: "image",
                    filename: "tip.png",
                    content_type: "image/png",
                    data: b"fake png bytes",
                },
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let id = posted_id(&response);

    let page = body_text(app.get(&format!("/p/{id}"), Some(&alice)).await).await;
    assert!(page.contains("Behind the library"));
    assert!(page.contains("/api/attachment/"));
    let href_start = page.find("/files/").unwrap();
    let file_href: String = page[href_start..].chars().take("/files/".len() + 36).collect();

    let file = app.get(&file_href, None).await;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(file.headers()["content-type"], "image/png");
    assert_eq!(body_text(file).await, "fake png bytes");
}

/// Serves everything from the real store but cannot save new files.
struct FullDisk(Arc<SqliteStore>);

#[async_trait]
impl FileRepo for FullDisk {
    async fn create_file(&self, _file: File) -> fx_core::Result<()> {
        Err(anyhow::anyhow!("disk full").into())
    }
    async fn get_file(&self, id: Uuid) -> fx_core::Result<Option<File>> {
        self.0.get_file(id).await
    }
    async fn attach_file(&self, attachment: Attachment) -> fx_core::Result<()> {
        self.0.attach_file(attachment).await
    }
    async fn find_attachment(&self, id: Uuid) -> fx_core::Result<Option<Attachment>> {
        self.0.find_attachment(id).await
    }
    async fn post_attachments(&self, post_id: Uuid) -> fx_core::Result<Vec<Attachment>> {
        self.0.post_attachments(post_id).await
    }
    async fn count_file_attachments(&self, file_id: Uuid) -> fx_core::Result<i64> {
        self.0.count_file_attachments(file_id).await
    }
    async fn delete_attachment(&self, id: Uuid) -> fx_core::Result<()> {
        self.0.delete_attachment(id).await
    }
    async fn delete_file(&self, id: Uuid) -> fx_core::Result<()> {
        self.0.delete_file(id).await
    }
}

#[tokio::test]
async fn failed_uploads_keep_the_post() {
    let app = TestApp::with_state(|state, store| state.files = Arc::new(FullDisk(store))).await;
    let alice = app.sign_up("alice").await;
    app.create_community(&alice, "leeds-centre", "Leeds").await;

    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "leeds-centre"),
                Part::Text("title", "Fly tipping"),
                Part::File {
                    name: "image",
                    filename: "tip.png",
                    content_type: "image/png",
                    data: b"fake png bytes",
                },
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let id = posted_id(&response);

    let page = app.get(&format!("/p/{id}"), None).await;
    assert_eq!(page.status(), StatusCode::OK);
    let page = body_text(page).await;
    assert!(page.contains("Fly tipping"));
    assert!(!page.contains("/files/"));

    let community = body_text(app.get("/c/leeds-centre", None).await).await;
    assert_eq!(community.matches("Fly tipping").count(), 1);
}
