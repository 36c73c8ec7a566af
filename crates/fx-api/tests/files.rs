mod common;

use axum::http::StatusCode;
use common::{body_text, location, posted_id, Part, TestApp};
use uuid::Uuid;

/// Creates a post with one image and returns (post id, file href, attachment id).
async fn post_with_image(app: &TestApp, session: &str) -> (Uuid, String, String) {
    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "hyde-park"),
                Part::Text("title", "Broken swing"),
                Part::File {
                    name: "image",
                    filename: "swing.jpg",
                    content_type: "image/jpeg",
                    data: b"jpeg bytes",
                },
            ],
            Some(session),
        )
        .await;
    let id = posted_id(&response);
    let page = body_text(app.get(&format!("/p/{id}"), Some(session)).await).await;

    let take_id = |marker: &str| -> String {
        let start = page.find(marker).unwrap() + marker.len();
        page[start..start + 36].to_string()
    };
    let file_id = take_id("/files/");
    let attachment_id = take_id("/api/attachment/");
    (id, format!("/files/{file_id}"), attachment_id)
}

async fn setup() -> (TestApp, String) {
    let app = TestApp::new().await;
    let alice = app.sign_up("alice").await;
    app.create_community(&alice, "hyde-park", "Leeds").await;
    (app, alice)
}

#[tokio::test]
async fn attached_files_cannot_be_deleted() {
    let (app, alice) = setup().await;
    let (_, href, _) = post_with_image(&app, &alice).await;
    let file_id = href.trim_start_matches("/files/");

    let response = app
        .post_form(&format!("/api/file/{file_id}/delete"), &[], Some(&alice))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response)
        .await
        .contains("cannot delete file: still has attachments"));
    assert_eq!(app.get(&href, None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn removing_the_attachment_frees_the_file() {
    let (app, alice) = setup().await;
    let (post_id, href, attachment_id) = post_with_image(&app, &alice).await;

    let response = app
        .post_form(
            &format!("/api/attachment/{attachment_id}/delete"),
            &[],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/p/{post_id}"));
    let page = body_text(app.get(&format!("/p/{post_id}"), None).await).await;
    assert!(!page.contains(&href));

    let file_id = href.trim_start_matches("/files/");
    let response = app
        .post_form(&format!("/api/file/{file_id}/delete"), &[], Some(&alice))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(app.get(&href, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_removes_attachments() {
    let (app, alice) = setup().await;
    let mallory = app.sign_up("mallory").await;
    let (_, href, attachment_id) = post_with_image(&app, &alice).await;

    let response = app
        .post_form(
            &format!("/api/attachment/{attachment_id}/delete"),
            &[],
            Some(&mallory),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/auth/login");
    assert_eq!(app.get(&href, None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn file_routes_reject_malformed_and_unknown_ids() {
    let app = TestApp::new().await;
    assert_eq!(
        app.get("/files/nope", None).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get(&format!("/files/{}", Uuid::now_v7()), None)
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn only_the_uploader_deletes_a_file() {
    let (app, alice) = setup().await;
    let mallory = app.sign_up("mallory").await;
    let (_, href, attachment_id) = post_with_image(&app, &alice).await;
    app.post_form(
        &format!("/api/attachment/{attachment_id}/delete"),
        &[],
        Some(&alice),
    )
    .await;

    let file_id = href.trim_start_matches("/files/");
    let response = app
        .post_form(&format!("/api/file/{file_id}/delete"), &[], Some(&mallory))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/auth/login");
    assert_eq!(app.get(&href, None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn images_are_served_inline() {
    let (app, alice) = setup().await;
    let (_, href, _) = post_with_image(&app, &alice).await;

    let file = app.get(&href, None).await;
    assert_eq!(file.headers()["content-type"], "image/jpeg");
    assert_eq!(file.headers()["content-disposition"], "inline");
}

#[tokio::test]
async fn markup_uploads_are_refused() {
    let (app, alice) = setup().await;
    let response = app
        .post_multipart(
            "/api/post/create",
            &[
                Part::Text("community", "hyde-park"),
                Part::Text("title", "Broken swing"),
                Part::File {
                    name: "image",
                    filename: "swing.html",
                    content_type: "text/html",
                    data: b"<script>alert(1)</script>",
                },
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("Only png, jpg, jpeg, gif, webp images can be uploaded"));

    let community = body_text(app.get("/c/hyde-park", None).await).await;
    assert!(!community.contains("Broken swing"));
}
