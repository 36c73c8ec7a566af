//! Flat, pre-formatted view models. Templates only print fields and test
//! booleans; every decision about wording happens here.

use chrono::{DateTime, Utc};
use fx_core::models::{Attachment, Community, PostRole, PostWithAuthor};
use fx_core::thread::{PostDetail, SolutionThread};

use crate::humanize::time_ago;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Who is looking at the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    username: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct CommunityView {
    pub name: String,
    pub title: String,
    pub location: String,
    pub banner_image_url: String,
}

impl From<&Community> for CommunityView {
    fn from(community: &Community) -> Self {
        Self {
            name: community.name.clone(),
            title: community.title.clone(),
            location: community.location.clone().unwrap_or_default(),
            banner_image_url: community.banner_image_url.clone().unwrap_or_default(),
        }
    }
}

/// One post as a list item or reply.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub role: String,
    pub author: String,
    pub ago: String,
    pub tags: Vec<String>,
    pub highlighted: bool,
}

impl PostView {
    pub fn new(item: &PostWithAuthor, now: DateTime<Utc>) -> Self {
        Self {
            id: item.post.id.to_string(),
            title: item.post.title.clone(),
            body: item.post.body.clone().unwrap_or_default(),
            role: item.post.role.to_string(),
            author: item.author.username.clone(),
            ago: time_ago(item.post.created_at, now),
            tags: item.post.tags.clone(),
            highlighted: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolutionView {
    pub solution: PostView,
    pub verification_count: usize,
    pub verifications: Vec<PostView>,
}

impl SolutionView {
    fn new(thread: &SolutionThread, now: DateTime<Utc>) -> Self {
        Self {
            solution: PostView::new(&thread.solution, now),
            verification_count: thread.verification_count(),
            verifications: thread
                .verifications
                .iter()
                .map(|v| PostView::new(v, now))
                .collect(),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification_count > 0
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentView {
    pub id: String,
    pub href: String,
    pub filename: String,
    pub caption: String,
    pub is_image: bool,
}

impl From<&Attachment> for AttachmentView {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            href: format!("/files/{}", attachment.file_id),
            filename: attachment.filename.clone(),
            caption: attachment.caption.clone().unwrap_or_default(),
            is_image: IMAGE_EXTENSIONS.contains(&attachment.extension.as_str()),
        }
    }
}

/// Everything the post detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetailView {
    pub post: PostView,
    pub community: CommunityView,
    pub parent_href: String,
    pub is_issue: bool,
    pub is_solution: bool,
    pub solutions: Vec<SolutionView>,
    pub discussion: Vec<PostView>,
    pub verifications: Vec<PostView>,
    pub attachments: Vec<AttachmentView>,
    pub interesting_votes: i64,
    pub solved_votes: i64,
    pub has_verified_solution: bool,
    /// The viewer wrote the post and may manage its attachments.
    pub is_author: bool,
}

impl PostDetailView {
    pub fn new(detail: &PostDetail, viewer_id: Option<uuid::Uuid>, now: DateTime<Utc>) -> Self {
        let role = detail.post.post.role;
        Self {
            post: PostView::new(&detail.post, now),
            community: CommunityView::from(&detail.community),
            parent_href: detail
                .post
                .post
                .reply_to
                .map(|id| format!("/p/{id}"))
                .unwrap_or_default(),
            is_issue: role == PostRole::Issue,
            is_solution: role == PostRole::Solution,
            solutions: detail
                .solutions
                .iter()
                .map(|s| SolutionView::new(s, now))
                .collect(),
            discussion: detail.chat.iter().map(|c| PostView::new(c, now)).collect(),
            verifications: detail
                .verifications
                .iter()
                .map(|v| PostView::new(v, now))
                .collect(),
            attachments: detail.attachments.iter().map(AttachmentView::from).collect(),
            interesting_votes: detail.votes.interesting,
            solved_votes: detail.votes.solved,
            has_verified_solution: detail.has_verified_solution(),
            is_author: viewer_id == Some(detail.post.author.id),
        }
    }
}

/// Sticky values and messages for the create-post form.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub community: String,
    pub reply_to_id: String,
    pub post_type: String,
    pub title: String,
    pub body: String,
    pub tags: String,
    pub caption: String,
    pub error: String,
}

impl PostForm {
    pub fn heading(&self) -> &'static str {
        match PostRole::from_post_type(&self.post_type) {
            PostRole::Issue if self.reply_to_id.is_empty() => "Report an issue",
            PostRole::Issue | PostRole::Chat => "Reply",
            PostRole::Solution => "Propose a solution",
            PostRole::Verification => "Verify this solution",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommunityForm {
    pub name: String,
    pub title: String,
    pub location: String,
    pub banner_image_url: String,
    pub latitude: String,
    pub longitude: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub username_errors: Vec<String>,
    pub email_errors: Vec<String>,
    pub password_errors: Vec<String>,
    pub confirm_password_errors: Vec<String>,
}

impl RegisterForm {
    pub fn rejected(username: &str, email: &str, errors: &fx_core::accounts::FieldErrors) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            username_errors: errors.get("username").to_vec(),
            email_errors: errors.get("email").to_vec(),
            password_errors: errors.get("password").to_vec(),
            confirm_password_errors: errors.get("confirm_password").to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fx_core::models::{Author, Post, VoteTally};
    use uuid::Uuid;

    fn item(role: PostRole, reply_to: Option<Uuid>, author: &str, minutes_ago: i64) -> PostWithAuthor {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        let author_id = Uuid::now_v7();
        PostWithAuthor {
            post: Post {
                id: Uuid::now_v7(),
                title: format!("{role} by {author}"),
                body: None,
                role,
                tags: vec!["lighting".into()],
                reply_to,
                user_id: author_id,
                community_id: Uuid::now_v7(),
                created_at: at,
                updated_at: at,
            },
            author: Author {
                id: author_id,
                username: author.into(),
            },
        }
    }

    fn community() -> Community {
        let now = Utc::now();
        Community {
            id: Uuid::now_v7(),
            name: "elm-street".into(),
            title: "Elm Street".into(),
            location: None,
            geography: None,
            banner_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn form_heading_follows_post_type() {
        let mut form = PostForm::default();
        assert_eq!(form.heading(), "Report an issue");
        form.reply_to_id = Uuid::now_v7().to_string();
        form.post_type = "solution".into();
        assert_eq!(form.heading(), "Propose a solution");
        form.post_type = "chat".into();
        assert_eq!(form.heading(), "Reply");
    }

    #[test]
    fn detail_view_flags_authorship_and_role() {
        let issue = item(PostRole::Issue, None, "alice", 60);
        let alice = issue.author.id;
        let fix = item(PostRole::Solution, Some(issue.post.id), "bob", 30);
        let mut detail = PostDetail::assemble(issue, community(), vec![fix], vec![]);
        detail.votes = VoteTally { interesting: 4, solved: 1 };

        let view = PostDetailView::new(&detail, Some(alice), Utc::now());
        assert!(view.is_issue);
        assert!(view.is_author);
        assert_eq!(view.parent_href, "");
        assert_eq!(view.solutions.len(), 1);
        assert!(!view.solutions[0].is_verified());
        assert_eq!(view.post.ago, "1 hour ago");
        assert_eq!(view.interesting_votes, 4);

        let anonymous = PostDetailView::new(&detail, None, Utc::now());
        assert!(!anonymous.is_author);
    }

    #[test]
    fn image_attachments_are_detected_by_extension() {
        let attachment = Attachment {
            id: Uuid::now_v7(),
            post_id: Uuid::now_v7(),
            file_id: Uuid::now_v7(),
            caption: None,
            filename: "notes.pdf".into(),
            extension: "pdf".into(),
            created_at: Utc::now(),
        };
        assert!(!AttachmentView::from(&attachment).is_image);
        let photo = Attachment {
            extension: "jpg".into(),
            ..attachment
        };
        let view = AttachmentView::from(&photo);
        assert!(view.is_image);
        assert_eq!(view.href, format!("/files/{}", photo.file_id));
    }
}
