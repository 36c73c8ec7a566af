//! # fx-ui
//!
//! Server-rendered pages. Every page extends `layout.html` and carries the
//! `Viewer` so the navigation can show who is signed in.

pub mod humanize;
pub mod views;

use askama::Template;

pub use views::{
    AttachmentView, CommunityForm, CommunityView, PostDetailView, PostForm, PostView,
    RegisterForm, SolutionView, Viewer,
};

#[derive(Template)]
#[template(path = "frontpage.html")]
pub struct FrontpageTemplate {
    pub viewer: Viewer,
    pub app_name: String,
    pub communities: Vec<CommunityView>,
    pub location: String,
}

#[derive(Template)]
#[template(path = "community.html")]
pub struct CommunityTemplate {
    pub viewer: Viewer,
    pub community: CommunityView,
    pub posts: Vec<PostView>,
    /// Set right after the viewer published a post from this page.
    pub just_posted: bool,
}

#[derive(Template)]
#[template(path = "community_create.html")]
pub struct CommunityCreateTemplate {
    pub viewer: Viewer,
    pub form: CommunityForm,
}

#[derive(Template)]
#[template(path = "post_create.html")]
pub struct PostCreateTemplate {
    pub viewer: Viewer,
    pub form: PostForm,
}

#[derive(Template)]
#[template(path = "post_show.html")]
pub struct PostShowTemplate {
    pub viewer: Viewer,
    pub page: PostDetailView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
    pub email: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub viewer: Viewer,
    pub form: RegisterForm,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub viewer: Viewer,
    pub status: u16,
    pub heading: String,
    pub message: String,
}
