use std::sync::Arc;

use fx_core::thread::DetailSources;
use fx_core::traits::{
    AuthProvider, CommunityRepo, FileRepo, Mailer, PostRepo, UserRepo, VoteRepo,
};

/// Site-wide values the handlers print or branch on.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub root_url: String,
    /// Render internal error details on the 500 page.
    pub show_errors: bool,
}

/// State shared by every request. Cloning is cheap: everything sits behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub communities: Arc<dyn CommunityRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub files: Arc<dyn FileRepo>,
    pub votes: Arc<dyn VoteRepo>,
    pub auth: Arc<dyn AuthProvider>,
    pub mailer: Arc<dyn Mailer>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wires one store that implements every repository port.
    pub fn from_store<S>(
        store: Arc<S>,
        auth: Arc<dyn AuthProvider>,
        mailer: Arc<dyn Mailer>,
        settings: Settings,
    ) -> Self
    where
        S: UserRepo + CommunityRepo + PostRepo + FileRepo + VoteRepo + 'static,
    {
        Self {
            users: store.clone(),
            communities: store.clone(),
            posts: store.clone(),
            files: store.clone(),
            votes: store,
            auth,
            mailer,
            settings: Arc::new(settings),
        }
    }

    pub fn detail_sources(&self) -> DetailSources<'_> {
        DetailSources {
            posts: self.posts.as_ref(),
            communities: self.communities.as_ref(),
            files: self.files.as_ref(),
            votes: self.votes.as_ref(),
        }
    }
}
