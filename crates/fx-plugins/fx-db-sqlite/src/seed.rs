//! Demo data for a fresh database.

use fx_core::accounts::{self, Registration};
use fx_core::communities::{self, CommunityCreateFields};
use fx_core::models::PostRole;
use fx_core::posting::{self, PostCreateFields};
use fx_core::traits::{AuthProvider, CommunityFilter, CommunityRepo};

use crate::SqliteStore;

const DEMO_ISSUES: [&str; 8] = [
    "Large pothole on Main Street near bus stop",
    "Graffiti on playground equipment at Central Park",
    "Fly-tipping behind grocery store on Oak Avenue",
    "Broken street lamp on Elm Street",
    "Abandoned shopping trolleys in River Park",
    "Deep potholes causing car damage on Bridge Road",
    "Graffiti tags on railway bridge",
    "Overflowing bins near school entrance",
];

pub const DEMO_EMAIL: &str = "demo@fixit.local";
pub const DEMO_PASSWORD: &str = "demo-password";

/// Inserts a demo user, a community and a handful of issues. Does nothing
/// when any community already exists. Returns whether data was written.
pub async fn seed(store: &SqliteStore, auth: &dyn AuthProvider) -> anyhow::Result<bool> {
    if !store
        .list_communities(&CommunityFilter::default())
        .await?
        .is_empty()
    {
        tracing::info!("database already has communities, skipping seed");
        return Ok(false);
    }

    let registration = Registration {
        username: "demo".into(),
        email: DEMO_EMAIL.into(),
        password: DEMO_PASSWORD.into(),
        confirm_password: DEMO_PASSWORD.into(),
    };
    let user = accounts::register(store, auth, registration).await?;

    let community = communities::create_community(
        store,
        CommunityCreateFields {
            name: "town-centre".into(),
            title: "Town Centre".into(),
            location: "High Street".into(),
            latitude: "53.7997".into(),
            longitude: "-1.5492".into(),
            ..Default::default()
        },
    )
    .await?;

    for title in DEMO_ISSUES {
        let fields = PostCreateFields {
            title: title.to_string(),
            body: None,
            role: PostRole::Issue,
            tags: Vec::new(),
            reply_to: None,
            community_id: community.id,
        };
        posting::create_post(store, fields, &user).await?;
    }

    tracing::info!(community = %community.name, issues = DEMO_ISSUES.len(), "demo data seeded");
    Ok(true)
}
