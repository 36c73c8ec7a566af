//! Community creation rules.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Community;
use crate::traits::CommunityRepo;

/// The create-community form, as raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityCreateFields {
    pub name: String,
    pub title: String,
    pub location: String,
    pub banner_image_url: String,
    pub latitude: String,
    pub longitude: String,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_slug(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `POINT(<lon> <lat>)` when both coordinates are given, `None` when neither is.
pub fn geography(latitude: &str, longitude: &str) -> Result<Option<String>> {
    let (lat, lon) = (latitude.trim(), longitude.trim());
    if lat.is_empty() && lon.is_empty() {
        return Ok(None);
    }
    let invalid = || AppError::Validation("Latitude and longitude must both be valid coordinates".into());
    let lat: f64 = lat.parse().map_err(|_| invalid())?;
    let lon: f64 = lon.parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok(Some(format!("POINT({lon} {lat})")))
}

pub async fn create_community(repo: &dyn CommunityRepo, fields: CommunityCreateFields) -> Result<Community> {
    let name = fields.name.trim();
    let title = fields.title.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Community name is required".into()));
    }
    if title.is_empty() {
        return Err(AppError::Validation("Community title is required".into()));
    }
    if !(3..=128).contains(&name.chars().count()) || !is_slug(name) {
        return Err(AppError::Validation(
            "Community name must be 3-128 letters, digits, '-' or '_'".into(),
        ));
    }
    if title.chars().count() > 128 {
        return Err(AppError::Validation(
            "Community title must be at most 128 characters".into(),
        ));
    }
    let geography = geography(&fields.latitude, &fields.longitude)?;

    if repo.find_community_by_name(name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A community named {name} already exists"
        )));
    }

    let now = Utc::now();
    let community = Community {
        id: Uuid::now_v7(),
        name: name.to_string(),
        title: title.to_string(),
        location: non_blank(&fields.location),
        geography,
        banner_image_url: non_blank(&fields.banner_image_url),
        created_at: now,
        updated_at: now,
    };
    repo.create_community(community.clone()).await?;
    tracing::info!(community_id = %community.id, name = %community.name, "community created");

    Ok(community)
}
