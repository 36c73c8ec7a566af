//! Request body shapes: multipart forms for anything that may carry a file,
//! urlencoded forms for the rest.

use std::collections::HashMap;

use axum::extract::Multipart;
use serde::Deserialize;

use crate::error::ApiError;

/// One uploaded file part.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A fully read multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    uploads: HashMap<String, Upload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    // Browsers submit an empty part for an untouched file input.
                    if !filename.is_empty() && !data.is_empty() {
                        form.uploads.insert(
                            name,
                            Upload {
                                filename,
                                data: data.to_vec(),
                            },
                        );
                    }
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    /// The trimmed text value of `name`, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn take_upload(&mut self, name: &str) -> Option<Upload> {
        self.uploads.remove(name)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginFields {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterFields {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteFields {
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrontpageQuery {
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommunityQuery {
    pub posted_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostFormQuery {
    #[serde(default)]
    pub reply_to_id: String,
    #[serde(default)]
    pub post_type: String,
}
