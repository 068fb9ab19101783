//! Profile picture storage.
//!
//! Handlers see only the [`ImageHost`] trait. [`CloudinaryImageHost`] talks
//! to Cloudinary's signed upload API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::domain::types::ImageUrl;
use crate::models::config::CloudinaryConfig;

#[derive(Debug, Error)]
pub enum ImageHostError {
    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("image host rejected the request: {0}")]
    Rejected(String),
    #[error("image host returned an invalid url: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores an image and returns its public HTTPS URL.
    async fn upload(&self, bytes: Vec<u8>) -> Result<ImageUrl, ImageHostError>;
    /// Removes a previously uploaded image.
    async fn delete(&self, url: &ImageUrl) -> Result<(), ImageHostError>;
}

/// Derives a Cloudinary public id from a delivery URL: the last path segment
/// without its extension, prefixed with `folder`.
pub fn public_id_from_url(url: &str, folder: &str) -> Option<String> {
    let segment = url
        .split(['?', '#'])
        .next()?
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())?;
    let stem = segment
        .rsplit_once('.')
        .map_or(segment, |(stem, _)| stem);
    if stem.is_empty() {
        return None;
    }
    if folder.is_empty() {
        Some(stem.to_string())
    } else {
        Some(format!("{folder}/{stem}"))
    }
}

/// Hex SHA-1 over the `&`-joined, key-sorted params followed by the secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub struct CloudinaryImageHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, bytes: Vec<u8>) -> Result<ImageUrl, ImageHostError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name("upload"))
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let body: UploadResponse = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.error {
            return Err(ImageHostError::Rejected(error.message));
        }
        let url = body
            .secure_url
            .ok_or_else(|| ImageHostError::Rejected("missing secure_url".to_string()))?;
        ImageUrl::new(url.clone()).map_err(|_| ImageHostError::InvalidUrl(url))
    }

    async fn delete(&self, url: &ImageUrl) -> Result<(), ImageHostError> {
        let public_id = public_id_from_url(url.as_str(), &self.config.folder)
            .ok_or_else(|| ImageHostError::InvalidUrl(url.to_string()))?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
        ];

        let body: DestroyResponse = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.error {
            return Err(ImageHostError::Rejected(error.message));
        }
        match body.result.as_deref() {
            Some("ok") | Some("not found") => Ok(()),
            other => Err(ImageHostError::Rejected(format!(
                "unexpected destroy result: {other:?}"
            ))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_uses_last_segment_without_extension() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712/user_profiles/abc123.jpg",
                "user_profiles"
            )
            .as_deref(),
            Some("user_profiles/abc123")
        );
        assert_eq!(
            public_id_from_url("https://host/x/photo.final.png?v=2", "pics").as_deref(),
            Some("pics/photo.final")
        );
        assert_eq!(
            public_id_from_url("https://host/x/noext", "").as_deref(),
            Some("noext")
        );
        assert_eq!(public_id_from_url("https://host/x/", "pics"), None);
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let a = sign(&[("timestamp", "1"), ("folder", "f")], "secret");
        let b = sign(&[("folder", "f"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);

        let mut hasher = Sha1::new();
        hasher.update(b"folder=f&timestamp=1secret");
        assert_eq!(a, hex::encode(hasher.finalize()));
        assert_eq!(a.len(), 40);
    }
}
