//! Object storage client for product images.
//!
//! The catalog only ever stores and compares the URL string returned here;
//! image bytes never enter the persistence layer.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Configuration for the image object store.
#[derive(Debug, Clone)]
pub struct ImageStoreConfig {
    /// Object-store endpoint, e.g. `"https://storage.example.com"`.
    pub endpoint: String,

    /// Bucket that holds product images.
    pub bucket: String,

    /// Bearer credential for uploads.
    pub token: String,
}

/// HTTP client that uploads image payloads and returns their stable URLs.
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    config: ImageStoreConfig,
    http: Client,
}

impl HttpImageStore {
    #[must_use]
    pub fn new(config: ImageStoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn upload_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.config.endpoint, self.config.bucket)
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn store_image(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ImageStoreError> {
        let response = self
            .http
            .put(self.upload_url(key))
            .bearer_auth(&self.config.token)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ImageStoreError::UnexpectedResponse(format!(
                "upload failed with status {status}: {text}"
            )));
        }

        let parsed: UploadResponse = response.json().await?;

        Ok(parsed.url)
    }
}

#[automock]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image payload and return its stable public URL.
    async fn store_image(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ImageStoreError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Errors that can occur when talking to the object store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned a non-2xx response or unexpected body.
    #[error("unexpected response from object store: {0}")]
    UnexpectedResponse(String),
}
