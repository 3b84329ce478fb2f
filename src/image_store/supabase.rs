//! HTTP client for a Supabase-compatible storage bucket.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use super::{ImageStore, ImageStoreError};

/// Client for one public storage bucket.
///
/// Objects are written to `{base}/storage/v1/object/{bucket}/{name}` and
/// read back through the `/object/public/` URL, so the bucket must be
/// configured public.
pub struct SupabaseImageStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl SupabaseImageStore {
    /// Create a new storage client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the storage service (e.g., "https://xyz.supabase.co")
    /// * `api_key` - Service role key, sent as both bearer token and apikey header
    /// * `bucket` - Bucket name
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, api_key: String, bucket: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            bucket,
            api_key,
        }
    }

    /// Random object name so concurrent uploads of identically-named files
    /// never collide; the original extension is kept for the CDN.
    fn object_name(file_name: &str) -> String {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty());
        match extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }

    /// Resolve a content type for the payload: what the client declared,
    /// or a sniff of the bytes when the declaration is missing.
    fn resolve_content_type(bytes: &[u8], declared: &str) -> String {
        if !declared.is_empty() {
            return declared.to_string();
        }
        infer::get(bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ImageStore for SupabaseImageStore {
    async fn put_object(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: &str,
    ) -> Result<String, ImageStoreError> {
        let object_name = Self::object_name(file_name);
        let content_type = Self::resolve_content_type(&bytes, content_type);
        let upload_url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        );

        let response = self
            .client
            .post(&upload_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("apikey", self.api_key.clone())
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageStoreError::Rejected { status, body });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        ))
    }
}
