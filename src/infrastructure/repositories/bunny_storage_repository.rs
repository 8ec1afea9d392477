use super::storage_repository::{StorageError, StorageRepository, UploadResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;

const ACCESS_KEY_HEADER: &str = "AccessKey";

/// Bunny.net edge storage implementation of storage repository
pub struct BunnyStorageRepository {
    client: reqwest::Client,
    base_url: String,
    storage_zone: String,
    api_key: String,
}

impl BunnyStorageRepository {
    pub fn new(client: reqwest::Client, base_url: String, storage_zone: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage_zone,
            api_key,
        }
    }

    /// `https://[<region>.]<host>`; the default region has no prefix
    pub fn endpoint(host: &str, region: Option<&str>) -> String {
        match region.map(str::trim).filter(|r| !r.is_empty() && *r != "de") {
            Some(region) => format!("https://{}.{}", region, host),
            None => format!("https://{}", host),
        }
    }

    /// Object URL under the storage zone, with each key segment
    /// percent-encoded. Keys with empty, `.` or `..` segments are refused:
    /// URL normalisation would resolve them outside the zone, even when
    /// the dots are percent-encoded.
    pub fn object_url(&self, key: &str) -> Result<String, StorageError> {
        let mut segments = Vec::new();
        for segment in key.split('/') {
            if matches!(segment, "" | "." | "..") {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            segments.push(urlencoding::encode(segment).into_owned());
        }
        Ok(format!(
            "{}/{}/{}",
            self.base_url,
            self.storage_zone,
            segments.join("/")
        ))
    }
}

#[async_trait]
impl StorageRepository for BunnyStorageRepository {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<UploadResult, StorageError> {
        let url = self.object_url(key)?;
        let body = tokio::fs::read(local_path).await?;
        let size = body.len();

        tracing::info!(
            url = %url,
            size_bytes = size,
            "Uploading artifact to Bunny storage"
        );

        let response = self
            .client
            .put(&url)
            .header(ACCESS_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    status = status.as_u16(),
                    key,
                    error = %e,
                    "Could not read Bunny storage response body"
                );
                String::new()
            }
        };

        if status == StatusCode::CREATED {
            tracing::info!(status = status.as_u16(), key, "Artifact uploaded");
            Ok(UploadResult {
                success: true,
                remote_status: status.as_u16(),
                message: "created".to_string(),
            })
        } else {
            tracing::warn!(
                status = status.as_u16(),
                key,
                body = %text,
                "Bunny storage rejected upload"
            );
            Ok(UploadResult {
                success: false,
                remote_status: status.as_u16(),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text
                },
            })
        }
    }
}
