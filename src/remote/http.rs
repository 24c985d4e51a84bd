//! HTTP Remote Store Client
//!
//! `reqwest`-backed implementation of [`RemoteStore`] speaking JSON to the
//! backend's readings and documents endpoints.

use reqwest::Client;

use crate::config::Config;
use crate::error::SyncError;

use super::{DocumentUpload, ReadingUpload, RemoteStore};

/// HTTP client for the remote authoritative store
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    config: Config,
    client: Client,
}

impl HttpRemoteStore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// POST a JSON body to an API path, mapping any failure to `RemoteWriteFailed`
    async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<(), SyncError> {
        let url = self.config.api_url(path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);

        if let Some(token) = self.config.token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(SyncError::remote_write(format!(
                "request failed: {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn submit_reading(&self, reading: &ReadingUpload) -> Result<(), SyncError> {
        self.post_json("/api/readings", reading).await
    }

    async fn submit_document(&self, document: &DocumentUpload) -> Result<(), SyncError> {
        self.post_json("/api/documents", document).await
    }
}
