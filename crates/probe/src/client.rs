//! HTTP client for the repository API.
//!
//! Development deployments serve the API over HTTPS with a self-signed
//! certificate, so certificate verification is optional and off by
//! default in the shipped configuration.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Options for constructing an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
    /// Bearer token for endpoints behind authentication.
    pub token: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), accept_invalid_certs: true, token: None }
    }
}

/// A thin wrapper around `reqwest` rooted at the repository's base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (trailing slash tolerated).
    pub fn new(base_url: &str, options: &ClientOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(token) = &options.token {
            let mut headers = reqwest::header::HeaderMap::new();
            let mut value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .or_raise(|| ErrorKind::Client)?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let http = builder.build().or_raise(|| ErrorKind::Client)?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// The base URL this client is rooted at, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path under the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of the record detail API for a public record identifier.
    pub fn record_url(&self, record_id: &str) -> String {
        self.url(&format!("api/records/{record_id}"))
    }

    /// URL of a record file's content endpoint.
    pub fn file_content_url(&self, record_id: &str, filename: &str) -> String {
        self.url(&format!("api/records/{record_id}/files/{filename}/content"))
    }

    /// URL of the IIIF Presentation manifest for a record.
    pub fn manifest_url(&self, record_id: &str) -> String {
        self.url(&format!("api/iiif/record:{record_id}/manifest"))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .or_raise(|| ErrorKind::Transport(url.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::UnexpectedStatus { url: url.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }

    /// GET a URL and check only that it answers with a success status.
    pub async fn get_ok(&self, url: &str) -> Result<()> {
        self.get(url).await?;
        Ok(())
    }

    /// GET a URL and parse the body as JSON.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.get(url).await?;
        response.json().await.or_raise(|| ErrorKind::InvalidBody("not valid JSON"))
    }

    /// GET a URL, returning the body bytes and the `Content-Type` header.
    pub async fn get_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>)> {
        let response = self.get(url).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes =
            response.bytes().await.or_raise(|| ErrorKind::Transport(url.to_string()))?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Download a record file to a local path.
    pub async fn download_file(
        &self,
        record_id: &str,
        filename: &str,
        dest: &Path,
    ) -> Result<u64> {
        let url = self.file_content_url(record_id, filename);
        let (bytes, _) = self.get_bytes(&url).await?;
        tokio::fs::write(dest, &bytes).await.or_raise(|| ErrorKind::Io)?;
        tracing::debug!(filename, bytes = bytes.len(), "Downloaded record file");
        Ok(bytes.len() as u64)
    }
}
