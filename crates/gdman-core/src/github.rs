use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use gdman_backend::{ManagerError, ProgressFn, RawRelease, ReleaseApi, ReleaseSource};

const GODOT_REPO_API: &str = "https://api.github.com/repos/godotengine/godot";
const USER_AGENT: &str = concat!("gdman/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub releases API, or any mirror that serves the same
/// JSON shape.
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    source: ReleaseSource,
}

impl GithubClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: GODOT_REPO_API.to_string(),
            source: ReleaseSource::Github,
        }
    }

    pub fn mirror(api_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            source: ReleaseSource::Mirror,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        progress: &ProgressFn,
    ) -> Result<T, ManagerError> {
        debug!("GET {}", url);
        let mut response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ManagerError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ManagerError::ConnectionFailed(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ManagerError::ConnectionFailed(e.to_string()))?
        {
            progress(chunk.len() as u64);
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|e| ManagerError::ConnectionFailed(format!("Malformed release data: {}", e)))
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseApi for GithubClient {
    fn source(&self) -> ReleaseSource {
        self.source
    }

    async fn releases(
        &self,
        per_page: usize,
        page: usize,
        progress: &ProgressFn,
    ) -> Result<Vec<RawRelease>, ManagerError> {
        let url = format!(
            "{}/releases?per_page={}&page={}",
            self.api_url, per_page, page
        );
        self.get_json(&url, progress).await
    }

    async fn latest_release(&self, progress: &ProgressFn) -> Result<RawRelease, ManagerError> {
        let url = format!("{}/releases/latest", self.api_url);
        self.get_json(&url, progress).await
    }
}
