//! Page retrieval: HTTP(S) URLs or local files.

#[cfg(test)]
mod tests;

use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a page comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Url(String),
    File(PathBuf),
}

impl PageSource {
    /// `http://` and `https://` targets are URLs, everything else a path
    pub fn parse(target: &str) -> Self {
        let lower = target.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PageSource::Url(target.trim().to_string())
        } else {
            PageSource::File(PathBuf::from(target))
        }
    }
}

/// Retrieves raw page HTML
pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webaudit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// GET `url` and return the body; non-2xx is an error
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "fetching page");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        info!(%url, bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Fetch a URL or read a local file, whichever `target` names
    pub async fn load(&self, target: &str) -> Result<String, FetchError> {
        match PageSource::parse(target) {
            PageSource::Url(url) => self.fetch(&url).await,
            PageSource::File(path) => {
                let body = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Read {
                        path: path.clone(),
                        source,
                    })?;
                debug!(path = %path.display(), bytes = body.len(), "page read from disk");
                Ok(body)
            }
        }
    }

    /// Like [`load`](Self::load), but a failure is logged and yields no content
    pub async fn load_or_empty(&self, target: &str) -> String {
        match self.load(target).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%target, error = %e, "page unavailable, continuing with no content");
                String::new()
            }
        }
    }
}
