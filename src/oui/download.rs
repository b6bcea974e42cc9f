// OUI Dataset Download Module
//
// Fetches the dataset resources as text. http(s) locations go through reqwest;
// file:// URLs and bare paths are read from disk so a host can ship the
// dataset alongside its binary.

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;

use crate::config::SourceConfig;
use crate::error::{Result, VendorError};

/// Source of dataset text
///
/// The loader only needs "location in, text out"; embedders can plug in their
/// own transport or in-memory data.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String>;
}

/// Default fetcher: HTTP(S) plus local files
pub struct ResourceFetcher {
    http: Client,
}

impl ResourceFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| VendorError::Client(e.to_string()))?;
        Ok(Self { http })
    }

    async fn fetch_http(&self, location: &str) -> Result<String> {
        let response = self
            .http
            .get(location)
            .send()
            .await
            .map_err(|source| VendorError::Http {
                location: location.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(VendorError::Status {
                location: location.to_string(),
                status: response.status(),
            });
        }

        response.text().await.map_err(|source| VendorError::Http {
            location: location.to_string(),
            source,
        })
    }

    async fn fetch_file(&self, location: &str) -> Result<String> {
        let path = local_path(location);
        fs::read_to_string(path).await.map_err(|source| VendorError::Io {
            location: location.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Fetch for ResourceFetcher {
    async fn fetch(&self, location: &str) -> Result<String> {
        log::debug!("Fetching {}", location);
        let body = if is_http(location) {
            self.fetch_http(location).await?
        } else {
            self.fetch_file(location).await?
        };
        log::debug!("Fetched {} bytes from {}", body.len(), location);
        Ok(body)
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Filesystem path for a file:// URL or bare path, cache-busting query dropped
fn local_path(location: &str) -> &str {
    let path = location.strip_prefix("file://").unwrap_or(location);
    match path.split_once('?') {
        Some((path, _)) => path,
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http() {
        assert!(is_http("http://example.com/oui.csv"));
        assert!(is_http("HTTPS://example.com/oui.csv"));
        assert!(!is_http("file:///srv/oui.csv"));
        assert!(!is_http("/srv/oui.csv"));
        assert!(!is_http("oui.csv"));
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("file:///srv/mac/oui.csv"), "/srv/mac/oui.csv");
        assert_eq!(local_path("/srv/mac/oui.csv?v=1.0"), "/srv/mac/oui.csv");
        assert_eq!(local_path("data/oui_cn.json"), "data/oui_cn.json");
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oui.csv");
        std::fs::write(&path, "AABBCC\tAcme Corp\n").unwrap();

        let fetcher = ResourceFetcher::new(&SourceConfig::default()).unwrap();
        let location = format!("{}?v=2", path.display());
        let body = fetcher.fetch(&location).await.unwrap();
        assert_eq!(body, "AABBCC\tAcme Corp\n");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let fetcher = ResourceFetcher::new(&SourceConfig::default()).unwrap();
        let result = fetcher.fetch("/nonexistent/mac_vendor/oui.csv").await;
        assert!(matches!(result, Err(VendorError::Io { .. })));
    }
}
