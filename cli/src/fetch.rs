#![deny(missing_docs)]

//! # Fetchers
//!
//! Document retrieval for the CLI: local files always, `http(s)` URLs with the
//! `client` feature.

use harbor_gen_core::oas::{DocumentFetcher, FsFetcher};
use harbor_gen_core::AppResult;
#[cfg(feature = "client")]
use harbor_gen_core::AppError;
use url::Url;

/// Fetches over HTTP(S) with a blocking `ureq` call on the blocking pool.
#[cfg(feature = "client")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(feature = "client")]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, uri: &Url) -> AppResult<String> {
        let target = uri.to_string();
        tokio::task::spawn_blocking(move || {
            ureq::get(target.as_str())
                .call()
                .and_then(|mut response| response.body_mut().read_to_string())
                .map_err(|e| AppError::load(target.as_str(), e.to_string()))
        })
        .await
        .map_err(|e| AppError::load(uri.as_str(), e.to_string()))?
    }
}

/// Picks a fetcher by URI scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliFetcher;

impl DocumentFetcher for CliFetcher {
    async fn fetch(&self, uri: &Url) -> AppResult<String> {
        match uri.scheme() {
            #[cfg(feature = "client")]
            "http" | "https" => HttpFetcher.fetch(uri).await,
            _ => FsFetcher.fetch(uri).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_local_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        fs::write(&path, "openapi: 3.0.0").unwrap();
        let uri = Url::from_file_path(&path).unwrap();

        assert_eq!(CliFetcher.fetch(&uri).await.unwrap(), "openapi: 3.0.0");
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_rejected() {
        let uri = Url::parse("ftp://example.com/openapi.yaml").unwrap();
        assert!(CliFetcher.fetch(&uri).await.is_err());
    }
}
