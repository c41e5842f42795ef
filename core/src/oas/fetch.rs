#![deny(missing_docs)]

//! # Document Fetching
//!
//! The I/O seam of the loader. Core ships a filesystem fetcher and an
//! in-memory one; network fetchers live with the binaries that need them.

use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::future::Future;
use url::Url;

/// Retrieves the raw text of a document.
pub trait DocumentFetcher: Send + Sync {
    /// Fetches `uri`. Failures should be [`AppError::Load`] naming the URI.
    fn fetch(&self, uri: &Url) -> impl Future<Output = AppResult<String>> + Send;
}

impl<T: DocumentFetcher> DocumentFetcher for &T {
    fn fetch(&self, uri: &Url) -> impl Future<Output = AppResult<String>> + Send {
        (**self).fetch(uri)
    }
}

/// Reads `file://` URIs from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl DocumentFetcher for FsFetcher {
    async fn fetch(&self, uri: &Url) -> AppResult<String> {
        if uri.scheme() != "file" {
            return Err(AppError::load(
                uri.as_str(),
                format!("unsupported scheme '{}' for filesystem fetcher", uri.scheme()),
            ));
        }
        let path = uri
            .to_file_path()
            .map_err(|_| AppError::load(uri.as_str(), "not a local file path"))?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::load(uri.as_str(), e.to_string()))
    }
}

/// Serves documents from memory, keyed by absolute URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, String>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document under `uri`.
    pub fn with_document(mut self, uri: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(uri, content);
        self
    }

    /// Adds or replaces a document.
    pub fn insert(&mut self, uri: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(uri.into(), content.into());
    }
}

impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, uri: &Url) -> AppResult<String> {
        self.documents
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| AppError::load(uri.as_str(), "document not found"))
    }
}
