//! Catalog source abstraction
//!
//! The pipeline only needs the list of catalog elements; where they come from
//! is behind [`ChannelCatalog`] so the HTTP fetcher can be swapped for an
//! in-memory catalog.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SourceResult;

/// A source of raw channel catalog elements
#[async_trait]
pub trait ChannelCatalog: Send + Sync {
    /// Human-readable description used in log lines
    fn describe(&self) -> String;

    /// Fetch the catalog; every element is one (possibly malformed) record
    async fn fetch_channels(&self) -> SourceResult<Vec<Value>>;
}

/// Catalog backed by an in-memory list
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<Value>,
}

impl StaticCatalog {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ChannelCatalog for StaticCatalog {
    fn describe(&self) -> String {
        format!("static catalog ({} records)", self.records.len())
    }

    async fn fetch_channels(&self) -> SourceResult<Vec<Value>> {
        Ok(self.records.clone())
    }
}
