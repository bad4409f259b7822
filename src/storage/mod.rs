//! Artifact persistence
//!
//! Model artifacts are keyed by symbol and interval. The backing medium is
//! swappable: local files for the CLI, memory for tests.

mod file;
mod memory;

pub use file::FileArtifactStore;
pub use memory::InMemoryArtifactStore;

use crate::error::Result;
use crate::ml::ModelArtifact;
use crate::types::Interval;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub symbol: String,
    pub interval: Interval,
}

impl ArtifactKey {
    pub fn new(symbol: &str, interval: Interval) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            interval,
        }
    }

    /// File-system safe name, e.g. `BTCUSDT_1m`
    pub fn file_stem(&self) -> String {
        let symbol: String = self
            .symbol
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        format!("{}_{}", symbol, self.interval)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.interval)
    }
}

/// Key-value store for trained artifacts. `put` replaces wholesale and must
/// never expose a partially written artifact to `get`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn get(&self, key: &ArtifactKey) -> Result<Option<ModelArtifact>>;

    async fn put(&self, key: &ArtifactKey, artifact: &ModelArtifact) -> Result<()>;

    /// Store name for logging
    fn name(&self) -> &str;
}
