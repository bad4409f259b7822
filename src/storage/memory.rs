use super::{ArtifactKey, ArtifactStore};
use crate::error::Result;
use crate::ml::ModelArtifact;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store, mainly for tests
#[derive(Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<ArtifactKey, ModelArtifact>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn get(&self, key: &ArtifactKey) -> Result<Option<ModelArtifact>> {
        Ok(self.artifacts.read().get(key).cloned())
    }

    async fn put(&self, key: &ArtifactKey, artifact: &ModelArtifact) -> Result<()> {
        self.artifacts.write().insert(key.clone(), artifact.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
