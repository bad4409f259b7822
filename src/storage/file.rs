//! One JSON file per artifact, replaced via temp file + rename

use super::{ArtifactKey, ArtifactStore};
use crate::error::{PredictorError, Result};
use crate::ml::ModelArtifact;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            PredictorError::Persistence(format!("create {}: {}", self.dir.display(), e))
        })?;

        // Same directory so the rename stays on one filesystem
        let tmp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, target).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove temp file {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(PredictorError::Persistence(format!(
                "write {}: {}",
                target.display(),
                e
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn get(&self, key: &ArtifactKey) -> Result<Option<ModelArtifact>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PredictorError::Persistence(format!(
                    "read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let artifact: ModelArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            PredictorError::Persistence(format!("corrupt artifact {}: {}", path.display(), e))
        })?;
        debug!("Loaded artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(artifact))
    }

    async fn put(&self, key: &ArtifactKey, artifact: &ModelArtifact) -> Result<()> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec(artifact)?;
        self.write_atomic(&path, &bytes).await?;
        debug!("Wrote artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
