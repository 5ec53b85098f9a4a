//! File system catalog source and condition store
//!
//! Layout under the base directory:
//!
//! ```text
//! <base>/<project>.json          attribute/event definitions
//! <base>/segments/<id>.json      { "groups": [...] }
//! <base>/triggers/<id>.json      [{ "eventName": ..., "filterGroups": [...] }, ...]
//! ```

use async_trait::async_trait;
use audience_core::{AttributeDefinitions, SegmentPayload, TriggerPayload};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{CatalogSource, ConditionStore};

fn validate_root(root_path: &Path) -> RepositoryResult<PathBuf> {
    if !root_path.is_dir() {
        return Err(RepositoryError::InvalidPath {
            path: root_path.to_path_buf(),
        });
    }
    Ok(root_path.to_path_buf())
}

/// Resolve `<dir>/<id>.json`, rejecting ids that would escape the directory
fn entry_path(dir: &Path, id: &str) -> RepositoryResult<PathBuf> {
    if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
        return Err(RepositoryError::InvalidPath {
            path: dir.join(id),
        });
    }
    Ok(dir.join(format!("{}.json", id)))
}

async fn read_json<T: DeserializeOwned>(path: &Path, id: &str) -> RepositoryResult<T> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RepositoryError::NotFound { id: id.to_string() })
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> RepositoryResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Catalog source reading `<base>/<project>.json`
#[derive(Debug, Clone)]
pub struct FileSystemCatalogSource {
    root_path: PathBuf,
}

impl FileSystemCatalogSource {
    /// Create a source rooted at an existing directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        Ok(Self {
            root_path: validate_root(root_path.as_ref())?,
        })
    }

    /// Get the root path of the source
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[async_trait]
impl CatalogSource for FileSystemCatalogSource {
    async fn fetch_definitions(&self, project: &str) -> RepositoryResult<AttributeDefinitions> {
        let path = entry_path(&self.root_path, project)?;
        read_json(&path, project).await
    }
}

/// Condition store writing JSON documents under a base directory
#[derive(Debug, Clone)]
pub struct FileSystemConditionStore {
    root_path: PathBuf,
}

impl FileSystemConditionStore {
    /// Create a store rooted at an existing directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        Ok(Self {
            root_path: validate_root(root_path.as_ref())?,
        })
    }

    fn segment_path(&self, segment_id: &str) -> RepositoryResult<PathBuf> {
        entry_path(&self.root_path.join("segments"), segment_id)
    }

    fn triggers_path(&self, campaign_id: &str) -> RepositoryResult<PathBuf> {
        entry_path(&self.root_path.join("triggers"), campaign_id)
    }
}

#[async_trait]
impl ConditionStore for FileSystemConditionStore {
    async fn load_segment(&self, segment_id: &str) -> RepositoryResult<SegmentPayload> {
        read_json(&self.segment_path(segment_id)?, segment_id).await
    }

    async fn save_segment(
        &self,
        segment_id: &str,
        payload: &SegmentPayload,
    ) -> RepositoryResult<()> {
        write_json(&self.segment_path(segment_id)?, payload).await
    }

    async fn load_triggers(&self, campaign_id: &str) -> RepositoryResult<Vec<TriggerPayload>> {
        read_json(&self.triggers_path(campaign_id)?, campaign_id).await
    }

    async fn save_triggers(
        &self,
        campaign_id: &str,
        triggers: &[TriggerPayload],
    ) -> RepositoryResult<()> {
        write_json(&self.triggers_path(campaign_id)?, triggers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_path_rejects_escapes() {
        let dir = Path::new("/tmp/catalog");
        assert_eq!(
            entry_path(dir, "shop").unwrap(),
            PathBuf::from("/tmp/catalog/shop.json")
        );
        assert!(entry_path(dir, "../etc/passwd").is_err());
        assert!(entry_path(dir, "a/b").is_err());
        assert!(entry_path(dir, "").is_err());
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            FileSystemCatalogSource::new("/nonexistent/audience/catalog"),
            Err(RepositoryError::InvalidPath { .. })
        ));
    }
}
