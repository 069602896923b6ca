//! Persisted ignore list

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ChatResult;
use crate::utils::atomic_write;

/// Decides whether lines from a sender are hidden locally
pub trait IgnoreFilter: Send + Sync {
    fn should_ignore(&self, name: &str) -> bool;
}

/// Set of ignored names, optionally persisted as a JSON array
pub struct IgnoreList {
    path: Option<PathBuf>,
    names: RwLock<BTreeSet<String>>,
}

impl IgnoreList {
    /// Ignore list that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            names: RwLock::new(BTreeSet::new()),
        }
    }

    /// Load the list from `path`; a missing file yields an empty list
    pub fn load(path: impl Into<PathBuf>) -> ChatResult<Self> {
        let path = path.into();
        let names = if Path::new(&path).exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeSet::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeSet::new()
        };
        debug!(path = %path.display(), count = names.len(), "loaded ignore list");

        Ok(Self {
            path: Some(path),
            names: RwLock::new(names),
        })
    }

    pub fn add(&self, name: &str) -> ChatResult<()> {
        let mut names = self.names.write();
        if names.insert(name.to_string()) {
            self.persist(&names)?;
        }
        Ok(())
    }

    pub fn remove(&self, name: &str) -> ChatResult<()> {
        let mut names = self.names.write();
        if names.remove(name) {
            self.persist(&names)?;
        }
        Ok(())
    }

    /// Ignored names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.names.read().iter().cloned().collect()
    }

    fn persist(&self, names: &BTreeSet<String>) -> ChatResult<()> {
        if let Some(path) = &self.path {
            atomic_write(path, &serde_json::to_string(names)?)?;
        }
        Ok(())
    }
}

impl IgnoreFilter for IgnoreList {
    fn should_ignore(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_remove() {
        let list = IgnoreList::in_memory();
        list.add("spammer").unwrap();
        assert!(list.should_ignore("spammer"));
        assert!(!list.should_ignore("friend"));

        list.remove("spammer").unwrap();
        assert!(!list.should_ignore("spammer"));
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ignored.json");

        let list = IgnoreList::load(&path).unwrap();
        list.add("troll").unwrap();
        list.add("bot").unwrap();

        let reloaded = IgnoreList::load(&path).unwrap();
        assert_eq!(reloaded.names(), vec!["bot".to_string(), "troll".to_string()]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let list = IgnoreList::load(dir.path().join("absent.json")).unwrap();
        assert!(list.names().is_empty());
    }
}
