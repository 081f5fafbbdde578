//! Data-directory management for the file-backed repositories.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// FileConnection manages the layout of the data directory and the shared
/// read/write primitives for YAML documents:
///
/// ```text
/// <data dir>/
/// ├── session.yaml
/// ├── accounts/<account_id>.yaml
/// ├── families/<family_id>.yaml
/// ├── ledgers/<child_id>/
/// │   ├── ledger.yaml
/// │   └── transactions.csv
/// └── messages/<family_id>.csv
/// ```
#[derive(Clone)]
pub struct FileConnection {
    base_directory: PathBuf,
}

impl FileConnection {
    /// Open a connection over a base directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {:?}", base_path))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn accounts_directory(&self) -> PathBuf {
        self.base_directory.join("accounts")
    }

    pub fn account_file(&self, account_id: &str) -> PathBuf {
        self.accounts_directory().join(format!("{}.yaml", account_id))
    }

    pub fn families_directory(&self) -> PathBuf {
        self.base_directory.join("families")
    }

    pub fn family_file(&self, family_id: &str) -> PathBuf {
        self.families_directory().join(format!("{}.yaml", family_id))
    }

    pub fn ledgers_directory(&self) -> PathBuf {
        self.base_directory.join("ledgers")
    }

    pub fn ledger_directory(&self, child_id: &str) -> PathBuf {
        self.ledgers_directory().join(child_id)
    }

    pub fn ledger_file(&self, child_id: &str) -> PathBuf {
        self.ledger_directory(child_id).join("ledger.yaml")
    }

    pub fn transactions_file(&self, child_id: &str) -> PathBuf {
        self.ledger_directory(child_id).join("transactions.csv")
    }

    pub fn messages_directory(&self) -> PathBuf {
        self.base_directory.join("messages")
    }

    pub fn messages_file(&self, family_id: &str) -> PathBuf {
        self.messages_directory().join(format!("{}.csv", family_id))
    }

    pub fn session_file(&self) -> PathBuf {
        self.base_directory.join("session.yaml")
    }

    /// Write a YAML document atomically: serialize to a temp file next to
    /// the target, then rename over it.
    pub fn write_yaml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let yaml_content = serde_yaml::to_string(value)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {:?} into place", temp_path))?;

        debug!("Wrote document {}", path.display());
        Ok(())
    }

    /// Read a YAML document, returning `None` when the file does not exist.
    pub fn read_yaml<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let value = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Malformed document at {:?}", path))?;
        Ok(Some(value))
    }

    /// List the `.yaml` documents directly under a directory. Returns an
    /// empty list when the directory has not been created yet.
    pub fn list_yaml_files(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_yaml_round_trip_and_missing_file() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let connection = FileConnection::new(temp_dir.path())?;

        let path = connection.base_directory().join("doc.yaml");
        assert_eq!(connection.read_yaml::<Doc>(&path)?, None);

        let doc = Doc { name: "first".to_string(), count: 3 };
        connection.write_yaml(&path, &doc)?;
        assert_eq!(connection.read_yaml::<Doc>(&path)?, Some(doc));

        // The temp file must not linger after the rename.
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }

    #[test]
    fn test_list_yaml_files_skips_other_extensions() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let connection = FileConnection::new(temp_dir.path())?;
        let dir = connection.accounts_directory();

        connection.write_yaml(&dir.join("a.yaml"), &Doc { name: "a".into(), count: 1 })?;
        connection.write_yaml(&dir.join("b.yaml"), &Doc { name: "b".into(), count: 2 })?;
        std::fs::write(dir.join("notes.txt"), "ignored")?;

        let files = connection.list_yaml_files(&dir)?;
        assert_eq!(files.len(), 2);
        Ok(())
    }
}
