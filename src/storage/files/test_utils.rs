//! Shared helpers for repository and service tests: a temp-directory-backed
//! connection that cleans up after itself.

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::FileConnection;

/// A throwaway data directory. Keep the environment alive for the duration
/// of the test; the directory is removed on drop.
pub struct TestEnvironment {
    pub connection: Arc<FileConnection>,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = Arc::new(FileConnection::new(temp_dir.path())?);
        Ok(Self {
            connection,
            _temp_dir: temp_dir,
        })
    }
}
