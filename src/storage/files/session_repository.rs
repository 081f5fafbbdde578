//! The current-session pointer: a single `session.yaml` document at the
//! root of the data directory, separate from the aggregate stores.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;

use super::connection::FileConnection;

/// The persisted session pointer: which account is signed in and which of
/// its families is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPointer {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_family_id: Option<String>,
}

/// Storage interface for the session pointer.
pub trait SessionStorage: Send + Sync {
    /// Read the pointer; `None` when signed out.
    fn get_session(&self) -> Result<Option<SessionPointer>>;

    /// Replace the pointer.
    fn set_session(&self, session: &SessionPointer) -> Result<()>;

    /// Remove the pointer (sign out).
    fn clear_session(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct SessionRepository {
    connection: Arc<FileConnection>,
}

impl SessionRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }
}

impl SessionStorage for SessionRepository {
    fn get_session(&self) -> Result<Option<SessionPointer>> {
        self.connection.read_yaml(&self.connection.session_file())
    }

    fn set_session(&self, session: &SessionPointer) -> Result<()> {
        self.connection
            .write_yaml(&self.connection.session_file(), session)?;
        info!("Session pointer set to account {}", session.account_id);
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let path = self.connection.session_file();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file {:?}", path))?;
            info!("Session cleared");
        } else {
            debug!("Session already clear");
        }
        Ok(())
    }
}
