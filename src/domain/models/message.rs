//! Domain model for a family chat message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat entry. Messages are append-only and scoped to one family;
/// `is_system` marks announcements generated by the app itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub family_id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_system: bool,
}

impl ChatMessage {
    /// Generate a unique ID for a new message.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
