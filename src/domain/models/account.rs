//! Domain model for an account (parent or child identity).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Parent,
    Child,
}

/// An identity record. Parents carry email/password credentials, children
/// carry username/PIN credentials; the unused pair stays `None`.
///
/// `approved` is the admission gate: an unapproved account is invisible to
/// every family-scoped query and cannot establish a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// Families this account belongs to. Children have exactly one in
    /// practice; parents may create or join several.
    pub family_ids: Vec<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Generate a unique ID for a new account.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn belongs_to(&self, family_id: &str) -> bool {
        self.family_ids.iter().any(|id| id == family_id)
    }
}
