//! Domain models for a family: membership, the preset catalog, and the
//! schedule/reminder recurrence rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::ledger::TransactionCategory;

/// A reusable task/reward/penalty template. The `recurring` flag is
/// informational only; recurrence is governed by `ScheduleItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub family_id: String,
    pub label: String,
    pub emoji: String,
    pub category: TransactionCategory,
    /// Non-negative point magnitude; the sign is implied by `category`.
    pub amount: i64,
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Once,
    Weekly,
}

/// A recurrence rule scheduling a preset task. Exactly one of `date` and
/// `day_of_week` is meaningful, selected by `frequency`; a rule whose
/// selected field is absent never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    /// Target child; `None` applies the rule to every child in the family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// 0 = Sunday .. 6 = Saturday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    pub preset_id: String,
}

/// Like `ScheduleItem`, but carries free text instead of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    pub text: String,
}

/// The membership and configuration boundary: parents, the preset catalog,
/// and the recurrence rules. Children are linked through their accounts and
/// ledgers, not listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    /// Human-shareable 6-digit code admitting new members. Uniqueness is
    /// assumed, not enforced against collision.
    pub join_code: String,
    pub parent_ids: Vec<String>,
    pub presets: Vec<Preset>,
    pub schedules: Vec<ScheduleItem>,
    pub reminders: Vec<ReminderItem>,
}

impl Family {
    /// Create a family for its founding parent, seeded with the default
    /// preset catalog and a fresh join code.
    pub fn new(name: impl Into<String>, founding_parent_id: &str) -> Self {
        let id = Uuid::new_v4().to_string();
        let presets = Self::default_presets(&id);
        Self {
            id,
            name: name.into(),
            join_code: Self::generate_join_code(),
            parent_ids: vec![founding_parent_id.to_string()],
            presets,
            schedules: Vec::new(),
            reminders: Vec::new(),
        }
    }

    /// Generate a 6-digit join code from the clock, like the transaction ID
    /// suffixes. Collisions are possible and not checked.
    pub fn generate_join_code() -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("{}", 100_000 + (nanos % 900_000) as u32)
    }

    /// The starter catalog every new family is seeded with.
    pub fn default_presets(family_id: &str) -> Vec<Preset> {
        let catalog: [(&str, &str, TransactionCategory, i64); 10] = [
            ("Tidy the bedroom", "🛏️", TransactionCategory::Earn, 50),
            ("Wash the dishes", "🍽️", TransactionCategory::Earn, 30),
            ("Finish homework", "📚", TransactionCategory::Earn, 40),
            ("Walk the dog", "🐕", TransactionCategory::Earn, 25),
            ("Read a book", "📖", TransactionCategory::Earn, 30),
            ("1 hour of screen time", "📱", TransactionCategory::Spend, 60),
            ("Outing with friends", "🍕", TransactionCategory::Spend, 100),
            ("Ice cream", "🍦", TransactionCategory::Spend, 20),
            ("Bad grade", "📉", TransactionCategory::Penalty, 50),
            ("Misbehaving", "😠", TransactionCategory::Penalty, 30),
        ];
        catalog
            .iter()
            .map(|(label, emoji, category, amount)| Preset {
                id: Uuid::new_v4().to_string(),
                family_id: family_id.to_string(),
                label: label.to_string(),
                emoji: emoji.to_string(),
                category: *category,
                amount: *amount,
                recurring: false,
            })
            .collect()
    }
}
