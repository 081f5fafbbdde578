//! Domain models for the per-child points ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The signed category of a transaction. The stored amount is always a
/// non-negative magnitude; the category supplies the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Earn,
    Spend,
    Penalty,
}

impl TransactionCategory {
    /// Sign a magnitude: earning adds points, spending and penalties
    /// remove them.
    pub fn signed(&self, amount: i64) -> i64 {
        match self {
            TransactionCategory::Earn => amount,
            TransactionCategory::Spend | TransactionCategory::Penalty => -amount,
        }
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionCategory::Earn => "EARN",
            TransactionCategory::Spend => "SPEND",
            TransactionCategory::Penalty => "PENALTY",
        };
        f.write_str(s)
    }
}

impl FromStr for TransactionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EARN" => Ok(TransactionCategory::Earn),
            "SPEND" => Ok(TransactionCategory::Spend),
            "PENALTY" => Ok(TransactionCategory::Penalty),
            other => Err(format!("unknown transaction category: {}", other)),
        }
    }
}

/// Lifecycle state of a transaction. `Completed` and `Rejected` are
/// terminal; the balance delta is applied on exactly one edge (entry into
/// `Completed` from `Pending`, or direct creation as `Completed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "REJECTED" => Ok(TransactionStatus::Rejected),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A single earn/spend/penalty event. Immutable once created except for
/// `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Non-negative magnitude; the sign comes from `category`.
    pub amount: i64,
    pub description: String,
    pub category: TransactionCategory,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Generate a unique ID for a new transaction.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// The contribution of this transaction to the balance: its signed
    /// magnitude if completed, zero otherwise.
    pub fn balance_contribution(&self) -> i64 {
        match self.status {
            TransactionStatus::Completed => self.category.signed(self.amount),
            TransactionStatus::Pending | TransactionStatus::Rejected => 0,
        }
    }
}

/// Per-child aggregate: the transaction history plus the materialized
/// balance over completed transactions.
///
/// Invariant: `balance == Σ balance_contribution()` over `transactions` at
/// every observation point. The balance is maintained incrementally by the
/// ledger service; it is never recomputed from history outside of tests.
/// Transactions are ordered newest first by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildLedger {
    /// Shared with the child's `Account` id.
    pub child_id: String,
    pub family_id: String,
    pub balance: i64,
    pub transactions: Vec<Transaction>,
}

impl ChildLedger {
    /// An empty ledger for a newly registered child.
    pub fn new(child_id: impl Into<String>, family_id: impl Into<String>) -> Self {
        Self {
            child_id: child_id.into(),
            family_id: family_id.into(),
            balance: 0,
            transactions: Vec::new(),
        }
    }

    /// Recompute the balance from history. Must always agree with the
    /// `balance` field.
    pub fn completed_sum(&self) -> i64 {
        self.transactions.iter().map(|t| t.balance_contribution()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amounts_by_category() {
        assert_eq!(TransactionCategory::Earn.signed(50), 50);
        assert_eq!(TransactionCategory::Spend.signed(30), -30);
        assert_eq!(TransactionCategory::Penalty.signed(20), -20);
    }

    #[test]
    fn test_only_completed_transactions_contribute() {
        let mut tx = Transaction {
            id: Transaction::generate_id(),
            amount: 40,
            description: "Homework".to_string(),
            category: TransactionCategory::Earn,
            status: TransactionStatus::Pending,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(tx.balance_contribution(), 0);

        tx.status = TransactionStatus::Completed;
        assert_eq!(tx.balance_contribution(), 40);

        tx.status = TransactionStatus::Rejected;
        assert_eq!(tx.balance_contribution(), 0);
    }

    #[test]
    fn test_category_and_status_round_trip_as_strings() {
        for category in [
            TransactionCategory::Earn,
            TransactionCategory::Spend,
            TransactionCategory::Penalty,
        ] {
            assert_eq!(category.to_string().parse::<TransactionCategory>(), Ok(category));
        }
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<TransactionStatus>(), Ok(status));
        }
        assert!("BONUS".parse::<TransactionCategory>().is_err());
    }
}
