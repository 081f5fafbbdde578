//! File-backed ledger repository. Each child gets a directory under
//! `ledgers/` holding two files:
//!
//! - `ledger.yaml` — the aggregate header (child id, family id, balance)
//! - `transactions.csv` — the transaction history, newest first, with a
//!   header row and RFC 3339 timestamps
//!
//! The ledger is always read and rewritten as a whole, so the materialized
//! balance and the history can never drift apart on disk between calls.

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::FileConnection;
use crate::domain::models::ledger::{ChildLedger, Transaction};
use crate::storage::traits::LedgerStorage;

/// The `ledger.yaml` document: everything except the transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerHeader {
    child_id: String,
    family_id: String,
    balance: i64,
}

#[derive(Clone)]
pub struct LedgerRepository {
    connection: Arc<FileConnection>,
}

impl LedgerRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    /// Read a child's transaction history, preserving file order (newest
    /// first by construction). An absent file is an empty history.
    fn read_transactions(&self, child_id: &str) -> Result<Vec<Transaction>> {
        let file_path = self.connection.transactions_file(child_id);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {:?}", file_path))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for result in csv_reader.deserialize() {
            let transaction: Transaction =
                result.with_context(|| format!("Malformed row in {:?}", file_path))?;
            transactions.push(transaction);
        }
        Ok(transactions)
    }

    /// Rewrite a child's transaction history in ledger order.
    fn write_transactions(&self, child_id: &str, transactions: &[Transaction]) -> Result<()> {
        let file_path = self.connection.transactions_file(child_id);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open {:?} for writing", file_path))?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        for transaction in transactions {
            csv_writer.serialize(transaction)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl LedgerStorage for LedgerRepository {
    fn store_ledger(&self, ledger: &ChildLedger) -> Result<()> {
        let directory = self.connection.ledger_directory(&ledger.child_id);
        if !directory.exists() {
            fs::create_dir_all(&directory)
                .with_context(|| format!("Failed to create ledger directory {:?}", directory))?;
        }

        let header = LedgerHeader {
            child_id: ledger.child_id.clone(),
            family_id: ledger.family_id.clone(),
            balance: ledger.balance,
        };
        self.connection
            .write_yaml(&self.connection.ledger_file(&ledger.child_id), &header)?;
        self.write_transactions(&ledger.child_id, &ledger.transactions)?;

        info!(
            "Stored ledger for child {} (balance {}, {} transactions)",
            ledger.child_id,
            ledger.balance,
            ledger.transactions.len()
        );
        Ok(())
    }

    fn get_ledger(&self, child_id: &str) -> Result<Option<ChildLedger>> {
        let header: Option<LedgerHeader> = self
            .connection
            .read_yaml(&self.connection.ledger_file(child_id))?;

        let Some(header) = header else {
            debug!("No ledger found for child {}", child_id);
            return Ok(None);
        };

        let transactions = self.read_transactions(child_id)?;
        Ok(Some(ChildLedger {
            child_id: header.child_id,
            family_id: header.family_id,
            balance: header.balance,
            transactions,
        }))
    }

    fn list_ledgers(&self) -> Result<Vec<ChildLedger>> {
        let directory = self.connection.ledgers_directory();
        if !directory.exists() {
            return Ok(Vec::new());
        }

        let mut ledgers = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(child_id) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.get_ledger(child_id)? {
                Some(ledger) => ledgers.push(ledger),
                None => warn!("Ledger directory without header: {}", path.display()),
            }
        }

        ledgers.sort_by(|a, b| a.child_id.cmp(&b.child_id));
        Ok(ledgers)
    }

    fn delete_ledger(&self, child_id: &str) -> Result<bool> {
        let directory = self.connection.ledger_directory(child_id);
        if !directory.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&directory)
            .with_context(|| format!("Failed to delete ledger directory {:?}", directory))?;
        info!("Deleted ledger for child {}", child_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ledger::{TransactionCategory, TransactionStatus};
    use crate::storage::files::test_utils::TestEnvironment;
    use chrono::Utc;

    fn transaction(id: &str, amount: i64, status: TransactionStatus) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            description: format!("Test {}", id),
            category: TransactionCategory::Earn,
            status,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_round_trip() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = LedgerRepository::new(env.connection.clone());

        let ledger = ChildLedger::new("child-1", "fam-1");
        repo.store_ledger(&ledger)?;

        let loaded = repo.get_ledger("child-1")?.expect("ledger should exist");
        assert_eq!(loaded.balance, 0);
        assert!(loaded.transactions.is_empty());
        Ok(())
    }

    #[test]
    fn test_history_order_is_preserved() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = LedgerRepository::new(env.connection.clone());

        let mut ledger = ChildLedger::new("child-2", "fam-1");
        // Newest first, as the ledger service builds it.
        ledger.transactions = vec![
            transaction("tx-newest", 30, TransactionStatus::Pending),
            transaction("tx-middle", 20, TransactionStatus::Completed),
            transaction("tx-oldest", 10, TransactionStatus::Rejected),
        ];
        ledger.balance = 20;
        repo.store_ledger(&ledger)?;

        let loaded = repo.get_ledger("child-2")?.expect("ledger should exist");
        let ids: Vec<&str> = loaded.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tx-newest", "tx-middle", "tx-oldest"]);
        assert_eq!(loaded, ledger);
        Ok(())
    }

    #[test]
    fn test_delete_removes_history() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = LedgerRepository::new(env.connection.clone());

        let mut ledger = ChildLedger::new("child-3", "fam-1");
        ledger.transactions = vec![transaction("tx-1", 10, TransactionStatus::Completed)];
        ledger.balance = 10;
        repo.store_ledger(&ledger)?;

        assert!(repo.delete_ledger("child-3")?);
        assert!(repo.get_ledger("child-3")?.is_none());
        assert!(!repo.delete_ledger("child-3")?);
        Ok(())
    }

    #[test]
    fn test_list_ledgers_scans_directories() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = LedgerRepository::new(env.connection.clone());

        repo.store_ledger(&ChildLedger::new("child-b", "fam-1"))?;
        repo.store_ledger(&ChildLedger::new("child-a", "fam-2"))?;

        let ledgers = repo.list_ledgers()?;
        let ids: Vec<&str> = ledgers.iter().map(|l| l.child_id.as_str()).collect();
        assert_eq!(ids, vec!["child-a", "child-b"]);
        Ok(())
    }
}
