//! The transaction/balance state machine — the core of the points economy.
//!
//! Recording an event is split from applying its financial effect: a
//! child-initiated request enters the ledger as `Pending` and grants no
//! value until a parent completes it. The balance delta is applied on
//! exactly one edge per transaction — direct creation as `Completed`, or
//! the `Pending -> Completed` transition — gated on the *pre-transition*
//! status so repeat calls can never double-apply it.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::ledger::{
    CreateTransactionCommand, InitialStatus, UpdateTransactionStatusCommand,
};
use crate::domain::models::ledger::{ChildLedger, Transaction, TransactionStatus};
use crate::storage::files::{FileConnection, LedgerRepository};
use crate::storage::traits::LedgerStorage;

#[derive(Clone)]
pub struct LedgerService {
    ledger_repository: LedgerRepository,
}

impl LedgerService {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self {
            ledger_repository: LedgerRepository::new(connection),
        }
    }

    /// Create an empty ledger for a newly registered child.
    pub fn create_ledger(&self, child_id: &str, family_id: &str) -> Result<ChildLedger> {
        let ledger = ChildLedger::new(child_id, family_id);
        self.ledger_repository.store_ledger(&ledger)?;
        Ok(ledger)
    }

    pub fn get_ledger(&self, child_id: &str) -> Result<Option<ChildLedger>> {
        self.ledger_repository.get_ledger(child_id)
    }

    /// Record a new transaction on a child's ledger.
    ///
    /// The amount is stored as its absolute value; the caller's sign is
    /// never trusted. A `Completed` creation applies the balance delta
    /// immediately, a `Pending` one leaves the balance untouched. An
    /// unknown child id is a no-op returning `Ok(None)`.
    ///
    /// No affordability check happens here: an approved spend may drive the
    /// balance negative.
    pub fn create_transaction(
        &self,
        command: CreateTransactionCommand,
    ) -> Result<Option<ChildLedger>> {
        let Some(mut ledger) = self.ledger_repository.get_ledger(&command.child_id)? else {
            warn!("create_transaction: no ledger for child {}", command.child_id);
            return Ok(None);
        };

        let amount = command.amount.abs();
        let status: TransactionStatus = command.status.into();
        let transaction = Transaction {
            id: Transaction::generate_id(),
            amount,
            description: command.description,
            category: command.category,
            status,
            timestamp: Utc::now(),
        };

        if command.status == InitialStatus::Completed {
            ledger.balance += command.category.signed(amount);
        }
        ledger.transactions.insert(0, transaction);

        self.ledger_repository.store_ledger(&ledger)?;
        info!(
            "💰 Recorded {} {} of {} pts for child {} (balance now {})",
            status, command.category, amount, ledger.child_id, ledger.balance
        );
        Ok(Some(ledger))
    }

    /// Move a transaction to a new lifecycle status.
    ///
    /// The deferred balance delta is applied only on the
    /// `Pending -> Completed` edge. Any other transition — including
    /// re-completing an already completed transaction — changes the status
    /// field without touching the balance. Unknown child or transaction ids
    /// are no-ops returning `Ok(None)`.
    pub fn update_transaction_status(
        &self,
        command: UpdateTransactionStatusCommand,
    ) -> Result<Option<ChildLedger>> {
        let Some(mut ledger) = self.ledger_repository.get_ledger(&command.child_id)? else {
            warn!("update_transaction_status: no ledger for child {}", command.child_id);
            return Ok(None);
        };

        let Some(transaction) = ledger
            .transactions
            .iter_mut()
            .find(|t| t.id == command.transaction_id)
        else {
            warn!(
                "update_transaction_status: transaction {} not found for child {}",
                command.transaction_id, command.child_id
            );
            return Ok(None);
        };

        let previous = transaction.status;
        transaction.status = command.status;

        if previous == TransactionStatus::Pending && command.status == TransactionStatus::Completed
        {
            let delta = transaction.category.signed(transaction.amount);
            ledger.balance += delta;
            info!(
                "💰 Completed transaction {} for child {} (delta {}, balance now {})",
                command.transaction_id, command.child_id, delta, ledger.balance
            );
        } else {
            info!(
                "Transaction {} for child {}: {} -> {} (no balance change)",
                command.transaction_id, command.child_id, previous, command.status
            );
        }

        self.ledger_repository.store_ledger(&ledger)?;
        Ok(Some(ledger))
    }

    /// Pending transactions across a family's ledgers, for the parent
    /// review queue.
    pub fn pending_transactions(&self, family_id: &str) -> Result<Vec<(String, Transaction)>> {
        let mut pending = Vec::new();
        for ledger in self.ledger_repository.list_ledgers()? {
            if ledger.family_id != family_id {
                continue;
            }
            for transaction in ledger.transactions {
                if transaction.status == TransactionStatus::Pending {
                    pending.push((ledger.child_id.clone(), transaction));
                }
            }
        }
        Ok(pending)
    }
}
