//! # Storage Traits
//!
//! Per-aggregate storage abstractions. Each aggregate (account, family,
//! child ledger, message log) gets its own repository interface so the
//! domain layer can work against any backend without modification.
//!
//! All operations are synchronous: there is exactly one writer at a time by
//! design assumption, so no locking discipline is specified here.

use anyhow::Result;

use crate::domain::models::account::Account;
use crate::domain::models::family::Family;
use crate::domain::models::ledger::ChildLedger;
use crate::domain::models::message::ChatMessage;

/// Interface for account storage operations.
pub trait AccountStorage: Send + Sync {
    /// Store a new account.
    fn store_account(&self, account: &Account) -> Result<()>;

    /// Retrieve an account by ID.
    fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// List every known account.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Update an existing account.
    fn update_account(&self, account: &Account) -> Result<()>;

    /// Delete an account by ID.
    /// Returns true if the account was found and deleted.
    fn delete_account(&self, account_id: &str) -> Result<bool>;

    /// Find an account by its parent login email (exact match).
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Find an account by its child login username (case-insensitive).
    fn find_by_username(&self, username: &str) -> Result<Option<Account>>;
}

/// Interface for family storage operations.
pub trait FamilyStorage: Send + Sync {
    /// Store a new family.
    fn store_family(&self, family: &Family) -> Result<()>;

    /// Retrieve a family by ID.
    fn get_family(&self, family_id: &str) -> Result<Option<Family>>;

    /// List every known family.
    fn list_families(&self) -> Result<Vec<Family>>;

    /// Update an existing family.
    fn update_family(&self, family: &Family) -> Result<()>;

    /// Find a family by its 6-digit join code. If codes ever collide the
    /// first match wins; collision is not checked at creation.
    fn find_by_join_code(&self, join_code: &str) -> Result<Option<Family>>;
}

/// Interface for child-ledger storage operations.
///
/// The ledger is read and written as a whole aggregate: every ledger
/// mutation is a complete read-modify-write executed before control
/// returns, so partial writes are never observable.
pub trait LedgerStorage: Send + Sync {
    /// Store (or replace) a child's ledger.
    fn store_ledger(&self, ledger: &ChildLedger) -> Result<()>;

    /// Retrieve a child's ledger by the child's account ID.
    fn get_ledger(&self, child_id: &str) -> Result<Option<ChildLedger>>;

    /// List every known ledger.
    fn list_ledgers(&self) -> Result<Vec<ChildLedger>>;

    /// Delete a child's ledger, history included.
    /// Returns true if the ledger was found and deleted.
    fn delete_ledger(&self, child_id: &str) -> Result<bool>;
}

/// Interface for the append-only chat log.
pub trait MessageStorage: Send + Sync {
    /// Append a message to its family's log.
    fn append_message(&self, message: &ChatMessage) -> Result<()>;

    /// List a family's messages in append order.
    fn list_messages(&self, family_id: &str) -> Result<Vec<ChatMessage>>;
}
