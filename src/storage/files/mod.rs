//! # File-backed storage
//!
//! Per-aggregate storage on the local filesystem: YAML documents for the
//! record-shaped aggregates (accounts, families, ledger headers, session
//! pointer) and CSV files for the tabular, append-heavy ones (transactions,
//! chat messages).
//!
//! ## Layout
//!
//! ```text
//! <data dir>/
//! ├── session.yaml
//! ├── accounts/<account_id>.yaml
//! ├── families/<family_id>.yaml
//! ├── ledgers/<child_id>/
//! │   ├── ledger.yaml
//! │   └── transactions.csv
//! └── messages/<family_id>.csv
//! ```
//!
//! YAML writes are atomic (temp file + rename). There is a single writer by
//! design assumption, so no cross-process locking is attempted.

pub mod account_repository;
pub mod connection;
pub mod family_repository;
pub mod ledger_repository;
pub mod message_repository;
pub mod session_repository;

#[cfg(test)]
pub mod test_utils;

pub use account_repository::AccountRepository;
pub use connection::FileConnection;
pub use family_repository::FamilyRepository;
pub use ledger_repository::LedgerRepository;
pub use message_repository::MessageRepository;
pub use session_repository::{SessionPointer, SessionRepository, SessionStorage};
