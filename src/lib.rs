//! # Family Bank Backend
//!
//! A synchronous, file-backed backend for a family points economy: parents
//! define tasks, rewards, and penalties; children earn and spend points on
//! per-child ledgers; pending requests wait in a parental approval queue.
//!
//! This crate is the domain and storage core only. A presentation layer
//! (desktop or otherwise) drives it through [`Backend`] and the command
//! types in [`domain::commands`]:
//! - Synchronous operations (no async/await)
//! - Direct access to domain services
//! - All state under a single data directory

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::files::FileConnection;

use domain::{
    AdviceProvider, AdviceService, AuthService, FamilyService, LedgerService, MessagingService,
    SessionService,
};

/// Main backend struct that orchestrates all services.
pub struct Backend {
    pub auth_service: AuthService,
    pub session_service: SessionService,
    pub family_service: FamilyService,
    pub ledger_service: LedgerService,
    pub messaging_service: MessagingService,
    pub advice_service: AdviceService,
}

impl Backend {
    /// Create a backend rooted at the given data directory, with advice
    /// disabled (the fallback text is served).
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        Self::with_advice_provider(data_directory, None)
    }

    /// Create a backend with an optional advice provider.
    pub fn with_advice_provider<P: AsRef<Path>>(
        data_directory: P,
        advice_provider: Option<Box<dyn AdviceProvider>>,
    ) -> Result<Self> {
        let connection = Arc::new(FileConnection::new(data_directory)?);

        Ok(Backend {
            auth_service: AuthService::new(connection.clone()),
            session_service: SessionService::new(connection.clone()),
            family_service: FamilyService::new(connection.clone()),
            ledger_service: LedgerService::new(connection.clone()),
            messaging_service: MessagingService::new(connection),
            advice_service: AdviceService::new(advice_provider),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::auth::{RegisterChildCommand, RegisterParentCommand, RegistrationMode};
    use crate::domain::commands::ledger::{
        CreateTransactionCommand, InitialStatus, UpdateTransactionStatusCommand,
    };
    use crate::domain::commands::auth::ParentRegistration;
    use crate::domain::models::ledger::{TransactionCategory, TransactionStatus};
    use tempfile::TempDir;

    // End-to-end flow across services: found a family, admit a child,
    // run a request through the approval queue, and restore the session.
    #[test]
    fn test_full_family_lifecycle() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let backend = Backend::new(temp_dir.path())?;

        let (parent, family) = match backend.auth_service.register_parent(RegisterParentCommand {
            name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
            password: "secret".to_string(),
            mode: RegistrationMode::CreateFamily {
                family_name: "Smith".to_string(),
            },
        })? {
            ParentRegistration::SignedIn { account, family } => (account, family),
            ParentRegistration::PendingApproval { .. } => panic!("creator must be signed in"),
        };

        let child = backend
            .auth_service
            .register_child(RegisterChildCommand {
                join_code: family.join_code.clone(),
                name: "Sofia".to_string(),
                username: "sofia".to_string(),
                pin: "1234".to_string(),
            })?
            .account;
        backend.auth_service.approve_member(&child.id)?;

        // Child requests a reward; parent approves it.
        let ledger = backend
            .ledger_service
            .create_transaction(CreateTransactionCommand {
                child_id: child.id.clone(),
                amount: 60,
                description: "1 hour of screen time".to_string(),
                category: TransactionCategory::Spend,
                status: InitialStatus::Pending,
            })?
            .expect("ledger exists");
        assert_eq!(ledger.balance, 0);

        let pending = backend.ledger_service.pending_transactions(&family.id)?;
        assert_eq!(pending.len(), 1);
        let (pending_child_id, request) = pending.into_iter().next().expect("one pending request");
        assert_eq!(pending_child_id, child.id);

        let ledger = backend
            .ledger_service
            .update_transaction_status(UpdateTransactionStatusCommand {
                child_id: child.id.clone(),
                transaction_id: request.id,
                status: TransactionStatus::Completed,
            })?
            .expect("ledger exists");
        assert_eq!(ledger.balance, -60);

        // The creator's session survives a fresh backend over the same data.
        let reopened = Backend::new(temp_dir.path())?;
        let session = reopened.session_service.current_session()?;
        assert_eq!(session.account.map(|a| a.id), Some(parent.id));
        assert_eq!(session.family.map(|f| f.id), Some(family.id));

        assert_eq!(
            reopened.advice_service.parental_advice("pocket money"),
            domain::FALLBACK_ADVICE
        );
        Ok(())
    }
}
