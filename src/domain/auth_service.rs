//! Registration, login, and the admission gate.
//!
//! Every account that joins an existing family — parent or child — starts
//! unapproved: invisible to family-scoped queries and unable to establish a
//! session until an administrator approves it. Only a family-creating
//! parent is trusted by construction.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::commands::auth::{
    LoginResult, ParentRegistration, RegisterChildCommand, RegisterChildResult,
    RegisterParentCommand, RegistrationMode,
};
use crate::domain::models::account::{Account, Role};
use crate::domain::models::family::Family;
use crate::domain::models::ledger::ChildLedger;
use crate::storage::files::{
    AccountRepository, FamilyRepository, FileConnection, LedgerRepository, SessionPointer,
    SessionRepository,
};
use crate::storage::traits::{AccountStorage, FamilyStorage, LedgerStorage};
use crate::storage::SessionStorage;

/// Validation failures at the admission boundary. The messages are
/// user-facing; the presentation layer displays them as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("This email is already registered.")]
    EmailTaken,
    #[error("This username is already taken.")]
    UsernameTaken,
    #[error("Invalid family code.")]
    InvalidJoinCode,
    #[error("PIN must be exactly 4 digits.")]
    InvalidPin,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("User not found.")]
    UnknownUsername,
    #[error("Incorrect PIN.")]
    WrongPin,
    #[error("Your account is awaiting approval by the family administrator.")]
    PendingApproval,
    #[error("No family linked to this account.")]
    NoFamily,
    #[error("Family data could not be loaded.")]
    FamilyNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthService {
    account_repository: AccountRepository,
    family_repository: FamilyRepository,
    ledger_repository: LedgerRepository,
    session_repository: SessionRepository,
}

impl AuthService {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self {
            account_repository: AccountRepository::new(connection.clone()),
            family_repository: FamilyRepository::new(connection.clone()),
            ledger_repository: LedgerRepository::new(connection.clone()),
            session_repository: SessionRepository::new(connection),
        }
    }

    /// Is a child username free? Comparison is case-insensitive. This is a
    /// precondition check, not a transactional guarantee; there is a single
    /// writer by construction.
    pub fn check_username_available(&self, username: &str) -> Result<bool> {
        Ok(self.account_repository.find_by_username(username)?.is_none())
    }

    /// Register a parent, either founding a new family (approved and signed
    /// in immediately) or joining an existing one by code (gated until
    /// approved).
    pub fn register_parent(
        &self,
        command: RegisterParentCommand,
    ) -> Result<ParentRegistration, AuthError> {
        if self.account_repository.find_by_email(&command.email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let account_id = Account::generate_id();
        let now = Utc::now();

        match command.mode {
            RegistrationMode::CreateFamily { family_name } => {
                let family = Family::new(family_name, &account_id);
                let account = Account {
                    id: account_id,
                    name: command.name,
                    role: Role::Parent,
                    email: Some(command.email),
                    password: Some(command.password),
                    username: None,
                    pin: None,
                    family_ids: vec![family.id.clone()],
                    approved: true,
                    created_at: now,
                    updated_at: now,
                };

                self.family_repository.store_family(&family)?;
                self.account_repository.store_account(&account)?;
                self.session_repository.set_session(&SessionPointer {
                    account_id: account.id.clone(),
                    active_family_id: Some(family.id.clone()),
                })?;

                info!(
                    "Registered parent {} as creator of family {} (join code {})",
                    account.id, family.id, family.join_code
                );
                Ok(ParentRegistration::SignedIn { account, family })
            }
            RegistrationMode::JoinFamily { join_code } => {
                let mut family = self
                    .family_repository
                    .find_by_join_code(&join_code)?
                    .ok_or(AuthError::InvalidJoinCode)?;

                let account = Account {
                    id: account_id,
                    name: command.name,
                    role: Role::Parent,
                    email: Some(command.email),
                    password: Some(command.password),
                    username: None,
                    pin: None,
                    family_ids: vec![family.id.clone()],
                    approved: false,
                    created_at: now,
                    updated_at: now,
                };

                if !family.parent_ids.contains(&account.id) {
                    family.parent_ids.push(account.id.clone());
                }
                self.family_repository.update_family(&family)?;
                self.account_repository.store_account(&account)?;

                info!(
                    "Registered parent {} as pending joiner of family {}",
                    account.id, family.id
                );
                Ok(ParentRegistration::PendingApproval {
                    message: "Registration received! Wait for the family administrator to approve your account.".to_string(),
                })
            }
        }
    }

    /// Register a child by family join code. The account starts unapproved,
    /// alongside an empty ledger.
    pub fn register_child(
        &self,
        command: RegisterChildCommand,
    ) -> Result<RegisterChildResult, AuthError> {
        let family = self
            .family_repository
            .find_by_join_code(&command.join_code)?
            .ok_or(AuthError::InvalidJoinCode)?;

        if !self.check_username_available(&command.username)? {
            return Err(AuthError::UsernameTaken);
        }
        if command.pin.len() != 4 || !command.pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidPin);
        }

        let now = Utc::now();
        let account = Account {
            id: Account::generate_id(),
            name: command.name,
            role: Role::Child,
            email: None,
            password: None,
            username: Some(command.username),
            pin: Some(command.pin),
            family_ids: vec![family.id.clone()],
            approved: false,
            created_at: now,
            updated_at: now,
        };

        self.account_repository.store_account(&account)?;
        self.ledger_repository
            .store_ledger(&ChildLedger::new(account.id.clone(), family.id.clone()))?;

        info!("Registered child {} (pending) for family {}", account.id, family.id);
        Ok(RegisterChildResult { account })
    }

    /// Parent login by email and password. Correct credentials on an
    /// unapproved account still fail, with the approval-pending error.
    pub fn login_parent(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let account = self
            .account_repository
            .find_by_email(email)?
            .filter(|a| a.role == Role::Parent && a.password.as_deref() == Some(password))
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.approved {
            return Err(AuthError::PendingApproval);
        }

        let family = match account.family_ids.first() {
            Some(family_id) => Some(
                self.family_repository
                    .get_family(family_id)?
                    .ok_or(AuthError::FamilyNotFound)?,
            ),
            None => None,
        };

        self.session_repository.set_session(&SessionPointer {
            account_id: account.id.clone(),
            active_family_id: family.as_ref().map(|f| f.id.clone()),
        })?;

        info!("Parent {} signed in", account.id);
        Ok(LoginResult { account, family })
    }

    /// Child login by username and PIN.
    pub fn login_child(&self, username: &str, pin: &str) -> Result<LoginResult, AuthError> {
        let account = self
            .account_repository
            .find_by_username(username)?
            .filter(|a| a.role == Role::Child)
            .ok_or(AuthError::UnknownUsername)?;

        if account.pin.as_deref() != Some(pin) {
            return Err(AuthError::WrongPin);
        }
        if !account.approved {
            return Err(AuthError::PendingApproval);
        }

        let family_id = account.family_ids.first().ok_or(AuthError::NoFamily)?;
        let family = self
            .family_repository
            .get_family(family_id)?
            .ok_or(AuthError::FamilyNotFound)?;

        self.session_repository.set_session(&SessionPointer {
            account_id: account.id.clone(),
            active_family_id: Some(family.id.clone()),
        })?;

        info!("Child {} signed in", account.id);
        Ok(LoginResult {
            account,
            family: Some(family),
        })
    }

    /// Accounts waiting on the admission gate for a family. This is the
    /// only query that surfaces unapproved accounts.
    pub fn pending_members(&self, family_id: &str) -> Result<Vec<Account>> {
        Ok(self
            .account_repository
            .list_accounts()?
            .into_iter()
            .filter(|a| a.belongs_to(family_id) && !a.approved)
            .collect())
    }

    /// Approve a pending member: flips the gate, nothing else. Unknown
    /// account ids are no-ops.
    pub fn approve_member(&self, account_id: &str) -> Result<Option<Account>> {
        let Some(mut account) = self.account_repository.get_account(account_id)? else {
            warn!("approve_member: account {} not found", account_id);
            return Ok(None);
        };

        account.approved = true;
        account.updated_at = Utc::now();
        self.account_repository.update_account(&account)?;

        info!("Approved member {} ({})", account.id, account.name);
        Ok(Some(account))
    }

    /// Reject a pending member: removes the account, its entry in every
    /// family's parent list, and — for a child — its ledger. Destructive
    /// and non-reversible; applied as a unit from the caller's perspective.
    pub fn reject_member(&self, account_id: &str) -> Result<bool> {
        let Some(account) = self.account_repository.get_account(account_id)? else {
            warn!("reject_member: account {} not found", account_id);
            return Ok(false);
        };

        for family_id in &account.family_ids {
            if let Some(mut family) = self.family_repository.get_family(family_id)? {
                family.parent_ids.retain(|id| id != account_id);
                self.family_repository.update_family(&family)?;
            }
        }

        if account.role == Role::Child {
            self.ledger_repository.delete_ledger(account_id)?;
        }

        self.account_repository.delete_account(account_id)?;
        info!("Rejected and removed member {} ({})", account.id, account.name);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::files::test_utils::TestEnvironment;

    fn setup() -> Result<(AuthService, TestEnvironment)> {
        let env = TestEnvironment::new()?;
        let service = AuthService::new(env.connection.clone());
        Ok((service, env))
    }

    fn create_family(service: &AuthService, email: &str) -> Result<(Account, Family)> {
        let registration = service
            .register_parent(RegisterParentCommand {
                name: "Alex".to_string(),
                email: email.to_string(),
                password: "secret".to_string(),
                mode: RegistrationMode::CreateFamily {
                    family_name: "Smith".to_string(),
                },
            })
            .expect("creation should succeed");
        match registration {
            ParentRegistration::SignedIn { account, family } => Ok((account, family)),
            ParentRegistration::PendingApproval { .. } => panic!("creator must be signed in"),
        }
    }

    #[test]
    fn test_family_creator_is_approved_and_signed_in() -> Result<()> {
        let (service, env) = setup()?;
        let (account, family) = create_family(&service, "alex@example.com")?;

        assert!(account.approved);
        assert_eq!(family.parent_ids, vec![account.id.clone()]);
        assert_eq!(family.join_code.len(), 6);

        let sessions = SessionRepository::new(env.connection.clone());
        let pointer = sessions.get_session()?.expect("session should be set");
        assert_eq!(pointer.account_id, account.id);
        assert_eq!(pointer.active_family_id, Some(family.id));
        Ok(())
    }

    #[test]
    fn test_duplicate_email_is_rejected() -> Result<()> {
        let (service, _env) = setup()?;
        create_family(&service, "alex@example.com")?;

        let result = service.register_parent(RegisterParentCommand {
            name: "Other".to_string(),
            email: "alex@example.com".to_string(),
            password: "pw".to_string(),
            mode: RegistrationMode::CreateFamily {
                family_name: "Other".to_string(),
            },
        });
        assert!(matches!(result, Err(AuthError::EmailTaken)));
        Ok(())
    }

    #[test]
    fn test_joining_parent_is_gated() -> Result<()> {
        let (service, _env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        let registration = service.register_parent(RegisterParentCommand {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password: "pw".to_string(),
            mode: RegistrationMode::JoinFamily {
                join_code: family.join_code.clone(),
            },
        })?;
        assert!(matches!(registration, ParentRegistration::PendingApproval { .. }));

        // Correct credentials, but the gate holds.
        let login = service.login_parent("sam@example.com", "pw");
        assert!(matches!(login, Err(AuthError::PendingApproval)));

        let pending = service.pending_members(&family.id)?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].email.as_deref(), Some("sam@example.com"));
        Ok(())
    }

    #[test]
    fn test_invalid_join_code() -> Result<()> {
        let (service, _env) = setup()?;
        create_family(&service, "alex@example.com")?;

        let result = service.register_child(RegisterChildCommand {
            join_code: "000000".to_string(),
            name: "Sofia".to_string(),
            username: "sofia".to_string(),
            pin: "1234".to_string(),
        });
        assert!(matches!(result, Err(AuthError::InvalidJoinCode)));
        Ok(())
    }

    #[test]
    fn test_child_registration_creates_gated_account_and_ledger() -> Result<()> {
        let (service, env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        let result = service.register_child(RegisterChildCommand {
            join_code: family.join_code.clone(),
            name: "Sofia".to_string(),
            username: "sofia".to_string(),
            pin: "1234".to_string(),
        })?;
        assert!(!result.account.approved);

        let ledgers = LedgerRepository::new(env.connection.clone());
        let ledger = ledgers.get_ledger(&result.account.id)?.expect("ledger created");
        assert_eq!(ledger.balance, 0);
        assert_eq!(ledger.family_id, family.id);

        // Gated at login despite correct credentials.
        let login = service.login_child("sofia", "1234");
        assert!(matches!(login, Err(AuthError::PendingApproval)));
        Ok(())
    }

    #[test]
    fn test_username_uniqueness_is_case_insensitive() -> Result<()> {
        let (service, _env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        service.register_child(RegisterChildCommand {
            join_code: family.join_code.clone(),
            name: "Sofia".to_string(),
            username: "Sofia".to_string(),
            pin: "1234".to_string(),
        })?;

        assert!(!service.check_username_available("SOFIA")?);
        let result = service.register_child(RegisterChildCommand {
            join_code: family.join_code.clone(),
            name: "Other Sofia".to_string(),
            username: "sofia".to_string(),
            pin: "9999".to_string(),
        });
        assert!(matches!(result, Err(AuthError::UsernameTaken)));
        Ok(())
    }

    #[test]
    fn test_malformed_pin_is_rejected() -> Result<()> {
        let (service, _env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        for pin in ["123", "12345", "12a4", ""] {
            let result = service.register_child(RegisterChildCommand {
                join_code: family.join_code.clone(),
                name: "Sofia".to_string(),
                username: format!("sofia-{}", pin.len()),
                pin: pin.to_string(),
            });
            assert!(matches!(result, Err(AuthError::InvalidPin)), "pin {:?}", pin);
        }
        Ok(())
    }

    #[test]
    fn test_approval_flips_gate_only() -> Result<()> {
        let (service, _env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        let result = service.register_child(RegisterChildCommand {
            join_code: family.join_code.clone(),
            name: "Sofia".to_string(),
            username: "sofia".to_string(),
            pin: "1234".to_string(),
        })?;

        let approved = service.approve_member(&result.account.id)?.expect("account exists");
        assert!(approved.approved);
        assert_eq!(approved.username, result.account.username);

        let login = service.login_child("sofia", "1234")?;
        assert_eq!(login.account.id, result.account.id);
        assert_eq!(login.family.map(|f| f.id), Some(family.id.clone()));
        assert!(service.pending_members(&family.id)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejection_removes_account_ledger_and_membership() -> Result<()> {
        let (service, env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;

        let joiner = match service.register_parent(RegisterParentCommand {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password: "pw".to_string(),
            mode: RegistrationMode::JoinFamily {
                join_code: family.join_code.clone(),
            },
        })? {
            ParentRegistration::PendingApproval { .. } => {
                service.pending_members(&family.id)?.remove(0)
            }
            ParentRegistration::SignedIn { .. } => panic!("joiner must be pending"),
        };
        let child = service
            .register_child(RegisterChildCommand {
                join_code: family.join_code.clone(),
                name: "Sofia".to_string(),
                username: "sofia".to_string(),
                pin: "1234".to_string(),
            })?
            .account;

        assert!(service.reject_member(&joiner.id)?);
        assert!(service.reject_member(&child.id)?);

        let accounts = AccountRepository::new(env.connection.clone());
        assert!(accounts.get_account(&joiner.id)?.is_none());
        assert!(accounts.get_account(&child.id)?.is_none());

        let ledgers = LedgerRepository::new(env.connection.clone());
        assert!(ledgers.get_ledger(&child.id)?.is_none());

        let families = FamilyRepository::new(env.connection.clone());
        let family = families.get_family(&family.id)?.unwrap();
        assert!(!family.parent_ids.contains(&joiner.id));
        assert!(service.pending_members(&family.id)?.is_empty());

        // A second rejection finds nothing.
        assert!(!service.reject_member(&child.id)?);
        Ok(())
    }

    #[test]
    fn test_wrong_credentials() -> Result<()> {
        let (service, _env) = setup()?;
        let (_, family) = create_family(&service, "alex@example.com")?;
        let child = service
            .register_child(RegisterChildCommand {
                join_code: family.join_code,
                name: "Sofia".to_string(),
                username: "sofia".to_string(),
                pin: "1234".to_string(),
            })?
            .account;
        service.approve_member(&child.id)?;

        assert!(matches!(
            service.login_parent("alex@example.com", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login_child("nobody", "1234"),
            Err(AuthError::UnknownUsername)
        ));
        assert!(matches!(
            service.login_child("sofia", "0000"),
            Err(AuthError::WrongPin)
        ));
        Ok(())
    }
}
