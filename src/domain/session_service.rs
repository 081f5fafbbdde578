//! Session restoration and the active-family pointer.
//!
//! A session is a pointer on disk, not a token: restoring it re-reads the
//! account and family records, so a member removed or still unapproved is
//! signed out rather than resurrected from stale state.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::models::account::Account;
use crate::domain::models::family::Family;
use crate::storage::files::{
    AccountRepository, FamilyRepository, FileConnection, SessionPointer, SessionRepository,
};
use crate::storage::traits::{AccountStorage, FamilyStorage};
use crate::storage::SessionStorage;

/// Who is signed in right now, if anyone.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub account: Option<Account>,
    pub family: Option<Family>,
}

#[derive(Clone)]
pub struct SessionService {
    session_repository: SessionRepository,
    account_repository: AccountRepository,
    family_repository: FamilyRepository,
}

impl SessionService {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self {
            session_repository: SessionRepository::new(connection.clone()),
            account_repository: AccountRepository::new(connection.clone()),
            family_repository: FamilyRepository::new(connection),
        }
    }

    /// Restore the session from the stored pointer. A dangling pointer
    /// (deleted or unapproved account) is cleared and reads as signed out.
    pub fn current_session(&self) -> Result<CurrentSession> {
        let Some(pointer) = self.session_repository.get_session()? else {
            return Ok(CurrentSession::default());
        };

        let account = match self.account_repository.get_account(&pointer.account_id)? {
            Some(account) if account.approved => account,
            _ => {
                warn!("Stale session pointer for {}; signing out", pointer.account_id);
                self.session_repository.clear_session()?;
                return Ok(CurrentSession::default());
            }
        };

        // Prefer the pointer's active family, but only if the account is
        // still a member of it; otherwise fall back to the first membership.
        let family_id = pointer
            .active_family_id
            .filter(|id| account.belongs_to(id))
            .or_else(|| account.family_ids.first().cloned());
        let family = match family_id {
            Some(id) => self.family_repository.get_family(&id)?,
            None => None,
        };

        Ok(CurrentSession {
            account: Some(account),
            family,
        })
    }

    /// Point the session at another of the account's families. Returns the
    /// new active family, or `None` when signed out, not a member, or the
    /// family record is missing.
    pub fn switch_family(&self, family_id: &str) -> Result<Option<Family>> {
        let Some(pointer) = self.session_repository.get_session()? else {
            warn!("switch_family: no active session");
            return Ok(None);
        };
        let Some(account) = self.account_repository.get_account(&pointer.account_id)? else {
            return Ok(None);
        };
        if !account.belongs_to(family_id) {
            warn!("switch_family: {} is not a member of {}", account.id, family_id);
            return Ok(None);
        }
        let Some(family) = self.family_repository.get_family(family_id)? else {
            return Ok(None);
        };

        self.session_repository.set_session(&SessionPointer {
            account_id: account.id.clone(),
            active_family_id: Some(family.id.clone()),
        })?;

        info!("Switched {} to family {}", account.id, family.id);
        Ok(Some(family))
    }

    /// Establish a session for an account directly, as the login flows do.
    /// Unknown or unapproved accounts are no-ops.
    pub fn sign_in(&self, account_id: &str, family_id: Option<&str>) -> Result<Option<CurrentSession>> {
        let account = match self.account_repository.get_account(account_id)? {
            Some(account) if account.approved => account,
            _ => {
                warn!("sign_in: account {} unknown or not approved", account_id);
                return Ok(None);
            }
        };

        let family_id = family_id
            .map(str::to_string)
            .filter(|id| account.belongs_to(id))
            .or_else(|| account.family_ids.first().cloned());
        let family = match &family_id {
            Some(id) => self.family_repository.get_family(id)?,
            None => None,
        };

        self.session_repository.set_session(&SessionPointer {
            account_id: account.id.clone(),
            active_family_id: family.as_ref().map(|f| f.id.clone()),
        })?;

        info!("Signed in {}", account.id);
        Ok(Some(CurrentSession {
            account: Some(account),
            family,
        }))
    }

    pub fn logout(&self) -> Result<()> {
        self.session_repository.clear_session()?;
        info!("Signed out");
        Ok(())
    }
}
