//! File-backed account repository: one YAML document per account under
//! `accounts/`.

use anyhow::Result;
use log::{debug, info, warn};
use std::fs;
use std::sync::Arc;

use super::connection::FileConnection;
use crate::domain::models::account::Account;
use crate::storage::traits::AccountStorage;

#[derive(Clone)]
pub struct AccountRepository {
    connection: Arc<FileConnection>,
}

impl AccountRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    /// Load every account document by scanning the accounts directory.
    fn discover_accounts(&self) -> Result<Vec<Account>> {
        let directory = self.connection.accounts_directory();
        let mut accounts = Vec::new();

        for path in self.connection.list_yaml_files(&directory)? {
            match self.connection.read_yaml::<Account>(&path)? {
                Some(account) => accounts.push(account),
                None => warn!("Account file vanished while listing: {}", path.display()),
            }
        }

        debug!("Discovered {} accounts", accounts.len());
        Ok(accounts)
    }
}

impl AccountStorage for AccountRepository {
    fn store_account(&self, account: &Account) -> Result<()> {
        let path = self.connection.account_file(&account.id);
        self.connection.write_yaml(&path, account)?;
        info!("Stored account {} ({})", account.id, account.name);
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let path = self.connection.account_file(account_id);
        self.connection.read_yaml(&path)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.discover_accounts()
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        // Same write path as store; documents are whole-file replacements.
        let path = self.connection.account_file(&account.id);
        self.connection.write_yaml(&path, account)?;
        debug!("Updated account {}", account.id);
        Ok(())
    }

    fn delete_account(&self, account_id: &str) -> Result<bool> {
        let path = self.connection.account_file(account_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Deleted account {}", account_id);
        Ok(true)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .discover_accounts()?
            .into_iter()
            .find(|a| a.email.as_deref() == Some(email)))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let wanted = username.to_lowercase();
        Ok(self.discover_accounts()?.into_iter().find(|a| {
            a.username
                .as_deref()
                .map(|u| u.to_lowercase() == wanted)
                .unwrap_or(false)
        }))
    }
}
