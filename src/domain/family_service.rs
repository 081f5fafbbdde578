//! Family catalog management: presets, the weekly planner, membership
//! queries, and profile edits.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::family::{SavePresetCommand, UpdateProfileCommand, UpdateScheduleCommand};
use crate::domain::models::account::{Account, Role};
use crate::domain::models::family::{Family, Preset};
use crate::domain::models::ledger::ChildLedger;
use crate::storage::files::{AccountRepository, FamilyRepository, FileConnection, LedgerRepository};
use crate::storage::traits::{AccountStorage, FamilyStorage, LedgerStorage};

#[derive(Clone)]
pub struct FamilyService {
    family_repository: FamilyRepository,
    account_repository: AccountRepository,
    ledger_repository: LedgerRepository,
}

impl FamilyService {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self {
            family_repository: FamilyRepository::new(connection.clone()),
            account_repository: AccountRepository::new(connection.clone()),
            ledger_repository: LedgerRepository::new(connection),
        }
    }

    pub fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        self.family_repository.get_family(family_id)
    }

    /// Found an additional family for an existing parent, seeded with the
    /// default preset catalog and a fresh join code. Unknown accounts are
    /// no-ops.
    pub fn create_family(&self, account_id: &str, name: &str) -> Result<Option<Family>> {
        let Some(mut account) = self.account_repository.get_account(account_id)? else {
            warn!("create_family: account {} not found", account_id);
            return Ok(None);
        };

        let family = Family::new(name, account_id);
        account.family_ids.push(family.id.clone());
        account.updated_at = Utc::now();

        self.family_repository.store_family(&family)?;
        self.account_repository.update_account(&account)?;

        info!(
            "Created family {} ({}) for {} (join code {})",
            family.id, family.name, account.id, family.join_code
        );
        Ok(Some(family))
    }

    /// Families the account is a member of, in the order its membership
    /// list records them.
    pub fn list_families(&self, account_id: &str) -> Result<Vec<Family>> {
        let Some(account) = self.account_repository.get_account(account_id)? else {
            return Ok(Vec::new());
        };

        let mut families = Vec::with_capacity(account.family_ids.len());
        for family_id in &account.family_ids {
            if let Some(family) = self.family_repository.get_family(family_id)? {
                families.push(family);
            }
        }
        Ok(families)
    }

    /// A family's preset catalog. Missing family reads as an empty catalog
    /// rather than an error.
    pub fn get_presets(&self, family_id: &str) -> Result<Vec<Preset>> {
        Ok(self
            .family_repository
            .get_family(family_id)?
            .map(|family| family.presets)
            .unwrap_or_default())
    }

    /// Insert or replace a preset, matched by id. Returns the updated
    /// catalog, or `None` when the family does not exist.
    pub fn save_preset(&self, command: SavePresetCommand) -> Result<Option<Vec<Preset>>> {
        let Some(mut family) = self.family_repository.get_family(&command.family_id)? else {
            warn!("save_preset: family {} not found", command.family_id);
            return Ok(None);
        };

        let mut preset = command.preset;
        preset.family_id = family.id.clone();
        match family.presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => family.presets.push(preset),
        }

        self.family_repository.update_family(&family)?;
        Ok(Some(family.presets))
    }

    /// Remove a preset from the catalog. Unknown preset ids leave the
    /// catalog unchanged.
    pub fn delete_preset(&self, family_id: &str, preset_id: &str) -> Result<Option<Vec<Preset>>> {
        let Some(mut family) = self.family_repository.get_family(family_id)? else {
            warn!("delete_preset: family {} not found", family_id);
            return Ok(None);
        };

        family.presets.retain(|p| p.id != preset_id);
        self.family_repository.update_family(&family)?;
        Ok(Some(family.presets))
    }

    /// Replace the family's schedule and reminder lists wholesale. The
    /// planner always submits the full lists, so no merging is needed.
    pub fn update_schedule(&self, command: UpdateScheduleCommand) -> Result<Option<Family>> {
        let Some(mut family) = self.family_repository.get_family(&command.family_id)? else {
            warn!("update_schedule: family {} not found", command.family_id);
            return Ok(None);
        };

        family.schedules = command.schedules;
        family.reminders = command.reminders;
        self.family_repository.update_family(&family)?;

        info!(
            "Updated planner for family {}: {} schedules, {} reminders",
            family.id,
            family.schedules.len(),
            family.reminders.len()
        );
        Ok(Some(family))
    }

    /// Approved children of a family, each paired with their ledger.
    /// Unapproved accounts stay invisible here.
    pub fn family_children(&self, family_id: &str) -> Result<Vec<(Account, ChildLedger)>> {
        let mut children = Vec::new();
        for account in self.account_repository.list_accounts()? {
            if account.role != Role::Child || !account.approved || !account.belongs_to(family_id) {
                continue;
            }
            let Some(ledger) = self.ledger_repository.get_ledger(&account.id)? else {
                warn!("family_children: child {} has no ledger", account.id);
                continue;
            };
            children.push((account, ledger));
        }
        Ok(children)
    }

    /// Apply profile edits; `None` fields are left as they are.
    pub fn update_profile(&self, command: UpdateProfileCommand) -> Result<Option<Account>> {
        let Some(mut account) = self.account_repository.get_account(&command.account_id)? else {
            warn!("update_profile: account {} not found", command.account_id);
            return Ok(None);
        };

        if let Some(name) = command.name {
            account.name = name;
        }
        if let Some(password) = command.password {
            account.password = Some(password);
        }
        if let Some(pin) = command.pin {
            account.pin = Some(pin);
        }
        account.updated_at = Utc::now();

        self.account_repository.update_account(&account)?;
        info!("Updated profile for {}", account.id);
        Ok(Some(account))
    }
}
