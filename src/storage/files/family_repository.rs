//! File-backed family repository: one YAML document per family under
//! `families/`, with presets, schedules and reminders embedded.

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;

use super::connection::FileConnection;
use crate::domain::models::family::Family;
use crate::storage::traits::FamilyStorage;

#[derive(Clone)]
pub struct FamilyRepository {
    connection: Arc<FileConnection>,
}

impl FamilyRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    fn discover_families(&self) -> Result<Vec<Family>> {
        let directory = self.connection.families_directory();
        let mut families = Vec::new();

        for path in self.connection.list_yaml_files(&directory)? {
            match self.connection.read_yaml::<Family>(&path)? {
                Some(family) => families.push(family),
                None => warn!("Family file vanished while listing: {}", path.display()),
            }
        }

        debug!("Discovered {} families", families.len());
        Ok(families)
    }
}

impl FamilyStorage for FamilyRepository {
    fn store_family(&self, family: &Family) -> Result<()> {
        let path = self.connection.family_file(&family.id);
        self.connection.write_yaml(&path, family)?;
        info!("Stored family {} ({})", family.id, family.name);
        Ok(())
    }

    fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        let path = self.connection.family_file(family_id);
        self.connection.read_yaml(&path)
    }

    fn list_families(&self) -> Result<Vec<Family>> {
        self.discover_families()
    }

    fn update_family(&self, family: &Family) -> Result<()> {
        let path = self.connection.family_file(&family.id);
        self.connection.write_yaml(&path, family)?;
        debug!("Updated family {}", family.id);
        Ok(())
    }

    fn find_by_join_code(&self, join_code: &str) -> Result<Option<Family>> {
        Ok(self
            .discover_families()?
            .into_iter()
            .find(|f| f.join_code == join_code))
    }
}
