//! The session rotation plus auxiliary rotations addressed by id.

use bevy::prelude::*;

use crate::catalog::LevelCatalog;

use super::config::{RotationConfigError, RotationDocument};
use super::game_rules::GameRulesResolver;
use super::rotation::{ExtInfoId, LevelRotation};

/// Resource owning every rotation of the session.
#[derive(Resource, Debug, Default)]
pub struct RotationRegistry {
    /// The session rotation driven by `changelevel`.
    pub main: LevelRotation,
    extended: Vec<LevelRotation>,
}

impl RotationRegistry {
    /// Load an auxiliary rotation under `id`. Fails if `id` is taken or the
    /// document is rejected; nothing is added in either case.
    pub fn add_extended_from_config(
        &mut self,
        doc: &RotationDocument,
        alt_root_tag: Option<&str>,
        id: ExtInfoId,
        catalog: &LevelCatalog,
        rules: &dyn GameRulesResolver,
    ) -> Result<&mut LevelRotation, RotationConfigError> {
        if self.find(id).is_some() {
            warn!("Couldn't add extended level rotation with id '{}': id in use", id);
            return Err(RotationConfigError::DuplicateExtInfoId(id));
        }

        let mut rotation = LevelRotation::new();
        rotation
            .load_from_config(doc, alt_root_tag, catalog, rules)
            .inspect_err(|e| warn!("Couldn't add extended level rotation with id '{}': {}", id, e))?;
        rotation.set_ext_info_id(id);

        self.extended.push(rotation);
        let last = self.extended.len() - 1;
        Ok(&mut self.extended[last])
    }

    pub fn find(&self, id: ExtInfoId) -> Option<&LevelRotation> {
        self.extended.iter().find(|rotation| rotation.ext_info_id() == id)
    }

    pub fn find_mut(&mut self, id: ExtInfoId) -> Option<&mut LevelRotation> {
        self.extended
            .iter_mut()
            .find(|rotation| rotation.ext_info_id() == id)
    }

    /// Get an empty rotation for `id`, resetting the existing one if present.
    pub fn create_new(&mut self, id: ExtInfoId) -> &mut LevelRotation {
        let index = match self
            .extended
            .iter()
            .position(|rotation| rotation.ext_info_id() == id)
        {
            Some(index) => {
                self.extended[index].reset();
                index
            }
            None => {
                self.extended.push(LevelRotation::new());
                self.extended.len() - 1
            }
        };

        let rotation = &mut self.extended[index];
        rotation.set_ext_info_id(id);
        rotation
    }

    pub fn clear_extended(&mut self) {
        self.extended.clear();
    }

    pub fn extended_count(&self) -> usize {
        self.extended.len()
    }
}
