//! Rotation documents and loading a rotation from them.

use bevy::log::{debug, warn};
use std::path::Path;
use thiserror::Error;

use crate::catalog::{read_xml_file, DataLoadError, LevelCatalog, XmlElement};

use super::game_rules::GameRulesResolver;
use super::rotation::{ExtInfoId, LevelRotation, RandomisationFlags};

/// Root tag every rotation document must carry, unless the caller accepts an alternate.
pub const ROTATION_ROOT_TAG: &str = "levelrotation";

/// Errors raised while loading a rotation.
#[derive(Debug, Error)]
pub enum RotationConfigError {
    #[error("Rotation root tag '{found}' is neither 'levelrotation' nor the accepted alternate")]
    RootTagMismatch { found: String },

    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error("An extended rotation with id {0} already exists")]
    DuplicateExtInfoId(ExtInfoId),
}

/// One `level` element of a rotation document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationLevelDef {
    pub name: String,
    /// `gamerules` attribute. Takes precedence over `game_rules`.
    pub gamerules: Option<String>,
    /// Names of nested `gameRules` elements, used when `gamerules` is absent or empty.
    pub game_rules: Vec<String>,
}

impl RotationLevelDef {
    fn from_element(level: &XmlElement) -> Self {
        Self {
            name: level.attr("name").unwrap_or_default().to_string(),
            gamerules: level.attr("gamerules").map(str::to_string),
            game_rules: level
                .children_tagged("gameRules")
                .filter_map(|rules| rules.attr("name"))
                .map(str::to_string)
                .collect(),
        }
    }

    fn mode_names(&self) -> Vec<&str> {
        match self.gamerules.as_deref() {
            Some(single) if !single.is_empty() => vec![single],
            _ => self
                .game_rules
                .iter()
                .map(String::as_str)
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

/// A rotation document, e.g.
///
/// ```xml
/// <levelrotation randomize="1" maintainPairs="0" includeNonPresentLevels="0">
///   <level name="Arena1" gamerules="TeamDeathmatch"/>
///   <level name="Arena2"><gameRules name="Deathmatch"/></level>
/// </levelrotation>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationDocument {
    /// Root element tag.
    pub tag: String,
    pub randomize: bool,
    pub maintain_pairs: bool,
    /// Keep entries for levels the catalog does not know.
    pub include_non_present_levels: bool,
    pub levels: Vec<RotationLevelDef>,
}

impl RotationDocument {
    pub fn from_file(path: &Path) -> Result<Self, DataLoadError> {
        read_xml_file(path).map(|root| Self::from_element(&root))
    }

    pub fn parse(contents: &str) -> Result<Self, DataLoadError> {
        XmlElement::parse(contents, "<inline>").map(|root| Self::from_element(&root))
    }

    pub fn from_element(root: &XmlElement) -> Self {
        Self {
            tag: root.tag.clone(),
            randomize: root.attr_bool("randomize").unwrap_or(false),
            maintain_pairs: root.attr_bool("maintainPairs").unwrap_or(false),
            include_non_present_levels: root.attr_bool("includeNonPresentLevels").unwrap_or(false),
            levels: root
                .children_tagged("level")
                .map(RotationLevelDef::from_element)
                .collect(),
        }
    }

    fn tag_matches(&self, alt_root_tag: Option<&str>) -> bool {
        self.tag.eq_ignore_ascii_case(ROTATION_ROOT_TAG)
            || alt_root_tag.is_some_and(|alt| self.tag.eq_ignore_ascii_case(alt))
    }
}

impl LevelRotation {
    /// Replace this rotation with the contents of `doc`.
    ///
    /// On a root tag mismatch the rotation is left untouched. A single
    /// surviving entry, or an odd count when pairs are maintained, gets the
    /// last entry duplicated.
    pub fn load_from_config(
        &mut self,
        doc: &RotationDocument,
        alt_root_tag: Option<&str>,
        catalog: &LevelCatalog,
        rules: &dyn GameRulesResolver,
    ) -> Result<(), RotationConfigError> {
        if !doc.tag_matches(alt_root_tag) {
            return Err(RotationConfigError::RootTagMismatch {
                found: doc.tag.clone(),
            });
        }

        self.reset();
        self.set_randomisation_flags(RandomisationFlags {
            shuffle: doc.randomize,
            maintain_pairs: doc.maintain_pairs,
        });

        let mut last_valid = None;
        for def in &doc.levels {
            if def.name.is_empty() {
                continue;
            }
            if !doc.include_non_present_levels && !catalog.contains(&def.name) {
                debug!("Rotation skips '{}': not in the level catalog", def.name);
                continue;
            }

            last_valid = Some(def);
            self.add_level_from_def(def, rules);
        }

        let added = self.len();
        if added == 1 || (doc.maintain_pairs && added % 2 == 1) {
            if let Some(def) = last_valid {
                debug!("Rotation duplicates '{}' to keep an even entry count", def.name);
                self.add_level_from_def(def, rules);
            }
        }

        Ok(())
    }

    /// Load a rotation file. See [`LevelRotation::load_from_config`].
    pub fn load_from_file(
        &mut self,
        path: &Path,
        alt_root_tag: Option<&str>,
        catalog: &LevelCatalog,
        rules: &dyn GameRulesResolver,
    ) -> Result<(), RotationConfigError> {
        let doc = RotationDocument::from_file(path)?;
        self.load_from_config(&doc, alt_root_tag, catalog, rules)
            .inspect_err(|e| warn!("Rotation {:?} rejected: {}", path, e))
    }

    fn add_level_from_def(&mut self, def: &RotationLevelDef, rules: &dyn GameRulesResolver) {
        let index = self.add_level(&def.name);
        for mode in def.mode_names() {
            self.add_game_mode(index, mode, rules);
        }
    }
}
