//! Level catalog - discovers level folders and resolves level names.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::data::read_xml_file;
use super::info::{basename, canonicalize_name, LevelInfo, LevelTag};

/// Package file whose presence marks a folder as a level.
pub const LEVEL_PACKAGE_FILE: &str = "level.pak";

/// Resource holding every level discovered so far.
///
/// Rescans only add new levels or refresh the scan tag of known ones.
/// Levels whose folders disappeared stay registered until the catalog is
/// replaced.
#[derive(Resource, Default, Debug)]
pub struct LevelCatalog {
    levels: Vec<LevelInfo>,
    levels_folder: PathBuf,
    level_names: Vec<String>,
    level_types: Vec<String>,
}

impl LevelCatalog {
    pub fn new(levels_folder: impl Into<PathBuf>) -> Self {
        Self {
            levels_folder: levels_folder.into(),
            ..default()
        }
    }

    pub fn levels_folder(&self) -> &Path {
        &self.levels_folder
    }

    /// Scan `levels_folder` (or the last scanned folder when `None`).
    pub fn rescan(&mut self, levels_folder: Option<&Path>, tag: LevelTag) {
        if let Some(folder) = levels_folder {
            self.levels_folder = folder.to_path_buf();
        }

        let root = self.levels_folder.clone();
        self.scan_root(&root, false, tag);
        self.rebuild_level_names();
    }

    /// Scan a mod's level folder first, then the main levels folder.
    pub fn rescan_with_mod(&mut self, mod_levels_folder: &Path, levels_folder: &Path, tag: LevelTag) {
        if mod_levels_folder.is_dir() {
            self.scan_root(mod_levels_folder, true, tag);
        } else {
            warn!("Mod levels folder not found: {:?}", mod_levels_folder);
        }
        self.rescan(Some(levels_folder), tag);
    }

    fn scan_root(&mut self, root: &Path, mod_folder: bool, tag: LevelTag) {
        if !root.exists() {
            warn!("Levels directory not found: {:?}", root);
            return;
        }

        let before = self.levels.len();
        self.scan_folder(root, "", mod_folder, tag);
        info!(
            "Scanned {:?}: {} new level(s), {} total",
            root,
            self.levels.len() - before,
            self.levels.len()
        );
    }

    fn scan_folder(&mut self, root: &Path, subfolder: &str, mod_folder: bool, tag: LevelTag) {
        let search = if subfolder.is_empty() {
            root.to_path_buf()
        } else {
            root.join(subfolder)
        };

        let Ok(entries) = fs::read_dir(&search) else {
            warn!("Failed to read levels directory {:?}", search);
            return;
        };

        let mut folders: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
            .collect();
        folders.sort();

        for (folder_name, level_path) in folders {
            let level_folder = if subfolder.is_empty() {
                folder_name.clone()
            } else {
                format!("{}/{}", subfolder, folder_name)
            };

            let has_package = level_path.join(LEVEL_PACKAGE_FILE).is_file();
            let has_sidecar = level_path.join(format!("{}.xml", folder_name)).is_file();
            if !has_package && !has_sidecar {
                self.scan_folder(root, &level_folder, mod_folder, tag);
                continue;
            }

            let name = canonicalize_name(&level_folder);
            if let Some(existing) = self.find_exact_mut(&name) {
                if !existing.metadata_loaded {
                    if let Err(e) = existing.read_metadata() {
                        warn!("Level '{}' metadata still unreadable: {}", name, e);
                    }
                }
                existing.scan_tag = tag;
                continue;
            }

            let mut level = LevelInfo::new(&name, level_path, tag);
            level.is_mod_level = mod_folder;
            if let Err(e) = level.read_metadata() {
                warn!("Level '{}' registered without metadata: {}", name, e);
            }
            debug!("Registered level '{}'", name);
            self.levels.push(level);
        }
    }

    fn find_exact_mut(&mut self, canonical: &str) -> Option<&mut LevelInfo> {
        self.levels
            .iter_mut()
            .find(|level| level.name.eq_ignore_ascii_case(canonical))
    }

    fn rebuild_level_names(&mut self) {
        self.level_names = self
            .levels
            .iter()
            .map(|level| level.basename().to_string())
            .collect();
    }

    /// Insert a record directly, replacing one with the same canonical name.
    pub fn insert(&mut self, level: LevelInfo) {
        if let Some(existing) = self.find_exact_mut(&level.name) {
            *existing = level;
        } else {
            self.levels.push(level);
        }
        self.rebuild_level_names();
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Bounds-checked positional access.
    pub fn get(&self, index: usize) -> Option<&LevelInfo> {
        self.levels.get(index)
    }

    /// Resolve a level by name.
    ///
    /// Tries the full canonical name, then the basename of every level, then
    /// retries once with the input stripped to its own basename.
    pub fn lookup(&self, name: &str) -> Option<&LevelInfo> {
        self.lookup_index(name).map(|index| &self.levels[index])
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut LevelInfo> {
        self.lookup_index(name).map(move |index| &mut self.levels[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup_index(name).is_some()
    }

    fn lookup_index(&self, name: &str) -> Option<usize> {
        if let Some(index) = self
            .levels
            .iter()
            .position(|level| level.name.eq_ignore_ascii_case(name))
        {
            return Some(index);
        }

        if let Some(index) = self
            .levels
            .iter()
            .position(|level| level.basename().eq_ignore_ascii_case(name))
        {
            return Some(index);
        }

        let stripped = basename(name);
        if stripped.len() != name.len() {
            return self.lookup_index(stripped);
        }

        None
    }

    /// Level basenames for console auto-completion.
    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    /// Auto-completion candidates starting with `prefix` (case-insensitive).
    pub fn complete(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_ascii_lowercase();
        self.level_names
            .iter()
            .filter(|name| name.to_ascii_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    /// User defined level types, loaded once at startup.
    pub fn level_types(&self) -> &[String] {
        &self.level_types
    }

    /// Read `value` attributes of the children of a level types document.
    pub fn load_level_types(&mut self, path: &Path) {
        match read_xml_file(path) {
            Ok(root) => {
                let types: Vec<String> = root
                    .children
                    .iter()
                    .filter_map(|child| child.attr("value"))
                    .map(str::to_string)
                    .collect();
                info!("Loaded {} level type(s) from {:?}", types.len(), path);
                self.level_types = types;
            }
            Err(e) => {
                warn!("Could not load level types: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_level(root: &Path, rel: &str, with_package: bool, sidecar: Option<&str>) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        if with_package {
            fs::write(dir.join(LEVEL_PACKAGE_FILE), b"pak").unwrap();
        }
        if let Some(contents) = sidecar {
            fs::write(dir.join(format!("{}.xml", basename(rel))), contents).unwrap();
        }
    }

    #[test]
    fn test_rescan_discovers_nested_levels() {
        let dir = tempfile::tempdir().unwrap();
        make_level(dir.path(), "arena", true, None);
        make_level(
            dir.path(),
            "mp/harbor",
            false,
            Some(r#"<MetaData><Display Name="Harbor"/></MetaData>"#),
        );
        fs::create_dir_all(dir.path().join("mp/empty")).unwrap();

        let mut catalog = LevelCatalog::new(dir.path());
        catalog.rescan(None, LevelTag::MAIN);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("arena"));
        let harbor = catalog.lookup("mp/harbor").unwrap();
        assert_eq!(harbor.display_name, "Harbor");
        assert!(harbor.metadata_loaded);
        assert!(catalog.lookup("mp/empty").is_none());
        assert!(catalog.level_names().contains(&"harbor".to_string()));
    }

    #[test]
    fn test_malformed_sidecar_does_not_block_scan() {
        let dir = tempfile::tempdir().unwrap();
        make_level(dir.path(), "broken", false, Some("<MetaData><Display "));
        make_level(dir.path(), "good", false, Some("<MetaData/>"));

        let mut catalog = LevelCatalog::new(dir.path());
        catalog.rescan(None, LevelTag::MAIN);

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.lookup("broken").unwrap().metadata_loaded);
        assert!(catalog.lookup("good").unwrap().metadata_loaded);
    }

    #[test]
    fn test_rescan_updates_scan_tag_and_retries_metadata() {
        let dir = tempfile::tempdir().unwrap();
        make_level(dir.path(), "arena", false, Some("<MetaData><Display "));

        let mut catalog = LevelCatalog::new(dir.path());
        catalog.rescan(None, LevelTag::MAIN);
        assert!(!catalog.lookup("arena").unwrap().metadata_loaded);

        fs::write(
            dir.path().join("arena/arena.xml"),
            r#"<MetaData><Display Name="Arena"/></MetaData>"#,
        )
        .unwrap();
        let dlc = LevelTag::from_chars("DLC1");
        catalog.rescan(None, dlc);

        assert_eq!(catalog.len(), 1);
        let arena = catalog.lookup("arena").unwrap();
        assert!(arena.metadata_loaded);
        assert_eq!(arena.display_name, "Arena");
        assert_eq!(arena.scan_tag, dlc);
    }

    #[test]
    fn test_sidecar_alone_marks_level_folder() {
        let dir = tempfile::tempdir().unwrap();
        make_level(
            dir.path(),
            "arena",
            false,
            Some(r#"<MetaData><Gamerules a="Deathmatch"/></MetaData>"#),
        );
        fs::write(dir.path().join("arena/notes.txt"), "not a level marker").unwrap();

        let mut catalog = LevelCatalog::new(dir.path());
        catalog.rescan(None, LevelTag::MAIN);

        assert_eq!(catalog.len(), 1);
        assert!(catalog.lookup("arena").unwrap().supports_game_type("Deathmatch"));
    }

    #[test]
    fn test_rescan_keeps_stale_levels() {
        let dir = tempfile::tempdir().unwrap();
        make_level(dir.path(), "gone", true, None);

        let mut catalog = LevelCatalog::new(dir.path());
        catalog.rescan(None, LevelTag::MAIN);
        fs::remove_dir_all(dir.path().join("gone")).unwrap();
        catalog.rescan(None, LevelTag::MAIN);

        assert!(catalog.contains("gone"));
    }

    #[test]
    fn test_lookup_strategies() {
        let mut catalog = LevelCatalog::default();
        catalog.insert(LevelInfo::new("mp\\Harbor", "levels/mp/Harbor", LevelTag::MAIN));

        assert_eq!(catalog.lookup("MP/HARBOR").unwrap().name, "mp/Harbor");
        assert_eq!(catalog.lookup("harbor").unwrap().name, "mp/Harbor");
        assert_eq!(catalog.lookup("other/harbor").unwrap().name, "mp/Harbor");
        assert_eq!(catalog.lookup("other\\harbor").unwrap().name, "mp/Harbor");
        assert!(catalog.lookup("other/forest").is_none());
        assert!(catalog.get(0).is_some());
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn test_mod_levels_are_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let mod_root = dir.path().join("Mods/mymod/levels");
        let main_root = dir.path().join("levels");
        make_level(&mod_root, "modmap", true, None);
        make_level(&main_root, "arena", true, None);

        let mut catalog = LevelCatalog::default();
        catalog.rescan_with_mod(&mod_root, &main_root, LevelTag::MAIN);

        assert!(catalog.lookup("modmap").unwrap().is_mod_level);
        assert!(!catalog.lookup("arena").unwrap().is_mod_level);
        assert_eq!(catalog.levels_folder(), main_root.as_path());
    }

    #[test]
    fn test_complete_prefix() {
        let mut catalog = LevelCatalog::default();
        catalog.insert(LevelInfo::new("Arena", "levels/Arena", LevelTag::MAIN));
        catalog.insert(LevelInfo::new("ArcticBase", "levels/ArcticBase", LevelTag::MAIN));
        catalog.insert(LevelInfo::new("Harbor", "levels/Harbor", LevelTag::MAIN));

        let mut found = catalog.complete("ar");
        found.sort();
        assert_eq!(found, vec!["ArcticBase", "Arena"]);
    }

    #[test]
    fn test_load_level_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leveltypes.xml");
        fs::write(
            &path,
            r#"<LevelTypes>
                <LevelType value="multiplayer"/>
                <LevelType/>
                <LevelType value="singleplayer"/>
            </LevelTypes>"#,
        )
        .unwrap();

        let mut catalog = LevelCatalog::default();
        catalog.load_level_types(&path);
        assert_eq!(catalog.level_types(), vec!["multiplayer", "singleplayer"]);
    }
}
