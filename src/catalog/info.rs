//! Per-level catalog record and its metadata readers.

use bevy::log::{debug, warn};
use std::collections::HashMap;
use std::path::PathBuf;

use super::data::{
    parse_build_number, read_xml_file, AttributeValue, LevelDataDescriptor, LevelDescriptor,
    XmlElement,
};
use super::error::DataLoadError;

/// Build number of an editor release whose exported levels must not be loaded.
pub const INCOMPATIBLE_BUILD_NUMBER: u32 = 5620;

/// Primary descriptor file name.
pub const LEVEL_DESCRIPTOR_FILE: &str = "LevelInfo.xml";

/// Secondary descriptor candidates, tried in order.
pub const LEVEL_DATA_FILES: [&str; 2] = ["LevelDataAction.xml", "LevelData.xml"];

/// Four byte identifier stored big-endian, e.g. `ARNA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelTag(pub u32);

impl LevelTag {
    pub const UNKNOWN: LevelTag = LevelTag::from_bytes(*b"ZZZZ");
    pub const MAIN: LevelTag = LevelTag::from_bytes(*b"MAIN");

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Pack up to four characters; shorter values are zero padded.
    pub fn from_chars(value: &str) -> Self {
        let mut bytes = [0u8; 4];
        for (slot, byte) in bytes.iter_mut().zip(value.bytes()) {
            *slot = byte;
        }
        Self::from_bytes(bytes)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Default for LevelTag {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl std::fmt::Display for LevelTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(4);
        write!(f, "{}", String::from_utf8_lossy(&bytes[..end]))
    }
}

/// Minimap placement in world units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinimapInfo {
    /// Full path of the minimap image (level path + file name).
    pub image_path: String,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub width: u32,
    pub height: u32,
    /// `end_x - start_x`, clamped to at least 1.
    pub dim_x: f32,
    /// `end_y - start_y`, clamped to at least 1.
    pub dim_y: f32,
}

/// A mission entry read from the level's secondary descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTypeInfo {
    pub name: String,
    pub cgf_count: u32,
    pub mission_file: String,
}

/// Catalog record for one level folder.
#[derive(Debug, Clone)]
pub struct LevelInfo {
    /// Canonical name: folder path relative to the levels root, forward slashes.
    pub name: String,
    pub path: PathBuf,
    pub package_paths: Vec<PathBuf>,
    pub supported_game_modes: Vec<String>,
    pub display_name: String,
    pub preview_image_path: String,
    pub background_image_path: String,
    pub minimap_image_path: String,
    pub minimap: MinimapInfo,
    pub level_tag: LevelTag,
    pub scan_tag: LevelTag,
    pub custom_attributes: HashMap<String, AttributeValue>,
    pub level_types: Vec<String>,
    pub game_types: Vec<GameTypeInfo>,
    pub heightmap_size: u32,
    pub is_mod_level: bool,
    pub metadata_loaded: bool,
}

/// Replace backslashes with forward slashes.
pub fn canonicalize_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// Final path segment of a canonical or raw level name.
pub fn basename(name: &str) -> &str {
    name.rsplit(&['/', '\\'][..]).next().unwrap_or(name)
}

impl LevelInfo {
    pub fn new(name: &str, path: impl Into<PathBuf>, scan_tag: LevelTag) -> Self {
        let path = path.into();
        Self {
            name: canonicalize_name(name),
            package_paths: vec![path.join("level.pak")],
            path,
            supported_game_modes: Vec::new(),
            display_name: String::new(),
            preview_image_path: String::new(),
            background_image_path: String::new(),
            minimap_image_path: String::new(),
            minimap: MinimapInfo::default(),
            level_tag: LevelTag::UNKNOWN,
            scan_tag,
            custom_attributes: HashMap::new(),
            level_types: Vec::new(),
            game_types: Vec::new(),
            heightmap_size: 0,
            is_mod_level: false,
            metadata_loaded: false,
        }
    }

    pub fn basename(&self) -> &str {
        basename(&self.name)
    }

    /// Path of the sidecar metadata file, `<path>/<basename>.xml`.
    pub fn sidecar_path(&self) -> PathBuf {
        self.path.join(format!("{}.xml", self.basename()))
    }

    /// Best-effort parse of the sidecar file.
    ///
    /// Child nodes are matched by tag name ignoring case; unknown nodes are
    /// skipped and incomplete ones only produce warnings. Missing sidecars
    /// leave the defaults in place and `metadata_loaded` false. A document
    /// that is not well-formed is reported and also leaves it false so the
    /// next scan retries.
    pub fn read_metadata(&mut self) -> Result<(), DataLoadError> {
        let map_name = self.basename().to_string();
        self.supported_game_modes.clear();
        self.level_types.clear();
        self.custom_attributes.clear();
        self.display_name = format!("@ui_{}", map_name);

        let sidecar = self.sidecar_path();
        if !sidecar.exists() {
            debug!("Map {}: no sidecar at {:?}", map_name, sidecar);
            return Ok(());
        }

        let root = read_xml_file(&sidecar)?;

        let mut found_minimap = false;
        for node in &root.children {
            if node.is_tag("Gamerules") {
                self.supported_game_modes
                    .extend(node.attributes.iter().map(|(_, mode)| mode.clone()));
            } else if node.is_tag("Display") {
                if let Some(name) = node.attr("Name") {
                    self.display_name = name.to_string();
                }
            } else if node.is_tag("PreviewImage") {
                if let Some(filename) = node.attr("Filename") {
                    self.preview_image_path = filename.to_string();
                }
            } else if node.is_tag("BackgroundImage") {
                if let Some(filename) = node.attr("Filename") {
                    self.background_image_path = filename.to_string();
                }
            } else if node.is_tag("Minimap") {
                found_minimap = self.read_minimap(node);
            } else if node.is_tag("Tag") {
                self.level_tag = node
                    .attr("Value")
                    .map(LevelTag::from_chars)
                    .unwrap_or(LevelTag::UNKNOWN);
            } else if node.is_tag("Attributes") {
                for attribute in &node.children {
                    if self.custom_attributes.contains_key(&attribute.tag) {
                        warn!("Map {}: duplicate attribute '{}' ignored", map_name, attribute.tag);
                        continue;
                    }
                    let value = AttributeValue::infer(attribute.attr("value").unwrap_or_default());
                    self.custom_attributes.insert(attribute.tag.clone(), value);
                }
            } else if node.is_tag("LevelType") {
                if let Some(level_type) = node.attr("value") {
                    self.level_types.push(level_type.to_string());
                }
            } else {
                debug!("Map {}: ignoring <{}>", map_name, node.tag);
            }
        }

        self.metadata_loaded = true;

        if !found_minimap {
            warn!("Map {}: Missing or invalid minimap info!", map_name);
        }
        Ok(())
    }

    /// Read a `Minimap` node. Returns whether every field was present and valid.
    fn read_minimap(&mut self, node: &XmlElement) -> bool {
        let filename = node.attr("Filename");
        let start_x = node.attr_parsed::<f32>("startX");
        let start_y = node.attr_parsed::<f32>("startY");
        let end_x = node.attr_parsed::<f32>("endX");
        let end_y = node.attr_parsed::<f32>("endY");
        let width = node.attr_parsed::<u32>("width");
        let height = node.attr_parsed::<u32>("height");

        let complete = filename.is_some()
            && start_x.is_some()
            && start_y.is_some()
            && end_x.is_some()
            && end_y.is_some()
            && width.is_some()
            && height.is_some();

        let filename = filename.unwrap_or_default().to_string();
        let start_x = start_x.unwrap_or(0.0);
        let start_y = start_y.unwrap_or(0.0);
        let end_x = end_x.unwrap_or(0.0);
        let end_y = end_y.unwrap_or(0.0);

        self.minimap = MinimapInfo {
            image_path: self.path.join(&filename).display().to_string(),
            start_x,
            start_y,
            end_x,
            end_y,
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
            dim_x: (end_x - start_x).max(1.0),
            dim_y: (end_y - start_y).max(1.0),
        };
        self.minimap_image_path = filename;
        complete
    }

    /// Read the level descriptors. Only invoked at load time.
    ///
    /// Fails if the primary descriptor is missing or was exported by the
    /// incompatible build. The mission list is refreshed from the first
    /// readable secondary descriptor that lists at least one mission.
    pub fn read_info(&mut self) -> Result<(), DataLoadError> {
        let descriptor_path = self.path.join(LEVEL_DESCRIPTOR_FILE);
        let descriptor = LevelDescriptor::from_element(&read_xml_file(&descriptor_path)?);

        if let Some(build) = descriptor.sandbox_version.as_deref().and_then(parse_build_number) {
            if build == INCOMPATIBLE_BUILD_NUMBER {
                return Err(DataLoadError::IncompatibleBuild {
                    path: descriptor_path.display().to_string(),
                    build,
                });
            }
        }

        self.heightmap_size = descriptor.heightmap_size;

        let data = LEVEL_DATA_FILES.iter().find_map(|file| {
            let path = self.path.join(file);
            match read_xml_file(&path) {
                Ok(root) => Some((path, LevelDataDescriptor::from_element(&root))),
                Err(DataLoadError::FileNotFound(_)) => None,
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        });

        if let Some((data_path, data)) = data {
            if data.missions.is_empty() {
                debug!("{:?} lists no missions", data_path);
            } else {
                self.game_types = data
                    .missions
                    .into_iter()
                    .map(|mission| GameTypeInfo {
                        name: mission.name,
                        cgf_count: mission.cgf_count,
                        mission_file: mission.file,
                    })
                    .collect();
            }
        }

        Ok(())
    }

    /// Whether the sidecar lists `game_type` (case-insensitive).
    pub fn supports_game_type(&self, game_type: &str) -> bool {
        self.supported_game_modes
            .iter()
            .any(|mode| mode.eq_ignore_ascii_case(game_type))
    }

    /// First mission entry, if the descriptors have been read.
    pub fn default_game_type(&self) -> Option<&GameTypeInfo> {
        self.game_types.first()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.custom_attributes.get(key)
    }

    pub fn is_of_type(&self, level_type: &str) -> bool {
        self.level_types.iter().any(|t| t == level_type)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn level_in(dir: &Path, name: &str) -> LevelInfo {
        let path = dir.join(name);
        fs::create_dir_all(&path).unwrap();
        LevelInfo::new(name, path, LevelTag::MAIN)
    }

    #[test]
    fn test_level_tag_packing() {
        let tag = LevelTag::from_chars("ARNA");
        assert_eq!(tag.to_bytes(), *b"ARNA");
        assert_eq!(tag.to_string(), "ARNA");
        assert_eq!(LevelTag::from_chars("AB").to_bytes(), [b'A', b'B', 0, 0]);
        assert_eq!(LevelTag::default(), LevelTag::UNKNOWN);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonicalize_name("mp\\arena"), "mp/arena");
        assert_eq!(basename("mp/arena"), "arena");
        assert_eq!(basename("arena"), "arena");
    }

    #[test]
    fn test_read_metadata_without_sidecar_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "forest");
        info.read_metadata().unwrap();
        assert_eq!(info.display_name, "@ui_forest");
        assert!(!info.metadata_loaded);
    }

    #[test]
    fn test_read_metadata_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(
            info.sidecar_path(),
            r#"<MetaData>
                <Gamerules GameRule1="TeamDeathmatch" GameRule0="Deathmatch"/>
                <Display Name="Arena"/>
                <PreviewImage Filename="preview.dds"/>
                <Minimap Filename="map.dds" startX="10" startY="10" endX="10" endY="522"
                         width="256" height="256"/>
                <Tag Value="ARNA"/>
                <Attributes>
                    <max_players value="16"/>
                    <max_players value="4"/>
                    <night value="true"/>
                </Attributes>
                <LevelType value="multiplayer"/>
            </MetaData>"#,
        )
        .unwrap();

        info.read_metadata().unwrap();

        assert!(info.metadata_loaded);
        assert_eq!(info.supported_game_modes, vec!["TeamDeathmatch", "Deathmatch"]);
        assert!(info.supports_game_type("deathmatch"));
        assert_eq!(info.display_name, "Arena");
        assert_eq!(info.preview_image_path, "preview.dds");
        assert_eq!(info.minimap_image_path, "map.dds");
        assert_eq!(info.minimap.width, 256);
        assert_eq!(info.minimap.dim_x, 1.0);
        assert_eq!(info.minimap.dim_y, 512.0);
        assert_eq!(info.level_tag, LevelTag::from_chars("ARNA"));
        assert_eq!(info.attribute("max_players"), Some(&AttributeValue::Int(16)));
        assert_eq!(info.attribute("night"), Some(&AttributeValue::Bool(true)));
        assert!(info.is_of_type("multiplayer"));
    }

    #[test]
    fn test_read_metadata_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(
            info.sidecar_path(),
            r#"<metadata>
                <GAMERULES a="Deathmatch"/>
                <Weather Kind="rain"/>
                <display name="Arena"/>
                <Minimap Filename="map.dds" startX="100" startY="abc" endX="50"/>
                <tag value="XY"/>
            </metadata>"#,
        )
        .unwrap();

        info.read_metadata().unwrap();

        assert!(info.metadata_loaded);
        assert_eq!(info.supported_game_modes, vec!["Deathmatch"]);
        assert_eq!(info.display_name, "Arena");
        assert_eq!(info.minimap_image_path, "map.dds");
        assert_eq!(info.minimap.start_x, 100.0);
        assert_eq!(info.minimap.start_y, 0.0);
        assert_eq!(info.minimap.dim_x, 1.0);
        assert_eq!(info.minimap.dim_y, 1.0);
        assert_eq!(info.minimap.width, 0);
        assert_eq!(info.level_tag.to_bytes(), [b'X', b'Y', 0, 0]);
    }

    #[test]
    fn test_reread_metadata_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(
            info.sidecar_path(),
            r#"<MetaData>
                <Gamerules a="TeamDeathmatch" b="Deathmatch"/>
                <LevelType value="multiplayer"/>
            </MetaData>"#,
        )
        .unwrap();

        info.read_metadata().unwrap();
        info.read_metadata().unwrap();

        assert_eq!(info.supported_game_modes, vec!["TeamDeathmatch", "Deathmatch"]);
        assert_eq!(info.level_types, vec!["multiplayer"]);
    }

    #[test]
    fn test_read_metadata_malformed_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "broken");
        fs::write(info.sidecar_path(), "<MetaData><Display Name=").unwrap();

        assert!(matches!(info.read_metadata(), Err(DataLoadError::ParseError { .. })));
        assert!(!info.metadata_loaded);
        assert_eq!(info.display_name, "@ui_broken");
    }

    #[test]
    fn test_read_info_missions() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(
            info.path.join(LEVEL_DESCRIPTOR_FILE),
            r#"<LevelInfo SandboxVersion="3.6.15.1200" HeightmapSize="1024"/>"#,
        )
        .unwrap();
        fs::write(
            info.path.join("LevelData.xml"),
            r#"<LevelData><Missions>
                <Mission Name="Mission0" File="mission_mission0.xml" CGFCount="12"/>
            </Missions></LevelData>"#,
        )
        .unwrap();

        info.read_info().unwrap();

        assert_eq!(info.heightmap_size, 1024);
        let default = info.default_game_type().unwrap();
        assert_eq!(default.name, "Mission0");
        assert_eq!(default.mission_file, "mission_mission0.xml");
        assert_eq!(default.cgf_count, 12);
    }

    #[test]
    fn test_read_info_prefers_action_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(info.path.join(LEVEL_DESCRIPTOR_FILE), "<LevelInfo/>").unwrap();
        fs::write(
            info.path.join("LevelDataAction.xml"),
            r#"<LevelData><Missions><Mission Name="Action"/></Missions></LevelData>"#,
        )
        .unwrap();
        fs::write(
            info.path.join("LevelData.xml"),
            r#"<LevelData><Missions><Mission Name="Plain"/></Missions></LevelData>"#,
        )
        .unwrap();

        info.read_info().unwrap();
        assert_eq!(info.default_game_type().unwrap().name, "Action");
    }

    #[test]
    fn test_read_info_falls_back_when_action_descriptor_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "arena");
        fs::write(info.path.join(LEVEL_DESCRIPTOR_FILE), "<LevelInfo/>").unwrap();
        fs::write(info.path.join("LevelDataAction.xml"), "<LevelData>").unwrap();
        fs::write(
            info.path.join("LevelData.xml"),
            r#"<LevelData><Missions><Mission Name="Plain"/></Missions></LevelData>"#,
        )
        .unwrap();

        info.read_info().unwrap();
        assert_eq!(info.default_game_type().unwrap().name, "Plain");
    }

    #[test]
    fn test_read_info_rejects_incompatible_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "leaked");
        fs::write(
            info.path.join(LEVEL_DESCRIPTOR_FILE),
            r#"<LevelInfo SandboxVersion="3.5.0.5620"/>"#,
        )
        .unwrap();

        assert!(matches!(
            info.read_info(),
            Err(DataLoadError::IncompatibleBuild { build: 5620, .. })
        ));
    }

    #[test]
    fn test_read_info_requires_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = level_in(dir.path(), "empty");
        assert!(matches!(info.read_info(), Err(DataLoadError::FileNotFound(_))));
    }
}
