//! Level data documents: XML sidecars, descriptors and mission files.

use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::error::DataLoadError;

/// An XML element detached from its source text.
///
/// Tag and attribute lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    /// Attributes in declaration order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(text: &str, origin: &str) -> Result<Self, DataLoadError> {
        let doc = Document::parse(text).map_err(|e| DataLoadError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: Node) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Attribute parsed as `T`; `None` when missing or malformed.
    pub fn attr_parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        self.attr(name)?.trim().parse().ok()
    }

    /// Boolean attribute: `true`/`yes` or a non-zero integer.
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        let value = self.attr(name)?.trim();
        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
            return Some(true);
        }
        if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") {
            return Some(false);
        }
        value.parse::<i64>().ok().map(|v| v != 0)
    }

    pub fn find_child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.is_tag(tag))
    }

    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.is_tag(tag))
    }
}

/// Read an XML file and return its root element.
pub fn read_xml_file(path: &Path) -> Result<XmlElement, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    XmlElement::parse(&contents, &path.display().to_string())
}

// === Sidecar metadata (<level>/<basename>.xml) ===

/// A typed custom attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Type an attribute string: booleans, then integers, then floats.
    pub fn infer(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else if let Ok(int) = trimmed.parse::<i64>() {
            Self::Int(int)
        } else if let Ok(float) = trimmed.parse::<f64>() {
            Self::Float(float)
        } else {
            Self::String(value.to_string())
        }
    }
}

// === Level descriptors (LevelInfo.xml, LevelDataAction.xml / LevelData.xml) ===

/// Primary level descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelDescriptor {
    /// Editor build that exported the level, formatted `major.minor.bugfix.build`.
    pub sandbox_version: Option<String>,
    pub heightmap_size: u32,
}

impl LevelDescriptor {
    pub fn from_element(root: &XmlElement) -> Self {
        Self {
            sandbox_version: root.attr("SandboxVersion").map(str::to_string),
            heightmap_size: root.attr_parsed("HeightmapSize").unwrap_or(0),
        }
    }
}

/// A `Missions/Mission` entry of the secondary descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionDef {
    pub name: String,
    pub file: String,
    pub cgf_count: u32,
}

/// Secondary level descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelDataDescriptor {
    pub missions: Vec<MissionDef>,
}

impl LevelDataDescriptor {
    /// Collect named `Mission` entries below `Missions`.
    pub fn from_element(root: &XmlElement) -> Self {
        let missions = root
            .find_child("Missions")
            .map(|missions| {
                missions
                    .children_tagged("Mission")
                    .filter_map(|mission| {
                        let name = mission.attr("Name")?;
                        Some(MissionDef {
                            name: name.to_string(),
                            file: mission.attr("File").unwrap_or_default().to_string(),
                            cgf_count: mission.attr_parsed("CGFCount").unwrap_or(0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { missions }
    }
}

/// Mission file referenced by a game type entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionFile {
    pub script: Option<String>,
    /// Names of the entities listed under `Objects`.
    pub objects: Vec<String>,
}

impl MissionFile {
    pub fn from_element(root: &XmlElement) -> Self {
        let objects = root
            .find_child("Objects")
            .map(|objects| {
                objects
                    .children
                    .iter()
                    .map(|object| object.attr("Name").unwrap_or(&object.tag).to_string())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            script: root
                .attr("Script")
                .filter(|script| !script.is_empty())
                .map(str::to_string),
            objects,
        }
    }
}

/// Extract the build number from a `major.minor.bugfix.build` version string.
pub fn parse_build_number(version: &str) -> Option<u32> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    if parts[..3].iter().any(|p| p.trim().parse::<i64>().is_err()) {
        return None;
    }
    parts[3].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number("3.5.0.5620"), Some(5620));
        assert_eq!(parse_build_number("1.0.0.1"), Some(1));
        assert_eq!(parse_build_number("3.5.0"), None);
        assert_eq!(parse_build_number("a.b.c.d"), None);
    }

    #[test]
    fn test_xml_lookups_ignore_case() {
        let root = XmlElement::parse(
            r#"<LevelRotation Randomize="1" maintainpairs="true">
                 <!-- comment -->
                 <LEVEL name="a"/>
                 <other/>
                 <level NAME="b"/>
               </LevelRotation>"#,
            "inline",
        )
        .unwrap();

        assert!(root.is_tag("levelrotation"));
        assert_eq!(root.attr_bool("randomize"), Some(true));
        assert_eq!(root.attr_bool("maintainPairs"), Some(true));
        assert_eq!(root.attr_bool("includeNonPresentLevels"), None);
        assert_eq!(root.children.len(), 3);
        let names: Vec<_> = root
            .children_tagged("level")
            .filter_map(|level| level.attr("name"))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_attribute_order_is_kept() {
        let root = XmlElement::parse(r#"<Gamerules b="Second" a="First" c="Third"/>"#, "inline")
            .unwrap();
        let values: Vec<_> = root.attributes.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["Second", "First", "Third"]);
    }

    #[test]
    fn test_attribute_value_infer() {
        assert_eq!(AttributeValue::infer("16"), AttributeValue::Int(16));
        assert_eq!(AttributeValue::infer("TRUE"), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::infer("0.5"), AttributeValue::Float(0.5));
        assert_eq!(
            AttributeValue::infer("night"),
            AttributeValue::String("night".to_string())
        );
    }

    #[test]
    fn test_level_data_missions() {
        let root = XmlElement::parse(
            r#"<LevelData>
                 <Missions>
                   <Mission Name="Mission0" File="mission_mission0.xml" CGFCount="12"/>
                   <Mission File="unnamed.xml"/>
                   <Mission Name="Mission1"/>
                 </Missions>
               </LevelData>"#,
            "inline",
        )
        .unwrap();

        let data = LevelDataDescriptor::from_element(&root);
        assert_eq!(
            data.missions,
            vec![
                MissionDef {
                    name: "Mission0".to_string(),
                    file: "mission_mission0.xml".to_string(),
                    cgf_count: 12,
                },
                MissionDef {
                    name: "Mission1".to_string(),
                    file: String::new(),
                    cgf_count: 0,
                },
            ]
        );
    }

    #[test]
    fn test_mission_file_objects() {
        let root = XmlElement::parse(
            r#"<Mission Script="Scripts/init.lua">
                 <Objects><Entity Name="Spawn1"/><Entity/></Objects>
               </Mission>"#,
            "inline",
        )
        .unwrap();

        let mission = MissionFile::from_element(&root);
        assert_eq!(mission.script.as_deref(), Some("Scripts/init.lua"));
        assert_eq!(mission.objects, vec!["Spawn1", "Entity"]);
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let result = XmlElement::parse("<Level><Display></Level>", "broken.xml");
        assert!(matches!(result, Err(DataLoadError::ParseError { path, .. }) if path == "broken.xml"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_xml_file(Path::new("does/not/exist.xml"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound(_))));
    }
}
