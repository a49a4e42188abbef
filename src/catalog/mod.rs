//! Catalog module - level discovery, metadata records and name resolution.

mod data;
mod error;
mod info;
mod plugin;
mod registry;

pub use data::{
    read_xml_file, AttributeValue, LevelDataDescriptor, LevelDescriptor, MissionDef, MissionFile,
    XmlElement,
};
pub use error::DataLoadError;
pub use info::{
    basename, canonicalize_name, GameTypeInfo, LevelInfo, LevelTag, MinimapInfo,
    INCOMPATIBLE_BUILD_NUMBER, LEVEL_DATA_FILES, LEVEL_DESCRIPTOR_FILE,
};
pub use plugin::{scan_levels, CatalogPlugin};
pub use registry::{LevelCatalog, LEVEL_PACKAGE_FILE};
