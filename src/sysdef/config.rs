//! Handler configuration, read from TOML.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::{errors::ConfigError, node::Node};

/// Settings of a [`SystemDefinitionHandler`](crate::SystemDefinitionHandler).
///
/// ```toml
/// ui_file_suffix = "_ui"
/// shared_datapools_file_suffix = "_shared_datapools"
/// xml_indent = 1
/// devices = ["ESX3CM", "ESX3CS"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Appended to the file stem of the core file to name the UI file.
    pub ui_file_suffix: String,
    /// Appended to the file stem of the core file to name the shared Datapool file.
    pub shared_datapools_file_suffix: String,
    /// Indentation width of written XML files.
    pub xml_indent: usize,
    /// Known device types. Empty disables the device reference check on load.
    pub devices: Vec<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig {
            ui_file_suffix: "_ui".to_string(),
            shared_datapools_file_suffix: "_shared_datapools".to_string(),
            xml_indent: 1,
            devices: Vec::new(),
        }
    }
}

impl HandlerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path: &Path = path.as_ref();
        let text: String = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn device_catalog(&self) -> DeviceCatalog {
        DeviceCatalog::new(self.devices.iter().cloned())
    }
}

/// Set of device types nodes may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCatalog {
    devices: BTreeSet<String>,
}

impl DeviceCatalog {
    pub fn new<I: IntoIterator<Item = String>>(devices: I) -> Self {
        DeviceCatalog {
            devices: devices.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, device_type: &str) -> bool {
        self.devices.contains(device_type)
    }

    /// First node whose device type is not in the catalog. An empty catalog accepts all nodes.
    pub fn find_unknown<'a>(&self, nodes: &'a [Node]) -> Option<&'a Node> {
        if self.is_empty() {
            return None;
        }
        nodes
            .iter()
            .find(|node| !self.contains(&node.properties.device_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = HandlerConfig::from_toml_str("devices = [\"ESX3CM\"]").unwrap();
        assert_eq!(config.ui_file_suffix, "_ui");
        assert_eq!(config.shared_datapools_file_suffix, "_shared_datapools");
        assert_eq!(config.xml_indent, 1);
        assert_eq!(config.devices, vec!["ESX3CM".to_string()]);
        assert_eq!(HandlerConfig::from_toml_str("").unwrap(), HandlerConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = HandlerConfig::from_toml_str("xml_indent = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handler.toml");
        fs::write(&path, "ui_file_suffix = \"_gui\"\nxml_indent = 2\n").unwrap();

        let config = HandlerConfig::from_file(&path).unwrap();
        assert_eq!(config.ui_file_suffix, "_gui");
        assert_eq!(config.xml_indent, 2);

        let err = HandlerConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_device_catalog() {
        let nodes = vec![Node::new("A", "ESX3CM"), Node::new("B", "Unknown")];
        assert!(DeviceCatalog::default().find_unknown(&nodes).is_none());

        let catalog = HandlerConfig {
            devices: vec!["ESX3CM".to_string()],
            ..Default::default()
        }
        .device_catalog();
        assert_eq!(catalog.find_unknown(&nodes).map(Node::name), Some("B"));
    }
}
