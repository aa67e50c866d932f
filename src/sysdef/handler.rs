//! Owner of the live system definition: load, save and change tracking.

#[cfg(feature = "xml")]
use std::path::{Path, PathBuf};
#[cfg(feature = "xml")]
use std::time::Instant;

#[cfg(feature = "xml")]
use log::{debug, error, info};

use crate::sysdef::config::HandlerConfig;
#[cfg(feature = "xml")]
use crate::sysdef::{
    repair::run_drift_repair, sort::sort_definition_messages, verify::verify_definition,
};
use crate::types::{
    datapool::Element,
    index::MessageId,
    message::{CanMessage, UiCanMessage},
    signal::CanSignal,
    system::SystemDefinition,
};
#[cfg(feature = "xml")]
use crate::{
    filer::{self, LEGACY_FILE_VERSION},
    types::{
        errors::{FilerError, LoadError, SaveError},
        shared::SharedDatapools,
        system::UiDefinition,
    },
};

/// Holds the system definition of the open project and the hash it had when it was last
/// loaded or saved.
#[derive(Debug, Clone)]
pub struct SystemDefinitionHandler {
    config: HandlerConfig,
    definition: SystemDefinition,
    last_saved_hash: u32,
}

impl Default for SystemDefinitionHandler {
    fn default() -> Self {
        Self::new(HandlerConfig::default())
    }
}

impl SystemDefinitionHandler {
    pub fn new(config: HandlerConfig) -> Self {
        let definition = SystemDefinition::new();
        let last_saved_hash: u32 = definition.calc_hash();
        SystemDefinitionHandler {
            config,
            definition,
            last_saved_hash,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn definition(&self) -> &SystemDefinition {
        &self.definition
    }

    pub fn definition_mut(&mut self) -> &mut SystemDefinition {
        &mut self.definition
    }

    /// Starts a new, empty project.
    pub fn clear(&mut self) {
        self.definition = SystemDefinition::new();
        self.last_saved_hash = self.definition.calc_hash();
    }

    pub fn calc_hash(&self) -> u32 {
        self.definition.calc_hash()
    }

    /// `true` if the definition was changed since it was last loaded or saved.
    pub fn has_hash_changed(&self) -> bool {
        self.calc_hash() != self.last_saved_hash
    }

    pub fn get_can_message(&self, id: &MessageId) -> Option<&CanMessage> {
        self.definition.get_can_message(id)
    }

    pub fn get_ui_can_message(&self, id: &MessageId) -> Option<&UiCanMessage> {
        self.definition.get_ui_can_message(id)
    }

    pub fn get_can_signal(&self, id: &MessageId, signal: usize) -> Option<&CanSignal> {
        self.definition.get_can_signal(id, signal)
    }

    pub fn get_signal_element(&self, id: &MessageId, signal: usize) -> Option<&Element> {
        self.definition.get_signal_element(id, signal)
    }

    #[cfg(feature = "xml")]
    fn ui_file_path(&self, path: &Path) -> PathBuf {
        filer::companion_file_path(path, &self.config.ui_file_suffix)
    }

    #[cfg(feature = "xml")]
    fn shared_datapools_file_path(&self, path: &Path) -> PathBuf {
        filer::companion_file_path(path, &self.config.shared_datapools_file_suffix)
    }

    /// Loads a project and returns the version of its system definition file.
    ///
    /// The current definition is only replaced if loading, repairing and verifying the
    /// new one all succeed.
    #[cfg(feature = "xml")]
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<u16, LoadError> {
        let path: &Path = path.as_ref();
        let started = Instant::now();
        info!("Loading system definition '{}'", path.display());

        let (mut definition, version) = match self.load_definition(path) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!("Loading system definition failed: {err}");
                return Err(err);
            }
        };

        if let Some(node) = self
            .config
            .device_catalog()
            .find_unknown(&definition.core.nodes)
        {
            let err = LoadError::ReferenceOverflow {
                node: node.properties.name.clone(),
                device_type: node.properties.device_type.clone(),
            };
            error!("Loading system definition failed: {err}");
            return Err(err);
        }

        let report = run_drift_repair(&mut definition);
        if !report.is_empty() {
            debug!(
                "Drift repair resized {} container(s) and renamed {} node(s)",
                report.resized_containers.len(),
                report.renamed_nodes.len()
            );
        }

        let hash: u32 = definition.calc_hash();
        verify_definition(&definition)?;

        self.definition = definition;
        self.last_saved_hash = hash;
        info!(
            "Loaded system definition version {version} with {} node(s) in {:?}",
            self.definition.core.nodes.len(),
            started.elapsed()
        );
        Ok(version)
    }

    #[cfg(feature = "xml")]
    fn load_definition(&self, path: &Path) -> Result<(SystemDefinition, u16), LoadError> {
        let version: u16 = filer::read_file_version(path)?;
        debug!("System definition file version: {version}");
        if version <= LEGACY_FILE_VERSION {
            return Ok(filer::load_legacy(path)?);
        }

        let (core, version) = filer::load_core(path)?;
        let mut ui: UiDefinition = filer::load_ui(&self.ui_file_path(path))?;
        let shared_path: PathBuf = self.shared_datapools_file_path(path);
        ui.shared_datapools = match filer::load_shared_datapools(&shared_path) {
            Ok(shared) => shared,
            Err(FilerError::NotFound { .. }) => SharedDatapools::default(),
            Err(err) => return Err(err.into()),
        };
        Ok((SystemDefinition { core, ui }, version))
    }

    /// Sorts all CAN messages by name and writes the project.
    ///
    /// Sorting works on a copy: if it fails nothing is written and the current definition
    /// is unchanged. After all files are written the sorted copy becomes the current
    /// definition.
    #[cfg(feature = "xml")]
    pub fn save<P: AsRef<Path>>(
        &mut self,
        path: P,
        use_legacy_format: bool,
    ) -> Result<(), SaveError> {
        let path: &Path = path.as_ref();
        let started = Instant::now();
        info!("Saving system definition '{}'", path.display());

        let mut sorted: SystemDefinition = self.definition.clone();
        if let Err(err) = sort_definition_messages(&mut sorted) {
            error!("Saving system definition failed: {err}");
            return Err(err.into());
        }

        if let Err(err) = self.write_definition(&sorted, path, use_legacy_format) {
            error!("Saving system definition failed: {err}");
            return Err(err.into());
        }

        self.definition = sorted;
        self.last_saved_hash = self.definition.calc_hash();
        info!("Saved system definition in {:?}", started.elapsed());
        Ok(())
    }

    #[cfg(feature = "xml")]
    fn write_definition(
        &self,
        definition: &SystemDefinition,
        path: &Path,
        use_legacy_format: bool,
    ) -> Result<(), FilerError> {
        let indent: usize = self.config.xml_indent;
        if use_legacy_format {
            return filer::save_legacy(definition, path, indent);
        }
        filer::save_core(&definition.core, path, indent)?;
        filer::save_ui(&definition.ui, &self.ui_file_path(path), indent)?;
        filer::save_shared_datapools(
            &definition.ui.shared_datapools,
            &self.shared_datapools_file_path(path),
            indent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{node::Node, node::UiNode};

    #[test]
    fn test_hash_tracking() {
        let mut handler = SystemDefinitionHandler::default();
        assert!(!handler.has_hash_changed());

        handler
            .definition_mut()
            .add_node(Node::new("ECU1", "ESX3CM"), UiNode::default())
            .unwrap();
        assert!(handler.has_hash_changed());

        handler.clear();
        assert!(!handler.has_hash_changed());
        assert!(handler.definition().core.nodes.is_empty());
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_failed_load_keeps_definition() {
        crate::sysdef::init_test_logger();
        let mut handler = SystemDefinitionHandler::default();
        handler
            .definition_mut()
            .add_node(Node::new("ECU1", "ESX3CM"), UiNode::default())
            .unwrap();
        let before: SystemDefinition = handler.definition().clone();

        let dir = tempfile::tempdir().unwrap();
        let err = handler.load(dir.path().join("missing.syde_sysdef")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(handler.definition(), &before);
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_save_writes_companion_files() {
        crate::sysdef::init_test_logger();
        let mut handler = SystemDefinitionHandler::default();
        handler
            .definition_mut()
            .add_node(Node::new("ECU1", "ESX3CM"), UiNode::default())
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.syde_sysdef");
        handler.save(&path, false).unwrap();
        assert!(path.exists());
        assert!(dir.path().join("demo_ui.syde_sysdef").exists());
        assert!(dir.path().join("demo_shared_datapools.syde_sysdef").exists());
        assert!(!handler.has_hash_changed());
    }
}
