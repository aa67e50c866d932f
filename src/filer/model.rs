//! Serde structs mirroring the XML layout of the project files.
//!
//! Attributes are `@`-prefixed fields; child lists are wrapped in a container element
//! (`<nodes><node/>...</nodes>`). Enumerations are kept as strings here and converted
//! when resolving into the public types.

use serde::{Deserialize, Serialize};

// --- Root elements ---

/// `<opensyde-system-definition>`: the core file, or the single legacy file when
/// `gui_only` is present.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "opensyde-system-definition")]
pub struct XmlSystemDefinition {
    #[serde(rename = "file-version")]
    pub file_version: u16,
    #[serde(default)]
    pub nodes: XmlNodes,
    #[serde(default)]
    pub buses: XmlBuses,
    #[serde(rename = "gui-only", default, skip_serializing_if = "Option::is_none")]
    pub gui_only: Option<XmlGuiOnly>,
}

/// Only the version of a system definition file; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct XmlFileVersion {
    #[serde(rename = "file-version")]
    pub file_version: u16,
}

/// `<opensyde-system-definition-ui>`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "opensyde-system-definition-ui")]
pub struct XmlSystemDefinitionUi {
    #[serde(rename = "file-version")]
    pub file_version: u16,
    #[serde(default)]
    pub nodes: XmlUiNodes,
    #[serde(default)]
    pub buses: XmlUiBuses,
    #[serde(rename = "bus-text-elements", default)]
    pub bus_text_elements: XmlBusTextElements,
}

/// `<gui-only>` section of the legacy single-file format.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlGuiOnly {
    #[serde(default)]
    pub nodes: XmlUiNodes,
    #[serde(default)]
    pub buses: XmlUiBuses,
    #[serde(rename = "bus-text-elements", default)]
    pub bus_text_elements: XmlBusTextElements,
}

/// `<opensyde-shared-datapools>`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "opensyde-shared-datapools")]
pub struct XmlSharedDatapools {
    #[serde(rename = "file-version")]
    pub file_version: u16,
    #[serde(default)]
    pub groups: XmlSharedGroups,
}

// --- Core part ---

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlNodes {
    #[serde(rename = "node", default)]
    pub items: Vec<XmlNode>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlNode {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@device-type", default)]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(rename = "com-interfaces", default)]
    pub com_interfaces: XmlComInterfaces,
    #[serde(default)]
    pub datapools: XmlDatapools,
    #[serde(rename = "com-protocols", default)]
    pub com_protocols: XmlComProtocols,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlComInterfaces {
    #[serde(rename = "interface", default)]
    pub items: Vec<XmlComInterface>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlComInterface {
    #[serde(rename = "@type")]
    pub interface_type: String,
    #[serde(rename = "@number", default)]
    pub interface_number: u8,
    #[serde(rename = "@node-id", default)]
    pub node_id: u8,
    #[serde(rename = "@bus-index", default, skip_serializing_if = "Option::is_none")]
    pub bus_index: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlDatapools {
    #[serde(rename = "datapool", default)]
    pub items: Vec<XmlDatapool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlDatapool {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@kind")]
    pub kind: String,
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "@safety", default)]
    pub is_safety: bool,
    #[serde(rename = "@nvm-start-address", default)]
    pub nvm_start_address: u32,
    #[serde(rename = "@nvm-size", default)]
    pub nvm_size: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default)]
    pub lists: XmlLists,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlLists {
    #[serde(rename = "list", default)]
    pub items: Vec<XmlList>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlList {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@nvm-size", default)]
    pub nvm_size: u32,
    #[serde(rename = "@nvm-address", default)]
    pub nvm_address: u32,
    #[serde(rename = "@nvm-crc-active", default)]
    pub nvm_crc_active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default)]
    pub elements: XmlElements,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlElements {
    #[serde(rename = "element", default)]
    pub items: Vec<XmlElement>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlElement {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@content-type")]
    pub content_type: String,
    #[serde(rename = "@array-size", default)]
    pub array_size: u32,
    #[serde(rename = "@factor")]
    pub factor: f64,
    #[serde(rename = "@offset")]
    pub offset: f64,
    #[serde(rename = "@unit", default)]
    pub unit: String,
    #[serde(rename = "@min")]
    pub min: f64,
    #[serde(rename = "@max")]
    pub max: f64,
    #[serde(rename = "@value")]
    pub value: f64,
    #[serde(rename = "@access")]
    pub access: String,
    #[serde(rename = "@diag-event-call", default)]
    pub diag_event_call: bool,
    #[serde(rename = "@nvm-address", default)]
    pub nvm_address: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlComProtocols {
    #[serde(rename = "protocol", default)]
    pub items: Vec<XmlComProtocol>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlComProtocol {
    #[serde(rename = "@type")]
    pub protocol_type: String,
    #[serde(rename = "@datapool-index")]
    pub datapool_index: usize,
    #[serde(rename = "message-containers", default)]
    pub message_containers: XmlMessageContainers,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlMessageContainers {
    #[serde(rename = "container", default)]
    pub items: Vec<XmlMessageContainer>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlMessageContainer {
    #[serde(rename = "@used-by-interface", default)]
    pub used_by_interface: bool,
    #[serde(rename = "tx-messages", default)]
    pub tx_messages: XmlMessages,
    #[serde(rename = "rx-messages", default)]
    pub rx_messages: XmlMessages,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlMessages {
    #[serde(rename = "message", default)]
    pub items: Vec<XmlMessage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlMessage {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@can-id")]
    pub can_id: u32,
    #[serde(rename = "@extended", default)]
    pub is_extended: bool,
    #[serde(rename = "@dlc")]
    pub dlc: u16,
    #[serde(rename = "@tx-method")]
    pub tx_method: String,
    #[serde(rename = "@cycle-time", default)]
    pub cycle_time_ms: u32,
    #[serde(rename = "@delay-time", default)]
    pub delay_time_ms: u16,
    #[serde(rename = "@timeout", default)]
    pub timeout_ms: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default)]
    pub signals: XmlSignals,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlSignals {
    #[serde(rename = "signal", default)]
    pub items: Vec<XmlSignal>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlSignal {
    #[serde(rename = "@byte-order")]
    pub byte_order: String,
    #[serde(rename = "@bit-start")]
    pub bit_start: u16,
    #[serde(rename = "@bit-length")]
    pub bit_length: u16,
    #[serde(rename = "@multiplexer-type", default)]
    pub multiplexer_type: String,
    #[serde(rename = "@multiplexer-value", default)]
    pub multiplexer_value: u16,
    #[serde(rename = "@element-index")]
    pub element_index: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlBuses {
    #[serde(rename = "bus", default)]
    pub items: Vec<XmlBus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlBus {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@type")]
    pub bus_type: String,
    #[serde(rename = "@bitrate", default)]
    pub bitrate: u32,
    #[serde(rename = "@bus-id", default)]
    pub bus_id: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

// --- UI part ---

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiNodes {
    #[serde(rename = "node", default)]
    pub items: Vec<XmlUiNode>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiNode {
    #[serde(rename = "@x", default)]
    pub x: f64,
    #[serde(rename = "@y", default)]
    pub y: f64,
    #[serde(rename = "@width", default)]
    pub width: f64,
    #[serde(rename = "@height", default)]
    pub height: f64,
    #[serde(rename = "@z-order", default)]
    pub z_order: f64,
    #[serde(default)]
    pub datapools: XmlUiDatapools,
    #[serde(rename = "can-protocols", default)]
    pub can_protocols: XmlUiCanProtocols,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiDatapools {
    #[serde(rename = "datapool", default)]
    pub items: Vec<XmlUiDatapool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiDatapool {
    #[serde(default)]
    pub lists: XmlUiLists,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiLists {
    #[serde(rename = "list", default)]
    pub items: Vec<XmlUiList>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiList {
    #[serde(rename = "@expanded", default)]
    pub expanded: bool,
    #[serde(default)]
    pub elements: XmlUiElements,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiElements {
    #[serde(rename = "element", default)]
    pub items: Vec<XmlUiElement>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiElement {
    #[serde(rename = "@auto-min-max", default)]
    pub auto_min_max: bool,
    #[serde(rename = "@interpret-as-string", default)]
    pub interpret_as_string: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiCanProtocols {
    #[serde(rename = "protocol", default)]
    pub items: Vec<XmlUiCanProtocol>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiCanProtocol {
    #[serde(rename = "message-containers", default)]
    pub message_containers: XmlUiMessageContainers,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiMessageContainers {
    #[serde(rename = "container", default)]
    pub items: Vec<XmlUiMessageContainer>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiMessageContainer {
    #[serde(rename = "tx-messages", default)]
    pub tx_messages: XmlUiMessages,
    #[serde(rename = "rx-messages", default)]
    pub rx_messages: XmlUiMessages,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiMessages {
    #[serde(rename = "message", default)]
    pub items: Vec<XmlUiMessage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiMessage {
    #[serde(default)]
    pub signals: XmlUiSignals,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiSignals {
    #[serde(rename = "signal", default)]
    pub items: Vec<XmlUiSignal>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiSignal {
    #[serde(rename = "@color-index", default)]
    pub color_index: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiBuses {
    #[serde(rename = "bus", default)]
    pub items: Vec<XmlUiBus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlUiBus {
    #[serde(rename = "@color", default)]
    pub color: String,
    #[serde(rename = "@width", default)]
    pub width: u8,
    #[serde(default)]
    pub points: XmlPoints,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlPoints {
    #[serde(rename = "point", default)]
    pub items: Vec<XmlPoint>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlPoint {
    #[serde(rename = "@x")]
    pub x: f64,
    #[serde(rename = "@y")]
    pub y: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlBusTextElements {
    #[serde(rename = "bus-text-element", default)]
    pub items: Vec<XmlBusTextElement>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlBusTextElement {
    #[serde(rename = "@bus-index")]
    pub bus_index: usize,
    #[serde(rename = "@x", default)]
    pub x: f64,
    #[serde(rename = "@y", default)]
    pub y: f64,
    #[serde(rename = "@font-size", default)]
    pub font_size: u16,
    #[serde(default)]
    pub text: String,
}

// --- Shared Datapools ---

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlSharedGroups {
    #[serde(rename = "group", default)]
    pub items: Vec<XmlSharedGroup>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlSharedGroup {
    #[serde(rename = "datapool", default)]
    pub items: Vec<XmlSharedDatapool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct XmlSharedDatapool {
    #[serde(rename = "@node-index")]
    pub node: usize,
    #[serde(rename = "@datapool-index")]
    pub datapool: usize,
}
