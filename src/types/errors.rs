use std::io;
use thiserror::Error;

use crate::types::index::Direction;

/// A core vector and its UI mirror do not have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("core and UI vectors differ in length (core {core} vs. UI {ui})")]
pub struct PairLengthMismatch {
    pub core: usize,
    pub ui: usize,
}

/// First cardinality mismatch found between the UI part and the core part.
///
/// Every variant carries the UI count first and the core count second, the same
/// order used in the log output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("UI part does not match core part: Number of nodes (UI {ui} vs. core {core}).")]
    NodeCount { ui: usize, core: usize },
    #[error("UI part does not match core part: Number of buses (UI {ui} vs. core {core}).")]
    BusCount { ui: usize, core: usize },
    #[error(
        "UI part does not match core part: Number of Datapools of node {node} (UI {ui} vs. core {core})."
    )]
    DatapoolCount { node: String, ui: usize, core: usize },
    #[error(
        "UI part does not match core part: Number of Datapool lists of Datapool {node}::{datapool} (UI {ui} vs. core {core})."
    )]
    ListCount {
        node: String,
        datapool: String,
        ui: usize,
        core: usize,
    },
    #[error(
        "UI part does not match core part: Number of Datapool list elements of list {node}::{datapool}::{list} (UI {ui} vs. core {core})."
    )]
    ElementCount {
        node: String,
        datapool: String,
        list: String,
        ui: usize,
        core: usize,
    },
    #[error(
        "UI part does not match core part: Number of CAN protocols of node {node} (UI {ui} vs. core {core})."
    )]
    ProtocolCount { node: String, ui: usize, core: usize },
    #[error(
        "UI part does not match core part: Number of message containers of node {node} (UI {ui} vs. core {core})."
    )]
    ContainerCount { node: String, ui: usize, core: usize },
    #[error(
        "UI part does not match core part: Number of {direction} messages of node {node} (UI {ui} vs. core {core})."
    )]
    MessageCount {
        node: String,
        direction: Direction,
        ui: usize,
        core: usize,
    },
    #[error(
        "UI part does not match core part: Number of {direction} signals of node {node} in CAN message {message} (UI {ui} vs. core {core})."
    )]
    SignalCount {
        node: String,
        direction: Direction,
        message: String,
        ui: usize,
        core: usize,
    },
}

/// Errors produced while sorting CAN messages by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("Message sorting failed for node '{node}': {details}")]
    Config { node: String, details: String },
    #[error(
        "Signal {signal} of message '{message}' references element {element_index}, but the list only has {list_len} elements"
    )]
    ElementIndexOutOfRange {
        message: String,
        signal: usize,
        element_index: usize,
        list_len: usize,
    },
    #[error("Cannot re-insert elements of message '{message}' at position {position} (list has {list_len} elements)")]
    InsertOutOfRange {
        message: String,
        position: usize,
        list_len: usize,
    },
    #[error(transparent)]
    PairMismatch(#[from] PairLengthMismatch),
}

/// Errors returned by paired edit operations on a [`SystemDefinition`](crate::SystemDefinition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Node index {index} does not exist")]
    NodeMissing { index: usize },
    #[error("Node '{node}' has no CAN protocol {protocol}")]
    ProtocolMissing { node: String, protocol: String },
    #[error("Node '{node}' has no message container for interface {interface}")]
    ContainerMissing { node: String, interface: usize },
    #[error("Node '{node}' has no {direction} list for interface {interface}")]
    ListMissing {
        node: String,
        direction: Direction,
        interface: usize,
    },
    #[error("Message index {index} does not exist")]
    MessageMissing { index: usize },
    #[error("{direction} list of node '{node}' has {list_len} elements, but its messages need {required}")]
    ListTooShort {
        node: String,
        direction: Direction,
        list_len: usize,
        required: usize,
    },
    #[error(
        "Message '{message}' has {signals} core signals, {ui_signals} UI signals and {elements} elements"
    )]
    SignalElementMismatch {
        message: String,
        signals: usize,
        ui_signals: usize,
        elements: usize,
    },
    #[error(transparent)]
    PairMismatch(#[from] PairLengthMismatch),
}

/// Errors produced by the XML file layer.
#[derive(Debug, Error)]
pub enum FilerError {
    #[error("File '{path}' does not exist")]
    NotFound { path: String },
    #[error("Failed to read '{path}'. \nError: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("File '{path}' is not a valid system definition XML file: {details}")]
    MalformedXml { path: String, details: String },
    #[error("File '{path}' has invalid content: {details}")]
    InvalidContent { path: String, details: String },
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize '{path}': {details}")]
    Serialize { path: String, details: String },
}

/// Errors produced while reading a [`HandlerConfig`](crate::HandlerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}

/// Errors returned by [`SystemDefinitionHandler::load`](crate::SystemDefinitionHandler::load).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The system definition (or its UI file) does not exist.
    #[error("File '{path}' does not exist")]
    NotFound { path: String },
    /// The file exists but could not be read.
    #[error("Failed to open '{path}'. \nError: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The file is not an XML document with the expected root element.
    #[error("File '{path}' could not be opened: {details}")]
    Malformed { path: String, details: String },
    /// The file parses but its content is invalid or incomplete.
    #[error("Content of '{path}' is invalid or incomplete: {details}")]
    Config { path: String, details: String },
    /// A node references a device that is not part of the device definitions.
    #[error("Node '{node}' references unknown device type '{device_type}'")]
    ReferenceOverflow { node: String, device_type: String },
    /// The loaded UI part does not match the loaded core part.
    #[error(transparent)]
    Checksum(#[from] ConsistencyError),
}

impl From<FilerError> for LoadError {
    fn from(err: FilerError) -> Self {
        match err {
            FilerError::NotFound { path } => LoadError::NotFound { path },
            FilerError::Unreadable { path, source }
            | FilerError::CreateDirectory { path, source }
            | FilerError::WriteFailure { path, source } => LoadError::Io { path, source },
            FilerError::MalformedXml { path, details } => LoadError::Malformed { path, details },
            FilerError::InvalidContent { path, details }
            | FilerError::Serialize { path, details } => LoadError::Config { path, details },
        }
    }
}

/// Errors returned by [`SystemDefinitionHandler::save`](crate::SystemDefinitionHandler::save).
#[derive(Debug, Error)]
pub enum SaveError {
    /// Sorting the messages by name failed; nothing was written.
    #[error("Bus message sorting failed: {0}")]
    Sort(#[from] SortError),
    /// Writing one of the files failed; on-disk state is unknown.
    #[error(transparent)]
    Io(#[from] FilerError),
}
