//! # can_sysdef
//!
//! Rust model and consistency engine for **CAN system definitions**.
//!
//! A system definition is held twice: a **core** tree with the engineering data (nodes,
//! buses, Datapools, CAN protocols, messages, signals) and a **UI** tree with presentation
//! data that mirrors the core tree one to one.
//!
//! ## Highlights
//! - **Paired edits**: [`PairedVec`] mutates a core vector and its UI mirror together.
//! - **Verification**: [`verify_definition`] reports the first cardinality mismatch between the trees.
//! - **Drift repair**: [`run_drift_repair`] fixes message containers, NVM addresses and node names after load.
//! - **Message sorting**: [`sort_definition_messages`] orders CAN messages by name and moves
//!   the Datapool elements backing their signals along.
//! - **Persistence**: [`SystemDefinitionHandler`] loads and saves XML projects and tracks
//!   unsaved changes with a structural CRC-32.
//!

#[cfg(feature = "xml")]
pub mod filer;
pub mod sysdef;
#[doc(hidden)]
pub mod types;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::types::{
    bus::{Bus, BusTextElement, UiBus},
    container::{MessageContainer, UiMessageContainer},
    datapool::{
        Access, ContentType, Datapool, DatapoolKind, DatapoolList, Element, UiDatapool,
        UiDatapoolList, UiElement,
    },
    errors::{
        ConfigError, ConsistencyError, DefinitionError, FilerError, LoadError,
        PairLengthMismatch, SaveError, SortError,
    },
    hash::{CalcHash, StructuralHasher},
    index::{DatapoolIndex, Direction, ElementId, ElementIndex, ListIndex, MessageId, NodeIndex},
    message::{CanMessage, TxMethod, UiCanMessage},
    node::{BusType, ComInterface, Node, NodeProperties, UiNode},
    paired::PairedVec,
    protocol::{CanProtocol, CanProtocolType, UiCanProtocol},
    shared::{SharedDatapoolId, SharedDatapools},
    signal::{ByteOrder, CanSignal, MultiplexerType, UiCanSignal},
    system::{CoreDefinition, SystemDefinition, UiDefinition},
};

#[doc(inline)]
pub use crate::sysdef::{
    config::{DeviceCatalog, HandlerConfig},
    handler::SystemDefinitionHandler,
    repair::{RepairReport, run_drift_repair},
    sort::sort_definition_messages,
    verify::verify_definition,
};
