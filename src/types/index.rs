//! Index types used to address entities of a system definition.
//!
//! Entities are never referenced by pointer: a node is a position in the node vector,
//! a signal's element is a position in its list's element vector, and so on. The same
//! indices are valid for the core tree and for the UI tree.

use std::fmt;

use crate::types::protocol::CanProtocolType;

/// Position of a node in both node vectors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// Position of a Datapool inside its node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct DatapoolIndex(pub usize);

/// Position of a list inside its Datapool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct ListIndex(pub usize);

/// Position of an element inside its list.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct ElementIndex(pub usize);

/// Full address of one Datapool list element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct ElementId {
    pub node: NodeIndex,
    pub datapool: DatapoolIndex,
    pub list: ListIndex,
    pub element: ElementIndex,
}

/// Transmission direction of a message relative to its node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Direction {
    #[default]
    Tx,
    Rx,
}

impl Direction {
    pub fn is_tx(self) -> bool {
        self == Direction::Tx
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Direction::Tx => "Tx",
            Direction::Rx => "Rx",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Identifies one CAN message: node, protocol, interface (message container),
/// direction and the position inside the Tx or Rx vector.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MessageId {
    pub node: NodeIndex,
    pub protocol: CanProtocolType,
    pub interface: usize,
    pub direction: Direction,
    pub message: usize,
}

impl MessageId {
    pub fn new(
        node: usize,
        protocol: CanProtocolType,
        interface: usize,
        direction: Direction,
        message: usize,
    ) -> Self {
        MessageId {
            node: NodeIndex(node),
            protocol,
            interface,
            direction,
            message,
        }
    }
}
