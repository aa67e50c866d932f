use std::fmt;

use crate::types::{
    container::{MessageContainer, UiMessageContainer},
    datapool::Datapool,
    hash::{CalcHash, StructuralHasher},
    index::Direction,
};

/// CAN protocol a Datapool is bound to.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CanProtocolType {
    /// Plain layer 2 messages.
    #[default]
    Layer2,
    /// Safety protocol, ECeS variant.
    Eces,
    /// Safety protocol, ECoS variant.
    Ecos,
}

impl CanProtocolType {
    pub fn to_str(self) -> &'static str {
        match self {
            CanProtocolType::Layer2 => "layer2",
            CanProtocolType::Eces => "eces",
            CanProtocolType::Ecos => "ecos",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "layer2" => Some(CanProtocolType::Layer2),
            "eces" => Some(CanProtocolType::Eces),
            "ecos" => Some(CanProtocolType::Ecos),
            _ => None,
        }
    }
}

impl fmt::Display for CanProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Core binding of a COM Datapool to a CAN protocol.
///
/// Holds one [`MessageContainer`] per CAN interface of the node. Container `i` is backed
/// by the Tx list `2 * i` and the Rx list `2 * i + 1` of the bound Datapool.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct CanProtocol {
    pub protocol_type: CanProtocolType,
    /// Index of the bound Datapool in the node's Datapool vector.
    pub datapool_index: usize,
    pub message_containers: Vec<MessageContainer>,
}

impl CanProtocol {
    /// Index of the list backing the messages of `interface` in `direction`,
    /// or `None` if the Datapool has no such list.
    pub fn list_index(datapool: &Datapool, interface: usize, direction: Direction) -> Option<usize> {
        let index: usize = interface * 2 + usize::from(!direction.is_tx());
        (index < datapool.lists.len()).then_some(index)
    }
}

impl CalcHash for CanProtocol {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(self.protocol_type.to_str());
        hasher.write_usize(self.datapool_index);
        hasher.write_all(&self.message_containers);
    }
}

/// UI mirror of a [`CanProtocol`].
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiCanProtocol {
    pub message_containers: Vec<UiMessageContainer>,
}

impl CalcHash for UiCanProtocol {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_all(&self.message_containers);
    }
}
