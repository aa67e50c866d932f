use crate::types::{
    hash::{CalcHash, StructuralHasher},
    index::Direction,
    message::{CanMessage, UiCanMessage, assign_element_indices},
};

/// Tx and Rx messages of one node, one protocol and one CAN interface.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MessageContainer {
    /// Whether the protocol is active on the interface this container belongs to.
    pub used_by_interface: bool,
    pub tx_messages: Vec<CanMessage>,
    pub rx_messages: Vec<CanMessage>,
}

impl MessageContainer {
    pub fn messages(&self, direction: Direction) -> &Vec<CanMessage> {
        match direction {
            Direction::Tx => &self.tx_messages,
            Direction::Rx => &self.rx_messages,
        }
    }

    pub fn messages_mut(&mut self, direction: Direction) -> &mut Vec<CanMessage> {
        match direction {
            Direction::Tx => &mut self.tx_messages,
            Direction::Rx => &mut self.rx_messages,
        }
    }

    /// Re-derives the element index of every signal from message order.
    ///
    /// Tx and Rx signals are backed by different lists, so both directions start at 0.
    pub fn recalc_data_element_indices(&mut self) {
        assign_element_indices(&mut self.tx_messages);
        assign_element_indices(&mut self.rx_messages);
    }

    /// Number of list elements occupied by the signals of one direction.
    pub fn signal_count(&self, direction: Direction) -> usize {
        self.messages(direction)
            .iter()
            .map(|m| m.signals.len())
            .sum()
    }
}

impl CalcHash for MessageContainer {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_bool(self.used_by_interface);
        hasher.write_all(&self.tx_messages);
        hasher.write_all(&self.rx_messages);
    }
}

/// UI mirror of a [`MessageContainer`].
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiMessageContainer {
    pub tx_messages: Vec<UiCanMessage>,
    pub rx_messages: Vec<UiCanMessage>,
}

impl UiMessageContainer {
    pub fn messages(&self, direction: Direction) -> &Vec<UiCanMessage> {
        match direction {
            Direction::Tx => &self.tx_messages,
            Direction::Rx => &self.rx_messages,
        }
    }

    pub fn messages_mut(&mut self, direction: Direction) -> &mut Vec<UiCanMessage> {
        match direction {
            Direction::Tx => &mut self.tx_messages,
            Direction::Rx => &mut self.rx_messages,
        }
    }
}

impl CalcHash for UiMessageContainer {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_all(&self.tx_messages);
        hasher.write_all(&self.rx_messages);
    }
}
