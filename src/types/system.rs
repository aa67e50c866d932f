//! The whole system definition: core tree, UI tree, lookups and paired edits.

use crate::types::{
    bus::{Bus, BusTextElement, UiBus},
    container::MessageContainer,
    datapool::{Element, UiElement},
    errors::DefinitionError,
    hash::{CalcHash, StructuralHasher},
    index::{DatapoolIndex, Direction, ElementId, ElementIndex, ListIndex, MessageId, NodeIndex},
    message::{CanMessage, UiCanMessage, assign_element_indices},
    node::{Node, UiNode},
    paired::PairedVec,
    protocol::{CanProtocol, CanProtocolType},
    shared::SharedDatapools,
    signal::CanSignal,
};

/// Engineering data: nodes and buses.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct CoreDefinition {
    pub nodes: Vec<Node>,
    pub buses: Vec<Bus>,
}

/// Presentation data mirroring [`CoreDefinition`], plus UI-only items.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct UiDefinition {
    pub nodes: Vec<UiNode>,
    pub buses: Vec<UiBus>,
    pub bus_text_elements: Vec<BusTextElement>,
    pub shared_datapools: SharedDatapools,
}

/// Core and UI tree of one project.
///
/// Both trees are public so a freshly parsed (possibly drifted) pair can be held and
/// inspected. Structural edits should go through the `add_*`/`remove_*` methods, which
/// change both trees together.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct SystemDefinition {
    pub core: CoreDefinition,
    pub ui: UiDefinition,
}

/// Mutable access to one message vector and the list backing its signals.
struct MessageSlot<'a> {
    node_name: String,
    messages: &'a mut Vec<CanMessage>,
    ui_messages: &'a mut Vec<UiCanMessage>,
    elements: &'a mut Vec<Element>,
    ui_elements: &'a mut Vec<UiElement>,
}

impl SystemDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural CRC-32 over core nodes, core buses, UI nodes, UI buses,
    /// bus text elements and shared Datapools, in that order.
    pub fn calc_hash(&self) -> u32 {
        let mut hasher = StructuralHasher::new();
        hasher.write_all(&self.core.nodes);
        hasher.write_all(&self.core.buses);
        hasher.write_all(&self.ui.nodes);
        hasher.write_all(&self.ui.buses);
        hasher.write_all(&self.ui.bus_text_elements);
        self.ui.shared_datapools.calc_hash(&mut hasher);
        hasher.finish()
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn get_node(&self, node: NodeIndex) -> Option<&Node> {
        self.core.nodes.get(node.0)
    }

    pub fn get_ui_node(&self, node: NodeIndex) -> Option<&UiNode> {
        self.ui.nodes.get(node.0)
    }

    pub fn get_node_index_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.core
            .nodes
            .iter()
            .position(|n| n.properties.name == name)
            .map(NodeIndex)
    }

    pub fn get_can_message_container(
        &self,
        node: NodeIndex,
        protocol: CanProtocolType,
        interface: usize,
    ) -> Option<&MessageContainer> {
        self.get_node(node)?
            .get_can_protocol(protocol)?
            .message_containers
            .get(interface)
    }

    pub fn get_can_message(&self, id: &MessageId) -> Option<&CanMessage> {
        self.get_can_message_container(id.node, id.protocol, id.interface)?
            .messages(id.direction)
            .get(id.message)
    }

    /// UI part of a message. The protocol is resolved on the core node; the UI node uses
    /// the same protocol position.
    pub fn get_ui_can_message(&self, id: &MessageId) -> Option<&UiCanMessage> {
        let protocol_index = self.get_node(id.node)?.can_protocol_index(id.protocol)?;
        self.get_ui_node(id.node)?
            .can_protocols
            .get(protocol_index)?
            .message_containers
            .get(id.interface)?
            .messages(id.direction)
            .get(id.message)
    }

    pub fn get_can_signal(&self, id: &MessageId, signal: usize) -> Option<&CanSignal> {
        self.get_can_message(id)?.signals.get(signal)
    }

    /// Address of the Datapool element backing a signal.
    pub fn get_signal_element_id(&self, id: &MessageId, signal: usize) -> Option<ElementId> {
        let node = self.get_node(id.node)?;
        let protocol = node.get_can_protocol(id.protocol)?;
        let datapool = node.datapools.get(protocol.datapool_index)?;
        let list = CanProtocol::list_index(datapool, id.interface, id.direction)?;
        let signal = self.get_can_signal(id, signal)?;
        Some(ElementId {
            node: id.node,
            datapool: DatapoolIndex(protocol.datapool_index),
            list: ListIndex(list),
            element: ElementIndex(signal.element_index),
        })
    }

    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.get_node(id.node)?
            .datapools
            .get(id.datapool.0)?
            .lists
            .get(id.list.0)?
            .elements
            .get(id.element.0)
    }

    /// Element holding value, range and scaling of a signal.
    pub fn get_signal_element(&self, id: &MessageId, signal: usize) -> Option<&Element> {
        self.get_element(&self.get_signal_element_id(id, signal)?)
    }

    // ------------------------------------------------------------------
    // Paired edits
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, node: Node, ui_node: UiNode) -> Result<NodeIndex, DefinitionError> {
        let mut nodes = PairedVec::new(&mut self.core.nodes, &mut self.ui.nodes)?;
        nodes.push(node, ui_node);
        Ok(NodeIndex(nodes.len() - 1))
    }

    pub fn add_bus(&mut self, bus: Bus, ui_bus: UiBus) -> Result<usize, DefinitionError> {
        let mut buses = PairedVec::new(&mut self.core.buses, &mut self.ui.buses)?;
        buses.push(bus, ui_bus);
        Ok(buses.len() - 1)
    }

    /// Appends a message to a container and inserts the elements backing its signals
    /// behind the elements of the existing messages. Signal element indices of the whole
    /// direction are rewritten afterwards.
    ///
    /// `elements` must hold one element per signal, in signal order.
    pub fn add_can_message(
        &mut self,
        node: NodeIndex,
        protocol: CanProtocolType,
        interface: usize,
        direction: Direction,
        message: (CanMessage, UiCanMessage),
        elements: Vec<(Element, UiElement)>,
    ) -> Result<MessageId, DefinitionError> {
        let (core_message, ui_message) = message;
        if core_message.signals.len() != ui_message.signals.len()
            || core_message.signals.len() != elements.len()
        {
            return Err(DefinitionError::SignalElementMismatch {
                message: core_message.name,
                signals: core_message.signals.len(),
                ui_signals: ui_message.signals.len(),
                elements: elements.len(),
            });
        }

        let slot = self.message_slot(node, protocol, interface, direction)?;
        let mut messages = PairedVec::new(slot.messages, slot.ui_messages)?;
        let mut list = PairedVec::new(slot.elements, slot.ui_elements)?;

        let position: usize = messages.core().iter().map(|m| m.signals.len()).sum();
        if position > list.len() {
            return Err(DefinitionError::ListTooShort {
                node: slot.node_name,
                direction,
                list_len: list.len(),
                required: position,
            });
        }
        for (offset, (element, ui_element)) in elements.into_iter().enumerate() {
            if list.insert(position + offset, element, ui_element).is_err() {
                return Err(DefinitionError::ListTooShort {
                    node: slot.node_name,
                    direction,
                    list_len: list.len(),
                    required: position + offset,
                });
            }
        }

        messages.push(core_message, ui_message);
        assign_element_indices(messages.core_mut());
        Ok(MessageId::new(
            node.0,
            protocol,
            interface,
            direction,
            messages.len() - 1,
        ))
    }

    /// Removes a message together with the elements its signals reference and rewrites
    /// the signal element indices of the remaining messages.
    pub fn remove_can_message(
        &mut self,
        id: &MessageId,
    ) -> Result<(CanMessage, UiCanMessage), DefinitionError> {
        let slot = self.message_slot(id.node, id.protocol, id.interface, id.direction)?;
        let mut messages = PairedVec::new(slot.messages, slot.ui_messages)?;
        let mut list = PairedVec::new(slot.elements, slot.ui_elements)?;

        let Some((message, _)) = messages.get(id.message) else {
            return Err(DefinitionError::MessageMissing { index: id.message });
        };
        let mut indices: Vec<usize> = message.signals.iter().map(|s| s.element_index).collect();
        indices.sort_unstable();
        indices.dedup();
        if let Some(&highest) = indices.last() {
            if highest >= list.len() {
                return Err(DefinitionError::ListTooShort {
                    node: slot.node_name,
                    direction: id.direction,
                    list_len: list.len(),
                    required: highest + 1,
                });
            }
        }

        for index in indices.into_iter().rev() {
            list.remove(index);
        }
        let removed = messages
            .remove(id.message)
            .ok_or(DefinitionError::MessageMissing { index: id.message })?;
        assign_element_indices(messages.core_mut());
        Ok(removed)
    }

    fn message_slot(
        &mut self,
        node: NodeIndex,
        protocol: CanProtocolType,
        interface: usize,
        direction: Direction,
    ) -> Result<MessageSlot<'_>, DefinitionError> {
        let (Some(core_node), Some(ui_node)) =
            (self.core.nodes.get_mut(node.0), self.ui.nodes.get_mut(node.0))
        else {
            return Err(DefinitionError::NodeMissing { index: node.0 });
        };
        let node_name = core_node.properties.name.clone();
        let protocol_missing = |node_name: &str| DefinitionError::ProtocolMissing {
            node: node_name.to_string(),
            protocol: protocol.to_string(),
        };
        let container_missing = |node_name: &str| DefinitionError::ContainerMissing {
            node: node_name.to_string(),
            interface,
        };
        let list_missing = |node_name: &str| DefinitionError::ListMissing {
            node: node_name.to_string(),
            direction,
            interface,
        };

        let Some(protocol_index) = core_node.can_protocol_index(protocol) else {
            return Err(protocol_missing(&node_name));
        };
        let Node {
            datapools,
            com_protocols,
            ..
        } = core_node;
        let UiNode {
            datapools: ui_datapools,
            can_protocols: ui_protocols,
            ..
        } = ui_node;

        let (Some(core_protocol), Some(ui_protocol)) = (
            com_protocols.get_mut(protocol_index),
            ui_protocols.get_mut(protocol_index),
        ) else {
            return Err(protocol_missing(&node_name));
        };
        let datapool_index = core_protocol.datapool_index;
        let (Some(datapool), Some(ui_datapool)) = (
            datapools.get_mut(datapool_index),
            ui_datapools.get_mut(datapool_index),
        ) else {
            return Err(list_missing(&node_name));
        };
        let Some(list_index) = CanProtocol::list_index(datapool, interface, direction) else {
            return Err(list_missing(&node_name));
        };
        let (Some(list), Some(ui_list)) = (
            datapool.lists.get_mut(list_index),
            ui_datapool.lists.get_mut(list_index),
        ) else {
            return Err(list_missing(&node_name));
        };
        let (Some(container), Some(ui_container)) = (
            core_protocol.message_containers.get_mut(interface),
            ui_protocol.message_containers.get_mut(interface),
        ) else {
            return Err(container_missing(&node_name));
        };

        Ok(MessageSlot {
            node_name,
            messages: container.messages_mut(direction),
            ui_messages: ui_container.messages_mut(direction),
            elements: &mut list.elements,
            ui_elements: &mut ui_list.elements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        container::UiMessageContainer,
        datapool::{Datapool, DatapoolKind, DatapoolList, UiDatapool, UiDatapoolList},
        node::{BusType, ComInterface},
        protocol::UiCanProtocol,
        signal::UiCanSignal,
    };

    fn com_node() -> (Node, UiNode) {
        let mut node = Node::new("ECU1", "ESX3CM");
        node.properties.com_interfaces = vec![ComInterface {
            interface_type: BusType::Can,
            ..Default::default()
        }];
        node.datapools = vec![Datapool {
            lists: vec![DatapoolList::new("Tx"), DatapoolList::new("Rx")],
            ..Datapool::new("COM", DatapoolKind::Com)
        }];
        node.com_protocols = vec![CanProtocol {
            protocol_type: CanProtocolType::Layer2,
            datapool_index: 0,
            message_containers: vec![MessageContainer::default()],
        }];
        let ui_node = UiNode {
            datapools: vec![UiDatapool {
                lists: vec![UiDatapoolList::default(), UiDatapoolList::default()],
            }],
            can_protocols: vec![UiCanProtocol {
                message_containers: vec![UiMessageContainer::default()],
            }],
            ..Default::default()
        };
        (node, ui_node)
    }

    fn message(name: &str, signals: usize) -> ((CanMessage, UiCanMessage), Vec<(Element, UiElement)>) {
        let core = CanMessage {
            signals: vec![CanSignal::default(); signals],
            ..CanMessage::new(name, 0x100)
        };
        let ui = UiCanMessage {
            signals: vec![UiCanSignal::default(); signals],
        };
        let elements = (0..signals)
            .map(|i| (Element::new(&format!("{name}.sig{i}")), UiElement::default()))
            .collect();
        ((core, ui), elements)
    }

    fn tx_names(def: &SystemDefinition) -> Vec<String> {
        def.core.nodes[0].datapools[0].lists[0]
            .elements
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn test_add_and_lookup_message() {
        let mut def = SystemDefinition::new();
        let (node, ui_node) = com_node();
        let node_index = def.add_node(node, ui_node).unwrap();

        let (msg, elements) = message("Engine", 2);
        let id = def
            .add_can_message(node_index, CanProtocolType::Layer2, 0, Direction::Tx, msg, elements)
            .unwrap();
        let (msg, elements) = message("Brake", 1);
        let second = def
            .add_can_message(node_index, CanProtocolType::Layer2, 0, Direction::Tx, msg, elements)
            .unwrap();

        assert_eq!(id.message, 0);
        assert_eq!(second.message, 1);
        assert_eq!(tx_names(&def), vec!["Engine.sig0", "Engine.sig1", "Brake.sig0"]);
        assert_eq!(def.get_can_signal(&second, 0).unwrap().element_index, 2);
        assert_eq!(def.get_signal_element(&second, 0).unwrap().name, "Brake.sig0");
        assert_eq!(def.get_ui_can_message(&id).unwrap().signals.len(), 2);
        assert!(def.get_can_message(&MessageId { message: 2, ..id }).is_none());
    }

    #[test]
    fn test_remove_message_reindexes() {
        let mut def = SystemDefinition::new();
        let (node, ui_node) = com_node();
        let node_index = def.add_node(node, ui_node).unwrap();
        for (name, count) in [("A", 1), ("B", 2), ("C", 1)] {
            let (msg, elements) = message(name, count);
            def.add_can_message(node_index, CanProtocolType::Layer2, 0, Direction::Tx, msg, elements)
                .unwrap();
        }

        let id = MessageId::new(0, CanProtocolType::Layer2, 0, Direction::Tx, 1);
        let (removed, _) = def.remove_can_message(&id).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(tx_names(&def), vec!["A.sig0", "C.sig0"]);
        assert_eq!(def.get_signal_element(&id, 0).unwrap().name, "C.sig0");
        assert_eq!(
            def.ui.nodes[0].datapools[0].lists[0].elements.len(),
            def.core.nodes[0].datapools[0].lists[0].elements.len()
        );
    }

    #[test]
    fn test_add_message_errors() {
        let mut def = SystemDefinition::new();
        let (node, ui_node) = com_node();
        def.add_node(node, ui_node).unwrap();

        let ((core, ui), _) = message("Bad", 2);
        let err = def
            .add_can_message(NodeIndex(0), CanProtocolType::Layer2, 0, Direction::Rx, (core, ui), vec![])
            .unwrap_err();
        assert!(matches!(err, DefinitionError::SignalElementMismatch { elements: 0, .. }));

        let (msg, elements) = message("NoProto", 0);
        let err = def
            .add_can_message(NodeIndex(0), CanProtocolType::Ecos, 0, Direction::Rx, msg, elements)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ProtocolMissing { .. }));

        let (msg, elements) = message("NoList", 0);
        let err = def
            .add_can_message(NodeIndex(0), CanProtocolType::Layer2, 1, Direction::Tx, msg, elements)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ListMissing { interface: 1, .. }));
    }

    #[test]
    fn test_add_node_refuses_drifted_tree() {
        let mut def = SystemDefinition::new();
        def.core.nodes.push(Node::default());
        let err = def.add_node(Node::default(), UiNode::default()).unwrap_err();
        assert!(matches!(err, DefinitionError::PairMismatch(_)));
    }

    #[test]
    fn test_hash_tracks_ui_changes() {
        let mut def = SystemDefinition::new();
        let (node, ui_node) = com_node();
        def.add_node(node, ui_node).unwrap();
        let before = def.calc_hash();
        assert_eq!(before, def.clone().calc_hash());

        def.ui.nodes[0].x = 42.0;
        assert_ne!(before, def.calc_hash());
    }
}
