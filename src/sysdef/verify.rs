//! Cardinality check between the core tree and the UI tree.

use log::error;

use crate::types::{
    container::{MessageContainer, UiMessageContainer},
    datapool::{Datapool, UiDatapool},
    errors::ConsistencyError,
    index::Direction,
    node::{Node, UiNode},
    system::SystemDefinition,
};

/// Checks that every core vector has a UI mirror of the same length.
///
/// Checks run in a fixed order (nodes, buses, then per node Datapools, lists, elements,
/// protocols, containers, Tx/Rx messages and signals) and stop at the first mismatch,
/// which is logged and returned. The definition is not modified.
pub fn verify_definition(definition: &SystemDefinition) -> Result<(), ConsistencyError> {
    let result = check_definition(definition);
    if let Err(err) = &result {
        error!("{err}");
    }
    result
}

fn check_definition(definition: &SystemDefinition) -> Result<(), ConsistencyError> {
    let (core, ui) = (&definition.core, &definition.ui);
    if ui.nodes.len() != core.nodes.len() {
        return Err(ConsistencyError::NodeCount {
            ui: ui.nodes.len(),
            core: core.nodes.len(),
        });
    }
    if ui.buses.len() != core.buses.len() {
        return Err(ConsistencyError::BusCount {
            ui: ui.buses.len(),
            core: core.buses.len(),
        });
    }
    for (node, ui_node) in core.nodes.iter().zip(ui.nodes.iter()) {
        check_datapools(node, ui_node)?;
        check_protocols(node, ui_node)?;
    }
    Ok(())
}

fn check_datapools(node: &Node, ui_node: &UiNode) -> Result<(), ConsistencyError> {
    if ui_node.datapools.len() != node.datapools.len() {
        return Err(ConsistencyError::DatapoolCount {
            node: node.name().to_string(),
            ui: ui_node.datapools.len(),
            core: node.datapools.len(),
        });
    }
    for (datapool, ui_datapool) in node.datapools.iter().zip(ui_node.datapools.iter()) {
        check_lists(node.name(), datapool, ui_datapool)?;
    }
    Ok(())
}

fn check_lists(
    node: &str,
    datapool: &Datapool,
    ui_datapool: &UiDatapool,
) -> Result<(), ConsistencyError> {
    if ui_datapool.lists.len() != datapool.lists.len() {
        return Err(ConsistencyError::ListCount {
            node: node.to_string(),
            datapool: datapool.name.clone(),
            ui: ui_datapool.lists.len(),
            core: datapool.lists.len(),
        });
    }
    for (list, ui_list) in datapool.lists.iter().zip(ui_datapool.lists.iter()) {
        if ui_list.elements.len() != list.elements.len() {
            return Err(ConsistencyError::ElementCount {
                node: node.to_string(),
                datapool: datapool.name.clone(),
                list: list.name.clone(),
                ui: ui_list.elements.len(),
                core: list.elements.len(),
            });
        }
    }
    Ok(())
}

fn check_protocols(node: &Node, ui_node: &UiNode) -> Result<(), ConsistencyError> {
    if ui_node.can_protocols.len() != node.com_protocols.len() {
        return Err(ConsistencyError::ProtocolCount {
            node: node.name().to_string(),
            ui: ui_node.can_protocols.len(),
            core: node.com_protocols.len(),
        });
    }
    for (protocol, ui_protocol) in node.com_protocols.iter().zip(ui_node.can_protocols.iter()) {
        if ui_protocol.message_containers.len() != protocol.message_containers.len() {
            return Err(ConsistencyError::ContainerCount {
                node: node.name().to_string(),
                ui: ui_protocol.message_containers.len(),
                core: protocol.message_containers.len(),
            });
        }
        for (container, ui_container) in protocol
            .message_containers
            .iter()
            .zip(ui_protocol.message_containers.iter())
        {
            check_container(node.name(), container, ui_container)?;
        }
    }
    Ok(())
}

fn check_container(
    node: &str,
    container: &MessageContainer,
    ui_container: &UiMessageContainer,
) -> Result<(), ConsistencyError> {
    for direction in [Direction::Tx, Direction::Rx] {
        let (messages, ui_messages) = (container.messages(direction), ui_container.messages(direction));
        if ui_messages.len() != messages.len() {
            return Err(ConsistencyError::MessageCount {
                node: node.to_string(),
                direction,
                ui: ui_messages.len(),
                core: messages.len(),
            });
        }
    }
    for direction in [Direction::Tx, Direction::Rx] {
        let (messages, ui_messages) = (container.messages(direction), ui_container.messages(direction));
        for (message, ui_message) in messages.iter().zip(ui_messages.iter()) {
            if ui_message.signals.len() != message.signals.len() {
                return Err(ConsistencyError::SignalCount {
                    node: node.to_string(),
                    direction,
                    message: message.name.clone(),
                    ui: ui_message.signals.len(),
                    core: message.signals.len(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        bus::{Bus, UiBus},
        datapool::{DatapoolList, UiDatapoolList, UiElement, Element},
        message::{CanMessage, UiCanMessage},
        protocol::{CanProtocol, UiCanProtocol},
        signal::{CanSignal, UiCanSignal},
    };

    fn consistent() -> SystemDefinition {
        let mut def = SystemDefinition::new();
        let mut node = Node::new("ECU1", "ESX3CM");
        node.datapools = vec![Datapool {
            lists: vec![DatapoolList {
                elements: vec![Element::new("a")],
                ..DatapoolList::new("Tx")
            }],
            ..Default::default()
        }];
        node.com_protocols = vec![CanProtocol {
            message_containers: vec![MessageContainer {
                tx_messages: vec![CanMessage {
                    signals: vec![CanSignal::default()],
                    ..CanMessage::new("M1", 1)
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];
        let ui_node = UiNode {
            datapools: vec![UiDatapool {
                lists: vec![UiDatapoolList {
                    elements: vec![UiElement::default()],
                    ..Default::default()
                }],
            }],
            can_protocols: vec![UiCanProtocol {
                message_containers: vec![UiMessageContainer {
                    tx_messages: vec![UiCanMessage {
                        signals: vec![UiCanSignal::default()],
                    }],
                    ..Default::default()
                }],
            }],
            ..Default::default()
        };
        def.add_node(node, ui_node).unwrap();
        def.add_bus(Bus::default(), UiBus::default()).unwrap();
        def
    }

    #[test]
    fn test_consistent_definition_passes() {
        assert_eq!(verify_definition(&consistent()), Ok(()));
        assert_eq!(verify_definition(&SystemDefinition::new()), Ok(()));
    }

    #[test]
    fn test_node_count_mismatch() {
        let mut def = consistent();
        def.core.nodes.push(Node::new("ECU2", "ESX3CM"));
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::NodeCount { ui: 1, core: 2 })
        );
    }

    #[test]
    fn test_bus_checked_before_node_content() {
        let mut def = consistent();
        def.ui.buses.clear();
        def.ui.nodes[0].datapools.clear();
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::BusCount { ui: 0, core: 1 })
        );
    }

    #[test]
    fn test_datapool_count_mismatch() {
        let mut def = consistent();
        def.ui.nodes[0].datapools.push(UiDatapool::default());
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::DatapoolCount {
                node: "ECU1".to_string(),
                ui: 2,
                core: 1,
            })
        );
    }

    #[test]
    fn test_list_count_mismatch() {
        let mut def = consistent();
        def.core.nodes[0].datapools[0].name = "COM".to_string();
        def.ui.nodes[0].datapools[0].lists.clear();
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::ListCount {
                node: "ECU1".to_string(),
                datapool: "COM".to_string(),
                ui: 0,
                core: 1,
            })
        );
    }

    #[test]
    fn test_protocol_count_mismatch() {
        let mut def = consistent();
        def.ui.nodes[0].can_protocols.push(UiCanProtocol::default());
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::ProtocolCount {
                node: "ECU1".to_string(),
                ui: 2,
                core: 1,
            })
        );
    }

    #[test]
    fn test_container_count_mismatch() {
        let mut def = consistent();
        def.core.nodes[0].com_protocols[0]
            .message_containers
            .push(MessageContainer::default());
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::ContainerCount {
                node: "ECU1".to_string(),
                ui: 1,
                core: 2,
            })
        );
    }

    #[test]
    fn test_first_mismatch_wins() {
        // Datapools are checked before protocols, protocols before containers
        let mut def = consistent();
        def.ui.nodes[0].can_protocols.clear();
        def.core.nodes[0].com_protocols[0]
            .message_containers
            .push(MessageContainer::default());
        def.ui.nodes[0].datapools.clear();
        assert!(matches!(
            verify_definition(&def),
            Err(ConsistencyError::DatapoolCount { ui: 0, core: 1, .. })
        ));

        def.ui.nodes[0].datapools = consistent().ui.nodes[0].datapools.clone();
        assert!(matches!(
            verify_definition(&def),
            Err(ConsistencyError::ProtocolCount { ui: 0, core: 1, .. })
        ));

        def.ui.nodes[0].can_protocols = consistent().ui.nodes[0].can_protocols.clone();
        assert!(matches!(
            verify_definition(&def),
            Err(ConsistencyError::ContainerCount { ui: 1, core: 2, .. })
        ));
    }

    #[test]
    fn test_element_count_mismatch() {
        let mut def = consistent();
        def.ui.nodes[0].datapools[0].lists[0].elements.push(UiElement::default());
        let err = verify_definition(&def).unwrap_err();
        assert!(matches!(err, ConsistencyError::ElementCount { ui: 2, core: 1, .. }));
        assert_eq!(
            err.to_string(),
            "UI part does not match core part: Number of Datapool list elements of list ECU1::::Tx (UI 2 vs. core 1)."
        );
    }

    #[test]
    fn test_signal_count_mismatch() {
        let mut def = consistent();
        def.ui.nodes[0].can_protocols[0].message_containers[0].tx_messages[0]
            .signals
            .clear();
        assert_eq!(
            verify_definition(&def),
            Err(ConsistencyError::SignalCount {
                node: "ECU1".to_string(),
                direction: Direction::Tx,
                message: "M1".to_string(),
                ui: 0,
                core: 1,
            })
        );
    }

    #[test]
    fn test_rx_message_count_mismatch() {
        let mut def = consistent();
        def.core.nodes[0].com_protocols[0].message_containers[0]
            .rx_messages
            .push(CanMessage::new("R1", 2));
        assert!(matches!(
            verify_definition(&def),
            Err(ConsistencyError::MessageCount {
                direction: Direction::Rx,
                ui: 0,
                core: 1,
                ..
            })
        ));
    }
}
