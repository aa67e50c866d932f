use std::path::Path;

use log::debug;

use crate::filer::model::{
    XmlBus, XmlBusTextElement, XmlBusTextElements, XmlBuses, XmlComInterface, XmlComInterfaces,
    XmlComProtocol, XmlComProtocols, XmlDatapool, XmlDatapools, XmlElement, XmlElements,
    XmlGuiOnly, XmlList, XmlLists, XmlMessage, XmlMessageContainer, XmlMessageContainers,
    XmlMessages, XmlNode, XmlNodes, XmlPoint, XmlPoints, XmlSharedDatapool, XmlSharedDatapools,
    XmlSharedGroup, XmlSharedGroups, XmlSignal, XmlSignals, XmlSystemDefinition,
    XmlSystemDefinitionUi, XmlUiBus, XmlUiBuses, XmlUiCanProtocol, XmlUiCanProtocols,
    XmlUiDatapool, XmlUiDatapools, XmlUiElement, XmlUiElements, XmlUiList, XmlUiLists,
    XmlUiMessage, XmlUiMessageContainer, XmlUiMessageContainers, XmlUiMessages, XmlUiNode,
    XmlUiNodes, XmlUiSignal, XmlUiSignals,
};
use crate::filer::{FILE_VERSION, LEGACY_FILE_VERSION, UI_FILE_VERSION, serialize, write_file};
use crate::types::{
    bus::{Bus, BusTextElement, UiBus},
    container::{MessageContainer, UiMessageContainer},
    datapool::{Datapool, DatapoolList, Element, UiDatapool},
    errors::FilerError,
    message::{CanMessage, UiCanMessage},
    node::{ComInterface, Node, UiNode},
    protocol::{CanProtocol, UiCanProtocol},
    shared::SharedDatapools,
    signal::CanSignal,
    system::{CoreDefinition, SystemDefinition, UiDefinition},
};

/// Writes the core file.
pub fn save_core(core: &CoreDefinition, path: &Path, indent: usize) -> Result<(), FilerError> {
    let document = XmlSystemDefinition {
        file_version: FILE_VERSION,
        nodes: build_nodes(&core.nodes),
        buses: build_buses(&core.buses),
        gui_only: None,
    };
    write_file(path, &serialize(path, &document, indent)?)?;
    debug!("Wrote core file '{}'", path.display());
    Ok(())
}

/// Writes the UI file. Shared Datapools are not part of it.
pub fn save_ui(ui: &UiDefinition, path: &Path, indent: usize) -> Result<(), FilerError> {
    let document = XmlSystemDefinitionUi {
        file_version: UI_FILE_VERSION,
        nodes: build_ui_nodes(&ui.nodes),
        buses: build_ui_buses(&ui.buses),
        bus_text_elements: build_bus_text_elements(&ui.bus_text_elements),
    };
    write_file(path, &serialize(path, &document, indent)?)?;
    debug!("Wrote UI file '{}'", path.display());
    Ok(())
}

pub fn save_shared_datapools(
    shared: &SharedDatapools,
    path: &Path,
    indent: usize,
) -> Result<(), FilerError> {
    let document = XmlSharedDatapools {
        file_version: UI_FILE_VERSION,
        groups: XmlSharedGroups {
            items: shared
                .groups
                .iter()
                .map(|group| XmlSharedGroup {
                    items: group
                        .iter()
                        .map(|id| XmlSharedDatapool {
                            node: id.node,
                            datapool: id.datapool,
                        })
                        .collect(),
                })
                .collect(),
        },
    };
    write_file(path, &serialize(path, &document, indent)?)?;
    debug!("Wrote shared Datapool file '{}'", path.display());
    Ok(())
}

/// Writes both trees into one file of the version 2 format. Shared Datapools are not
/// supported by that format and are dropped.
pub fn save_legacy(
    definition: &SystemDefinition,
    path: &Path,
    indent: usize,
) -> Result<(), FilerError> {
    let document = XmlSystemDefinition {
        file_version: LEGACY_FILE_VERSION,
        nodes: build_nodes(&definition.core.nodes),
        buses: build_buses(&definition.core.buses),
        gui_only: Some(XmlGuiOnly {
            nodes: build_ui_nodes(&definition.ui.nodes),
            buses: build_ui_buses(&definition.ui.buses),
            bus_text_elements: build_bus_text_elements(&definition.ui.bus_text_elements),
        }),
    };
    write_file(path, &serialize(path, &document, indent)?)?;
    debug!("Wrote legacy system definition '{}'", path.display());
    Ok(())
}

// --- Core part ---

fn build_nodes(nodes: &[Node]) -> XmlNodes {
    XmlNodes {
        items: nodes.iter().map(build_node).collect(),
    }
}

fn build_node(node: &Node) -> XmlNode {
    XmlNode {
        name: node.properties.name.clone(),
        device_type: node.properties.device_type.clone(),
        comment: node.properties.comment.clone(),
        com_interfaces: XmlComInterfaces {
            items: node
                .properties
                .com_interfaces
                .iter()
                .map(build_com_interface)
                .collect(),
        },
        datapools: XmlDatapools {
            items: node.datapools.iter().map(build_datapool).collect(),
        },
        com_protocols: XmlComProtocols {
            items: node.com_protocols.iter().map(build_com_protocol).collect(),
        },
    }
}

fn build_com_interface(interface: &ComInterface) -> XmlComInterface {
    XmlComInterface {
        interface_type: interface.interface_type.to_str().to_string(),
        interface_number: interface.interface_number,
        node_id: interface.node_id,
        bus_index: interface.bus_index,
    }
}

fn build_datapool(datapool: &Datapool) -> XmlDatapool {
    let (major, minor, release) = datapool.version;
    XmlDatapool {
        name: datapool.name.clone(),
        kind: datapool.kind.to_str().to_string(),
        version: format!("{major}.{minor}.{release}"),
        is_safety: datapool.is_safety,
        nvm_start_address: datapool.nvm_start_address,
        nvm_size: datapool.nvm_size,
        comment: datapool.comment.clone(),
        lists: XmlLists {
            items: datapool.lists.iter().map(build_list).collect(),
        },
    }
}

fn build_list(list: &DatapoolList) -> XmlList {
    XmlList {
        name: list.name.clone(),
        nvm_size: list.nvm_size,
        nvm_address: list.nvm_address,
        nvm_crc_active: list.nvm_crc_active,
        comment: list.comment.clone(),
        elements: XmlElements {
            items: list.elements.iter().map(build_element).collect(),
        },
    }
}

fn build_element(element: &Element) -> XmlElement {
    XmlElement {
        name: element.name.clone(),
        content_type: element.content_type.to_str().to_string(),
        array_size: element.array_size,
        factor: element.factor,
        offset: element.offset,
        unit: element.unit.clone(),
        min: element.min,
        max: element.max,
        value: element.value,
        access: element.access.to_str().to_string(),
        diag_event_call: element.diag_event_call,
        nvm_address: element.nvm_address,
        comment: element.comment.clone(),
    }
}

fn build_com_protocol(protocol: &CanProtocol) -> XmlComProtocol {
    XmlComProtocol {
        protocol_type: protocol.protocol_type.to_str().to_string(),
        datapool_index: protocol.datapool_index,
        message_containers: XmlMessageContainers {
            items: protocol
                .message_containers
                .iter()
                .map(build_message_container)
                .collect(),
        },
    }
}

fn build_message_container(container: &MessageContainer) -> XmlMessageContainer {
    XmlMessageContainer {
        used_by_interface: container.used_by_interface,
        tx_messages: build_messages(&container.tx_messages),
        rx_messages: build_messages(&container.rx_messages),
    }
}

fn build_messages(messages: &[CanMessage]) -> XmlMessages {
    XmlMessages {
        items: messages.iter().map(build_message).collect(),
    }
}

fn build_message(message: &CanMessage) -> XmlMessage {
    XmlMessage {
        name: message.name.clone(),
        can_id: message.can_id,
        is_extended: message.is_extended,
        dlc: message.dlc,
        tx_method: message.tx_method.to_str().to_string(),
        cycle_time_ms: message.cycle_time_ms,
        delay_time_ms: message.delay_time_ms,
        timeout_ms: message.timeout_ms,
        comment: message.comment.clone(),
        signals: XmlSignals {
            items: message.signals.iter().map(build_signal).collect(),
        },
    }
}

fn build_signal(signal: &CanSignal) -> XmlSignal {
    XmlSignal {
        byte_order: signal.byte_order.to_str().to_string(),
        bit_start: signal.bit_start,
        bit_length: signal.bit_length,
        multiplexer_type: signal.multiplexer_type.to_str().to_string(),
        multiplexer_value: signal.multiplexer_value,
        element_index: signal.element_index,
    }
}

fn build_buses(buses: &[Bus]) -> XmlBuses {
    XmlBuses {
        items: buses
            .iter()
            .map(|bus| XmlBus {
                name: bus.name.clone(),
                bus_type: bus.bus_type.to_str().to_string(),
                bitrate: bus.bitrate,
                bus_id: bus.bus_id,
                comment: bus.comment.clone(),
            })
            .collect(),
    }
}

// --- UI part ---

fn build_ui_nodes(nodes: &[UiNode]) -> XmlUiNodes {
    XmlUiNodes {
        items: nodes.iter().map(build_ui_node).collect(),
    }
}

fn build_ui_node(node: &UiNode) -> XmlUiNode {
    XmlUiNode {
        x: node.x,
        y: node.y,
        width: node.width,
        height: node.height,
        z_order: node.z_order,
        datapools: XmlUiDatapools {
            items: node.datapools.iter().map(build_ui_datapool).collect(),
        },
        can_protocols: XmlUiCanProtocols {
            items: node.can_protocols.iter().map(build_ui_can_protocol).collect(),
        },
    }
}

fn build_ui_datapool(datapool: &UiDatapool) -> XmlUiDatapool {
    XmlUiDatapool {
        lists: XmlUiLists {
            items: datapool
                .lists
                .iter()
                .map(|list| XmlUiList {
                    expanded: list.expanded,
                    elements: XmlUiElements {
                        items: list
                            .elements
                            .iter()
                            .map(|e| XmlUiElement {
                                auto_min_max: e.auto_min_max,
                                interpret_as_string: e.interpret_as_string,
                            })
                            .collect(),
                    },
                })
                .collect(),
        },
    }
}

fn build_ui_can_protocol(protocol: &UiCanProtocol) -> XmlUiCanProtocol {
    XmlUiCanProtocol {
        message_containers: XmlUiMessageContainers {
            items: protocol
                .message_containers
                .iter()
                .map(build_ui_message_container)
                .collect(),
        },
    }
}

fn build_ui_message_container(container: &UiMessageContainer) -> XmlUiMessageContainer {
    XmlUiMessageContainer {
        tx_messages: build_ui_messages(&container.tx_messages),
        rx_messages: build_ui_messages(&container.rx_messages),
    }
}

fn build_ui_messages(messages: &[UiCanMessage]) -> XmlUiMessages {
    XmlUiMessages {
        items: messages
            .iter()
            .map(|message| XmlUiMessage {
                signals: XmlUiSignals {
                    items: message
                        .signals
                        .iter()
                        .map(|s| XmlUiSignal {
                            color_index: s.color_index,
                        })
                        .collect(),
                },
            })
            .collect(),
    }
}

fn build_ui_buses(buses: &[UiBus]) -> XmlUiBuses {
    XmlUiBuses {
        items: buses
            .iter()
            .map(|bus| XmlUiBus {
                color: bus.color.clone(),
                width: bus.width,
                points: XmlPoints {
                    items: bus
                        .points
                        .iter()
                        .map(|&(x, y)| XmlPoint { x, y })
                        .collect(),
                },
            })
            .collect(),
    }
}

fn build_bus_text_elements(elements: &[BusTextElement]) -> XmlBusTextElements {
    XmlBusTextElements {
        items: elements
            .iter()
            .map(|e| XmlBusTextElement {
                bus_index: e.bus_index,
                x: e.x,
                y: e.y,
                font_size: e.font_size,
                text: e.text.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filer::load_core;
    use crate::types::{
        datapool::DatapoolKind,
        node::BusType,
        signal::{ByteOrder, MultiplexerType},
    };

    #[test]
    fn test_core_file_layout() {
        let mut node = Node::new("ECU1", "ESX3CM");
        node.properties.comment = "Front <left> & right".to_string();
        node.datapools = vec![Datapool {
            version: (1, 2, 3),
            lists: vec![DatapoolList {
                elements: vec![Element::new("Speed")],
                ..DatapoolList::new("Tx")
            }],
            ..Datapool::new("COM", DatapoolKind::Com)
        }];
        node.com_protocols = vec![CanProtocol {
            message_containers: vec![MessageContainer {
                used_by_interface: true,
                tx_messages: vec![CanMessage {
                    signals: vec![CanSignal {
                        byte_order: ByteOrder::Motorola,
                        bit_start: 7,
                        bit_length: 16,
                        multiplexer_type: MultiplexerType::Multiplexed,
                        multiplexer_value: 2,
                        element_index: 0,
                    }],
                    ..CanMessage::new("Status", 0x18FF_0001)
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];
        let core = CoreDefinition {
            nodes: vec![node],
            buses: vec![Bus::new("CAN1", BusType::Can)],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("system.syde_sysdef");
        save_core(&core, &path, 2).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("<file-version>3</file-version>"));
        assert!(text.contains("tx-method=\"cyclic\""));

        let (loaded, version) = load_core(&path).unwrap();
        assert_eq!(version, FILE_VERSION);
        assert_eq!(loaded, core);
    }
}
