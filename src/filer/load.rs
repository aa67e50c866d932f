use std::path::Path;

use log::debug;

use crate::filer::model::{
    XmlBus, XmlBusTextElement, XmlComInterface, XmlComProtocol, XmlDatapool, XmlElement,
    XmlFileVersion, XmlGuiOnly, XmlList, XmlMessage, XmlMessageContainer, XmlNode,
    XmlSharedDatapools, XmlSignal, XmlSystemDefinition, XmlSystemDefinitionUi, XmlUiBus,
    XmlUiCanProtocol, XmlUiDatapool, XmlUiMessage, XmlUiNode,
};
use crate::filer::{
    FILE_VERSION, LEGACY_FILE_VERSION, ROOT_SHARED_DATAPOOLS, ROOT_SYSTEM_DEFINITION,
    ROOT_SYSTEM_DEFINITION_UI, check_root, deserialize, path_string, read_text,
};
use crate::types::{
    bus::{Bus, BusTextElement, UiBus},
    container::{MessageContainer, UiMessageContainer},
    datapool::{
        Access, ContentType, Datapool, DatapoolKind, DatapoolList, Element, UiDatapool,
        UiDatapoolList, UiElement,
    },
    errors::FilerError,
    index::Direction,
    message::{CanMessage, TxMethod, UiCanMessage},
    node::{BusType, ComInterface, Node, NodeProperties, UiNode},
    protocol::{CanProtocol, CanProtocolType, UiCanProtocol},
    shared::{SharedDatapoolId, SharedDatapools},
    signal::{ByteOrder, CanSignal, MultiplexerType, UiCanSignal},
    system::{CoreDefinition, SystemDefinition, UiDefinition},
};

/// Version of a system definition file, without resolving its content.
pub fn read_file_version(path: &Path) -> Result<u16, FilerError> {
    let text: String = read_text(path)?;
    check_root(path, &text, ROOT_SYSTEM_DEFINITION)?;
    let header: XmlFileVersion = deserialize(path, &text)?;
    Ok(header.file_version)
}

/// Loads the core file of a current-format project. Returns the core tree and the file version.
pub fn load_core(path: &Path) -> Result<(CoreDefinition, u16), FilerError> {
    let document: XmlSystemDefinition = read_document(path, ROOT_SYSTEM_DEFINITION)?;
    if document.file_version != FILE_VERSION {
        return Err(invalid(
            path,
            format!("unsupported file version {}", document.file_version),
        ));
    }
    let core: CoreDefinition = resolve_core(&document).map_err(|details| invalid(path, details))?;
    debug!(
        "Loaded core file '{}': {} nodes, {} buses",
        path.display(),
        core.nodes.len(),
        core.buses.len()
    );
    Ok((core, document.file_version))
}

/// Loads a UI file. Shared Datapools live in their own file and are left empty.
pub fn load_ui(path: &Path) -> Result<UiDefinition, FilerError> {
    let document: XmlSystemDefinitionUi = read_document(path, ROOT_SYSTEM_DEFINITION_UI)?;
    let XmlSystemDefinitionUi {
        nodes,
        buses,
        bus_text_elements,
        ..
    } = document;
    Ok(UiDefinition {
        nodes: nodes.items.into_iter().map(resolve_ui_node).collect(),
        buses: buses.items.into_iter().map(resolve_ui_bus).collect(),
        bus_text_elements: bus_text_elements
            .items
            .into_iter()
            .map(resolve_bus_text_element)
            .collect(),
        shared_datapools: SharedDatapools::default(),
    })
}

pub fn load_shared_datapools(path: &Path) -> Result<SharedDatapools, FilerError> {
    let document: XmlSharedDatapools = read_document(path, ROOT_SHARED_DATAPOOLS)?;
    Ok(SharedDatapools {
        groups: document
            .groups
            .items
            .into_iter()
            .map(|group| {
                group
                    .items
                    .into_iter()
                    .map(|dp| SharedDatapoolId {
                        node: dp.node,
                        datapool: dp.datapool,
                    })
                    .collect()
            })
            .collect(),
    })
}

/// Loads a single-file project (file version 1 or 2) including its `<gui-only>` section.
pub fn load_legacy(path: &Path) -> Result<(SystemDefinition, u16), FilerError> {
    let mut document: XmlSystemDefinition = read_document(path, ROOT_SYSTEM_DEFINITION)?;
    if document.file_version == 0 || document.file_version > LEGACY_FILE_VERSION {
        return Err(invalid(
            path,
            format!("file version {} is not a legacy version", document.file_version),
        ));
    }
    let Some(gui_only) = document.gui_only.take() else {
        return Err(invalid(path, "missing 'gui-only' section".to_string()));
    };
    let core: CoreDefinition = resolve_core(&document).map_err(|details| invalid(path, details))?;
    let XmlGuiOnly {
        nodes,
        buses,
        bus_text_elements,
    } = gui_only;
    let ui = UiDefinition {
        nodes: nodes.items.into_iter().map(resolve_ui_node).collect(),
        buses: buses.items.into_iter().map(resolve_ui_bus).collect(),
        bus_text_elements: bus_text_elements
            .items
            .into_iter()
            .map(resolve_bus_text_element)
            .collect(),
        shared_datapools: SharedDatapools::default(),
    };
    Ok((SystemDefinition { core, ui }, document.file_version))
}

fn read_document<T>(path: &Path, root: &str) -> Result<T, FilerError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let text: String = read_text(path)?;
    check_root(path, &text, root)?;
    deserialize(path, &text)
}

fn invalid(path: &Path, details: String) -> FilerError {
    FilerError::InvalidContent {
        path: path_string(path),
        details,
    }
}

fn literal<T>(value: Option<T>, what: &str, text: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("unknown {what} '{text}'"))
}

// --- Core part ---

fn resolve_core(document: &XmlSystemDefinition) -> Result<CoreDefinition, String> {
    let nodes: Vec<Node> = document
        .nodes
        .items
        .iter()
        .map(resolve_node)
        .collect::<Result<_, _>>()?;
    let buses: Vec<Bus> = document
        .buses
        .items
        .iter()
        .map(resolve_bus)
        .collect::<Result<_, _>>()?;

    for node in &nodes {
        for interface in &node.properties.com_interfaces {
            if let Some(bus) = interface.bus_index
                && bus >= buses.len()
            {
                return Err(format!(
                    "node '{}' is connected to bus {bus}, but there are only {} buses",
                    node.name(),
                    buses.len()
                ));
            }
        }
    }
    Ok(CoreDefinition { nodes, buses })
}

fn resolve_node(xml: &XmlNode) -> Result<Node, String> {
    let node = Node {
        properties: NodeProperties {
            name: xml.name.clone(),
            comment: xml.comment.clone(),
            device_type: xml.device_type.clone(),
            com_interfaces: xml
                .com_interfaces
                .items
                .iter()
                .map(resolve_com_interface)
                .collect::<Result<_, _>>()?,
        },
        datapools: xml
            .datapools
            .items
            .iter()
            .map(resolve_datapool)
            .collect::<Result<_, _>>()?,
        com_protocols: xml
            .com_protocols
            .items
            .iter()
            .map(resolve_com_protocol)
            .collect::<Result<_, _>>()?,
    };

    for protocol in &node.com_protocols {
        if protocol.datapool_index >= node.datapools.len() {
            return Err(format!(
                "{} protocol of node '{}' references Datapool {}, but the node only has {}",
                protocol.protocol_type,
                node.name(),
                protocol.datapool_index,
                node.datapools.len()
            ));
        }
        check_element_indices(&node, protocol)?;
    }
    Ok(node)
}

/// Every signal must point into the list backing its container and direction.
fn check_element_indices(node: &Node, protocol: &CanProtocol) -> Result<(), String> {
    let Some(datapool) = node.datapools.get(protocol.datapool_index) else {
        return Ok(());
    };
    for (interface, container) in protocol.message_containers.iter().enumerate() {
        for direction in [Direction::Tx, Direction::Rx] {
            let Some(list) = CanProtocol::list_index(datapool, interface, direction)
                .and_then(|index| datapool.lists.get(index))
            else {
                continue;
            };
            for message in container.messages(direction) {
                if let Some(signal) = message
                    .signals
                    .iter()
                    .find(|s| s.element_index >= list.elements.len())
                {
                    return Err(format!(
                        "signal of message '{}' on node '{}' references element {} of list '{}', which has {} elements",
                        message.name,
                        node.name(),
                        signal.element_index,
                        list.name,
                        list.elements.len()
                    ));
                }
            }
        }
    }
    Ok(())
}

fn resolve_com_interface(xml: &XmlComInterface) -> Result<ComInterface, String> {
    Ok(ComInterface {
        interface_type: literal(
            BusType::parse(&xml.interface_type),
            "interface type",
            &xml.interface_type,
        )?,
        interface_number: xml.interface_number,
        node_id: xml.node_id,
        bus_index: xml.bus_index,
    })
}

fn parse_version(text: &str) -> Result<(u8, u8, u8), String> {
    if text.is_empty() {
        return Ok((0, 0, 0));
    }
    let parts: Vec<&str> = text.split('.').collect();
    let number = |part: &str| -> Result<u8, String> {
        part.trim()
            .parse::<u8>()
            .map_err(|_| format!("invalid Datapool version '{text}'"))
    };
    match parts.as_slice() {
        [major, minor, release] => Ok((number(*major)?, number(*minor)?, number(*release)?)),
        _ => Err(format!("invalid Datapool version '{text}'")),
    }
}

fn resolve_datapool(xml: &XmlDatapool) -> Result<Datapool, String> {
    Ok(Datapool {
        name: xml.name.clone(),
        comment: xml.comment.clone(),
        kind: literal(DatapoolKind::parse(&xml.kind), "Datapool kind", &xml.kind)?,
        version: parse_version(&xml.version)?,
        is_safety: xml.is_safety,
        nvm_start_address: xml.nvm_start_address,
        nvm_size: xml.nvm_size,
        lists: xml
            .lists
            .items
            .iter()
            .map(resolve_list)
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_list(xml: &XmlList) -> Result<DatapoolList, String> {
    Ok(DatapoolList {
        name: xml.name.clone(),
        comment: xml.comment.clone(),
        nvm_size: xml.nvm_size,
        nvm_address: xml.nvm_address,
        nvm_crc_active: xml.nvm_crc_active,
        elements: xml
            .elements
            .items
            .iter()
            .map(resolve_element)
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_element(xml: &XmlElement) -> Result<Element, String> {
    Ok(Element {
        name: xml.name.clone(),
        comment: xml.comment.clone(),
        content_type: literal(
            ContentType::parse(&xml.content_type),
            "content type",
            &xml.content_type,
        )?,
        array_size: xml.array_size.max(1),
        factor: xml.factor,
        offset: xml.offset,
        unit: xml.unit.clone(),
        min: xml.min,
        max: xml.max,
        value: xml.value,
        access: literal(Access::parse(&xml.access), "access", &xml.access)?,
        diag_event_call: xml.diag_event_call,
        nvm_address: xml.nvm_address,
    })
}

fn resolve_com_protocol(xml: &XmlComProtocol) -> Result<CanProtocol, String> {
    Ok(CanProtocol {
        protocol_type: literal(
            CanProtocolType::parse(&xml.protocol_type),
            "CAN protocol",
            &xml.protocol_type,
        )?,
        datapool_index: xml.datapool_index,
        message_containers: xml
            .message_containers
            .items
            .iter()
            .map(resolve_message_container)
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_message_container(xml: &XmlMessageContainer) -> Result<MessageContainer, String> {
    Ok(MessageContainer {
        used_by_interface: xml.used_by_interface,
        tx_messages: xml
            .tx_messages
            .items
            .iter()
            .map(resolve_message)
            .collect::<Result<_, _>>()?,
        rx_messages: xml
            .rx_messages
            .items
            .iter()
            .map(resolve_message)
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_message(xml: &XmlMessage) -> Result<CanMessage, String> {
    Ok(CanMessage {
        name: xml.name.clone(),
        comment: xml.comment.clone(),
        can_id: xml.can_id,
        is_extended: xml.is_extended,
        dlc: xml.dlc,
        tx_method: literal(TxMethod::parse(&xml.tx_method), "transmission method", &xml.tx_method)?,
        cycle_time_ms: xml.cycle_time_ms,
        delay_time_ms: xml.delay_time_ms,
        timeout_ms: xml.timeout_ms,
        signals: xml
            .signals
            .items
            .iter()
            .map(resolve_signal)
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_signal(xml: &XmlSignal) -> Result<CanSignal, String> {
    let multiplexer_type: MultiplexerType = if xml.multiplexer_type.is_empty() {
        MultiplexerType::Default
    } else {
        literal(
            MultiplexerType::parse(&xml.multiplexer_type),
            "multiplexer type",
            &xml.multiplexer_type,
        )?
    };
    Ok(CanSignal {
        byte_order: literal(ByteOrder::parse(&xml.byte_order), "byte order", &xml.byte_order)?,
        bit_start: xml.bit_start,
        bit_length: xml.bit_length,
        multiplexer_type,
        multiplexer_value: xml.multiplexer_value,
        element_index: xml.element_index,
    })
}

fn resolve_bus(xml: &XmlBus) -> Result<Bus, String> {
    Ok(Bus {
        name: xml.name.clone(),
        comment: xml.comment.clone(),
        bus_type: literal(BusType::parse(&xml.bus_type), "bus type", &xml.bus_type)?,
        bitrate: xml.bitrate,
        bus_id: xml.bus_id,
    })
}

// --- UI part ---

fn resolve_ui_node(xml: XmlUiNode) -> UiNode {
    UiNode {
        x: xml.x,
        y: xml.y,
        width: xml.width,
        height: xml.height,
        z_order: xml.z_order,
        datapools: xml
            .datapools
            .items
            .into_iter()
            .map(resolve_ui_datapool)
            .collect(),
        can_protocols: xml
            .can_protocols
            .items
            .into_iter()
            .map(resolve_ui_can_protocol)
            .collect(),
    }
}

fn resolve_ui_datapool(xml: XmlUiDatapool) -> UiDatapool {
    UiDatapool {
        lists: xml
            .lists
            .items
            .into_iter()
            .map(|list| UiDatapoolList {
                expanded: list.expanded,
                elements: list
                    .elements
                    .items
                    .into_iter()
                    .map(|e| UiElement {
                        auto_min_max: e.auto_min_max,
                        interpret_as_string: e.interpret_as_string,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn resolve_ui_can_protocol(xml: XmlUiCanProtocol) -> UiCanProtocol {
    UiCanProtocol {
        message_containers: xml
            .message_containers
            .items
            .into_iter()
            .map(|container| UiMessageContainer {
                tx_messages: container
                    .tx_messages
                    .items
                    .into_iter()
                    .map(resolve_ui_message)
                    .collect(),
                rx_messages: container
                    .rx_messages
                    .items
                    .into_iter()
                    .map(resolve_ui_message)
                    .collect(),
            })
            .collect(),
    }
}

fn resolve_ui_message(xml: XmlUiMessage) -> UiCanMessage {
    UiCanMessage {
        signals: xml
            .signals
            .items
            .into_iter()
            .map(|s| UiCanSignal {
                color_index: s.color_index,
            })
            .collect(),
    }
}

fn resolve_ui_bus(xml: XmlUiBus) -> UiBus {
    UiBus {
        color: xml.color,
        width: xml.width,
        points: xml.points.items.into_iter().map(|p| (p.x, p.y)).collect(),
    }
}

fn resolve_bus_text_element(xml: XmlBusTextElement) -> BusTextElement {
    BusTextElement {
        text: xml.text,
        bus_index: xml.bus_index,
        x: xml.x,
        y: xml.y,
        font_size: xml.font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.2.3"), Ok((1, 2, 3)));
        assert_eq!(parse_version(""), Ok((0, 0, 0)));
        assert!(parse_version("1.2").is_err());
        assert!(parse_version("1.x.3").is_err());
    }

    #[test]
    fn test_unknown_literal_is_reported() {
        let xml = XmlSignal {
            byte_order: "middle-endian".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve_signal(&xml),
            Err("unknown byte order 'middle-endian'".to_string())
        );
    }

    #[test]
    fn test_protocol_datapool_index_checked() {
        let xml = XmlNode {
            name: "ECU1".to_string(),
            com_protocols: crate::filer::model::XmlComProtocols {
                items: vec![XmlComProtocol {
                    protocol_type: "layer2".to_string(),
                    datapool_index: 3,
                    ..Default::default()
                }],
            },
            ..Default::default()
        };
        assert!(resolve_node(&xml).unwrap_err().contains("references Datapool 3"));
    }
}
