//! Repairs for known kinds of drift in freshly loaded projects.

use log::{debug, warn};

use crate::types::{
    node::Node,
    paired::PairedVec,
    protocol::{CanProtocol, CanProtocolType},
    system::SystemDefinition,
};

/// One protocol whose message containers were resized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerResize {
    pub node: String,
    pub protocol: CanProtocolType,
    pub from: usize,
    pub to: usize,
}

/// One node whose name was sanitized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRename {
    pub from: String,
    pub to: String,
}

/// What [`run_drift_repair`] changed.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct RepairReport {
    pub resized_containers: Vec<ContainerResize>,
    pub renamed_nodes: Vec<NodeRename>,
}

impl RepairReport {
    /// `true` if nothing had to be repaired.
    pub fn is_empty(&self) -> bool {
        self.resized_containers.is_empty() && self.renamed_nodes.is_empty()
    }
}

/// Runs every repair: message container counts, NVM addresses, node names.
pub fn run_drift_repair(definition: &mut SystemDefinition) -> RepairReport {
    let mut report = RepairReport {
        resized_containers: repair_comm_inconsistencies(definition),
        ..Default::default()
    };
    fix_address_issues(definition);
    report.renamed_nodes = fix_name_issues(definition);
    report
}

/// Resizes the message containers of every protocol to the number of CAN interfaces of
/// the node, resizing core and UI containers together.
///
/// A core container count that differs from the CAN interface count is healed on both
/// sides, whatever the UI count was. Afterwards a bound Datapool with an even number of
/// lists that cannot back one Tx/Rx pair per container caps the count at `lists / 2`.
pub fn repair_comm_inconsistencies(definition: &mut SystemDefinition) -> Vec<ContainerResize> {
    let mut resized: Vec<ContainerResize> = Vec::new();

    for (node, ui_node) in definition
        .core
        .nodes
        .iter_mut()
        .zip(definition.ui.nodes.iter_mut())
    {
        if node.com_protocols.len() != ui_node.can_protocols.len() {
            debug!(
                "Skipping container repair of node '{}': protocol count differs between core and UI",
                node.name()
            );
            continue;
        }
        let can_count: usize = node.can_interface_count();
        let Node {
            properties,
            datapools,
            com_protocols,
        } = node;

        for (protocol, ui_protocol) in com_protocols.iter_mut().zip(ui_node.can_protocols.iter_mut()) {
            let from: usize = protocol.message_containers.len();
            let ui_from: usize = ui_protocol.message_containers.len();

            if from != can_count {
                PairedVec::resync(
                    &mut protocol.message_containers,
                    &mut ui_protocol.message_containers,
                    can_count,
                );
                warn!(
                    "Node '{}': {} protocol had {from} message containers (UI {ui_from}) for {can_count} CAN interfaces, resized to {can_count}",
                    properties.name, protocol.protocol_type
                );
            }

            let (Some(datapool), Some(ui_datapool)) = (
                datapools.get(protocol.datapool_index),
                ui_node.datapools.get(protocol.datapool_index),
            ) else {
                warn!(
                    "Node '{}': {} protocol references missing Datapool {}",
                    properties.name, protocol.protocol_type, protocol.datapool_index
                );
                push_resize(&mut resized, &properties.name, protocol, from, ui_from);
                continue;
            };

            let lists: usize = datapool.lists.len();
            if lists != ui_datapool.lists.len() {
                debug!(
                    "Skipping list check of node '{}': list count of Datapool '{}' differs between core and UI",
                    properties.name, datapool.name
                );
            } else if lists % 2 != 0 {
                warn!(
                    "Node '{}': Datapool '{}' has an odd number of lists ({lists})",
                    properties.name, datapool.name
                );
            } else if let Ok(mut containers) = PairedVec::new(
                &mut protocol.message_containers,
                &mut ui_protocol.message_containers,
            ) && lists < containers.len() * 2
            {
                let target: usize = lists / 2;
                warn!(
                    "Node '{}': Datapool '{}' only backs {target} of {} message containers, reduced to {target}",
                    properties.name,
                    datapool.name,
                    containers.len()
                );
                containers.resize_default(target);
            }
            push_resize(&mut resized, &properties.name, protocol, from, ui_from);
        }
    }
    resized
}

/// Records a protocol whose core or UI container count changed.
fn push_resize(
    resized: &mut Vec<ContainerResize>,
    node: &str,
    protocol: &CanProtocol,
    from: usize,
    ui_from: usize,
) {
    let to: usize = protocol.message_containers.len();
    if to != from || to != ui_from {
        resized.push(ContainerResize {
            node: node.to_string(),
            protocol: protocol.protocol_type,
            from,
            to,
        });
    }
}

/// Recalculates the NVM addresses of every list and element of every node.
pub fn fix_address_issues(definition: &mut SystemDefinition) {
    for node in definition.core.nodes.iter_mut() {
        node.recalculate_addresses();
    }
}

/// Replaces every character of a node name that is not allowed in a C identifier with `_`.
pub fn fix_name_issues(definition: &mut SystemDefinition) -> Vec<NodeRename> {
    let mut renamed: Vec<NodeRename> = Vec::new();
    for node in definition.core.nodes.iter_mut() {
        let sanitized: String = node
            .properties
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if sanitized != node.properties.name {
            warn!("Node name '{}' changed to '{sanitized}'", node.properties.name);
            renamed.push(NodeRename {
                from: std::mem::replace(&mut node.properties.name, sanitized.clone()),
                to: sanitized,
            });
        }
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        container::{MessageContainer, UiMessageContainer},
        datapool::{Datapool, DatapoolKind, DatapoolList, UiDatapool, UiDatapoolList},
        message::CanMessage,
        node::{BusType, ComInterface, UiNode},
        protocol::{CanProtocol, UiCanProtocol},
    };
    use crate::sysdef::{init_test_logger, verify::verify_definition};

    fn node_with(can_interfaces: usize, lists: usize, containers: usize) -> (Node, UiNode) {
        let mut node = Node::new("ECU1", "ESX3CM");
        node.properties.com_interfaces = (0..can_interfaces)
            .map(|i| ComInterface {
                interface_type: BusType::Can,
                interface_number: i as u8,
                ..Default::default()
            })
            .collect();
        node.datapools = vec![Datapool {
            lists: vec![DatapoolList::default(); lists],
            ..Datapool::new("COM", DatapoolKind::Com)
        }];
        node.com_protocols = vec![CanProtocol {
            message_containers: vec![
                MessageContainer {
                    tx_messages: vec![CanMessage::new("Keep", 1)],
                    ..Default::default()
                };
                containers
            ],
            ..Default::default()
        }];
        let ui_node = UiNode {
            datapools: vec![UiDatapool {
                lists: vec![UiDatapoolList::default(); lists],
            }],
            can_protocols: vec![UiCanProtocol {
                message_containers: vec![UiMessageContainer::default(); containers],
            }],
            ..Default::default()
        };
        (node, ui_node)
    }

    fn definition_with(node: (Node, UiNode)) -> SystemDefinition {
        let mut def = SystemDefinition::new();
        def.add_node(node.0, node.1).unwrap();
        def
    }

    #[test]
    fn test_missing_container_is_added() {
        init_test_logger();
        let mut def = definition_with(node_with(2, 4, 1));

        let report = run_drift_repair(&mut def);

        let protocol = &def.core.nodes[0].com_protocols[0];
        assert_eq!(protocol.message_containers.len(), 2);
        assert_eq!(protocol.message_containers[0].tx_messages[0].name, "Keep");
        assert!(protocol.message_containers[1].tx_messages.is_empty());
        assert_eq!(
            def.ui.nodes[0].can_protocols[0].message_containers.len(),
            2
        );
        assert_eq!(
            report.resized_containers,
            vec![ContainerResize {
                node: "ECU1".to_string(),
                protocol: CanProtocolType::Layer2,
                from: 1,
                to: 2,
            }]
        );

        let again = run_drift_repair(&mut def);
        assert!(again.is_empty());
    }

    #[test]
    fn test_lists_cap_container_count() {
        // three CAN interfaces, but the Datapool only backs two of them
        let mut def = definition_with(node_with(3, 4, 3));
        let resized = repair_comm_inconsistencies(&mut def);
        assert_eq!(resized[0].to, 2);
        assert_eq!(def.core.nodes[0].com_protocols[0].message_containers.len(), 2);
        assert!(repair_comm_inconsistencies(&mut def).is_empty());
    }

    #[test]
    fn test_odd_list_count_uses_interface_count() {
        let mut def = definition_with(node_with(2, 3, 2));
        assert!(repair_comm_inconsistencies(&mut def).is_empty());
    }

    #[test]
    fn test_drifted_ui_containers_follow_interface_count() {
        init_test_logger();
        let mut def = definition_with(node_with(2, 4, 1));
        def.core.nodes[0].com_protocols[0].message_containers[0]
            .tx_messages
            .clear();
        def.ui.nodes[0].can_protocols[0].message_containers =
            vec![UiMessageContainer::default(); 3];

        let resized = repair_comm_inconsistencies(&mut def);

        assert_eq!(def.core.nodes[0].com_protocols[0].message_containers.len(), 2);
        assert_eq!(def.ui.nodes[0].can_protocols[0].message_containers.len(), 2);
        assert_eq!(resized[0].from, 1);
        assert_eq!(resized[0].to, 2);
        assert!(verify_definition(&def).is_ok());
        assert!(repair_comm_inconsistencies(&mut def).is_empty());
    }

    #[test]
    fn test_missing_datapool_still_heals_containers() {
        let mut def = definition_with(node_with(2, 4, 1));
        def.core.nodes[0].com_protocols[0].datapool_index = 5;

        let resized = repair_comm_inconsistencies(&mut def);

        assert_eq!(resized.len(), 1);
        assert_eq!(def.core.nodes[0].com_protocols[0].message_containers.len(), 2);
        assert_eq!(def.ui.nodes[0].can_protocols[0].message_containers.len(), 2);
    }

    #[test]
    fn test_fix_name_issues() {
        let mut def = definition_with(node_with(0, 0, 0));
        def.core.nodes[0].properties.name = "Front ECU-2".to_string();

        let renamed = fix_name_issues(&mut def);

        assert_eq!(def.core.nodes[0].name(), "Front_ECU_2");
        assert_eq!(renamed[0].from, "Front ECU-2");
        assert!(fix_name_issues(&mut def).is_empty());
    }

    #[test]
    fn test_fix_address_issues() {
        let mut def = definition_with(node_with(0, 2, 0));
        {
            let datapool = &mut def.core.nodes[0].datapools[0];
            datapool.nvm_start_address = 16;
            datapool.lists[0].nvm_size = 10;
        }
        fix_address_issues(&mut def);
        let lists = &def.core.nodes[0].datapools[0].lists;
        assert_eq!(lists[0].nvm_address, 16);
        assert_eq!(lists[1].nvm_address, 26);
    }
}
