//! Sorting of CAN messages by name.
//!
//! Signals do not own their values: each signal points at a Datapool list element by
//! position, and the elements of a message occupy one contiguous block of the list in
//! message order. Reordering messages therefore also moves the element blocks and
//! rewrites every signal's `element_index`.

use std::cmp::Ordering;

use log::debug;

use crate::types::{
    datapool::{Element, UiElement},
    errors::{PairLengthMismatch, SortError},
    index::Direction,
    message::{CanMessage, UiCanMessage, assign_element_indices},
    node::{Node, UiNode},
    paired::PairedVec,
    protocol::CanProtocol,
    system::SystemDefinition,
};

/// Byte-wise comparison of two names; a prefix sorts before the longer name.
///
/// Bytes are compared unsigned, so non-ASCII UTF-8 names sort after all ASCII names.
pub fn compare_ordinal(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// `true` if no message name is greater than its successor's.
pub fn is_sorted_by_name(messages: &[CanMessage]) -> bool {
    messages
        .windows(2)
        .all(|pair| compare_ordinal(&pair[0].name, &pair[1].name) != Ordering::Greater)
}

/// Sorts one message vector by name and moves the list elements referenced by the
/// signals along with their messages.
///
/// Returns the number of swaps performed. Nothing is modified on error.
pub fn sort_message_vector(
    messages: &mut Vec<CanMessage>,
    ui_messages: &mut Vec<UiCanMessage>,
    elements: &mut Vec<Element>,
    ui_elements: &mut Vec<UiElement>,
) -> Result<usize, SortError> {
    check_pair(messages.len(), ui_messages.len())?;
    check_pair(elements.len(), ui_elements.len())?;
    if is_sorted_by_name(messages) {
        return Ok(0);
    }

    let mut work_messages: Vec<CanMessage> = messages.clone();
    let mut work_ui_messages: Vec<UiCanMessage> = ui_messages.clone();
    let mut work_elements: Vec<Element> = elements.clone();
    let mut work_ui_elements: Vec<UiElement> = ui_elements.clone();

    let swaps: usize = {
        let mut paired_messages = PairedVec::new(&mut work_messages, &mut work_ui_messages)?;
        let mut paired_list = PairedVec::new(&mut work_elements, &mut work_ui_elements)?;
        bubble_sort(&mut paired_messages, &mut paired_list)?
    };

    *messages = work_messages;
    *ui_messages = work_ui_messages;
    *elements = work_elements;
    *ui_elements = work_ui_elements;
    Ok(swaps)
}

fn check_pair(core: usize, ui: usize) -> Result<(), PairLengthMismatch> {
    if core == ui {
        Ok(())
    } else {
        Err(PairLengthMismatch { core, ui })
    }
}

fn bubble_sort(
    messages: &mut PairedVec<'_, CanMessage, UiCanMessage>,
    list: &mut PairedVec<'_, Element, UiElement>,
) -> Result<usize, SortError> {
    let mut swaps: usize = 0;
    while !is_sorted_by_name(messages.core()) {
        for index in 0..messages.len().saturating_sub(1) {
            let core = messages.core();
            if compare_ordinal(&core[index].name, &core[index + 1].name) == Ordering::Greater {
                swap_messages(index, index + 1, messages, list)?;
                swaps += 1;
            }
        }
    }
    Ok(swaps)
}

/// Copies the elements referenced by the signals of one message, in signal order.
fn copy_elements(
    message: &CanMessage,
    list: &PairedVec<'_, Element, UiElement>,
    indices: &mut Vec<usize>,
) -> Result<Vec<(Element, UiElement)>, SortError> {
    let mut copies: Vec<(Element, UiElement)> = Vec::with_capacity(message.signals.len());
    for (signal_index, signal) in message.signals.iter().enumerate() {
        let Some(pair) = list.cloned(signal.element_index) else {
            return Err(SortError::ElementIndexOutOfRange {
                message: message.name.clone(),
                signal: signal_index,
                element_index: signal.element_index,
                list_len: list.len(),
            });
        };
        copies.push(pair);
        indices.push(signal.element_index);
    }
    Ok(copies)
}

/// Swaps the messages at `first < second` together with their element blocks.
fn swap_messages(
    first: usize,
    second: usize,
    messages: &mut PairedVec<'_, CanMessage, UiCanMessage>,
    list: &mut PairedVec<'_, Element, UiElement>,
) -> Result<(), SortError> {
    let mut indices: Vec<usize> = Vec::new();
    let mut first_block = Some(copy_elements(&messages.core()[first], list, &mut indices)?);
    let mut second_block = Some(copy_elements(&messages.core()[second], list, &mut indices)?);

    messages.swap(first, second);

    indices.sort_unstable();
    indices.dedup();
    for index in indices.into_iter().rev() {
        list.remove(index);
    }

    // walk the new message order; the block of the message now at `first` is the old
    // second block and vice versa
    let mut counter: usize = 0;
    for message_index in 0..messages.len() {
        let block = if message_index == first {
            second_block.take()
        } else if message_index == second {
            first_block.take()
        } else {
            None
        };
        if let Some(block) = block {
            for (offset, (element, ui_element)) in block.into_iter().enumerate() {
                let position: usize = counter + offset;
                if list.insert(position, element, ui_element).is_err() {
                    return Err(SortError::InsertOutOfRange {
                        message: messages.core()[message_index].name.clone(),
                        position,
                        list_len: list.len(),
                    });
                }
            }
        }
        counter += messages.core()[message_index].signals.len();
    }

    assign_element_indices(messages.core_mut());
    Ok(())
}

/// Sorts the Tx and Rx messages of every protocol and container of one node.
///
/// The node may be partially sorted when an error is returned; sort a copy if that matters.
pub fn sort_node_messages(node: &mut Node, ui_node: &mut UiNode) -> Result<(), SortError> {
    let name: String = node.name().to_string();
    let config_error = |details: String| SortError::Config {
        node: name.clone(),
        details,
    };

    if node.com_protocols.len() != ui_node.can_protocols.len() {
        return Err(config_error(format!(
            "{} core protocols vs. {} UI protocols",
            node.com_protocols.len(),
            ui_node.can_protocols.len()
        )));
    }
    let Node {
        datapools,
        com_protocols,
        ..
    } = node;
    let UiNode {
        datapools: ui_datapools,
        can_protocols: ui_protocols,
        ..
    } = ui_node;

    for (protocol, ui_protocol) in com_protocols.iter_mut().zip(ui_protocols.iter_mut()) {
        let datapool_index: usize = protocol.datapool_index;
        let (Some(datapool), Some(ui_datapool)) = (
            datapools.get_mut(datapool_index),
            ui_datapools.get_mut(datapool_index),
        ) else {
            return Err(config_error(format!(
                "{} protocol references missing Datapool {datapool_index}",
                protocol.protocol_type
            )));
        };
        if protocol.message_containers.len() != ui_protocol.message_containers.len() {
            return Err(config_error(format!(
                "{} core message containers vs. {} UI message containers",
                protocol.message_containers.len(),
                ui_protocol.message_containers.len()
            )));
        }

        for (interface, (container, ui_container)) in protocol
            .message_containers
            .iter_mut()
            .zip(ui_protocol.message_containers.iter_mut())
            .enumerate()
        {
            let mut result: Result<(), SortError> = Ok(());
            for direction in [Direction::Tx, Direction::Rx] {
                let lists = match CanProtocol::list_index(datapool, interface, direction) {
                    Some(index) => datapool
                        .lists
                        .get_mut(index)
                        .zip(ui_datapool.lists.get_mut(index)),
                    None => None,
                };
                let Some((list, ui_list)) = lists else {
                    result = Err(config_error(format!(
                        "no {direction} list for interface {interface} in Datapool '{}'",
                        datapool.name
                    )));
                    break;
                };
                match sort_message_vector(
                    container.messages_mut(direction),
                    ui_container.messages_mut(direction),
                    &mut list.elements,
                    &mut ui_list.elements,
                ) {
                    Ok(swaps) => {
                        if swaps > 0 {
                            debug!("Node '{name}': {swaps} swaps sorting {direction} messages of interface {interface}");
                        }
                    }
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                }
            }
            container.recalc_data_element_indices();
            result?;
        }
    }
    Ok(())
}

/// Sorts the messages of every node.
pub fn sort_definition_messages(definition: &mut SystemDefinition) -> Result<(), SortError> {
    check_pair(definition.core.nodes.len(), definition.ui.nodes.len())?;
    for (node, ui_node) in definition
        .core
        .nodes
        .iter_mut()
        .zip(definition.ui.nodes.iter_mut())
    {
        sort_node_messages(node, ui_node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        container::{MessageContainer, UiMessageContainer},
        datapool::{Datapool, DatapoolKind, DatapoolList, UiDatapool, UiDatapoolList},
        protocol::UiCanProtocol,
        signal::{CanSignal, UiCanSignal},
    };

    /// Messages with the given signal counts; elements are named `<message>.sig<i>`.
    fn fixture(
        layout: &[(&str, usize)],
    ) -> (Vec<CanMessage>, Vec<UiCanMessage>, Vec<Element>, Vec<UiElement>) {
        let mut messages: Vec<CanMessage> = Vec::new();
        let mut ui_messages: Vec<UiCanMessage> = Vec::new();
        let mut elements: Vec<Element> = Vec::new();
        let mut ui_elements: Vec<UiElement> = Vec::new();
        for (name, count) in layout {
            messages.push(CanMessage {
                signals: vec![CanSignal::default(); *count],
                ..CanMessage::new(name, 0x100)
            });
            ui_messages.push(UiCanMessage {
                signals: vec![UiCanSignal::default(); *count],
            });
            for i in 0..*count {
                elements.push(Element::new(&format!("{name}.sig{i}")));
                ui_elements.push(UiElement {
                    auto_min_max: i % 2 == 0,
                    ..Default::default()
                });
            }
        }
        assign_element_indices(&mut messages);
        (messages, ui_messages, elements, ui_elements)
    }

    fn names(messages: &[CanMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.name.as_str()).collect()
    }

    fn element_names(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_compare_ordinal() {
        assert_eq!(compare_ordinal("Apple", "Zebra"), Ordering::Less);
        assert_eq!(compare_ordinal("Zebra", "apple"), Ordering::Less);
        assert_eq!(compare_ordinal("Msg", "Msg_1"), Ordering::Less);
        assert_eq!(compare_ordinal("Msg", "Msg"), Ordering::Equal);
    }

    #[test]
    fn test_zebra_apple() {
        let (mut messages, mut ui_messages, mut elements, mut ui_elements) =
            fixture(&[("Zebra", 2), ("Apple", 1)]);

        let swaps =
            sort_message_vector(&mut messages, &mut ui_messages, &mut elements, &mut ui_elements)
                .unwrap();

        assert_eq!(swaps, 1);
        assert_eq!(names(&messages), vec!["Apple", "Zebra"]);
        assert_eq!(
            element_names(&elements),
            vec!["Apple.sig0", "Zebra.sig0", "Zebra.sig1"]
        );
        assert_eq!(messages[0].signals[0].element_index, 0);
        assert_eq!(messages[1].signals[0].element_index, 1);
        assert_eq!(messages[1].signals[1].element_index, 2);
        // UI elements travel with their core elements
        assert_eq!(
            ui_elements.iter().map(|e| e.auto_min_max).collect::<Vec<_>>(),
            vec![true, true, false]
        );
    }

    #[test]
    fn test_every_signal_keeps_its_element() {
        let (mut messages, mut ui_messages, mut elements, mut ui_elements) = fixture(&[
            ("Delta", 1),
            ("Bravo", 3),
            ("Echo", 0),
            ("Alpha", 2),
            ("Charlie", 1),
            ("Alpha_2", 2),
        ]);

        sort_message_vector(&mut messages, &mut ui_messages, &mut elements, &mut ui_elements)
            .unwrap();

        assert_eq!(
            names(&messages),
            vec!["Alpha", "Alpha_2", "Bravo", "Charlie", "Delta", "Echo"]
        );
        assert_eq!(elements.len(), 9);
        assert_eq!(ui_elements.len(), 9);
        for message in &messages {
            for (i, signal) in message.signals.iter().enumerate() {
                assert_eq!(elements[signal.element_index].name, format!("{}.sig{i}", message.name));
            }
        }
        let indices: Vec<usize> = messages
            .iter()
            .flat_map(|m| m.signals.iter().map(|s| s.element_index))
            .collect();
        assert_eq!(indices, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_sorted_input_is_untouched() {
        let (mut messages, mut ui_messages, mut elements, mut ui_elements) =
            fixture(&[("A", 1), ("B", 2), ("B", 1), ("C", 0)]);
        let before = (messages.clone(), elements.clone());

        let swaps =
            sort_message_vector(&mut messages, &mut ui_messages, &mut elements, &mut ui_elements)
                .unwrap();

        assert_eq!(swaps, 0);
        assert_eq!((messages, elements), before);
    }

    #[test]
    fn test_out_of_range_leaves_input_untouched() {
        let (mut messages, mut ui_messages, mut elements, mut ui_elements) =
            fixture(&[("Zebra", 1), ("Apple", 1)]);
        messages[1].signals[0].element_index = 7;
        let before = (messages.clone(), elements.clone());

        let err =
            sort_message_vector(&mut messages, &mut ui_messages, &mut elements, &mut ui_elements)
                .unwrap_err();

        assert_eq!(
            err,
            SortError::ElementIndexOutOfRange {
                message: "Apple".to_string(),
                signal: 0,
                element_index: 7,
                list_len: 2,
            }
        );
        assert_eq!((messages, elements), before);
    }

    #[test]
    fn test_pair_mismatch() {
        let (mut messages, mut ui_messages, mut elements, mut ui_elements) =
            fixture(&[("B", 1), ("A", 1)]);
        ui_elements.pop();
        let err =
            sort_message_vector(&mut messages, &mut ui_messages, &mut elements, &mut ui_elements)
                .unwrap_err();
        assert_eq!(err, SortError::PairMismatch(PairLengthMismatch { core: 2, ui: 1 }));
    }

    fn node_with_tx(layout: &[(&str, usize)], lists: usize) -> (Node, UiNode) {
        let (tx, ui_tx, elements, ui_elements) = fixture(layout);
        let mut core_lists = vec![DatapoolList::default(); lists];
        let mut ui_lists = vec![UiDatapoolList::default(); lists];
        if lists > 0 {
            core_lists[0].elements = elements;
            ui_lists[0].elements = ui_elements;
        }
        let mut node = Node::new("ECU1", "ESX3CM");
        node.datapools = vec![Datapool {
            lists: core_lists,
            ..Datapool::new("COM", DatapoolKind::Com)
        }];
        node.com_protocols = vec![CanProtocol {
            message_containers: vec![MessageContainer {
                tx_messages: tx,
                ..Default::default()
            }],
            ..Default::default()
        }];
        let ui_node = UiNode {
            datapools: vec![UiDatapool { lists: ui_lists }],
            can_protocols: vec![UiCanProtocol {
                message_containers: vec![UiMessageContainer {
                    tx_messages: ui_tx,
                    ..Default::default()
                }],
            }],
            ..Default::default()
        };
        (node, ui_node)
    }

    #[test]
    fn test_sort_definition_messages() {
        let mut def = SystemDefinition::new();
        let (node, ui_node) = node_with_tx(&[("Zebra", 2), ("Apple", 1)], 2);
        def.add_node(node, ui_node).unwrap();

        sort_definition_messages(&mut def).unwrap();

        let container = &def.core.nodes[0].com_protocols[0].message_containers[0];
        assert_eq!(names(&container.tx_messages), vec!["Apple", "Zebra"]);
        assert_eq!(
            element_names(&def.core.nodes[0].datapools[0].lists[0].elements),
            vec!["Apple.sig0", "Zebra.sig0", "Zebra.sig1"]
        );
    }

    #[test]
    fn test_missing_rx_list_is_config_error() {
        let (mut node, mut ui_node) = node_with_tx(&[("A", 1)], 1);
        let err = sort_node_messages(&mut node, &mut ui_node).unwrap_err();
        assert!(matches!(err, SortError::Config { ref node, .. } if node == "ECU1"));
    }
}
