use crate::types::{
    datapool::{Datapool, UiDatapool},
    hash::{CalcHash, StructuralHasher},
    protocol::{CanProtocol, CanProtocolType, UiCanProtocol},
};

/// Physical bus technology of a bus or a node interface.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BusType {
    #[default]
    Can,
    Ethernet,
}

impl BusType {
    pub fn to_str(self) -> &'static str {
        match self {
            BusType::Can => "CAN",
            BusType::Ethernet => "ETHERNET",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "CAN" => Some(BusType::Can),
            "ETHERNET" => Some(BusType::Ethernet),
            _ => None,
        }
    }
}

/// One communication interface of a node.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ComInterface {
    pub interface_type: BusType,
    /// Number of the interface among the interfaces of the same type.
    pub interface_number: u8,
    pub node_id: u8,
    /// Connected bus, if any.
    pub bus_index: Option<usize>,
}

impl CalcHash for ComInterface {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(self.interface_type.to_str());
        hasher.write_u8(self.interface_number);
        hasher.write_u8(self.node_id);
        hasher.write_bool(self.bus_index.is_some());
        if let Some(bus) = self.bus_index {
            hasher.write_usize(bus);
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct NodeProperties {
    pub name: String,
    pub comment: String,
    /// Device definition the node is an instance of.
    pub device_type: String,
    pub com_interfaces: Vec<ComInterface>,
}

impl CalcHash for NodeProperties {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_str(&self.device_type);
        hasher.write_all(&self.com_interfaces);
    }
}

/// Core part of a node (ECU).
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Node {
    pub properties: NodeProperties,
    pub datapools: Vec<Datapool>,
    pub com_protocols: Vec<CanProtocol>,
}

impl Node {
    pub fn new(name: &str, device_type: &str) -> Self {
        Node {
            properties: NodeProperties {
                name: name.to_string(),
                device_type: device_type.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    /// Number of CAN interfaces; every protocol needs one message container per CAN interface.
    pub fn can_interface_count(&self) -> usize {
        self.properties
            .com_interfaces
            .iter()
            .filter(|i| i.interface_type == BusType::Can)
            .count()
    }

    /// Index of the first protocol of the given type.
    pub fn can_protocol_index(&self, protocol_type: CanProtocolType) -> Option<usize> {
        self.com_protocols
            .iter()
            .position(|p| p.protocol_type == protocol_type)
    }

    pub fn get_can_protocol(&self, protocol_type: CanProtocolType) -> Option<&CanProtocol> {
        self.com_protocols
            .iter()
            .find(|p| p.protocol_type == protocol_type)
    }

    pub fn recalculate_addresses(&mut self) {
        for datapool in self.datapools.iter_mut() {
            datapool.recalculate_addresses();
        }
    }
}

impl CalcHash for Node {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        self.properties.calc_hash(hasher);
        hasher.write_all(&self.datapools);
        hasher.write_all(&self.com_protocols);
    }
}

/// UI part of a node: placement on the topology scene and the UI mirrors of its content.
#[derive(Clone, Debug, PartialEq)]
pub struct UiNode {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_order: f64,
    pub datapools: Vec<UiDatapool>,
    pub can_protocols: Vec<UiCanProtocol>,
}

impl Default for UiNode {
    fn default() -> Self {
        UiNode {
            x: 0.0,
            y: 0.0,
            width: 150.0,
            height: 100.0,
            z_order: 0.0,
            datapools: Vec::new(),
            can_protocols: Vec::new(),
        }
    }
}

impl CalcHash for UiNode {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_f64(self.x);
        hasher.write_f64(self.y);
        hasher.write_f64(self.width);
        hasher.write_f64(self.height);
        hasher.write_f64(self.z_order);
        hasher.write_all(&self.datapools);
        hasher.write_all(&self.can_protocols);
    }
}
