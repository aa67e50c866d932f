use crate::types::{
    hash::{CalcHash, StructuralHasher},
    node::BusType,
};

/// Core part of a bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bus {
    pub name: String,
    pub comment: String,
    pub bus_type: BusType,
    /// Bitrate in kbit/s.
    pub bitrate: u32,
    pub bus_id: u8,
}

impl Default for Bus {
    fn default() -> Self {
        Bus {
            name: String::new(),
            comment: String::new(),
            bus_type: BusType::Can,
            bitrate: 125,
            bus_id: 0,
        }
    }
}

impl Bus {
    pub fn new(name: &str, bus_type: BusType) -> Self {
        Bus {
            name: name.to_string(),
            bus_type,
            ..Default::default()
        }
    }
}

impl CalcHash for Bus {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_str(self.bus_type.to_str());
        hasher.write_u32(self.bitrate);
        hasher.write_u8(self.bus_id);
    }
}

/// UI part of a bus: a polyline on the topology scene.
#[derive(Clone, Debug, PartialEq)]
pub struct UiBus {
    /// Line color as `#RRGGBB`.
    pub color: String,
    pub width: u8,
    pub points: Vec<(f64, f64)>,
}

impl Default for UiBus {
    fn default() -> Self {
        UiBus {
            color: "#000000".to_string(),
            width: 6,
            points: Vec::new(),
        }
    }
}

impl CalcHash for UiBus {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.color);
        hasher.write_u8(self.width);
        hasher.write_usize(self.points.len());
        for (x, y) in &self.points {
            hasher.write_f64(*x);
            hasher.write_f64(*y);
        }
    }
}

/// Free text shown next to a bus. Has no core counterpart.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct BusTextElement {
    pub text: String,
    pub bus_index: usize,
    pub x: f64,
    pub y: f64,
    pub font_size: u16,
}

impl CalcHash for BusTextElement {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.text);
        hasher.write_usize(self.bus_index);
        hasher.write_f64(self.x);
        hasher.write_f64(self.y);
        hasher.write_u16(self.font_size);
    }
}
