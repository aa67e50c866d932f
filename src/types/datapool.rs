//! Datapools: structured memory regions of a node, organized into lists of elements.
//!
//! CAN signals materialize as elements of the Tx/Rx lists of a COM Datapool; the
//! element holds the decoded value, its range and its scaling.

use crate::types::hash::{CalcHash, StructuralHasher};

/// Purpose of a Datapool.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DatapoolKind {
    /// Diagnostic variables.
    #[default]
    Diag,
    /// Non volatile parameters.
    Nvm,
    /// Communication: backs CAN signals.
    Com,
}

impl DatapoolKind {
    pub fn to_str(self) -> &'static str {
        match self {
            DatapoolKind::Diag => "diag",
            DatapoolKind::Nvm => "nvm",
            DatapoolKind::Com => "com",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "diag" => Some(DatapoolKind::Diag),
            "nvm" => Some(DatapoolKind::Nvm),
            "com" => Some(DatapoolKind::Com),
            _ => None,
        }
    }
}

/// Storage type of an element value.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    #[default]
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    F32,
    F64,
}

impl ContentType {
    /// Size of one value in bytes.
    pub fn size_bytes(self) -> u32 {
        match self {
            ContentType::U8 | ContentType::S8 => 1,
            ContentType::U16 | ContentType::S16 => 2,
            ContentType::U32 | ContentType::S32 | ContentType::F32 => 4,
            ContentType::U64 | ContentType::S64 | ContentType::F64 => 8,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            ContentType::U8 => "uint8",
            ContentType::S8 => "sint8",
            ContentType::U16 => "uint16",
            ContentType::S16 => "sint16",
            ContentType::U32 => "uint32",
            ContentType::S32 => "sint32",
            ContentType::U64 => "uint64",
            ContentType::S64 => "sint64",
            ContentType::F32 => "float32",
            ContentType::F64 => "float64",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "uint8" => Some(ContentType::U8),
            "sint8" => Some(ContentType::S8),
            "uint16" => Some(ContentType::U16),
            "sint16" => Some(ContentType::S16),
            "uint32" => Some(ContentType::U32),
            "sint32" => Some(ContentType::S32),
            "uint64" => Some(ContentType::U64),
            "sint64" => Some(ContentType::S64),
            "float32" => Some(ContentType::F32),
            "float64" => Some(ContentType::F64),
            _ => None,
        }
    }
}

/// Access rights of an element over diagnostics.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl Access {
    pub fn to_str(self) -> &'static str {
        match self {
            Access::ReadOnly => "RO",
            Access::ReadWrite => "RW",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "RO" => Some(Access::ReadOnly),
            "RW" => Some(Access::ReadWrite),
            _ => None,
        }
    }
}

/// Core part of a Datapool list element.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub comment: String,
    pub content_type: ContentType,
    /// Number of values; `1` for scalars.
    pub array_size: u32,
    pub factor: f64,
    pub offset: f64,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    /// Initial / NVM value.
    pub value: f64,
    pub access: Access,
    pub diag_event_call: bool,
    /// Absolute NVM address, maintained by [`Datapool::recalculate_addresses`].
    pub nvm_address: u32,
}

impl Default for Element {
    fn default() -> Self {
        Element {
            name: String::new(),
            comment: String::new(),
            content_type: ContentType::U8,
            array_size: 1,
            factor: 1.0,
            offset: 0.0,
            unit: String::new(),
            min: 0.0,
            max: 255.0,
            value: 0.0,
            access: Access::ReadOnly,
            diag_event_call: false,
            nvm_address: 0,
        }
    }
}

impl Element {
    pub fn new(name: &str) -> Self {
        Element {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Size occupied in NVM.
    pub fn size_bytes(&self) -> u32 {
        self.content_type.size_bytes() * self.array_size.max(1)
    }
}

impl CalcHash for Element {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_str(self.content_type.to_str());
        hasher.write_u32(self.array_size);
        hasher.write_f64(self.factor);
        hasher.write_f64(self.offset);
        hasher.write_str(&self.unit);
        hasher.write_f64(self.min);
        hasher.write_f64(self.max);
        hasher.write_f64(self.value);
        hasher.write_str(self.access.to_str());
        hasher.write_bool(self.diag_event_call);
        hasher.write_u32(self.nvm_address);
    }
}

/// Core part of a Datapool list.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct DatapoolList {
    pub name: String,
    pub comment: String,
    /// Reserved NVM size in bytes.
    pub nvm_size: u32,
    /// Absolute NVM start address of the list.
    pub nvm_address: u32,
    /// A CRC16 over the list occupies the first two bytes.
    pub nvm_crc_active: bool,
    pub elements: Vec<Element>,
}

impl DatapoolList {
    pub fn new(name: &str) -> Self {
        DatapoolList {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Bytes used by all elements, CRC included.
    pub fn used_size(&self) -> u32 {
        let crc: u32 = if self.nvm_crc_active { 2 } else { 0 };
        crc + self.elements.iter().map(Element::size_bytes).sum::<u32>()
    }
}

impl CalcHash for DatapoolList {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_u32(self.nvm_size);
        hasher.write_u32(self.nvm_address);
        hasher.write_bool(self.nvm_crc_active);
        hasher.write_all(&self.elements);
    }
}

/// Core part of a Datapool.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Datapool {
    pub name: String,
    pub comment: String,
    pub kind: DatapoolKind,
    /// Version as `major.minor.release`.
    pub version: (u8, u8, u8),
    pub is_safety: bool,
    pub nvm_start_address: u32,
    pub nvm_size: u32,
    pub lists: Vec<DatapoolList>,
}

impl Datapool {
    pub fn new(name: &str, kind: DatapoolKind) -> Self {
        Datapool {
            name: name.to_string(),
            kind,
            ..Default::default()
        }
    }

    /// Lays the lists out one after another starting at `nvm_start_address`
    /// and every element of a list one after another behind the list CRC.
    pub fn recalculate_addresses(&mut self) {
        let mut list_address: u32 = self.nvm_start_address;
        for list in self.lists.iter_mut() {
            list.nvm_address = list_address;
            let mut element_address: u32 = list_address + if list.nvm_crc_active { 2 } else { 0 };
            for element in list.elements.iter_mut() {
                element.nvm_address = element_address;
                element_address += element.size_bytes();
            }
            list_address += list.nvm_size;
        }
    }
}

impl CalcHash for Datapool {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_str(self.kind.to_str());
        hasher.write_u8(self.version.0);
        hasher.write_u8(self.version.1);
        hasher.write_u8(self.version.2);
        hasher.write_bool(self.is_safety);
        hasher.write_u32(self.nvm_start_address);
        hasher.write_u32(self.nvm_size);
        hasher.write_all(&self.lists);
    }
}

/// UI part of a list element.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiElement {
    /// Min/max follow the content type limits.
    pub auto_min_max: bool,
    /// Display an u8/s8 array as text.
    pub interpret_as_string: bool,
}

impl CalcHash for UiElement {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_bool(self.auto_min_max);
        hasher.write_bool(self.interpret_as_string);
    }
}

/// UI part of a Datapool list.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiDatapoolList {
    /// Expanded in the list tree.
    pub expanded: bool,
    pub elements: Vec<UiElement>,
}

impl CalcHash for UiDatapoolList {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_bool(self.expanded);
        hasher.write_all(&self.elements);
    }
}

/// UI part of a Datapool.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiDatapool {
    pub lists: Vec<UiDatapoolList>,
}

impl CalcHash for UiDatapool {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_all(&self.lists);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recalculate_addresses() {
        let mut dp = Datapool {
            nvm_start_address: 0x100,
            lists: vec![
                DatapoolList {
                    nvm_size: 32,
                    nvm_crc_active: true,
                    elements: vec![
                        Element {
                            content_type: ContentType::U16,
                            ..Element::new("a")
                        },
                        Element {
                            content_type: ContentType::U32,
                            array_size: 2,
                            ..Element::new("b")
                        },
                        Element::new("c"),
                    ],
                    ..DatapoolList::new("first")
                },
                DatapoolList {
                    nvm_size: 8,
                    elements: vec![Element::new("d")],
                    ..DatapoolList::new("second")
                },
            ],
            ..Datapool::new("NVM", DatapoolKind::Nvm)
        };

        dp.recalculate_addresses();

        assert_eq!(dp.lists[0].nvm_address, 0x100);
        assert_eq!(dp.lists[0].elements[0].nvm_address, 0x102);
        assert_eq!(dp.lists[0].elements[1].nvm_address, 0x104);
        assert_eq!(dp.lists[0].elements[2].nvm_address, 0x10C);
        assert_eq!(dp.lists[1].nvm_address, 0x120);
        assert_eq!(dp.lists[1].elements[0].nvm_address, 0x120);
        assert_eq!(dp.lists[0].used_size(), 2 + 2 + 8 + 1);
    }

    #[test]
    fn test_content_type_literals() {
        for ct in [
            ContentType::U8,
            ContentType::S8,
            ContentType::U16,
            ContentType::S16,
            ContentType::U32,
            ContentType::S32,
            ContentType::U64,
            ContentType::S64,
            ContentType::F32,
            ContentType::F64,
        ] {
            assert_eq!(ContentType::parse(ct.to_str()), Some(ct));
        }
        assert_eq!(DatapoolKind::parse("com"), Some(DatapoolKind::Com));
        assert_eq!(Access::parse("WO"), None);
    }
}
