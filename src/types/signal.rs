use crate::types::hash::{CalcHash, StructuralHasher};

/// Byte order of a signal inside the CAN payload.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Little endian.
    #[default]
    Intel,
    /// Big endian.
    Motorola,
}

impl ByteOrder {
    pub fn to_str(self) -> &'static str {
        match self {
            ByteOrder::Intel => "intel",
            ByteOrder::Motorola => "motorola",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "intel" => Some(ByteOrder::Intel),
            "motorola" => Some(ByteOrder::Motorola),
            _ => None,
        }
    }
}

/// What role (if any) a signal plays in multiplexing.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MultiplexerType {
    /// Not multiplexed (always present).
    #[default]
    Default,
    /// This signal is the multiplexer switch.
    Multiplexer,
    /// This signal is only present for one multiplexer value.
    Multiplexed,
}

impl MultiplexerType {
    pub fn to_str(self) -> &'static str {
        match self {
            MultiplexerType::Default => "default",
            MultiplexerType::Multiplexer => "multiplexer",
            MultiplexerType::Multiplexed => "multiplexed",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "default" => Some(MultiplexerType::Default),
            "multiplexer" => Some(MultiplexerType::Multiplexer),
            "multiplexed" => Some(MultiplexerType::Multiplexed),
            _ => None,
        }
    }
}

/// Core part of a CAN signal.
///
/// The decoded value, range and scaling live in the Datapool element at `element_index`
/// of the list backing the owning message's direction. The index is a plain position and
/// has to be rewritten whenever that list is reordered.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct CanSignal {
    pub byte_order: ByteOrder,
    /// Start bit inside the payload.
    pub bit_start: u16,
    /// Length in bits.
    pub bit_length: u16,
    pub multiplexer_type: MultiplexerType,
    /// Multiplexer value for which a multiplexed signal is present.
    pub multiplexer_value: u16,
    /// Position of the backing element in the Tx or Rx list.
    pub element_index: usize,
}

impl CalcHash for CanSignal {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(self.byte_order.to_str());
        hasher.write_u16(self.bit_start);
        hasher.write_u16(self.bit_length);
        hasher.write_str(self.multiplexer_type.to_str());
        hasher.write_u16(self.multiplexer_value);
        hasher.write_usize(self.element_index);
    }
}

/// UI part of a CAN signal.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiCanSignal {
    /// Index into the signal color palette of the message layout view.
    pub color_index: u8,
}

impl CalcHash for UiCanSignal {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_u8(self.color_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_round_trip() {
        for order in [ByteOrder::Intel, ByteOrder::Motorola] {
            assert_eq!(ByteOrder::parse(order.to_str()), Some(order));
        }
        for mux in [
            MultiplexerType::Default,
            MultiplexerType::Multiplexer,
            MultiplexerType::Multiplexed,
        ] {
            assert_eq!(MultiplexerType::parse(mux.to_str()), Some(mux));
        }
        assert_eq!(ByteOrder::parse("Intel"), None);
    }

    #[test]
    fn test_element_index_changes_hash() {
        let sig = CanSignal {
            bit_length: 8,
            ..Default::default()
        };
        let moved = CanSignal {
            element_index: 3,
            ..sig.clone()
        };

        let mut a = StructuralHasher::new();
        sig.calc_hash(&mut a);
        let mut b = StructuralHasher::new();
        moved.calc_hash(&mut b);
        assert_ne!(a.finish(), b.finish());
    }
}
