//! Structural hash of a system definition.
//!
//! A CRC-32 digest (initial value `0xFFFF_FFFF`, no final XOR) is fed with every field of
//! every entity in a fixed traversal order. Comparing two results answers "has anything
//! changed" without diffing the trees.

use crc::{CRC_32_JAMCRC, Crc, Digest};

static STRUCTURAL_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_JAMCRC);

/// Rolling CRC-32 accumulator.
pub struct StructuralHasher {
    digest: Digest<'static, u32>,
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralHasher {
    /// Starts a new hash seeded with `0xFFFF_FFFF`.
    pub fn new() -> Self {
        StructuralHasher {
            digest: STRUCTURAL_CRC.digest(),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_bytes(&[u8::from(value)]);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_usize(&mut self, value: usize) {
        self.write_bytes(&(value as u64).to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_bits().to_le_bytes());
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_usize(value.len());
        self.write_bytes(value.as_bytes());
    }

    /// Folds the length of a sequence and then each of its items.
    pub fn write_all<T: CalcHash>(&mut self, items: &[T]) {
        self.write_usize(items.len());
        for item in items {
            item.calc_hash(self);
        }
    }

    pub fn finish(self) -> u32 {
        self.digest.finalize()
    }
}

/// Entities that contribute to the structural hash.
pub trait CalcHash {
    fn calc_hash(&self, hasher: &mut StructuralHasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash_is_seed() {
        // Without final XOR an empty digest keeps the initial value.
        assert_eq!(StructuralHasher::new().finish(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_order_matters() {
        let mut a = StructuralHasher::new();
        a.write_str("Apple");
        a.write_str("Zebra");
        let mut b = StructuralHasher::new();
        b.write_str("Zebra");
        b.write_str("Apple");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_same_input_same_hash() {
        let mut a = StructuralHasher::new();
        a.write_u32(42);
        a.write_f64(1.5);
        let mut b = StructuralHasher::new();
        b.write_u32(42);
        b.write_f64(1.5);
        assert_eq!(a.finish(), b.finish());
    }
}
