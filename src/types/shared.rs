use crate::types::hash::{CalcHash, StructuralHasher};

/// One Datapool taking part in a sharing group.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SharedDatapoolId {
    pub node: usize,
    pub datapool: usize,
}

impl CalcHash for SharedDatapoolId {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_usize(self.node);
        hasher.write_usize(self.datapool);
    }
}

/// Groups of Datapools on different nodes that share one configuration.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct SharedDatapools {
    pub groups: Vec<Vec<SharedDatapoolId>>,
}

impl SharedDatapools {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group the given Datapool belongs to, if any.
    pub fn group_of(&self, id: SharedDatapoolId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(&id))
    }
}

impl CalcHash for SharedDatapools {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_usize(self.groups.len());
        for group in &self.groups {
            hasher.write_all(group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_of() {
        let a = SharedDatapoolId { node: 0, datapool: 1 };
        let b = SharedDatapoolId { node: 2, datapool: 0 };
        let shared = SharedDatapools {
            groups: vec![vec![a, b]],
        };
        assert_eq!(shared.group_of(b), Some(0));
        assert_eq!(shared.group_of(SharedDatapoolId { node: 1, datapool: 0 }), None);
    }
}
