//! Paired core/UI vectors.
//!
//! Every core vector of the system definition has a UI mirror that must keep the same
//! length. [`PairedVec`] borrows both halves at once and only offers operations that
//! change them together, so code mutating the structure cannot drift one side.
//! Element contents stay freely editable through fixed-length slices.

use crate::types::errors::PairLengthMismatch;

/// Mutable view over a core vector and its UI mirror.
#[derive(Debug)]
pub struct PairedVec<'a, C, U> {
    core: &'a mut Vec<C>,
    ui: &'a mut Vec<U>,
}

impl<'a, C, U> PairedVec<'a, C, U> {
    /// Pairs two vectors. Fails if they do not already have the same length.
    pub fn new(core: &'a mut Vec<C>, ui: &'a mut Vec<U>) -> Result<Self, PairLengthMismatch> {
        if core.len() != ui.len() {
            return Err(PairLengthMismatch {
                core: core.len(),
                ui: ui.len(),
            });
        }
        Ok(PairedVec { core, ui })
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    pub fn core(&self) -> &[C] {
        self.core
    }

    pub fn ui(&self) -> &[U] {
        self.ui
    }

    pub fn core_mut(&mut self) -> &mut [C] {
        self.core
    }

    pub fn ui_mut(&mut self) -> &mut [U] {
        self.ui
    }

    pub fn get(&self, index: usize) -> Option<(&C, &U)> {
        Some((self.core.get(index)?, self.ui.get(index)?))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<(&mut C, &mut U)> {
        Some((self.core.get_mut(index)?, self.ui.get_mut(index)?))
    }

    pub fn push(&mut self, core: C, ui: U) {
        self.core.push(core);
        self.ui.push(ui);
    }

    /// Inserts a pair at `index`. Returns the pair back if `index > len`.
    pub fn insert(&mut self, index: usize, core: C, ui: U) -> Result<(), (C, U)> {
        if index > self.len() {
            return Err((core, ui));
        }
        self.core.insert(index, core);
        self.ui.insert(index, ui);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<(C, U)> {
        if index >= self.len() {
            return None;
        }
        Some((self.core.remove(index), self.ui.remove(index)))
    }

    /// Swaps two positions in both halves. Out-of-range indices are ignored.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.len() && b < self.len() {
            self.core.swap(a, b);
            self.ui.swap(a, b);
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.core.truncate(len);
        self.ui.truncate(len);
    }
}

impl<'a, C: Default, U: Default> PairedVec<'a, C, U> {
    /// Pairs two vectors of possibly different lengths by truncating or extending each
    /// of them to `len` with default values.
    pub fn resync(core: &'a mut Vec<C>, ui: &'a mut Vec<U>, len: usize) -> Self {
        core.resize_with(len, C::default);
        ui.resize_with(len, U::default);
        PairedVec { core, ui }
    }

    /// Truncates or extends both halves with default values.
    pub fn resize_default(&mut self, len: usize) {
        self.core.resize_with(len, C::default);
        self.ui.resize_with(len, U::default);
    }
}

impl<C: Clone, U: Clone> PairedVec<'_, C, U> {
    /// Clones the pair at `index`.
    pub fn cloned(&self, index: usize) -> Option<(C, U)> {
        self.get(index).map(|(c, u)| (c.clone(), u.clone()))
    }
}
