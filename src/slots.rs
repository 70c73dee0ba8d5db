//! Identity → banner slot table.
//!
//! Loaded once from configuration and read-only afterwards. Several tokens
//! may share a slot (one person with more than one identity).

use std::collections::HashMap;

use crate::roster::IdentityToken;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: HashMap<IdentityToken, u32>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `token`, if mapped. Unmapped tokens are simply left out of
    /// the banner.
    pub fn slot(&self, token: &IdentityToken) -> Option<u32> {
        self.slots.get(token).copied()
    }

    /// Map `token` to `slot`, replacing any previous mapping.
    pub fn insert(&mut self, token: impl Into<IdentityToken>, slot: u32) {
        self.slots.insert(token.into(), slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Into<IdentityToken>> FromIterator<(T, u32)> for SlotTable {
    fn from_iter<I: IntoIterator<Item = (T, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (token, slot) in iter {
            table.insert(token, slot);
        }
        table
    }
}
