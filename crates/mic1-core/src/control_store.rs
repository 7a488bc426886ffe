//! Read-only control store of microinstruction slots.

use crate::microword::MICROWORD_MASK;
use crate::registers::MPC_MASK;

/// Number of microinstruction slots addressable by the 9-bit MPC.
pub const CONTROL_STORE_SLOTS: usize = 512;

/// The control store: a fixed table of 512 microwords, populated once by
/// the loader and only read afterwards. Unloaded slots stay zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlStore {
    words: Box<[u64]>,
}

impl Default for ControlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlStore {
    /// Creates a zero-initialized control store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; CONTROL_STORE_SLOTS].into_boxed_slice(),
        }
    }

    /// Fetches the microword at a 9-bit control-store index.
    ///
    /// Indexing cannot fail: the MPC width matches the slot count exactly.
    #[must_use]
    pub fn fetch(&self, mpc: u16) -> u64 {
        self.words[usize::from(mpc & MPC_MASK)]
    }

    /// Writes one slot during loading. Bits above position 35 are dropped.
    pub fn set(&mut self, index: u16, word: u64) {
        self.words[usize::from(index & MPC_MASK)] = word & MICROWORD_MASK;
    }
}
