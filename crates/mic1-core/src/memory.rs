//! Byte-addressable main memory with pre-access bound checks.
//!
//! Word traffic (MDR reads and writes) addresses memory at `MAR*4`;
//! instruction-byte fetches address it at PC directly. Both bound checks
//! use the architectural strict-less rule and return a fatal [`Fault`]
//! instead of touching memory.

use crate::fault::Fault;

/// Default main-memory capacity in bytes.
pub const DEFAULT_MEMORY_BYTES: usize = 10_000_000;
/// Byte address the program body is loaded at.
pub const PROGRAM_ORIGIN: usize = 0x0401;
/// Size of the initialization block loaded at address 0.
pub const INIT_BLOCK_BYTES: usize = 20;
/// Bytes per architectural word.
pub const WORD_BYTES: usize = 4;

/// Flat byte-addressable main memory of a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MainMemory {
    bytes: Box<[u8]>,
}

impl Default for MainMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMemory {
    /// Allocates a zeroed memory of the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_BYTES)
    }

    /// Allocates a zeroed memory of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
        }
    }

    /// Returns the fixed capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Checks that PC addresses a byte inside memory.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::PcOutOfBounds`] when `pc >= capacity`.
    pub fn validate_fetch(&self, pc: u32) -> Result<(), Fault> {
        if (pc as usize) < self.capacity() {
            Ok(())
        } else {
            Err(Fault::PcOutOfBounds { pc })
        }
    }

    /// Checks that `MAR*4` addresses a word inside memory.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MarOutOfBounds`] when `MAR*4 >= capacity`.
    pub fn validate_word(&self, mar: u32) -> Result<(), Fault> {
        if u64::from(mar) * (WORD_BYTES as u64) < self.capacity() as u64 {
            Ok(())
        } else {
            Err(Fault::MarOutOfBounds { mar })
        }
    }

    /// Reads the instruction byte at PC.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::PcOutOfBounds`] when the address is out of range.
    pub fn fetch_byte(&self, pc: u32) -> Result<u8, Fault> {
        self.validate_fetch(pc)?;
        Ok(self.bytes[pc as usize])
    }

    /// Reads the little-endian word at word index `mar`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MarOutOfBounds`] when the word is out of range.
    pub fn read_word(&self, mar: u32) -> Result<u32, Fault> {
        self.validate_word(mar)?;
        let raw = self
            .word_slice(mar)
            .ok_or(Fault::MarOutOfBounds { mar })?;
        Ok(u32::from_le_bytes(raw))
    }

    /// Writes `value` as a little-endian word at word index `mar`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MarOutOfBounds`] when the word is out of range.
    pub fn write_word(&mut self, mar: u32, value: u32) -> Result<(), Fault> {
        self.validate_word(mar)?;
        let base = mar as usize * WORD_BYTES;
        let slot = self
            .bytes
            .get_mut(base..base + WORD_BYTES)
            .ok_or(Fault::MarOutOfBounds { mar })?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Non-faulting byte read used by inspectors; `None` out of range.
    #[must_use]
    pub fn byte_at(&self, addr: u32) -> Option<u8> {
        self.bytes.get(addr as usize).copied()
    }

    /// Non-faulting word read used by inspectors; `None` out of range.
    #[must_use]
    pub fn word_at(&self, index: u32) -> Option<u32> {
        self.word_slice(index).map(u32::from_le_bytes)
    }

    /// Mutable view of a byte range, used by the loader.
    pub(crate) fn slice_mut(&mut self, start: usize, len: usize) -> Option<&mut [u8]> {
        self.bytes.get_mut(start..start.checked_add(len)?)
    }

    fn word_slice(&self, index: u32) -> Option<[u8; WORD_BYTES]> {
        let base = (index as usize).checked_mul(WORD_BYTES)?;
        let raw = self.bytes.get(base..base + WORD_BYTES)?;
        let mut word = [0; WORD_BYTES];
        word.copy_from_slice(raw);
        Some(word)
    }
}
