//! Fault, warning, and halt taxonomy for the cycle engine.

use thiserror::Error;

/// Fatal runtime faults. A fault transitions the engine to its halted
/// state at the end of the cycle that raised it; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// PC addresses a byte at or beyond memory capacity.
    #[error("PC 0x{pc:X} is outside memory capacity")]
    PcOutOfBounds {
        /// The offending program counter.
        pc: u32,
    },
    /// `MAR*4` addresses a word at or beyond memory capacity.
    #[error("MAR 0x{mar:X} addresses a word outside memory capacity")]
    MarOutOfBounds {
        /// The offending memory address register.
        mar: u32,
    },
}

/// Non-fatal field-code warnings. Execution continues with a defined
/// fallback value after each of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Warning {
    /// Unrecognized B-bus selector; the bus carries all-ones.
    #[error("unrecognized B-bus selector code {0}")]
    UnknownBusSelector(u8),
    /// Unrecognized ALU operation; the C bus keeps its previous value.
    #[error("unrecognized ALU operation code {0}")]
    UnknownAluOp(u8),
    /// Unrecognized shifter code; the result passes through unshifted.
    #[error("unrecognized shifter code {0}")]
    UnknownShift(u8),
}

/// Why the engine stopped. Halting is terminal for the machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltReason {
    /// The halt sentinel byte was latched into MBR. Normal completion.
    #[error("halt instruction reached")]
    HaltInstruction,
    /// A fatal bounds fault was raised during the cycle.
    #[error("memory fault: {0}")]
    Fault(#[from] Fault),
}

impl HaltReason {
    /// Returns `true` for normal completion (the halt sentinel).
    #[must_use]
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::HaltInstruction)
    }
}
