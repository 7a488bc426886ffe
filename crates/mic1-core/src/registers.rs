//! Architectural register file, condition flags, and C-bus destinations.

/// Number of C-bus destination registers (mask bits 0..=8).
pub const C_BUS_TARGET_COUNT: usize = 9;
/// Mask selecting the 9 significant MPC bits.
pub const MPC_MASK: u16 = 0x1FF;

/// One of the nine registers a set C-mask bit can overwrite, in bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CBusTarget {
    /// Mask bit 0.
    Mar,
    /// Mask bit 1.
    Mdr,
    /// Mask bit 2.
    Pc,
    /// Mask bit 3.
    Sp,
    /// Mask bit 4.
    Lv,
    /// Mask bit 5.
    Cpp,
    /// Mask bit 6.
    Tos,
    /// Mask bit 7.
    Opc,
    /// Mask bit 8.
    H,
}

impl CBusTarget {
    /// All destinations in ascending mask-bit order.
    pub const ALL: [Self; C_BUS_TARGET_COUNT] = [
        Self::Mar,
        Self::Mdr,
        Self::Pc,
        Self::Sp,
        Self::Lv,
        Self::Cpp,
        Self::Tos,
        Self::Opc,
        Self::H,
    ];

    /// Returns the C-mask bit index for this destination (`0..=8`).
    #[must_use]
    pub const fn bit_index(self) -> u32 {
        match self {
            Self::Mar => 0,
            Self::Mdr => 1,
            Self::Pc => 2,
            Self::Sp => 3,
            Self::Lv => 4,
            Self::Cpp => 5,
            Self::Tos => 6,
            Self::Opc => 7,
            Self::H => 8,
        }
    }

    /// Returns the single-bit C-mask for this destination.
    #[must_use]
    pub const fn mask(self) -> u16 {
        1 << self.bit_index()
    }
}

/// Condition flags produced by the ALU each cycle.
///
/// The update rule is literal machine behavior: a zero result sets
/// `zero` and clears `negative`; any nonzero result sets `negative` and
/// clears `zero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CondFlags {
    /// Set when the last ALU result was nonzero.
    pub negative: bool,
    /// Set when the last ALU result was zero.
    pub zero: bool,
}

impl CondFlags {
    /// Computes the flags for an ALU result.
    #[must_use]
    pub const fn from_result(value: u32) -> Self {
        Self {
            negative: value != 0,
            zero: value == 0,
        }
    }
}

/// The full architectural register state, owned exclusively by the engine.
///
/// All registers reset to zero. Word registers are 32 bits, MBR is one
/// byte, MPC holds 9 bits, and MIR holds the 36 significant bits of the
/// latched microinstruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    mar: u32,
    mdr: u32,
    pc: u32,
    mbr: u8,
    sp: u32,
    lv: u32,
    tos: u32,
    opc: u32,
    cpp: u32,
    h: u32,
    mpc: u16,
    mir: u64,
    flags: CondFlags,
}

impl RegisterFile {
    /// Creates a zeroed register file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the memory address register.
    #[must_use]
    pub const fn mar(&self) -> u32 {
        self.mar
    }

    /// Writes the memory address register.
    pub const fn set_mar(&mut self, value: u32) {
        self.mar = value;
    }

    /// Reads the memory data register.
    #[must_use]
    pub const fn mdr(&self) -> u32 {
        self.mdr
    }

    /// Writes the memory data register.
    pub const fn set_mdr(&mut self, value: u32) {
        self.mdr = value;
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// Reads the memory buffer register (last fetched instruction byte).
    #[must_use]
    pub const fn mbr(&self) -> u8 {
        self.mbr
    }

    /// Writes the memory buffer register.
    pub const fn set_mbr(&mut self, value: u8) {
        self.mbr = value;
    }

    /// Reads the stack pointer.
    #[must_use]
    pub const fn sp(&self) -> u32 {
        self.sp
    }

    /// Writes the stack pointer.
    pub const fn set_sp(&mut self, value: u32) {
        self.sp = value;
    }

    /// Reads the local-variable frame register.
    #[must_use]
    pub const fn lv(&self) -> u32 {
        self.lv
    }

    /// Writes the local-variable frame register.
    pub const fn set_lv(&mut self, value: u32) {
        self.lv = value;
    }

    /// Reads the top-of-stack register.
    #[must_use]
    pub const fn tos(&self) -> u32 {
        self.tos
    }

    /// Writes the top-of-stack register.
    pub const fn set_tos(&mut self, value: u32) {
        self.tos = value;
    }

    /// Reads the operand register.
    #[must_use]
    pub const fn opc(&self) -> u32 {
        self.opc
    }

    /// Writes the operand register.
    pub const fn set_opc(&mut self, value: u32) {
        self.opc = value;
    }

    /// Reads the constant-pool pointer.
    #[must_use]
    pub const fn cpp(&self) -> u32 {
        self.cpp
    }

    /// Writes the constant-pool pointer.
    pub const fn set_cpp(&mut self, value: u32) {
        self.cpp = value;
    }

    /// Reads the ALU auxiliary register.
    #[must_use]
    pub const fn h(&self) -> u32 {
        self.h
    }

    /// Writes the ALU auxiliary register.
    pub const fn set_h(&mut self, value: u32) {
        self.h = value;
    }

    /// Reads the 9-bit microprogram counter.
    #[must_use]
    pub const fn mpc(&self) -> u16 {
        self.mpc
    }

    /// Writes the microprogram counter, keeping only the 9 significant bits.
    pub const fn set_mpc(&mut self, value: u16) {
        self.mpc = value & MPC_MASK;
    }

    /// Reads the latched microinstruction.
    #[must_use]
    pub const fn mir(&self) -> u64 {
        self.mir
    }

    /// Latches a microinstruction for the current cycle.
    pub const fn set_mir(&mut self, value: u64) {
        self.mir = value;
    }

    /// Reads the condition flags from the last ALU evaluation.
    #[must_use]
    pub const fn flags(&self) -> CondFlags {
        self.flags
    }

    /// Stores the condition flags produced by an ALU evaluation.
    pub const fn set_flags(&mut self, flags: CondFlags) {
        self.flags = flags;
    }

    /// Overwrites one C-bus destination register with the C-bus value.
    pub const fn write_c_target(&mut self, target: CBusTarget, value: u32) {
        match target {
            CBusTarget::Mar => self.mar = value,
            CBusTarget::Mdr => self.mdr = value,
            CBusTarget::Pc => self.pc = value,
            CBusTarget::Sp => self.sp = value,
            CBusTarget::Lv => self.lv = value,
            CBusTarget::Cpp => self.cpp = value,
            CBusTarget::Tos => self.tos = value,
            CBusTarget::Opc => self.opc = value,
            CBusTarget::H => self.h = value,
        }
    }

    /// Reads one C-bus destination register.
    #[must_use]
    pub const fn read_c_target(&self, target: CBusTarget) -> u32 {
        match target {
            CBusTarget::Mar => self.mar,
            CBusTarget::Mdr => self.mdr,
            CBusTarget::Pc => self.pc,
            CBusTarget::Sp => self.sp,
            CBusTarget::Lv => self.lv,
            CBusTarget::Cpp => self.cpp,
            CBusTarget::Tos => self.tos,
            CBusTarget::Opc => self.opc,
            CBusTarget::H => self.h,
        }
    }
}
