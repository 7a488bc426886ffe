//! 36-bit microinstruction layout and typed field decoding.
//!
//! The packed layout, low bit first, is a wire-format contract shared with
//! the control-store image format:
//!
//! ```text
//! bits  0..=3   B_SEL     B-bus source selector
//! bits  4..=6   MEM       memory request bits (fetch/read/write)
//! bits  7..=15  C_MASK    C-bus destination enable mask
//! bits 16..=21  ALU_OP    ALU operation code
//! bits 22..=23  SHIFT     shifter code
//! bits 24..=26  JUMP      next-address gate bits
//! bits 27..=35  MPC_next  base next-address
//! ```
//!
//! Decoding is a pure, lossless split: [`MicroOp::encode`] reconstructs the
//! exact 36 bits it was decoded from, including unrecognized field codes.

/// Number of significant bits in a microinstruction.
pub const MICROWORD_BITS: u32 = 36;
/// Mask selecting the 36 significant microinstruction bits.
pub const MICROWORD_MASK: u64 = (1 << MICROWORD_BITS) - 1;

/// Width in bits of the B-bus selector field.
pub const B_SEL_BITS: u32 = 4;
/// Width in bits of the memory request field.
pub const MEM_BITS: u32 = 3;
/// Width in bits of the C-bus destination mask field.
pub const C_MASK_BITS: u32 = 9;
/// Width in bits of the ALU operation field.
pub const ALU_OP_BITS: u32 = 6;
/// Width in bits of the shifter field.
pub const SHIFT_BITS: u32 = 2;
/// Width in bits of the jump gate field.
pub const JUMP_BITS: u32 = 3;
/// Width in bits of the base next-address field.
pub const MPC_BITS: u32 = 9;

const B_SEL_SHIFT: u32 = 0;
const MEM_SHIFT: u32 = 4;
const C_MASK_SHIFT: u32 = 7;
const ALU_OP_SHIFT: u32 = 16;
const SHIFT_SHIFT: u32 = 22;
const JUMP_SHIFT: u32 = 24;
const MPC_SHIFT: u32 = 27;

const fn field(word: u64, shift: u32, bits: u32) -> u64 {
    (word >> shift) & ((1 << bits) - 1)
}

/// B-bus source selector codes (field value 0–8, others unrecognized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusSelector {
    /// Code 0: drive MDR onto the B bus.
    Mdr,
    /// Code 1: drive PC onto the B bus.
    Pc,
    /// Code 2: drive MBR sign-extended to 32 bits.
    MbrSigned,
    /// Code 3: drive MBR zero-extended to 32 bits.
    MbrUnsigned,
    /// Code 4: drive SP onto the B bus.
    Sp,
    /// Code 5: drive LV onto the B bus.
    Lv,
    /// Code 6: drive CPP onto the B bus.
    Cpp,
    /// Code 7: drive TOS onto the B bus.
    Tos,
    /// Code 8: drive OPC onto the B bus.
    Opc,
    /// Any other 4-bit code; the router warns and drives all-ones.
    Unknown(u8),
}

impl BusSelector {
    /// Decodes a 4-bit selector field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x0F {
            0 => Self::Mdr,
            1 => Self::Pc,
            2 => Self::MbrSigned,
            3 => Self::MbrUnsigned,
            4 => Self::Sp,
            5 => Self::Lv,
            6 => Self::Cpp,
            7 => Self::Tos,
            8 => Self::Opc,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw 4-bit field value for this selector.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Mdr => 0,
            Self::Pc => 1,
            Self::MbrSigned => 2,
            Self::MbrUnsigned => 3,
            Self::Sp => 4,
            Self::Lv => 5,
            Self::Cpp => 6,
            Self::Tos => 7,
            Self::Opc => 8,
            Self::Unknown(raw) => raw & 0x0F,
        }
    }
}

/// ALU operation codes. Only fifteen of the 64 codes are defined; all
/// others are [`AluOp::Unknown`] and leave the C bus unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AluOp {
    /// Code 12: `H AND B`.
    And,
    /// Code 17: constant 1.
    One,
    /// Code 18: constant −1.
    MinusOne,
    /// Code 20: pass B.
    PassB,
    /// Code 24: pass H.
    PassH,
    /// Code 26: bitwise NOT H.
    NotH,
    /// Code 28: `H OR B`.
    Or,
    /// Code 44: bitwise NOT B.
    NotB,
    /// Code 53: `B + 1`.
    IncB,
    /// Code 54: `B − 1`.
    DecB,
    /// Code 57: `H + 1`.
    IncH,
    /// Code 59: `−H`.
    NegH,
    /// Code 60: `H + B`.
    Add,
    /// Code 61: `H + B + 1`.
    AddInc,
    /// Code 63: `B − H`.
    SubB,
    /// Any other 6-bit code; the ALU warns and keeps its previous output.
    Unknown(u8),
}

impl AluOp {
    /// Decodes a 6-bit ALU operation field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3F {
            12 => Self::And,
            17 => Self::One,
            18 => Self::MinusOne,
            20 => Self::PassB,
            24 => Self::PassH,
            26 => Self::NotH,
            28 => Self::Or,
            44 => Self::NotB,
            53 => Self::IncB,
            54 => Self::DecB,
            57 => Self::IncH,
            59 => Self::NegH,
            60 => Self::Add,
            61 => Self::AddInc,
            63 => Self::SubB,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw 6-bit field value for this operation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::And => 12,
            Self::One => 17,
            Self::MinusOne => 18,
            Self::PassB => 20,
            Self::PassH => 24,
            Self::NotH => 26,
            Self::Or => 28,
            Self::NotB => 44,
            Self::IncB => 53,
            Self::DecB => 54,
            Self::IncH => 57,
            Self::NegH => 59,
            Self::Add => 60,
            Self::AddInc => 61,
            Self::SubB => 63,
            Self::Unknown(raw) => raw & 0x3F,
        }
    }
}

/// Shifter codes applied to the ALU result after the flag update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ShiftOp {
    /// Code 0: no shift.
    #[default]
    None,
    /// Code 1: logical left shift by 8.
    Left8,
    /// Code 2: logical right shift by 1.
    Right1,
    /// Any other 2-bit code; the shifter warns and leaves the value alone.
    Unknown(u8),
}

impl ShiftOp {
    /// Decodes a 2-bit shifter field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::None,
            1 => Self::Left8,
            2 => Self::Right1,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw 2-bit field value for this shifter code.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Left8 => 1,
            Self::Right1 => 2,
            Self::Unknown(raw) => raw & 0x03,
        }
    }
}

/// Jump gate bits controlling next-address contributions.
///
/// Bit 0 gates `flag_negative << 8`, bit 1 gates `flag_zero << 8`, bit 2
/// gates OR-ing MBR into the low bits. Contributions combine by bitwise OR
/// with the base address, so a word requesting both flag gates collapses
/// onto the same bit 8 by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct JumpCond(u8);

impl JumpCond {
    /// Decodes a 3-bit jump gate field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Returns the raw 3-bit field value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether bit 8 of the next address is gated by the negative flag.
    #[must_use]
    pub const fn on_negative(self) -> bool {
        self.0 & 0b001 != 0
    }

    /// Whether bit 8 of the next address is gated by the zero flag.
    #[must_use]
    pub const fn on_zero(self) -> bool {
        self.0 & 0b010 != 0
    }

    /// Whether MBR is OR-ed into the next address.
    #[must_use]
    pub const fn on_mbr(self) -> bool {
        self.0 & 0b100 != 0
    }
}

/// Memory request bits for the current cycle.
///
/// Bit 0 requests an instruction-byte fetch at PC into MBR, bit 1 a word
/// read at `MAR*4` into MDR, bit 2 a word write of MDR at `MAR*4`. All
/// three may be requested in the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemRequest(u8);

impl MemRequest {
    /// Decodes a 3-bit memory request field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Returns the raw 3-bit field value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether an instruction-byte fetch at PC is requested.
    #[must_use]
    pub const fn fetch(self) -> bool {
        self.0 & 0b001 != 0
    }

    /// Whether a word read at `MAR*4` is requested.
    #[must_use]
    pub const fn read(self) -> bool {
        self.0 & 0b010 != 0
    }

    /// Whether a word write at `MAR*4` is requested.
    #[must_use]
    pub const fn write(self) -> bool {
        self.0 & 0b100 != 0
    }
}

/// One fully decoded microinstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MicroOp {
    /// Base control-store address of the next microinstruction (9 bits).
    pub next_base: u16,
    /// Next-address gate bits.
    pub jump: JumpCond,
    /// Shifter code.
    pub shift: ShiftOp,
    /// ALU operation code.
    pub alu: AluOp,
    /// C-bus destination enable mask (9 bits, bit 0 = MAR .. bit 8 = H).
    pub c_mask: u16,
    /// Memory request bits.
    pub mem: MemRequest,
    /// B-bus source selector.
    pub b_sel: BusSelector,
}

impl MicroOp {
    /// Splits a raw microword into typed fields.
    ///
    /// Bits above position 35 are ignored; decoding cannot fail because
    /// every fixed-width field pattern maps to a variant.
    #[must_use]
    pub const fn decode(word: u64) -> Self {
        let word = word & MICROWORD_MASK;
        Self {
            next_base: field(word, MPC_SHIFT, MPC_BITS) as u16,
            jump: JumpCond::from_bits(field(word, JUMP_SHIFT, JUMP_BITS) as u8),
            shift: ShiftOp::from_bits(field(word, SHIFT_SHIFT, SHIFT_BITS) as u8),
            alu: AluOp::from_bits(field(word, ALU_OP_SHIFT, ALU_OP_BITS) as u8),
            c_mask: field(word, C_MASK_SHIFT, C_MASK_BITS) as u16,
            mem: MemRequest::from_bits(field(word, MEM_SHIFT, MEM_BITS) as u8),
            b_sel: BusSelector::from_bits(field(word, B_SEL_SHIFT, B_SEL_BITS) as u8),
        }
    }

    /// Re-packs the typed fields into the original 36-bit word.
    #[must_use]
    pub const fn encode(self) -> u64 {
        (self.b_sel.bits() as u64) << B_SEL_SHIFT
            | (self.mem.bits() as u64) << MEM_SHIFT
            | ((self.c_mask & 0x1FF) as u64) << C_MASK_SHIFT
            | (self.alu.bits() as u64) << ALU_OP_SHIFT
            | (self.shift.bits() as u64) << SHIFT_SHIFT
            | (self.jump.bits() as u64) << JUMP_SHIFT
            | ((self.next_base & 0x1FF) as u64) << MPC_SHIFT
    }
}
