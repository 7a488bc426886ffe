//! ALU operation table and the post-flag shift stage.
//!
//! The ALU computes the C-bus value from the B bus and the H register,
//! then derives the condition flags from the unshifted result. The shift
//! stage runs after the flag update, so flags always describe the raw ALU
//! output. An unrecognized operation keeps the previous C-bus value, which
//! therefore also feeds the flag update for that cycle.

use crate::fault::Warning;
use crate::microword::{AluOp, ShiftOp};
use crate::registers::CondFlags;

/// Result of one ALU evaluation, before the shift stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    /// The unshifted C-bus value.
    pub value: u32,
    /// Flags derived from `value`.
    pub flags: CondFlags,
    /// Warning raised for an unrecognized operation code, if any.
    pub warning: Option<Warning>,
}

/// Evaluates one ALU operation.
///
/// `previous` is the C-bus value latched by the prior cycle; it is carried
/// through unchanged when `op` is unrecognized.
#[must_use]
pub const fn execute_alu(op: AluOp, h: u32, bus_b: u32, previous: u32) -> AluOutput {
    let (value, warning) = match op {
        AluOp::And => (h & bus_b, None),
        AluOp::One => (1, None),
        AluOp::MinusOne => (u32::MAX, None),
        AluOp::PassB => (bus_b, None),
        AluOp::PassH => (h, None),
        AluOp::NotH => (!h, None),
        AluOp::Or => (h | bus_b, None),
        AluOp::NotB => (!bus_b, None),
        AluOp::IncB => (bus_b.wrapping_add(1), None),
        AluOp::DecB => (bus_b.wrapping_sub(1), None),
        AluOp::IncH => (h.wrapping_add(1), None),
        AluOp::NegH => (h.wrapping_neg(), None),
        AluOp::Add => (h.wrapping_add(bus_b), None),
        AluOp::AddInc => (h.wrapping_add(bus_b).wrapping_add(1), None),
        AluOp::SubB => (bus_b.wrapping_sub(h), None),
        AluOp::Unknown(code) => (previous, Some(Warning::UnknownAluOp(code))),
    };

    AluOutput {
        value,
        flags: CondFlags::from_result(value),
        warning,
    }
}

/// Applies the shifter to the ALU result.
///
/// An unrecognized code is non-fatal: the value passes through unshifted
/// with a [`Warning::UnknownShift`].
#[must_use]
pub const fn apply_shift(shift: ShiftOp, value: u32) -> (u32, Option<Warning>) {
    match shift {
        ShiftOp::None => (value, None),
        ShiftOp::Left8 => (value << 8, None),
        ShiftOp::Right1 => (value >> 1, None),
        ShiftOp::Unknown(code) => (value, Some(Warning::UnknownShift(code))),
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_shift, execute_alu};
    use crate::fault::Warning;
    use crate::microword::{AluOp, ShiftOp};
    use rstest::rstest;

    #[rstest]
    #[case(AluOp::And, 0b1100, 0b1010, 0b1000)]
    #[case(AluOp::One, 0, 0, 1)]
    #[case(AluOp::MinusOne, 0, 0, 0xFFFF_FFFF)]
    #[case(AluOp::PassB, 7, 9, 9)]
    #[case(AluOp::PassH, 7, 9, 7)]
    #[case(AluOp::NotH, 0x0000_00FF, 0, 0xFFFF_FF00)]
    #[case(AluOp::Or, 0b1100, 0b1010, 0b1110)]
    #[case(AluOp::NotB, 0, 0x0000_00FF, 0xFFFF_FF00)]
    #[case(AluOp::IncB, 0, 41, 42)]
    #[case(AluOp::DecB, 0, 41, 40)]
    #[case(AluOp::IncH, 41, 0, 42)]
    #[case(AluOp::NegH, 1, 0, 0xFFFF_FFFF)]
    #[case(AluOp::Add, 40, 2, 42)]
    #[case(AluOp::AddInc, 40, 1, 42)]
    #[case(AluOp::SubB, 2, 44, 42)]
    fn defined_operations_compute_the_documented_result(
        #[case] op: AluOp,
        #[case] h: u32,
        #[case] bus_b: u32,
        #[case] expected: u32,
    ) {
        let out = execute_alu(op, h, bus_b, 0xAAAA_5555);
        assert_eq!(out.value, expected);
        assert_eq!(out.warning, None);
    }

    #[test]
    fn arithmetic_wraps_at_32_bits() {
        assert_eq!(execute_alu(AluOp::IncB, 0, u32::MAX, 0).value, 0);
        assert_eq!(execute_alu(AluOp::Add, u32::MAX, 2, 0).value, 1);
        assert_eq!(execute_alu(AluOp::NegH, 0, 0, 0).value, 0);
    }

    #[test]
    fn flag_update_follows_the_literal_zero_rule() {
        // Opcode 53 (B + 1) with B = -1 produces 0.
        let zero = execute_alu(AluOp::IncB, 0, u32::MAX, 0);
        assert!(zero.flags.zero);
        assert!(!zero.flags.negative);

        // Same opcode with B = 0 produces 1.
        let one = execute_alu(AluOp::IncB, 0, 0, 0);
        assert!(!one.flags.zero);
        assert!(one.flags.negative);
    }

    #[test]
    fn unknown_op_keeps_the_previous_bus_value_and_warns() {
        let out = execute_alu(AluOp::Unknown(5), 1, 2, 0xCAFE_F00D);
        assert_eq!(out.value, 0xCAFE_F00D);
        assert_eq!(out.warning, Some(Warning::UnknownAluOp(5)));
        // Flags are still recomputed, from the carried value.
        assert!(out.flags.negative);
    }

    #[test]
    fn shift_codes_match_the_hardware_table() {
        assert_eq!(apply_shift(ShiftOp::None, 0x0000_0101), (0x0000_0101, None));
        assert_eq!(apply_shift(ShiftOp::Left8, 0x0000_0101), (0x0001_0100, None));
        assert_eq!(apply_shift(ShiftOp::Right1, 0x0000_0101), (0x0000_0080, None));
        assert_eq!(
            apply_shift(ShiftOp::Unknown(3), 0x0000_0101),
            (0x0000_0101, Some(Warning::UnknownShift(3)))
        );
    }

    #[test]
    fn right_shift_is_logical_on_the_sign_bit() {
        assert_eq!(apply_shift(ShiftOp::Right1, 0x8000_0000), (0x4000_0000, None));
    }

    #[test]
    fn left_shift_discards_high_bits() {
        assert_eq!(apply_shift(ShiftOp::Left8, 0xFF00_0001), (0x0000_0100, None));
    }
}
