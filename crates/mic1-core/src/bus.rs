//! B-bus source routing and C-bus destination fan-out.

use crate::fault::Warning;
use crate::microword::BusSelector;
use crate::registers::{CBusTarget, RegisterFile};

/// Value driven onto the B bus when the selector code is unrecognized.
pub const BUS_ALL_ONES: u32 = u32::MAX;

/// Sign-extends an instruction byte to 32 bits.
#[must_use]
pub const fn sign_extend_byte(value: u8) -> u32 {
    if value & 0x80 != 0 {
        value as u32 | 0xFFFF_FF00
    } else {
        value as u32
    }
}

/// Routes the selected source register onto the B bus.
///
/// An unrecognized selector is non-fatal: the bus carries the all-ones
/// pattern and a [`Warning::UnknownBusSelector`] is returned alongside it.
#[must_use]
pub const fn drive_bus_b(regs: &RegisterFile, selector: BusSelector) -> (u32, Option<Warning>) {
    match selector {
        BusSelector::Mdr => (regs.mdr(), None),
        BusSelector::Pc => (regs.pc(), None),
        BusSelector::MbrSigned => (sign_extend_byte(regs.mbr()), None),
        BusSelector::MbrUnsigned => (regs.mbr() as u32, None),
        BusSelector::Sp => (regs.sp(), None),
        BusSelector::Lv => (regs.lv(), None),
        BusSelector::Cpp => (regs.cpp(), None),
        BusSelector::Tos => (regs.tos(), None),
        BusSelector::Opc => (regs.opc(), None),
        BusSelector::Unknown(code) => (BUS_ALL_ONES, Some(Warning::UnknownBusSelector(code))),
    }
}

/// Fans the C-bus value out to every destination whose mask bit is set.
///
/// Destinations are written in ascending bit order; all of them receive
/// the same value in the same cycle. A zero mask is a legal no-op.
pub fn write_back(regs: &mut RegisterFile, c_mask: u16, value: u32) {
    for target in CBusTarget::ALL {
        if c_mask & target.mask() != 0 {
            regs.write_c_target(target, value);
        }
    }
}
