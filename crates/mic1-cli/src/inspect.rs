//! Between-cycle state rendering: registers, operand stack, and program
//! area, in binary and hex. Pure formatting over a read-only snapshot;
//! nothing here ever mutates the machine.

use std::fmt::Write as _;

use mic1_core::{Machine, RegisterFile, MICROWORD_BITS, PROGRAM_ORIGIN, WORD_BYTES};

/// Field widths of a microword from most to least significant bit, used
/// to group the MIR rendering.
const MIR_GROUPS: [u32; 7] = [9, 3, 2, 6, 9, 3, 4];

fn byte_bits(value: u8) -> String {
    format!("{value:08b}")
}

fn word_bits(value: u32) -> String {
    let bytes = value.to_be_bytes();
    format!(
        "{:08b} {:08b} {:08b} {:08b}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

fn mpc_bits(value: u16) -> String {
    format!("{:09b}", value & 0x1FF)
}

fn mir_bits(word: u64) -> String {
    let mut out = String::new();
    let mut bit = MICROWORD_BITS;
    for group in MIR_GROUPS {
        if bit < MICROWORD_BITS {
            out.push(' ');
        }
        for _ in 0..group {
            bit -= 1;
            out.push(if word >> bit & 1 == 1 { '1' } else { '0' });
        }
    }
    out
}

fn render_stack(machine: &Machine) -> String {
    let regs = machine.registers();
    let (sp, lv) = (regs.sp(), regs.lv());
    if sp == 0 || lv == 0 {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\t\t  OPERAND STACK");
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "     ADDR\t   VALUE (BINARY)\t\tVALUE");

    let capacity = machine.memory().capacity() as u64;
    if u64::from(sp) * WORD_BYTES as u64 >= capacity || u64::from(lv) * WORD_BYTES as u64 >= capacity
    {
        let _ = writeln!(out, "invalid stack pointers (SP={sp:X}, LV={lv:X})");
    } else {
        for index in (lv..=sp).rev() {
            let marker = if index == sp {
                "SP ->"
            } else if index == lv {
                "LV ->"
            } else {
                "     "
            };
            let value = machine.memory().word_at(index).unwrap_or(0);
            let _ = writeln!(
                out,
                "{marker}{index:X}  {}  {}",
                word_bits(value),
                value as i32
            );
        }
    }
    let _ = writeln!(out, "========================================");
    out
}

fn render_program_area(machine: &Machine) -> String {
    let pc = machine.registers().pc();
    if pc < PROGRAM_ORIGIN as u32 {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n\t\t\tPROGRAM AREA");
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "\t\tBINARY\t HEX  BYTE ADDR");

    let capacity = machine.memory().capacity() as u64;
    if u64::from(pc) + 3 >= capacity || pc < 2 {
        let _ = writeln!(out, "PC is near the memory limits ({pc:X})");
    } else {
        for addr in pc - 2..=pc + 3 {
            let marker = if addr == pc { "running >>  " } else { "\t\t" };
            let byte = machine.memory().byte_at(addr).unwrap_or(0);
            let _ = writeln!(out, "{marker}{} 0x{byte:02X} \t{addr:X}", byte_bits(byte));
        }
    }
    let _ = writeln!(out, "========================================\n");
    out
}

fn render_registers(regs: &RegisterFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\t\tREGISTERS");
    let _ = writeln!(out, "\tBINARY\t\t\t\t\tHEX");

    let words = [
        ("MAR", regs.mar()),
        ("MDR", regs.mdr()),
        ("PC ", regs.pc()),
    ];
    for (name, value) in words {
        let _ = writeln!(out, "{name}: {}\t{value:x}", word_bits(value));
    }
    let _ = writeln!(out, "MBR: \t\t{}\t\t{:x}", byte_bits(regs.mbr()), regs.mbr());
    let words = [
        ("SP ", regs.sp()),
        ("LV ", regs.lv()),
        ("CPP", regs.cpp()),
        ("TOS", regs.tos()),
        ("OPC", regs.opc()),
        ("H  ", regs.h()),
    ];
    for (name, value) in words {
        let _ = writeln!(out, "{name}: {}\t{value:x}", word_bits(value));
    }
    let _ = writeln!(out, "MPC: \t\t{}\t\t{:x}", mpc_bits(regs.mpc()), regs.mpc());
    let _ = writeln!(out, "MIR: {}", mir_bits(regs.mir()));

    let flags = regs.flags();
    let _ = writeln!(
        out,
        "Flags: negative={} zero={}",
        u8::from(flags.negative),
        u8::from(flags.zero)
    );
    out
}

/// Renders the full between-cycle state display.
pub fn render_machine(machine: &Machine) -> String {
    let mut out = String::new();
    out.push_str(&render_stack(machine));
    out.push_str(&render_program_area(machine));
    out.push_str(&render_registers(machine.registers()));
    out
}

#[cfg(test)]
mod tests {
    use mic1_core::{Machine, MachineConfig};

    use super::{byte_bits, mir_bits, mpc_bits, render_machine, word_bits};

    fn machine() -> Machine {
        Machine::with_config(&MachineConfig {
            memory_bytes: 0x1000,
            ..MachineConfig::default()
        })
    }

    #[test]
    fn binary_renderings_are_fixed_width() {
        assert_eq!(byte_bits(0xA5), "10100101");
        assert_eq!(mpc_bits(0x005), "000000101");
        assert_eq!(
            word_bits(0x0102_8040),
            "00000001 00000010 10000000 01000000"
        );
    }

    #[test]
    fn mir_rendering_groups_the_seven_fields() {
        // All 36 bits set: groups of 9|3|2|6|9|3|4.
        assert_eq!(
            mir_bits((1 << 36) - 1),
            "111111111 111 11 111111 111111111 111 1111"
        );
        assert_eq!(
            mir_bits(0),
            "000000000 000 00 000000 000000000 000 0000"
        );
        // B_SEL is the low nibble.
        assert_eq!(
            mir_bits(0b1011),
            "000000000 000 00 000000 000000000 000 1011"
        );
    }

    #[test]
    fn fresh_machine_renders_registers_only() {
        let rendered = render_machine(&machine());
        assert!(rendered.contains("REGISTERS"));
        assert!(rendered.contains("MAR:"));
        assert!(rendered.contains("Flags: negative=0 zero=0"));
        // SP/LV are zero, PC is below the origin: no stack or program view.
        assert!(!rendered.contains("OPERAND STACK"));
        assert!(!rendered.contains("PROGRAM AREA"));
    }

    #[test]
    fn stack_view_appears_once_sp_and_lv_are_set() {
        use mic1_core::{
            AluOp, BusSelector, CBusTarget, JumpCond, MemRequest, MicroOp, NullTrace, ShiftOp,
        };

        const fn idle() -> MicroOp {
            MicroOp {
                next_base: 0,
                jump: JumpCond::from_bits(0),
                shift: ShiftOp::None,
                alu: AluOp::Unknown(0),
                c_mask: 0,
                mem: MemRequest::from_bits(0),
                b_sel: BusSelector::Mdr,
            }
        }

        // Registers only change through microcode. Stage 5 in word 0,
        // pull it through MDR into SP, then LV := SP - 1, so the view
        // spans two stack rows.
        let mut machine = machine();
        machine.memory_mut().write_word(0, 5).expect("in range");
        machine.memory_mut().write_word(5, 0x2A).expect("in range");
        machine.control_store_mut().set(0, MicroOp {
            mem: MemRequest::from_bits(0b010),
            next_base: 1,
            ..idle()
        }.encode());
        machine.control_store_mut().set(1, MicroOp {
            alu: AluOp::PassB,
            b_sel: BusSelector::Mdr,
            c_mask: CBusTarget::Sp.mask(),
            next_base: 2,
            ..idle()
        }.encode());
        machine.control_store_mut().set(2, MicroOp {
            alu: AluOp::DecB,
            b_sel: BusSelector::Sp,
            c_mask: CBusTarget::Lv.mask(),
            next_base: 3,
            ..idle()
        }.encode());

        let mut sink = NullTrace;
        for _ in 0..3 {
            let _ = machine.step(&mut sink);
        }
        assert_eq!(machine.registers().sp(), 5);
        assert_eq!(machine.registers().lv(), 4);

        let rendered = render_machine(&machine);
        assert!(rendered.contains("OPERAND STACK"));
        assert!(rendered.contains("SP ->"));
        assert!(rendered.contains("LV ->"));
        assert!(rendered.contains("42"));
    }
}
