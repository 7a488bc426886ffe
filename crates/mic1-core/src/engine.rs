//! The cycle engine: one microinstruction fully retired per tick.
//!
//! Each [`Machine::step`] runs the fixed pipeline in order — control-store
//! fetch, decode, B-bus routing, ALU and flag update, shift, C-bus
//! write-back, memory, next-address — then the termination check. No step
//! is skipped and none is revisited within a cycle; a step whose effect is
//! a no-op (zero C-mask, no memory bits) still runs. A bounds fault raised
//! by the memory step does not roll the cycle back: write-back has already
//! applied, the next-address step still runs, and the engine halts at the
//! termination check.

use crate::alu::{apply_shift, execute_alu};
use crate::bus::{drive_bus_b, write_back};
use crate::control_store::ControlStore;
use crate::fault::{Fault, HaltReason};
use crate::memory::{MainMemory, DEFAULT_MEMORY_BYTES};
use crate::microword::{MemRequest, MicroOp};
use crate::registers::RegisterFile;
use crate::trace::{TraceEvent, TraceSink};

/// Instruction byte that halts the machine once latched into MBR.
pub const HALT_SENTINEL: u8 = 0xFF;

/// Immutable machine-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Main-memory capacity in bytes.
    pub memory_bytes: usize,
    /// Instruction byte treated as the halt sentinel.
    pub halt_sentinel: u8,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_bytes: DEFAULT_MEMORY_BYTES,
            halt_sentinel: HALT_SENTINEL,
        }
    }
}

/// Execution state of the engine. Halted is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next cycle.
    Running,
    /// No further cycles will run.
    Halted(HaltReason),
}

impl RunState {
    /// Returns the halt reason when the engine has stopped.
    #[must_use]
    pub const fn halt_reason(self) -> Option<HaltReason> {
        match self {
            Self::Running => None,
            Self::Halted(reason) => Some(reason),
        }
    }
}

/// The complete simulated machine: registers, control store, memory, and
/// the persistent C-bus latch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    regs: RegisterFile,
    control: ControlStore,
    memory: MainMemory,
    // The C bus holds its value across cycles; an unrecognized ALU code
    // re-presents it.
    c_latch: u32,
    run_state: RunState,
    halt_sentinel: u8,
}

impl Default for Machine {
    fn default() -> Self {
        Self::with_config(&MachineConfig::default())
    }
}

impl Machine {
    /// Creates a machine with zeroed registers, an empty control store,
    /// and zeroed memory, per `config`.
    #[must_use]
    pub fn with_config(config: &MachineConfig) -> Self {
        Self {
            regs: RegisterFile::new(),
            control: ControlStore::new(),
            memory: MainMemory::with_capacity(config.memory_bytes),
            c_latch: 0,
            run_state: RunState::Running,
            halt_sentinel: config.halt_sentinel,
        }
    }

    /// Read access to the register file (inspector surface).
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Read access to main memory (inspector surface).
    #[must_use]
    pub const fn memory(&self) -> &MainMemory {
        &self.memory
    }

    /// Mutable memory access for the one-shot load phase.
    pub const fn memory_mut(&mut self) -> &mut MainMemory {
        &mut self.memory
    }

    /// Mutable control-store access for the one-shot load phase.
    pub const fn control_store_mut(&mut self) -> &mut ControlStore {
        &mut self.control
    }

    /// Current execution state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Executes one full cycle, or nothing if the engine has halted.
    pub fn step(&mut self, sink: &mut dyn TraceSink) -> RunState {
        if matches!(self.run_state, RunState::Halted(_)) {
            return self.run_state;
        }

        let word = self.control.fetch(self.regs.mpc());
        self.regs.set_mir(word);
        sink.on_event(TraceEvent::CycleStart {
            mpc: self.regs.mpc(),
            word,
        });
        let op = MicroOp::decode(word);

        let (bus_b, warning) = drive_bus_b(&self.regs, op.b_sel);
        if let Some(warning) = warning {
            sink.on_event(TraceEvent::Warning { warning });
        }

        let alu_out = execute_alu(op.alu, self.regs.h(), bus_b, self.c_latch);
        if let Some(warning) = alu_out.warning {
            sink.on_event(TraceEvent::Warning { warning });
        }
        self.regs.set_flags(alu_out.flags);

        let (shifted, warning) = apply_shift(op.shift, alu_out.value);
        if let Some(warning) = warning {
            sink.on_event(TraceEvent::Warning { warning });
        }
        self.c_latch = shifted;

        write_back(&mut self.regs, op.c_mask, self.c_latch);

        let memory_fault = self.memory_step(op.mem, sink).err();

        self.next_address(op);
        self.termination_check(memory_fault, sink);
        self.run_state
    }

    /// Runs cycles until the engine halts, returning why it stopped.
    pub fn run(&mut self, sink: &mut dyn TraceSink) -> HaltReason {
        loop {
            if let RunState::Halted(reason) = self.step(sink) {
                return reason;
            }
        }
    }

    /// Memory step: both bound checks run every cycle, before any access,
    /// whether or not a request bit is set.
    fn memory_step(&mut self, mem: MemRequest, sink: &mut dyn TraceSink) -> Result<(), Fault> {
        self.memory.validate_fetch(self.regs.pc())?;
        self.memory.validate_word(self.regs.mar())?;

        if mem.fetch() {
            let pc = self.regs.pc();
            let byte = self.memory.fetch_byte(pc)?;
            self.regs.set_mbr(byte);
            sink.on_event(TraceEvent::InstructionFetch { pc, byte });
        }
        if mem.read() {
            let mar = self.regs.mar();
            let value = self.memory.read_word(mar)?;
            self.regs.set_mdr(value);
            sink.on_event(TraceEvent::MemoryRead { mar, value });
        }
        if mem.write() {
            let mar = self.regs.mar();
            let value = self.regs.mdr();
            self.memory.write_word(mar, value)?;
            sink.on_event(TraceEvent::MemoryWrite { mar, value });
        }
        Ok(())
    }

    /// Next-address step: OR the base with the flag-gated bit 8
    /// contributions and the MBR-gated low bits.
    fn next_address(&mut self, op: MicroOp) {
        let flags = self.regs.flags();
        let mut mpc = op.next_base;
        if op.jump.on_negative() && flags.negative {
            mpc |= 1 << 8;
        }
        if op.jump.on_zero() && flags.zero {
            mpc |= 1 << 8;
        }
        if op.jump.on_mbr() {
            mpc |= u16::from(self.regs.mbr());
        }
        self.regs.set_mpc(mpc);
    }

    /// Termination check, run after every cycle.
    fn termination_check(&mut self, memory_fault: Option<Fault>, sink: &mut dyn TraceSink) {
        let reason = if let Some(fault) = memory_fault {
            Some(HaltReason::Fault(fault))
        } else if self.regs.mbr() == self.halt_sentinel {
            Some(HaltReason::HaltInstruction)
        } else if self.regs.pc() as u64 >= self.memory.capacity() as u64 {
            Some(HaltReason::Fault(Fault::PcOutOfBounds {
                pc: self.regs.pc(),
            }))
        } else {
            None
        };

        if let Some(reason) = reason {
            self.run_state = RunState::Halted(reason);
            sink.on_event(TraceEvent::Halted { reason });
        }
    }
}
