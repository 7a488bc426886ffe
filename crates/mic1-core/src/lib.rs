//! Core simulator crate for the Mic-1 microarchitecture.
//!
//! The crate models a microprogrammed machine: a 512-slot control store of
//! 36-bit microinstructions drives a register datapath through an ALU and
//! shifter, with byte-addressable main memory and flag-gated microprogram
//! jumps. One call to [`Machine::step`] retires exactly one microinstruction.

/// 36-bit microinstruction layout, field types, and split/pack helpers.
pub mod microword;
pub use microword::{
    AluOp, BusSelector, JumpCond, MemRequest, MicroOp, ShiftOp, ALU_OP_BITS, B_SEL_BITS,
    C_MASK_BITS, JUMP_BITS, MEM_BITS, MICROWORD_BITS, MICROWORD_MASK, MPC_BITS, SHIFT_BITS,
};

/// Architectural register file, condition flags, and C-bus destinations.
pub mod registers;
pub use registers::{CBusTarget, CondFlags, RegisterFile, C_BUS_TARGET_COUNT, MPC_MASK};

/// B-bus source routing and C-bus destination fan-out.
pub mod bus;
pub use bus::{drive_bus_b, sign_extend_byte, write_back, BUS_ALL_ONES};

/// ALU operation table and the post-flag shift stage.
pub mod alu;
pub use alu::{apply_shift, execute_alu, AluOutput};

/// Read-only control store of microinstruction slots.
pub mod control_store;
pub use control_store::{ControlStore, CONTROL_STORE_SLOTS};

/// Byte-addressable main memory with pre-access bound checks.
pub mod memory;
pub use memory::{
    MainMemory, DEFAULT_MEMORY_BYTES, INIT_BLOCK_BYTES, PROGRAM_ORIGIN, WORD_BYTES,
};

/// Fault, warning, and halt taxonomy.
pub mod fault;
pub use fault::{Fault, HaltReason, Warning};

/// Per-cycle observation events and the sink trait consumed by the engine.
pub mod trace;
pub use trace::{NullTrace, TraceEvent, TraceSink};

/// Control-store and program image loading from byte streams.
pub mod loader;
pub use loader::{
    load_control_store, load_program, ControlStoreReport, LoadError, ProgramReport,
    CONTROL_STORE_RECORD_BYTES,
};

/// The cycle engine orchestrating one microinstruction per tick.
pub mod engine;
pub use engine::{Machine, MachineConfig, RunState, HALT_SENTINEL};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
