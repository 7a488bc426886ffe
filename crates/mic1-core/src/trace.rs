//! Per-cycle observation events and the sink trait consumed by the engine.
//!
//! The core never prints. Everything a host might want to surface —
//! warnings, memory traffic, the halt report — is delivered through a
//! [`TraceSink`] in execution order, between state mutations, so a sink
//! observing a [`TraceEvent::CycleStart`] sees the machine exactly as the
//! cycle begins.

use crate::fault::{HaltReason, Warning};

/// One observable event emitted during a cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A microinstruction was latched from the control store.
    CycleStart {
        /// Control-store index it was fetched from.
        mpc: u16,
        /// The raw 36-bit microword.
        word: u64,
    },
    /// A non-fatal field-code warning was raised.
    Warning {
        /// The warning condition.
        warning: Warning,
    },
    /// An instruction byte was fetched from memory at PC into MBR.
    InstructionFetch {
        /// Byte address fetched from.
        pc: u32,
        /// The fetched byte.
        byte: u8,
    },
    /// A word was read from memory at `MAR*4` into MDR.
    MemoryRead {
        /// Word index read from.
        mar: u32,
        /// The word now in MDR.
        value: u32,
    },
    /// MDR was written to memory at `MAR*4`.
    MemoryWrite {
        /// Word index written to.
        mar: u32,
        /// The word that was stored.
        value: u32,
    },
    /// The engine transitioned to its terminal halted state.
    Halted {
        /// Why the machine stopped.
        reason: HaltReason,
    },
}

/// Receives trace events in deterministic execution order.
pub trait TraceSink {
    /// Records one event. Sinks must not assume anything beyond ordering.
    fn on_event(&mut self, event: TraceEvent);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::{NullTrace, TraceEvent, TraceSink};
    use crate::fault::HaltReason;

    #[test]
    fn null_sink_accepts_every_event_shape() {
        let mut sink = NullTrace;
        sink.on_event(TraceEvent::CycleStart { mpc: 0, word: 0 });
        sink.on_event(TraceEvent::Halted {
            reason: HaltReason::HaltInstruction,
        });
    }
}
