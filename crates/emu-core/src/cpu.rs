//! CPU stepping trait.

use crate::Bus;

/// A CPU core driven one step at a time.
///
/// The bus is passed in rather than owned so the host can share it with other
/// devices between steps. What a "step" is depends on the core's timing
/// strategy: a whole instruction, or a single bus cycle of one.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by one step. Returns the T-states the step consumed.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
