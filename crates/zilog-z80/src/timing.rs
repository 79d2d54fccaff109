//! Timing strategies.
//!
//! The engine always executes an instruction in one go on the first step.
//! What differs is how its cost is reported: [`Fast`] hands back the whole
//! instruction at once, [`BusCycle`] spreads it over one step per bus cycle
//! so a host can interleave other devices between them.

use crate::decode::{Cost, Descriptor};

/// Where the CPU is within an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has run since power-on or reset.
    #[default]
    Idle,
    /// Decoding and executing; only seen from inside a step.
    Fetching,
    /// Side effects are done; `remaining` bus cycles are still to be reported.
    Executing { remaining: u8 },
    /// The last instruction has been fully reported.
    Done,
}

impl Phase {
    /// True when the next step starts a new instruction.
    #[must_use]
    pub const fn at_boundary(self) -> bool {
        matches!(self, Self::Idle | Self::Done)
    }
}

/// How instruction costs are turned into steps.
///
/// Chosen once per CPU through its type parameter.
pub trait Clocking: Default {
    /// Report the next bus cycle of an instruction in progress, or `None`
    /// when the previous instruction has been fully reported.
    fn resume(&mut self) -> Option<u32>;

    /// The engine is about to decode a new instruction.
    fn fetch(&mut self);

    /// The engine has executed `descriptor`. `will_branch` is set when the
    /// handler took a conditional branch or repeat. Returns the T-states
    /// charged for this step.
    fn begin(&mut self, descriptor: &Descriptor, will_branch: bool) -> u32;

    /// Charge a fixed cost not backed by a descriptor (halt spin, interrupt
    /// response). Returns the T-states charged for this step.
    fn begin_fixed(&mut self, tstates: u8) -> u32;

    fn phase(&self) -> Phase;

    fn reset(&mut self);
}

/// Whole-instruction stepping.
///
/// Charges the not-taken cost, plus the taken delta when the handler branched.
#[derive(Debug, Default)]
pub struct Fast {
    phase: Phase,
}

impl Clocking for Fast {
    fn resume(&mut self) -> Option<u32> {
        None
    }

    fn fetch(&mut self) {
        self.phase = Phase::Fetching;
    }

    fn begin(&mut self, descriptor: &Descriptor, will_branch: bool) -> u32 {
        let mut tstates = u32::from(descriptor.not_taken.tstates);
        if will_branch {
            tstates += u32::from(descriptor.taken.tstates - descriptor.not_taken.tstates);
        }
        self.phase = Phase::Done;
        tstates
    }

    fn begin_fixed(&mut self, tstates: u8) -> u32 {
        self.phase = Phase::Done;
        u32::from(tstates)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}

/// Per-bus-cycle stepping.
///
/// Every step but the last reports 4 T-states; the last reports the
/// descriptor's final-cycle override.
#[derive(Debug, Default)]
pub struct BusCycle {
    phase: Phase,
    last: u8,
}

impl BusCycle {
    fn start(&mut self, cost: Cost) -> u32 {
        if cost.mcycles <= 1 {
            self.phase = Phase::Done;
            return u32::from(cost.last);
        }
        self.phase = Phase::Executing { remaining: cost.mcycles - 1 };
        self.last = cost.last;
        4
    }
}

impl Clocking for BusCycle {
    fn resume(&mut self) -> Option<u32> {
        let Phase::Executing { remaining } = self.phase else {
            return None;
        };
        if remaining <= 1 {
            self.phase = Phase::Done;
            Some(u32::from(self.last))
        } else {
            self.phase = Phase::Executing { remaining: remaining - 1 };
            Some(4)
        }
    }

    fn fetch(&mut self) {
        self.phase = Phase::Fetching;
    }

    fn begin(&mut self, descriptor: &Descriptor, will_branch: bool) -> u32 {
        self.start(if will_branch { descriptor.taken } else { descriptor.not_taken })
    }

    fn begin_fixed(&mut self, tstates: u8) -> u32 {
        self.start(Cost::of(tstates))
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
