//! Core traits and types shared between a CPU core and the machine hosting it.
//!
//! The CPU owns no memory. Every byte it reads or writes, in memory or I/O
//! space, goes through a [`Bus`] supplied by the host on each call.

mod bus;
mod cpu;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use ticks::Ticks;
