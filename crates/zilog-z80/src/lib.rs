//! Table-driven Zilog Z80 instruction core.
//!
//! Every opcode, across the unprefixed table and the CB, ED, DD, FD, DD CB
//! and FD CB tables, decodes to a static [`Descriptor`] naming its handler,
//! operands and cost. The engine runs one instruction per step in
//! [`FastZ80`], or reports it one bus cycle per step in [`AccurateZ80`].
//!
//! ```
//! use emu_core::SimpleBus;
//! use zilog_z80::FastZ80;
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0, &[0x3E, 0x42, 0x76]); // LD A,42h; HALT
//! let mut cpu = FastZ80::new();
//! assert_eq!(cpu.step(&mut bus), 7);
//! assert_eq!(cpu.regs().a, 0x42);
//! ```

pub mod alu;
mod cpu;
pub mod decode;
mod error;
mod flags;
mod registers;
mod timing;

pub use cpu::{AccurateZ80, FastZ80, Z80};
pub use decode::{
    BranchClass, Condition, Cost, Descriptor, Handler, Operand, Table, validate_tables,
};
pub use error::TableError;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53, sz53p};
pub use registers::{Reg8, Reg16, Registers};
pub use timing::{BusCycle, Clocking, Fast, Phase};
