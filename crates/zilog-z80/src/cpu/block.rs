//! Block transfer, compare and I/O instructions.
//!
//! The repeating forms run one iteration per instruction. While there is
//! more to do they rewind PC onto their own opcode and charge the taken cost,
//! so an interrupt can land between iterations.

use emu_core::Bus;

use super::Z80;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53};
use crate::timing::Clocking;

/// Direction of HL/DE (and the WZ step for CPI/CPD).
#[derive(Clone, Copy)]
enum Step {
    Up,
    Down,
}

impl Step {
    const fn apply(self, value: u16) -> u16 {
        match self {
            Self::Up => value.wrapping_add(1),
            Self::Down => value.wrapping_sub(1),
        }
    }
}

/// X and Y for LDI/CPI: bit 3 and bit 1 of `n`.
const fn block_xy(n: u8) -> u8 {
    (n & XF) | ((n << 4) & YF)
}

impl<C: Clocking> Z80<C> {
    /// Rewind onto the ED prefix so the instruction runs again.
    fn repeat(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_sub(2);
        self.take_branch();
    }

    /// As [`Self::repeat`], for the transfer and compare forms which also
    /// latch WZ one past the opcode start.
    fn repeat_latching(&mut self) {
        self.repeat();
        self.regs.wz = self.regs.pc.wrapping_add(1);
    }

    fn transfer<B: Bus>(&mut self, bus: &mut B, step: Step) {
        let hl = self.regs.hl();
        let de = self.regs.de();
        let value = bus.read(hl);
        bus.write(de, value);
        self.regs.set_hl(step.apply(hl));
        self.regs.set_de(step.apply(de));
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let n = value.wrapping_add(self.regs.a);
        let mut f = (self.regs.f & (SF | ZF | CF)) | block_xy(n);
        if bc != 0 {
            f |= PF;
        }
        self.set_f(f);
    }

    fn compare<B: Bus>(&mut self, bus: &mut B, step: Step) {
        let hl = self.regs.hl();
        let value = bus.read(hl);
        let a = self.regs.a;
        let result = a.wrapping_sub(value);
        let half = (a ^ value ^ result) & HF;

        self.regs.set_hl(step.apply(hl));
        self.regs.wz = step.apply(self.regs.wz);
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let n = result.wrapping_sub(u8::from(half != 0));
        let mut f = (self.regs.f & CF) | NF | half | (result & SF) | block_xy(n);
        if result == 0 {
            f |= ZF;
        }
        if bc != 0 {
            f |= PF;
        }
        self.set_f(f);
    }

    /// Flags shared by INI/IND/OUTI/OUTD. `k` is the byte moved plus the
    /// low byte it is paired with (C ± 1 for input, L for output).
    fn io_block_flags(&mut self, value: u8, k: u16) {
        let b = self.regs.b;
        let mut f = sz53(b);
        if value & 0x80 != 0 {
            f |= NF;
        }
        if k > 0xFF {
            f |= HF | CF;
        }
        if parity(((k as u8) & 7) ^ b) {
            f |= PF;
        }
        self.set_f(f);
    }

    fn input<B: Bus>(&mut self, bus: &mut B, step: Step) {
        let bc = self.regs.bc();
        self.regs.wz = step.apply(bc);
        let value = bus.port_in(bc);
        let hl = self.regs.hl();
        bus.write(hl, value);
        self.regs.set_hl(step.apply(hl));
        self.regs.b = self.regs.b.wrapping_sub(1);

        let paired = match step {
            Step::Up => self.regs.c.wrapping_add(1),
            Step::Down => self.regs.c.wrapping_sub(1),
        };
        self.io_block_flags(value, u16::from(value) + u16::from(paired));
    }

    fn output<B: Bus>(&mut self, bus: &mut B, step: Step) {
        let hl = self.regs.hl();
        let value = bus.read(hl);
        self.regs.b = self.regs.b.wrapping_sub(1);
        let bc = self.regs.bc();
        self.regs.wz = step.apply(bc);
        bus.port_out(bc, value);
        self.regs.set_hl(step.apply(hl));

        self.io_block_flags(value, u16::from(value) + u16::from(self.regs.l));
    }

    pub(super) fn ldi<B: Bus>(&mut self, bus: &mut B) {
        self.transfer(bus, Step::Up);
    }

    pub(super) fn ldd<B: Bus>(&mut self, bus: &mut B) {
        self.transfer(bus, Step::Down);
    }

    pub(super) fn ldir<B: Bus>(&mut self, bus: &mut B) {
        self.transfer(bus, Step::Up);
        if self.regs.bc() != 0 {
            self.repeat_latching();
        }
    }

    pub(super) fn lddr<B: Bus>(&mut self, bus: &mut B) {
        self.transfer(bus, Step::Down);
        if self.regs.bc() != 0 {
            self.repeat_latching();
        }
    }

    pub(super) fn cpi<B: Bus>(&mut self, bus: &mut B) {
        self.compare(bus, Step::Up);
    }

    pub(super) fn cpd<B: Bus>(&mut self, bus: &mut B) {
        self.compare(bus, Step::Down);
    }

    // Stops on a match as well as on BC reaching zero
    pub(super) fn cpir<B: Bus>(&mut self, bus: &mut B) {
        self.compare(bus, Step::Up);
        if self.regs.bc() != 0 && self.regs.f & ZF == 0 {
            self.repeat_latching();
        }
    }

    pub(super) fn cpdr<B: Bus>(&mut self, bus: &mut B) {
        self.compare(bus, Step::Down);
        if self.regs.bc() != 0 && self.regs.f & ZF == 0 {
            self.repeat_latching();
        }
    }

    pub(super) fn ini<B: Bus>(&mut self, bus: &mut B) {
        self.input(bus, Step::Up);
    }

    pub(super) fn ind<B: Bus>(&mut self, bus: &mut B) {
        self.input(bus, Step::Down);
    }

    pub(super) fn inir<B: Bus>(&mut self, bus: &mut B) {
        self.input(bus, Step::Up);
        if self.regs.b != 0 {
            self.repeat();
        }
    }

    pub(super) fn indr<B: Bus>(&mut self, bus: &mut B) {
        self.input(bus, Step::Down);
        if self.regs.b != 0 {
            self.repeat();
        }
    }

    pub(super) fn outi<B: Bus>(&mut self, bus: &mut B) {
        self.output(bus, Step::Up);
    }

    pub(super) fn outd<B: Bus>(&mut self, bus: &mut B) {
        self.output(bus, Step::Down);
    }

    pub(super) fn otir<B: Bus>(&mut self, bus: &mut B) {
        self.output(bus, Step::Up);
        if self.regs.b != 0 {
            self.repeat();
        }
    }

    pub(super) fn otdr<B: Bus>(&mut self, bus: &mut B) {
        self.output(bus, Step::Down);
        if self.regs.b != 0 {
            self.repeat();
        }
    }
}
