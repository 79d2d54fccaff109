//! Jumps, calls, returns, restarts and the interrupt-enable instructions.

use emu_core::Bus;

use super::Z80;
use crate::decode::Descriptor;
use crate::timing::Clocking;

impl<C: Clocking> Z80<C> {
    fn jump_relative(&mut self, offset: i8) {
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
        self.regs.wz = self.regs.pc;
    }

    pub(super) fn jp<B: Bus>(&mut self, bus: &mut B) {
        let target = self.fetch_word(bus);
        self.regs.pc = target;
        self.regs.wz = target;
    }

    // JP cc, nn: WZ takes the target whether or not the jump happens
    pub(super) fn jp_cond<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let target = self.fetch_word(bus);
        self.regs.wz = target;
        if d.cond().holds(self.regs.f) {
            self.regs.pc = target;
            self.take_branch();
        }
    }

    // JP (HL) / JP (IX) / JP (IY): no memory access, WZ untouched
    pub(super) fn jp_rr(&mut self, d: &Descriptor) {
        self.regs.pc = self.regs.get16(d.pair(0));
    }

    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B) {
        let offset = self.fetch_byte(bus) as i8;
        self.jump_relative(offset);
    }

    pub(super) fn jr_cond<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let offset = self.fetch_byte(bus) as i8;
        if d.cond().holds(self.regs.f) {
            self.jump_relative(offset);
            self.take_branch();
        }
    }

    pub(super) fn djnz<B: Bus>(&mut self, bus: &mut B) {
        self.regs.b = self.regs.b.wrapping_sub(1);
        let offset = self.fetch_byte(bus) as i8;
        if self.regs.b != 0 {
            self.jump_relative(offset);
            self.take_branch();
        }
    }

    pub(super) fn call<B: Bus>(&mut self, bus: &mut B) {
        let target = self.fetch_word(bus);
        self.regs.wz = target;
        self.push(bus, self.regs.pc);
        self.regs.pc = target;
    }

    pub(super) fn call_cond<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let target = self.fetch_word(bus);
        self.regs.wz = target;
        if d.cond().holds(self.regs.f) {
            self.push(bus, self.regs.pc);
            self.regs.pc = target;
            self.take_branch();
        }
    }

    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop(bus);
        self.regs.wz = self.regs.pc;
    }

    pub(super) fn ret_cond<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        if d.cond().holds(self.regs.f) {
            self.ret(bus);
            self.take_branch();
        }
    }

    /// RETN and RETI: return and restore IFF1 from IFF2.
    pub(super) fn retn<B: Bus>(&mut self, bus: &mut B) {
        self.regs.iff1 = self.regs.iff2;
        self.ret(bus);
    }

    pub(super) fn rst<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        self.restart(bus, u16::from(d.value()));
    }

    /// Push PC and continue at `target`. Shared by RST and interrupt entry.
    pub(super) fn restart<B: Bus>(&mut self, bus: &mut B, target: u16) {
        self.push(bus, self.regs.pc);
        self.regs.pc = target;
        self.regs.wz = target;
    }

    // PC stays on the HALT opcode until an interrupt releases it
    pub(super) fn halt(&mut self) {
        self.regs.halted = true;
        self.regs.pc = self.regs.pc.wrapping_sub(1);
    }

    pub(super) fn di(&mut self) {
        self.regs.iff1 = false;
        self.regs.iff2 = false;
    }

    pub(super) fn ei(&mut self) {
        self.regs.iff1 = true;
        self.regs.iff2 = true;
        self.regs.ei_pending = true;
    }
}
