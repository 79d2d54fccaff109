//! CB-prefixed rotates, shifts, BIT, RES and SET.

use emu_core::Bus;

use super::Z80;
use crate::alu;
use crate::decode::Descriptor;
use crate::flags::CF;
use crate::timing::Clocking;

impl<C: Clocking> Z80<C> {
    fn shift(&mut self, d: &Descriptor, value: u8) -> u8 {
        let result = d.shift_op().apply(value, self.regs.f);
        self.set_f(result.flags);
        result.value
    }

    fn test_bit(&mut self, d: &Descriptor, value: u8, xy_source: u8) {
        let flags = alu::bit(d.value(), value, xy_source);
        self.set_f(flags | (self.regs.f & CF));
    }

    /// Read-modify-write of `(IX+d)`. The result is also returned so the
    /// undocumented register-copy forms can store it.
    fn modify_indexed<B: Bus>(
        &mut self,
        bus: &mut B,
        d: &Descriptor,
        op: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        let addr = self.indexed_address(bus, d.pair(1));
        let value = op(self, bus.read(addr));
        bus.write(addr, value);
        value
    }

    pub(super) fn shift_r(&mut self, d: &Descriptor) {
        let reg = d.reg(1);
        let value = self.shift(d, self.regs.get8(reg));
        self.regs.set8(reg, value);
    }

    pub(super) fn shift_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(1));
        let value = self.shift(d, bus.read(addr));
        bus.write(addr, value);
    }

    pub(super) fn shift_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        self.modify_indexed(bus, d, |cpu, v| cpu.shift(d, v));
    }

    pub(super) fn shift_off_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.modify_indexed(bus, d, |cpu, v| cpu.shift(d, v));
        self.regs.set8(d.reg(2), value);
    }

    pub(super) fn bit_r(&mut self, d: &Descriptor) {
        let value = self.regs.get8(d.reg(1));
        self.test_bit(d, value, value);
    }

    // BIT n, (HL): X/Y leak from the high byte of WZ
    pub(super) fn bit_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = bus.read(self.regs.get16(d.pair(1)));
        let [_, wz_hi] = self.regs.wz.to_le_bytes();
        self.test_bit(d, value, wz_hi);
    }

    // BIT n, (IX+d): WZ holds the effective address
    pub(super) fn bit_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(1));
        let value = bus.read(addr);
        let [_, hi] = addr.to_le_bytes();
        self.test_bit(d, value, hi);
    }

    pub(super) fn res_r(&mut self, d: &Descriptor) {
        let reg = d.reg(1);
        self.regs.set8(reg, alu::res(d.value(), self.regs.get8(reg)));
    }

    pub(super) fn res_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(1));
        let value = alu::res(d.value(), bus.read(addr));
        bus.write(addr, value);
    }

    pub(super) fn res_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        self.modify_indexed(bus, d, |_, v| alu::res(d.value(), v));
    }

    pub(super) fn res_off_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.modify_indexed(bus, d, |_, v| alu::res(d.value(), v));
        self.regs.set8(d.reg(2), value);
    }

    pub(super) fn set_r(&mut self, d: &Descriptor) {
        let reg = d.reg(1);
        self.regs.set8(reg, alu::set(d.value(), self.regs.get8(reg)));
    }

    pub(super) fn set_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(1));
        let value = alu::set(d.value(), bus.read(addr));
        bus.write(addr, value);
    }

    pub(super) fn set_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        self.modify_indexed(bus, d, |_, v| alu::set(d.value(), v));
    }

    pub(super) fn set_off_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.modify_indexed(bus, d, |_, v| alu::set(d.value(), v));
        self.regs.set8(d.reg(2), value);
    }
}
