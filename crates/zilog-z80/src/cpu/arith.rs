//! 8- and 16-bit arithmetic, accumulator specials and RLD/RRD.

use emu_core::Bus;

use super::Z80;
use crate::alu::{self, AluResult};
use crate::decode::Descriptor;
use crate::flags::{CF, PF, SF, ZF, sz53p};
use crate::timing::Clocking;

impl<C: Clocking> Z80<C> {
    /// Write an accumulator result and its flags.
    fn set_a(&mut self, result: AluResult) {
        self.regs.a = result.value;
        self.set_f(result.flags);
    }

    fn alu_a(&mut self, d: &Descriptor, operand: u8) {
        let result = d.alu_op().apply(self.regs.a, operand, self.regs.f);
        self.set_a(result);
    }

    // ALU A, r
    pub(super) fn alu_r(&mut self, d: &Descriptor) {
        let operand = self.regs.get8(d.reg(1));
        self.alu_a(d, operand);
    }

    // ALU A, (HL)
    pub(super) fn alu_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let operand = bus.read(self.regs.get16(d.pair(1)));
        self.alu_a(d, operand);
    }

    // ALU A, (IX+d)
    pub(super) fn alu_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(1));
        let operand = bus.read(addr);
        self.alu_a(d, operand);
    }

    // ALU A, n
    pub(super) fn alu_n<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let operand = self.fetch_byte(bus);
        self.alu_a(d, operand);
    }

    /// INC/DEC result with C carried over from F.
    fn keep_carry(&mut self, result: AluResult) -> u8 {
        self.set_f(result.flags | (self.regs.f & CF));
        result.value
    }

    pub(super) fn inc_r(&mut self, d: &Descriptor) {
        let reg = d.reg(0);
        let value = self.keep_carry(alu::inc8(self.regs.get8(reg)));
        self.regs.set8(reg, value);
    }

    pub(super) fn dec_r(&mut self, d: &Descriptor) {
        let reg = d.reg(0);
        let value = self.keep_carry(alu::dec8(self.regs.get8(reg)));
        self.regs.set8(reg, value);
    }

    pub(super) fn inc_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(0));
        let value = self.keep_carry(alu::inc8(bus.read(addr)));
        bus.write(addr, value);
    }

    pub(super) fn dec_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(0));
        let value = self.keep_carry(alu::dec8(bus.read(addr)));
        bus.write(addr, value);
    }

    pub(super) fn inc_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(0));
        let value = self.keep_carry(alu::inc8(bus.read(addr)));
        bus.write(addr, value);
    }

    pub(super) fn dec_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(0));
        let value = self.keep_carry(alu::dec8(bus.read(addr)));
        bus.write(addr, value);
    }

    // 16-bit INC/DEC leave F alone
    pub(super) fn inc_rr(&mut self, d: &Descriptor) {
        let pair = d.pair(0);
        self.regs.set16(pair, self.regs.get16(pair).wrapping_add(1));
    }

    pub(super) fn dec_rr(&mut self, d: &Descriptor) {
        let pair = d.pair(0);
        self.regs.set16(pair, self.regs.get16(pair).wrapping_sub(1));
    }

    // ADD HL/IX/IY, rr: S, Z and P/V survive
    pub(super) fn add_rr_rr(&mut self, d: &Descriptor) {
        let dst = d.pair(0);
        let a = self.regs.get16(dst);
        let (value, flags) = alu::add16(a, self.regs.get16(d.pair(1)));
        self.regs.set16(dst, value);
        self.regs.wz = a.wrapping_add(1);
        self.set_f((self.regs.f & (SF | ZF | PF)) | flags);
    }

    pub(super) fn adc_hl_rr(&mut self, d: &Descriptor) {
        let hl = self.regs.hl();
        let carry = self.regs.f & CF != 0;
        let (value, flags) = alu::adc16(hl, self.regs.get16(d.pair(1)), carry);
        self.regs.set_hl(value);
        self.regs.wz = hl.wrapping_add(1);
        self.set_f(flags);
    }

    pub(super) fn sbc_hl_rr(&mut self, d: &Descriptor) {
        let hl = self.regs.hl();
        let carry = self.regs.f & CF != 0;
        let (value, flags) = alu::sbc16(hl, self.regs.get16(d.pair(1)), carry);
        self.regs.set_hl(value);
        self.regs.wz = hl.wrapping_add(1);
        self.set_f(flags);
    }

    pub(super) fn daa(&mut self) {
        let result = alu::daa(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    pub(super) fn cpl(&mut self) {
        let result = alu::cpl(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    pub(super) fn neg(&mut self) {
        let result = alu::neg(self.regs.a);
        self.set_a(result);
    }

    pub(super) fn scf(&mut self) {
        let f = alu::scf(self.regs.a, self.regs.f, self.regs.q);
        self.set_f(f);
    }

    pub(super) fn ccf(&mut self) {
        let f = alu::ccf(self.regs.a, self.regs.f, self.regs.q);
        self.set_f(f);
    }

    pub(super) fn rlca(&mut self) {
        let result = alu::rlca(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    pub(super) fn rrca(&mut self) {
        let result = alu::rrca(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    pub(super) fn rla(&mut self) {
        let result = alu::rla(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    pub(super) fn rra(&mut self) {
        let result = alu::rra(self.regs.a, self.regs.f);
        self.set_a(result);
    }

    /// RLD: rotate the low nibble of A and the byte at (HL) left by 4 bits
    /// as a 12-bit quantity.
    pub(super) fn rld<B: Bus>(&mut self, bus: &mut B) {
        let hl = self.regs.hl();
        let mem = bus.read(hl);
        let a = self.regs.a;
        bus.write(hl, (mem << 4) | (a & 0x0F));
        self.regs.a = (a & 0xF0) | (mem >> 4);
        self.regs.wz = hl.wrapping_add(1);
        self.set_f((self.regs.f & CF) | sz53p(self.regs.a));
    }

    /// RRD: as RLD, rotating right.
    pub(super) fn rrd<B: Bus>(&mut self, bus: &mut B) {
        let hl = self.regs.hl();
        let mem = bus.read(hl);
        let a = self.regs.a;
        bus.write(hl, (a << 4) | (mem >> 4));
        self.regs.a = (a & 0xF0) | (mem & 0x0F);
        self.regs.wz = hl.wrapping_add(1);
        self.set_f((self.regs.f & CF) | sz53p(self.regs.a));
    }
}
