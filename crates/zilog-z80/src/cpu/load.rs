//! Loads, stack operations and exchanges.

use emu_core::Bus;

use super::Z80;
use crate::decode::Descriptor;
use crate::flags::{CF, PF, sz53};
use crate::timing::Clocking;

impl<C: Clocking> Z80<C> {
    // LD r, r' (also LD I,A and LD R,A, which write the whole of R)
    pub(super) fn ld_r_r(&mut self, d: &Descriptor) {
        let value = self.regs.get8(d.reg(1));
        self.regs.set8(d.reg(0), value);
    }

    // LD r, n
    pub(super) fn ld_r_n<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.fetch_byte(bus);
        self.regs.set8(d.reg(0), value);
    }

    // LD r, (HL)
    pub(super) fn ld_r_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = bus.read(self.regs.get16(d.pair(1)));
        self.regs.set8(d.reg(0), value);
    }

    // LD r, (IX+d)
    pub(super) fn ld_r_off<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(1));
        let value = bus.read(addr);
        self.regs.set8(d.reg(0), value);
    }

    // LD (HL), r
    pub(super) fn ld_ind_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        bus.write(self.regs.get16(d.pair(0)), self.regs.get8(d.reg(1)));
    }

    // LD (IX+d), r
    pub(super) fn ld_off_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(0));
        bus.write(addr, self.regs.get8(d.reg(1)));
    }

    // LD (HL), n
    pub(super) fn ld_ind_n<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.fetch_byte(bus);
        bus.write(self.regs.get16(d.pair(0)), value);
    }

    // LD (IX+d), n: displacement comes before the immediate
    pub(super) fn ld_off_n<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.indexed_address(bus, d.pair(0));
        let value = self.fetch_byte(bus);
        bus.write(addr, value);
    }

    // LD A, (BC) / LD A, (DE)
    pub(super) fn ld_a_ind<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(1));
        self.regs.a = bus.read(addr);
        self.regs.wz = addr.wrapping_add(1);
    }

    // LD (BC), A / LD (DE), A
    pub(super) fn ld_ind_a<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.regs.get16(d.pair(0));
        bus.write(addr, self.regs.a);
        self.regs.wz = u16::from(self.regs.a) << 8 | (addr.wrapping_add(1) & 0x00FF);
    }

    // LD A, (nn)
    pub(super) fn ld_a_addr<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        self.regs.a = bus.read(addr);
        self.regs.wz = addr.wrapping_add(1);
    }

    // LD (nn), A
    pub(super) fn ld_addr_a<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.regs.a);
        self.regs.wz = u16::from(self.regs.a) << 8 | (addr.wrapping_add(1) & 0x00FF);
    }

    // LD A, I / LD A, R: P/V reports IFF2
    pub(super) fn ld_a_ir(&mut self, d: &Descriptor) {
        let value = self.regs.get8(d.reg(1));
        self.regs.a = value;
        let mut f = (self.regs.f & CF) | sz53(value);
        if self.regs.iff2 {
            f |= PF;
        }
        self.set_f(f);
    }

    // LD rr, nn
    pub(super) fn ld_rr_nn<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.fetch_word(bus);
        self.regs.set16(d.pair(0), value);
    }

    // LD rr, (nn)
    pub(super) fn ld_rr_addr<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.fetch_word(bus);
        let value = bus.read_word(addr);
        self.regs.set16(d.pair(0), value);
        self.regs.wz = addr.wrapping_add(1);
    }

    // LD (nn), rr
    pub(super) fn ld_addr_rr<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let addr = self.fetch_word(bus);
        bus.write_word(addr, self.regs.get16(d.pair(0)));
        self.regs.wz = addr.wrapping_add(1);
    }

    // LD SP, HL/IX/IY
    pub(super) fn ld_sp_rr(&mut self, d: &Descriptor) {
        self.regs.sp = self.regs.get16(d.pair(1));
    }

    pub(super) fn push_rr<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.regs.get16(d.pair(0));
        self.push(bus, value);
    }

    pub(super) fn pop_rr<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.pop(bus);
        self.regs.set16(d.pair(0), value);
    }

    pub(super) fn ex_de_hl(&mut self) {
        let de = self.regs.de();
        self.regs.set_de(self.regs.hl());
        self.regs.set_hl(de);
    }

    // EX (SP), HL/IX/IY: read low, read high, write high, write low
    pub(super) fn ex_sp_rr<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let sp = self.regs.sp;
        let pair = d.pair(1);
        let [lo, hi] = self.regs.get16(pair).to_le_bytes();

        let mem_lo = bus.read(sp);
        let mem_hi = bus.read(sp.wrapping_add(1));
        bus.write(sp.wrapping_add(1), hi);
        bus.write(sp, lo);

        let value = u16::from_le_bytes([mem_lo, mem_hi]);
        self.regs.set16(pair, value);
        self.regs.wz = value;
    }
}
