//! Port input and output.
//!
//! The `(n)` forms put A on the high half of the port address; the `(C)`
//! forms use the whole of BC.

use emu_core::Bus;

use super::Z80;
use crate::decode::Descriptor;
use crate::flags::{CF, sz53p};
use crate::timing::Clocking;

impl<C: Clocking> Z80<C> {
    // IN A, (n): no flags
    pub(super) fn in_a_n<B: Bus>(&mut self, bus: &mut B) {
        let n = self.fetch_byte(bus);
        let port = u16::from_le_bytes([n, self.regs.a]);
        self.regs.a = bus.port_in(port);
        self.regs.wz = port.wrapping_add(1);
    }

    pub(super) fn out_n_a<B: Bus>(&mut self, bus: &mut B) {
        let n = self.fetch_byte(bus);
        let a = self.regs.a;
        bus.port_out(u16::from_le_bytes([n, a]), a);
        self.regs.wz = u16::from_le_bytes([n.wrapping_add(1), a]);
    }

    /// `IN r, (C)` without the store. Flags from the value, C kept.
    fn in_c<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let bc = self.regs.bc();
        let value = bus.port_in(bc);
        self.regs.wz = bc.wrapping_add(1);
        self.set_f(sz53p(value) | (self.regs.f & CF));
        value
    }

    pub(super) fn in_r_c<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let value = self.in_c(bus);
        self.regs.set8(d.reg(0), value);
    }

    // ED 70: IN (C) sets flags and discards the byte
    pub(super) fn in_flags_c<B: Bus>(&mut self, bus: &mut B) {
        self.in_c(bus);
    }

    pub(super) fn out_c_r<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        let bc = self.regs.bc();
        bus.port_out(bc, self.regs.get8(d.reg(0)));
        self.regs.wz = bc.wrapping_add(1);
    }

    // ED 71: OUT (C), 0 on NMOS parts
    pub(super) fn out_c_0<B: Bus>(&mut self, bus: &mut B) {
        let bc = self.regs.bc();
        bus.port_out(bc, 0);
        self.regs.wz = bc.wrapping_add(1);
    }
}
