//! Interrupt acceptance and entry.
//!
//! The CPU does not arbitrate: the host decides when a line is asserted and
//! calls [`Z80::nmi`] or [`Z80::irq`] between steps.

use emu_core::Bus;

use super::Z80;
use crate::timing::Clocking;

const NMI_VECTOR: u16 = 0x0066;
const IM1_VECTOR: u16 = 0x0038;

impl<C: Clocking> Z80<C> {
    /// True when a maskable interrupt would be accepted right now.
    #[must_use]
    pub fn can_accept_irq(&self) -> bool {
        self.regs.iff1 && !self.regs.ei_pending && self.at_instruction_boundary()
    }

    /// True while the instruction after an EI is still to run.
    #[must_use]
    pub const fn irq_deferred(&self) -> bool {
        self.regs.ei_pending
    }

    /// Take a non-maskable interrupt.
    ///
    /// Returns the T-states charged for this step, or `None` when the CPU is
    /// part-way through an instruction. In accurate mode the rest of the
    /// 11 T-state response is reported by the following steps.
    pub fn nmi<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.at_instruction_boundary() {
            return None;
        }
        log::debug!("NMI at {:04X}", self.regs.pc);

        self.acknowledge();
        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;
        self.restart(bus, NMI_VECTOR);
        Some(self.charge(11))
    }

    /// Take a maskable interrupt with `data` on the data bus.
    ///
    /// Returns the T-states charged for this step, or `None` when the
    /// interrupt is not accepted (see [`Self::can_accept_irq`]).
    pub fn irq<B: Bus>(&mut self, bus: &mut B, data: u8) -> Option<u32> {
        if !self.can_accept_irq() {
            return None;
        }
        log::debug!("IRQ (IM {}) at {:04X} data {data:02X}", self.regs.im, self.regs.pc);

        self.acknowledge();
        self.regs.iff1 = false;
        self.regs.iff2 = false;

        let tstates = match self.regs.im {
            0 => {
                // Only RST opcodes are supported on the data bus
                let target = if data & 0xC7 == 0xC7 {
                    u16::from(data & 0x38)
                } else {
                    log::warn!("IM 0 data {data:02X} is not an RST; using RST 38h");
                    IM1_VECTOR
                };
                self.restart(bus, target);
                13
            }
            1 => {
                self.restart(bus, IM1_VECTOR);
                13
            }
            _ => {
                // Push first: the vector table may overlap the stack
                self.push(bus, self.regs.pc);
                let pointer = u16::from_le_bytes([data, self.regs.i]);
                let target = bus.read_word(pointer);
                self.regs.pc = target;
                self.regs.wz = target;
                19
            }
        };
        Some(self.charge(tstates))
    }

    /// Common to both responses: an M1 cycle that bumps R and releases HALT.
    fn acknowledge(&mut self) {
        self.regs.inc_r();
        self.regs.q = 0;
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    fn charge(&mut self, tstates: u8) -> u32 {
        self.clock.fetch();
        let first = self.clock.begin_fixed(tstates);
        self.total_ticks += first;
        first
    }
}
