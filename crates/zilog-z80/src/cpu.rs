//! Z80 CPU engine: fetch, decode through the descriptor tables, dispatch.

mod arith;
mod bits;
mod block;
mod control;
mod interrupt;
mod io;
mod load;

use emu_core::{Bus, Cpu, Ticks};

use crate::decode::{Descriptor, Handler, Table};
use crate::registers::{Reg16, Registers};
use crate::timing::{BusCycle, Clocking, Fast, Phase};

/// Z80 CPU.
///
/// The CPU does not own the bus. Instead, the bus is passed to `step()` so
/// the host can share it with other devices between steps. The timing
/// strategy `C` is fixed at construction.
pub struct Z80<C: Clocking = Fast> {
    /// Main register set.
    pub(crate) regs: Registers,
    clock: C,

    /// Set by a handler that takes a conditional branch or repeats.
    will_branch: bool,
    /// Set whenever a handler writes F; drives the Q latch.
    flags_written: bool,
    /// Displacement already fetched by the DD CB / FD CB decoder.
    displacement: Option<i8>,
    /// Table the next fetch uses after an absorbed prefix.
    pending_table: Option<Table>,

    /// Total T-states elapsed.
    total_ticks: Ticks,
}

/// Z80 that runs a whole instruction per step.
pub type FastZ80 = Z80<Fast>;

/// Z80 that reports one bus cycle per step.
pub type AccurateZ80 = Z80<BusCycle>;

impl<C: Clocking> Z80<C> {
    /// Create a Z80 in its power-on state.
    #[must_use]
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            clock: C::default(),
            will_branch: false,
            flags_written: false,
            displacement: None,
            pending_table: None,
            total_ticks: Ticks::ZERO,
        };
        cpu.power_on();
        cpu
    }

    /// Total T-states elapsed since creation.
    #[must_use]
    pub const fn total_ticks(&self) -> Ticks {
        self.total_ticks
    }

    /// The register file.
    #[must_use]
    pub const fn regs(&self) -> &Registers {
        &self.regs
    }

    /// Replace the whole register file, e.g. when loading a snapshot.
    ///
    /// Any instruction in flight is abandoned.
    pub fn restore(&mut self, regs: Registers) {
        self.regs = regs;
        self.clock.reset();
        self.displacement = None;
        self.pending_table = None;
    }

    /// Where the CPU is within the current instruction.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    /// True when the next step starts a new instruction (no bus cycles
    /// outstanding and no prefix waiting for its opcode).
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.clock.phase().at_boundary() && self.pending_table.is_none()
    }

    /// Advance by one step: a whole instruction in fast mode, one bus cycle
    /// in accurate mode. Returns the T-states the step took.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let tstates = match self.clock.resume() {
            Some(t) => t,
            None => {
                self.clock.fetch();
                if self.regs.halted {
                    // Spin on HALT: an M1 cycle with no fetch
                    self.regs.inc_r();
                    self.clock.begin_fixed(4)
                } else {
                    self.run_instruction(bus)
                }
            }
        };
        self.total_ticks += tstates;
        tstates
    }

    /// Step until at least `budget` T-states have elapsed. Returns the
    /// T-states actually used, which may overshoot by part of an instruction
    /// (fast mode) or one bus cycle (accurate mode).
    pub fn run_for<B: Bus>(&mut self, bus: &mut B, budget: u32) -> u32 {
        let mut used = 0;
        while used < budget {
            used += self.step(bus);
        }
        used
    }

    fn run_instruction<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let d = self.decode(bus);

        self.will_branch = false;
        self.flags_written = false;
        self.execute(bus, d);

        if d.handler != Handler::Prefix {
            self.regs.q = if self.flags_written { self.regs.f } else { 0 };
            if d.handler != Handler::Ei {
                self.regs.ei_pending = false;
            }
        }
        self.clock.begin(d, self.will_branch)
    }

    /// Fetch prefix and opcode bytes and select the descriptor.
    ///
    /// A DD/FD followed by another prefix ends here as a 4 T-state no-op;
    /// the next step picks up in the table that prefix selects.
    fn decode<B: Bus>(&mut self, bus: &mut B) -> &'static Descriptor {
        let mut table = self.pending_table.take().unwrap_or(Table::Main);
        loop {
            let pc = self.regs.pc;
            let op = self.fetch_opcode(bus);
            let d = table.lookup(op);

            if log::log_enabled!(log::Level::Trace) {
                log::trace!("{pc:04X}  {table:>4} {op:02X}  {:?}", d.handler);
            }

            if d.handler != Handler::Prefix {
                return d;
            }

            let next = d.next_table();
            if next.is_compound() {
                // DD CB d op: displacement first, then the opcode; neither is an M1 fetch
                self.displacement = Some(self.fetch_byte(bus) as i8);
                let op = self.fetch_byte(bus);
                return next.lookup(op);
            }
            if table.is_index() {
                self.pending_table = Some(next);
                return d;
            }
            table = next;
        }
    }

    fn execute<B: Bus>(&mut self, bus: &mut B, d: &Descriptor) {
        match d.handler {
            Handler::Nop | Handler::Prefix => {}

            Handler::LdRR => self.ld_r_r(d),
            Handler::LdRN => self.ld_r_n(bus, d),
            Handler::LdRInd => self.ld_r_ind(bus, d),
            Handler::LdROff => self.ld_r_off(bus, d),
            Handler::LdIndR => self.ld_ind_r(bus, d),
            Handler::LdOffR => self.ld_off_r(bus, d),
            Handler::LdIndN => self.ld_ind_n(bus, d),
            Handler::LdOffN => self.ld_off_n(bus, d),
            Handler::LdAInd => self.ld_a_ind(bus, d),
            Handler::LdIndA => self.ld_ind_a(bus, d),
            Handler::LdAAddr => self.ld_a_addr(bus),
            Handler::LdAddrA => self.ld_addr_a(bus),
            Handler::LdAIr => self.ld_a_ir(d),

            Handler::LdRrNn => self.ld_rr_nn(bus, d),
            Handler::LdRrAddr => self.ld_rr_addr(bus, d),
            Handler::LdAddrRr => self.ld_addr_rr(bus, d),
            Handler::LdSpRr => self.ld_sp_rr(d),
            Handler::Push => self.push_rr(bus, d),
            Handler::Pop => self.pop_rr(bus, d),
            Handler::ExAf => self.regs.swap_af(),
            Handler::Exx => self.regs.swap_main(),
            Handler::ExDeHl => self.ex_de_hl(),
            Handler::ExSpRr => self.ex_sp_rr(bus, d),

            Handler::AluR => self.alu_r(d),
            Handler::AluInd => self.alu_ind(bus, d),
            Handler::AluOff => self.alu_off(bus, d),
            Handler::AluN => self.alu_n(bus, d),
            Handler::IncR => self.inc_r(d),
            Handler::DecR => self.dec_r(d),
            Handler::IncInd => self.inc_ind(bus, d),
            Handler::DecInd => self.dec_ind(bus, d),
            Handler::IncOff => self.inc_off(bus, d),
            Handler::DecOff => self.dec_off(bus, d),
            Handler::IncRr => self.inc_rr(d),
            Handler::DecRr => self.dec_rr(d),
            Handler::AddRrRr => self.add_rr_rr(d),
            Handler::AdcHlRr => self.adc_hl_rr(d),
            Handler::SbcHlRr => self.sbc_hl_rr(d),
            Handler::Daa => self.daa(),
            Handler::Cpl => self.cpl(),
            Handler::Neg => self.neg(),
            Handler::Scf => self.scf(),
            Handler::Ccf => self.ccf(),
            Handler::Rlca => self.rlca(),
            Handler::Rrca => self.rrca(),
            Handler::Rla => self.rla(),
            Handler::Rra => self.rra(),
            Handler::Rld => self.rld(bus),
            Handler::Rrd => self.rrd(bus),

            Handler::ShiftR => self.shift_r(d),
            Handler::ShiftInd => self.shift_ind(bus, d),
            Handler::ShiftOff => self.shift_off(bus, d),
            Handler::ShiftOffR => self.shift_off_r(bus, d),
            Handler::BitR => self.bit_r(d),
            Handler::BitInd => self.bit_ind(bus, d),
            Handler::BitOff => self.bit_off(bus, d),
            Handler::ResR => self.res_r(d),
            Handler::ResInd => self.res_ind(bus, d),
            Handler::ResOff => self.res_off(bus, d),
            Handler::ResOffR => self.res_off_r(bus, d),
            Handler::SetR => self.set_r(d),
            Handler::SetInd => self.set_ind(bus, d),
            Handler::SetOff => self.set_off(bus, d),
            Handler::SetOffR => self.set_off_r(bus, d),

            Handler::Jp => self.jp(bus),
            Handler::JpCond => self.jp_cond(bus, d),
            Handler::JpRr => self.jp_rr(d),
            Handler::Jr => self.jr(bus),
            Handler::JrCond => self.jr_cond(bus, d),
            Handler::Djnz => self.djnz(bus),
            Handler::Call => self.call(bus),
            Handler::CallCond => self.call_cond(bus, d),
            Handler::Ret => self.ret(bus),
            Handler::RetCond => self.ret_cond(bus, d),
            Handler::Retn | Handler::Reti => self.retn(bus),
            Handler::Rst => self.rst(bus, d),
            Handler::Halt => self.halt(),
            Handler::Di => self.di(),
            Handler::Ei => self.ei(),
            Handler::Im => self.regs.im = d.value(),

            Handler::InAN => self.in_a_n(bus),
            Handler::OutNA => self.out_n_a(bus),
            Handler::InRC => self.in_r_c(bus, d),
            Handler::InFlagsC => self.in_flags_c(bus),
            Handler::OutCR => self.out_c_r(bus, d),
            Handler::OutC0 => self.out_c_0(bus),

            Handler::Ldi => self.ldi(bus),
            Handler::Ldd => self.ldd(bus),
            Handler::Ldir => self.ldir(bus),
            Handler::Lddr => self.lddr(bus),
            Handler::Cpi => self.cpi(bus),
            Handler::Cpd => self.cpd(bus),
            Handler::Cpir => self.cpir(bus),
            Handler::Cpdr => self.cpdr(bus),
            Handler::Ini => self.ini(bus),
            Handler::Ind => self.ind(bus),
            Handler::Inir => self.inir(bus),
            Handler::Indr => self.indr(bus),
            Handler::Outi => self.outi(bus),
            Handler::Outd => self.outd(bus),
            Handler::Otir => self.otir(bus),
            Handler::Otdr => self.otdr(bus),
        }
    }
}

impl<C: Clocking> Default for Z80<C> {
    fn default() -> Self {
        Self::new()
    }
}

// Bus and register helpers shared by the handlers.
impl<C: Clocking> Z80<C> {
    /// Read the byte at PC and advance PC.
    fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Read the little-endian word at PC and advance PC past it.
    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Opcode fetch (M1): also bumps the refresh counter.
    fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let op = self.fetch_byte(bus);
        self.regs.inc_r();
        op
    }

    /// Push a word: high byte to SP-1 first, then low byte to SP-2.
    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Effective address of `(IX+d)`/`(IY+d)`. Uses the displacement the
    /// DD CB decoder already read, otherwise fetches it. Latches WZ.
    fn indexed_address<B: Bus>(&mut self, bus: &mut B, base: Reg16) -> u16 {
        let d = match self.displacement.take() {
            Some(d) => d,
            None => self.fetch_byte(bus) as i8,
        };
        let addr = self.regs.get16(base).wrapping_add_signed(i16::from(d));
        self.regs.wz = addr;
        addr
    }

    fn set_f(&mut self, f: u8) {
        self.regs.f = f;
        self.flags_written = true;
    }

    /// Charge the taken cost for this instruction.
    fn take_branch(&mut self) {
        self.will_branch = true;
    }

    /// Reset state: everything the reset line touches. Other registers keep
    /// their values.
    fn power_on(&mut self) {
        self.regs.pc = 0x0000;
        self.regs.sp = 0xFFFF;
        self.regs.set_af(0xFFFF);
        self.regs.i = 0;
        self.regs.r = 0;
        self.regs.wz = 0;
        self.regs.q = 0;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.im = 0;
        self.regs.ei_pending = false;
        self.regs.halted = false;
        self.clock.reset();
        self.displacement = None;
        self.pending_table = None;
    }
}

impl<C: Clocking> Cpu for Z80<C> {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        Z80::step(self, bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn reset(&mut self) {
        log::debug!("Z80 reset at {:04X}", self.regs.pc);
        self.power_on();
    }
}

#[cfg(feature = "test-utils")]
impl<C: Clocking> Z80<C> {
    /// Set the program counter.
    ///
    /// Only available in test builds.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    /// Set the stack pointer.
    ///
    /// Only available in test builds.
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    /// Mutable access to the register file.
    ///
    /// Only available in test builds.
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }
}
