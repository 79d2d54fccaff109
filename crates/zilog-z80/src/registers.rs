//! Z80 register set and control state.

/// An 8-bit register, as named by an operand tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    /// High byte of IX (undocumented).
    Ixh,
    /// Low byte of IX (undocumented).
    Ixl,
    /// High byte of IY (undocumented).
    Iyh,
    /// Low byte of IY (undocumented).
    Iyl,
    /// Interrupt vector base.
    I,
    /// Memory refresh counter.
    R,
}

impl Reg8 {
    /// The register selected by a 3-bit opcode field (6 has no register).
    #[must_use]
    pub const fn from_field(r: u8) -> Self {
        match r & 7 {
            0 => Self::B,
            1 => Self::C,
            2 => Self::D,
            3 => Self::E,
            4 => Self::H,
            5 => Self::L,
            _ => Self::A,
        }
    }
}

/// A 16-bit register pair, as named by an operand tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    Sp,
}

impl Reg16 {
    /// The pair selected by the 2-bit `rp` field (BC, DE, HL, SP).
    #[must_use]
    pub const fn from_rp(p: u8) -> Self {
        match p & 3 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Sp,
        }
    }

    /// The pair selected by the 2-bit `rp2` field (BC, DE, HL, AF).
    #[must_use]
    pub const fn from_rp2(p: u8) -> Self {
        match p & 3 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Af,
        }
    }
}

/// Z80 register file, including hidden and control state.
///
/// Every field is public so a host can snapshot or restore the processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Internal registers
    /// WZ/MEMPTR - internal address latch.
    /// Leaks into the undocumented X/Y flags of `BIT n,(HL)` and `BIT n,(IX+d)`.
    pub wz: u16,
    /// Copy of F if the last instruction wrote the flags, otherwise 0.
    /// Feeds the undocumented X/Y bits of SCF and CCF.
    pub q: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    /// Set by EI; holds off maskable interrupts until the next instruction
    /// has completed.
    pub ei_pending: bool,

    // Halt state
    pub halted: bool,
}

impl Registers {
    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    pub fn set_af(&mut self, value: u16) {
        [self.f, self.a] = value.to_le_bytes();
    }

    pub fn set_bc(&mut self, value: u16) {
        [self.c, self.b] = value.to_le_bytes();
    }

    pub fn set_de(&mut self, value: u16) {
        [self.e, self.d] = value.to_le_bytes();
    }

    pub fn set_hl(&mut self, value: u16) {
        [self.l, self.h] = value.to_le_bytes();
    }

    /// Read an 8-bit register by name.
    #[must_use]
    pub const fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
            Reg8::Ixh => (self.ix >> 8) as u8,
            Reg8::Ixl => self.ix as u8,
            Reg8::Iyh => (self.iy >> 8) as u8,
            Reg8::Iyl => self.iy as u8,
            Reg8::I => self.i,
            Reg8::R => self.r,
        }
    }

    /// Write an 8-bit register by name.
    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
            Reg8::Ixh => self.ix = (self.ix & 0x00FF) | u16::from(value) << 8,
            Reg8::Ixl => self.ix = (self.ix & 0xFF00) | u16::from(value),
            Reg8::Iyh => self.iy = (self.iy & 0x00FF) | u16::from(value) << 8,
            Reg8::Iyl => self.iy = (self.iy & 0xFF00) | u16::from(value),
            Reg8::I => self.i = value,
            Reg8::R => self.r = value,
        }
    }

    /// Read a register pair by name.
    #[must_use]
    pub const fn get16(&self, pair: Reg16) -> u16 {
        match pair {
            Reg16::Af => self.af(),
            Reg16::Bc => self.bc(),
            Reg16::De => self.de(),
            Reg16::Hl => self.hl(),
            Reg16::Ix => self.ix,
            Reg16::Iy => self.iy,
            Reg16::Sp => self.sp,
        }
    }

    /// Write a register pair by name.
    pub fn set16(&mut self, pair: Reg16, value: u16) {
        match pair {
            Reg16::Af => self.set_af(value),
            Reg16::Bc => self.set_bc(value),
            Reg16::De => self.set_de(value),
            Reg16::Hl => self.set_hl(value),
            Reg16::Ix => self.ix = value,
            Reg16::Iy => self.iy = value,
            Reg16::Sp => self.sp = value,
        }
    }

    /// Bump the refresh counter. Only the low 7 bits count; bit 7 holds
    /// whatever `LD R,A` last put there.
    pub fn inc_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    /// `EX AF,AF'`.
    pub fn swap_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// `EXX`: swap BC, DE and HL with their shadows.
    pub fn swap_main(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_compose_high_low() {
        let mut regs = Registers::default();
        regs.set_bc(0x1234);
        assert_eq!((regs.b, regs.c), (0x12, 0x34));
        assert_eq!(regs.get16(Reg16::Bc), 0x1234);

        regs.set16(Reg16::Af, 0xABCD);
        assert_eq!((regs.a, regs.f), (0xAB, 0xCD));
    }

    #[test]
    fn index_halves_alias_index_registers() {
        let mut regs = Registers::default();
        regs.ix = 0x1122;
        regs.set8(Reg8::Ixl, 0x99);
        assert_eq!(regs.ix, 0x1199);
        regs.set8(Reg8::Iyh, 0x77);
        assert_eq!(regs.iy, 0x7700);
        assert_eq!(regs.get8(Reg8::Ixh), 0x11);
    }

    #[test]
    fn refresh_counter_keeps_bit_7() {
        let mut regs = Registers { r: 0xFF, ..Registers::default() };
        regs.inc_r();
        assert_eq!(regs.r, 0x80);

        regs.r = 0x7F;
        regs.inc_r();
        assert_eq!(regs.r, 0x00);
    }

    #[test]
    fn exchanges_swap_shadow_sets() {
        let mut regs = Registers::default();
        regs.set_af(0x1111);
        regs.set_hl(0x2222);
        regs.h_alt = 0x33;
        regs.swap_af();
        regs.swap_main();
        assert_eq!(regs.af(), 0);
        assert_eq!((regs.a_alt, regs.f_alt), (0x11, 0x11));
        assert_eq!(regs.h, 0x33);
        assert_eq!(regs.h_alt, 0x22);
    }
}
