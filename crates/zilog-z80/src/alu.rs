//! ALU operations for the Z80.
//!
//! Every function here is pure: operands (and an incoming carry or flag byte
//! where the instruction needs one) in, result and new flags out. Handlers
//! merge the returned flags into F; nothing in this module touches PC, SP or
//! the bus.

#![allow(clippy::verbose_bit_mask)] // Clearer to read mask comparisons.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// The eight accumulator operations selected by bits 5-3 of `10 yyy zzz`
/// and `11 yyy 110`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[must_use]
    pub const fn from_field(y: u8) -> Self {
        match y & 7 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }

    /// Apply to the accumulator. `f` supplies the incoming carry.
    /// For `Cp` the returned value is the unchanged accumulator.
    #[must_use]
    pub fn apply(self, a: u8, b: u8, f: u8) -> AluResult {
        match self {
            Self::Add => add8(a, b, false),
            Self::Adc => adc8(a, b, f),
            Self::Sub => sub8(a, b, false),
            Self::Sbc => sbc8(a, b, f),
            Self::And => and8(a, b),
            Self::Xor => xor8(a, b),
            Self::Or => or8(a, b),
            Self::Cp => AluResult { value: a, flags: cp8(a, b).flags },
        }
    }
}

/// The eight CB-prefix rotate/shift operations (bits 5-3 of `00 yyy zzz`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    /// Undocumented: shifts a 1 into bit 0.
    Sll,
    Srl,
}

impl ShiftOp {
    #[must_use]
    pub const fn from_field(y: u8) -> Self {
        match y & 7 {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Sll,
            _ => Self::Srl,
        }
    }

    /// Apply to `value`. `f` supplies the incoming carry for RL/RR.
    #[must_use]
    pub fn apply(self, value: u8, f: u8) -> AluResult {
        let carry = f & CF != 0;
        match self {
            Self::Rlc => rlc8(value),
            Self::Rrc => rrc8(value),
            Self::Rl => rl8(value, carry),
            Self::Rr => rr8(value, carry),
            Self::Sla => sla8(value),
            Self::Sra => sra8(value),
            Self::Sll => sll8(value),
            Self::Srl => srl8(value),
        }
    }
}

/// Add two bytes with optional carry, returning result and flags.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let result = wide as u8;

    let mut flags = sz53(result);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    // Overflow: operands share a sign the result does not
    if (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }
    if wide > 0xFF {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// Subtract two bytes with optional borrow, returning result and flags.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF | sz53(result);
    if (a & 0x0F) < (b & 0x0F) + c {
        flags |= HF;
    }
    // Overflow: operands differ in sign and the result took the subtrahend's
    if (a ^ b) & 0x80 != 0 && (b ^ result) & 0x80 == 0 {
        flags |= PF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// `ADC A, b`: add with the carry taken from `f`.
#[must_use]
pub fn adc8(a: u8, b: u8, f: u8) -> AluResult {
    add8(a, b, f & CF != 0)
}

/// `SBC A, b`: subtract with the borrow taken from `f`.
#[must_use]
pub fn sbc8(a: u8, b: u8, f: u8) -> AluResult {
    sub8(a, b, f & CF != 0)
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult { value, flags: sz53p(value) | HF }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: sz53p(value) }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: sz53p(value) }
}

/// Compare: flags of `a - b`, but X/Y come from the operand.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let mut result = sub8(a, b, false);
    result.flags = (result.flags & !(YF | XF)) | (b & (YF | XF));
    result
}

/// Increment. The returned flags never include C; callers keep the old one.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    let mut flags = sz53(value);
    if a & 0x0F == 0x0F {
        flags |= HF;
    }
    if a == 0x7F {
        flags |= PF;
    }
    AluResult { value, flags }
}

/// Decrement. The returned flags never include C; callers keep the old one.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    let mut flags = NF | sz53(value);
    if a & 0x0F == 0x00 {
        flags |= HF;
    }
    if a == 0x80 {
        flags |= PF;
    }
    AluResult { value, flags }
}

fn shifted(value: u8, carry_out: bool) -> AluResult {
    AluResult { value, flags: sz53p(value) | u8::from(carry_out) }
}

/// Rotate left circular (bit 7 -> carry and bit 0).
#[must_use]
pub fn rlc8(a: u8) -> AluResult {
    shifted(a.rotate_left(1), a & 0x80 != 0)
}

/// Rotate right circular (bit 0 -> carry and bit 7).
#[must_use]
pub fn rrc8(a: u8) -> AluResult {
    shifted(a.rotate_right(1), a & 0x01 != 0)
}

/// Rotate left through carry.
#[must_use]
pub fn rl8(a: u8, carry: bool) -> AluResult {
    shifted((a << 1) | u8::from(carry), a & 0x80 != 0)
}

/// Rotate right through carry.
#[must_use]
pub fn rr8(a: u8, carry: bool) -> AluResult {
    shifted((a >> 1) | (u8::from(carry) << 7), a & 0x01 != 0)
}

/// Shift left arithmetic (bit 0 = 0).
#[must_use]
pub fn sla8(a: u8) -> AluResult {
    shifted(a << 1, a & 0x80 != 0)
}

/// Shift right arithmetic (bit 7 preserved).
#[must_use]
pub fn sra8(a: u8) -> AluResult {
    shifted((a >> 1) | (a & 0x80), a & 0x01 != 0)
}

/// Shift left logical (undocumented SLL - bit 0 = 1).
#[must_use]
pub fn sll8(a: u8) -> AluResult {
    shifted((a << 1) | 1, a & 0x80 != 0)
}

/// Shift right logical (bit 7 = 0).
#[must_use]
pub fn srl8(a: u8) -> AluResult {
    shifted(a >> 1, a & 0x01 != 0)
}

/// Flags for `BIT n`. C is left to the caller.
///
/// `xy_source` supplies bits 5 and 3: the tested value for register
/// operands, the high byte of WZ for memory operands.
#[must_use]
pub fn bit(n: u8, value: u8, xy_source: u8) -> u8 {
    let tested = value & (1 << (n & 7));
    let mut flags = HF | (xy_source & (YF | XF)) | (tested & SF);
    if tested == 0 {
        flags |= ZF | PF;
    }
    flags
}

#[must_use]
pub const fn res(n: u8, value: u8) -> u8 {
    value & !(1 << (n & 7))
}

#[must_use]
pub const fn set(n: u8, value: u8) -> u8 {
    value | (1 << (n & 7))
}

/// Decimal adjust A after a BCD add or subtract. Takes and returns full F.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let mut correction = 0u8;
    let mut carry = f & CF;

    if f & HF != 0 || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry != 0 || a > 0x99 {
        correction |= 0x60;
        carry = CF;
    }

    let (value, half) = if subtract {
        (a.wrapping_sub(correction), f & HF != 0 && a & 0x0F < 6)
    } else {
        (a.wrapping_add(correction), a & 0x0F > 9)
    };

    let mut flags = sz53p(value) | carry | (f & NF);
    if half {
        flags |= HF;
    }
    AluResult { value, flags }
}

/// `CPL`. Takes and returns full F.
#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let value = !a;
    AluResult {
        value,
        flags: (f & (SF | ZF | PF | CF)) | HF | NF | (value & (YF | XF)),
    }
}

/// `NEG`: `0 - a`.
#[must_use]
pub fn neg(a: u8) -> AluResult {
    sub8(0, a, false)
}

/// Accumulator rotates keep S, Z and P/V; H and N clear; X/Y from the result.
fn rotate_a(value: u8, carry_out: bool, f: u8) -> AluResult {
    AluResult {
        value,
        flags: (f & (SF | ZF | PF)) | (value & (YF | XF)) | u8::from(carry_out),
    }
}

#[must_use]
pub fn rlca(a: u8, f: u8) -> AluResult {
    rotate_a(a.rotate_left(1), a & 0x80 != 0, f)
}

#[must_use]
pub fn rrca(a: u8, f: u8) -> AluResult {
    rotate_a(a.rotate_right(1), a & 0x01 != 0, f)
}

#[must_use]
pub fn rla(a: u8, f: u8) -> AluResult {
    rotate_a((a << 1) | (f & CF), a & 0x80 != 0, f)
}

#[must_use]
pub fn rra(a: u8, f: u8) -> AluResult {
    rotate_a((a >> 1) | ((f & CF) << 7), a & 0x01 != 0, f)
}

/// `SCF` flags. X/Y come from `(Q ^ F) | A`.
#[must_use]
pub const fn scf(a: u8, f: u8, q: u8) -> u8 {
    (f & (SF | ZF | PF)) | (((q ^ f) | a) & (YF | XF)) | CF
}

/// `CCF` flags. H takes the old carry; X/Y as for [`scf`].
#[must_use]
pub const fn ccf(a: u8, f: u8, q: u8) -> u8 {
    let old_carry = f & CF;
    (f & (SF | ZF | PF))
        | (((q ^ f) | a) & (YF | XF))
        | if old_carry != 0 { HF } else { CF }
}

/// 16-bit add for HL/IX/IY. Returned flags cover H, N, C and X/Y only;
/// callers keep S, Z and P/V.
#[must_use]
pub fn add16(a: u16, b: u16) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let result = wide as u16;

    let mut flags = ((result >> 8) as u8) & (YF | XF);
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        flags |= HF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit add with carry for HL.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let result = wide as u16;

    let mut flags = word_sz53(result);
    if (a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0 {
        flags |= PF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit subtract with borrow for HL.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF | word_sz53(result);
    if (a & 0x0FFF) < (b & 0x0FFF) + c {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 != 0 && (b ^ result) & 0x8000 == 0 {
        flags |= PF;
    }
    if u32::from(a) < u32::from(b) + u32::from(c) {
        flags |= CF;
    }

    (result, flags)
}

/// S and Z at 16-bit width, X/Y from the high byte.
fn word_sz53(value: u16) -> u8 {
    let hi = (value >> 8) as u8;
    let mut flags = hi & (SF | YF | XF);
    if value == 0 {
        flags |= ZF;
    }
    flags
}
