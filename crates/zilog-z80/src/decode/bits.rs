//! CB table and the DD CB / FD CB compound tables.

use crate::alu::ShiftOp;
use crate::registers::{Reg8, Reg16};

use super::base::IndexMode;
use super::{Descriptor, Handler as H, Operand as O};

pub(super) const fn table() -> [Descriptor; 256] {
    let mut t = [Descriptor::new(H::Nop, 8); 256];
    let mut i = 0;
    while i < 256 {
        t[i] = entry(i as u8);
        i += 1;
    }
    t
}

pub(super) const fn index_table(mode: IndexMode) -> [Descriptor; 256] {
    let mut t = [Descriptor::new(H::Nop, 8); 256];
    let mut i = 0;
    while i < 256 {
        t[i] = index_entry(i as u8, mode);
        i += 1;
    }
    t
}

/// `CB xx yyy zzz`.
const fn entry(op: u8) -> Descriptor {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;

    let first = match x {
        0 => O::Shift(ShiftOp::from_field(y)),
        _ => O::Bit(y),
    };

    if z == 6 {
        let hl = O::Pair(Reg16::Hl);
        match x {
            0 => Descriptor::new(H::ShiftInd, 15).op2(first, hl),
            1 => Descriptor::new(H::BitInd, 12).op2(first, hl),
            2 => Descriptor::new(H::ResInd, 15).op2(first, hl),
            _ => Descriptor::new(H::SetInd, 15).op2(first, hl),
        }
    } else {
        let r = O::Reg(Reg8::from_field(z));
        let h = match x {
            0 => H::ShiftR,
            1 => H::BitR,
            2 => H::ResR,
            _ => H::SetR,
        };
        Descriptor::new(h, 8).op2(first, r)
    }
}

/// `DD CB d xx yyy zzz`. Every slot operates on `(IX+d)`; for z != 6 the
/// rotate/RES/SET result is also copied into register z (undocumented).
const fn index_entry(op: u8, mode: IndexMode) -> Descriptor {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;
    let ix = O::Pair(mode.pair());

    let (first, plain, copying) = match x {
        0 => (O::Shift(ShiftOp::from_field(y)), H::ShiftOff, H::ShiftOffR),
        1 => return Descriptor::new(H::BitOff, 20).op2(O::Bit(y), ix),
        2 => (O::Bit(y), H::ResOff, H::ResOffR),
        _ => (O::Bit(y), H::SetOff, H::SetOffR),
    };

    if z == 6 {
        Descriptor::new(plain, 23).op2(first, ix)
    } else {
        Descriptor::new(copying, 23).op3(first, ix, O::Reg(Reg8::from_field(z)))
    }
}
