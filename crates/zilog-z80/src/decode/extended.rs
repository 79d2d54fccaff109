//! ED table.
//!
//! Only `01 xxx xxx` and the block-instruction corner of `10 xxx xxx` are
//! populated; every other slot is an 8 T-state no-op.

use crate::registers::{Reg8, Reg16};

use super::{Descriptor, Handler as H, Operand as O};

/// IM argument for `ED 01 yyy 110`; the odd slots are undocumented mirrors.
const IM_MODES: [u8; 8] = [0, 0, 1, 2, 0, 0, 1, 2];

pub(super) const fn table() -> [Descriptor; 256] {
    let mut t = [Descriptor::new(H::Nop, 8); 256];
    let mut i = 0;
    while i < 256 {
        t[i] = entry(i as u8);
        i += 1;
    }
    t
}

const fn entry(op: u8) -> Descriptor {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;

    match x {
        1 => block1(y, z),
        2 if z <= 3 && y >= 4 => block_op(y, z),
        _ => Descriptor::new(H::Nop, 8),
    }
}

const fn block1(y: u8, z: u8) -> Descriptor {
    let p = y >> 1;
    let q = y & 1;
    let hl = O::Pair(Reg16::Hl);
    let rp = O::Pair(Reg16::from_rp(p));

    match z {
        0 => {
            if y == 6 {
                Descriptor::new(H::InFlagsC, 12)
            } else {
                Descriptor::new(H::InRC, 12).op1(O::Reg(Reg8::from_field(y)))
            }
        }
        1 => {
            if y == 6 {
                Descriptor::new(H::OutC0, 12)
            } else {
                Descriptor::new(H::OutCR, 12).op1(O::Reg(Reg8::from_field(y)))
            }
        }
        2 => {
            let h = if q == 0 { H::SbcHlRr } else { H::AdcHlRr };
            Descriptor::new(h, 15).op2(hl, rp)
        }
        // ED 63 / ED 6B mirror LD (nn),HL / LD HL,(nn) at the ED cost of 20
        3 => {
            let h = if q == 0 { H::LdAddrRr } else { H::LdRrAddr };
            Descriptor::new(h, 20).op1(rp)
        }
        4 => Descriptor::new(H::Neg, 8),
        5 => Descriptor::new(if y == 1 { H::Reti } else { H::Retn }, 14),
        6 => Descriptor::new(H::Im, 8).op1(O::Mode(IM_MODES[y as usize])),
        _ => match y {
            0 => Descriptor::new(H::LdRR, 9).op2(O::Reg(Reg8::I), O::Reg(Reg8::A)),
            1 => Descriptor::new(H::LdRR, 9).op2(O::Reg(Reg8::R), O::Reg(Reg8::A)),
            2 => Descriptor::new(H::LdAIr, 9).op2(O::Reg(Reg8::A), O::Reg(Reg8::I)),
            3 => Descriptor::new(H::LdAIr, 9).op2(O::Reg(Reg8::A), O::Reg(Reg8::R)),
            4 => Descriptor::new(H::Rrd, 18),
            5 => Descriptor::new(H::Rld, 18),
            _ => Descriptor::new(H::Nop, 8),
        },
    }
}

/// `10 1rd 0kk`: LDI/CPI/INI/OUTI, their decrementing forms, and repeats.
const fn block_op(y: u8, z: u8) -> Descriptor {
    let h = match (y, z) {
        (4, 0) => H::Ldi,
        (4, 1) => H::Cpi,
        (4, 2) => H::Ini,
        (4, _) => H::Outi,
        (5, 0) => H::Ldd,
        (5, 1) => H::Cpd,
        (5, 2) => H::Ind,
        (5, _) => H::Outd,
        (6, 0) => H::Ldir,
        (6, 1) => H::Cpir,
        (6, 2) => H::Inir,
        (6, _) => H::Otir,
        (_, 0) => H::Lddr,
        (_, 1) => H::Cpdr,
        (_, 2) => H::Indr,
        _ => H::Otdr,
    };
    let d = Descriptor::new(h, 16);
    if y >= 6 { d.taken(21) } else { d }
}
