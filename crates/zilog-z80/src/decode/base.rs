//! Unprefixed table and its DD/FD index-register variants.
//!
//! DD and FD decode exactly like the unprefixed table with HL renamed to
//! IX/IY, H/L to the index halves, and `(HL)` to `(IX+d)`. Opcodes that do
//! not touch HL still run, one prefix fetch (4 T-states) slower.

use crate::alu::AluOp;
use crate::registers::{Reg8, Reg16};

use super::{Condition, Descriptor, Handler as H, Operand as O, Table};

/// Which register stands in for HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexMode {
    Hl,
    Ix,
    Iy,
}

impl IndexMode {
    const fn is_index(self) -> bool {
        !matches!(self, Self::Hl)
    }

    pub(crate) const fn pair(self) -> Reg16 {
        match self {
            Self::Hl => Reg16::Hl,
            Self::Ix => Reg16::Ix,
            Self::Iy => Reg16::Iy,
        }
    }

    /// Register for a 3-bit field, with H/L renamed under DD/FD.
    const fn r8(self, field: u8) -> Reg8 {
        match (self, field) {
            (Self::Ix, 4) => Reg8::Ixh,
            (Self::Ix, 5) => Reg8::Ixl,
            (Self::Iy, 4) => Reg8::Iyh,
            (Self::Iy, 5) => Reg8::Iyl,
            _ => Reg8::from_field(field),
        }
    }

    const fn rp(self, p: u8) -> Reg16 {
        if p == 2 { self.pair() } else { Reg16::from_rp(p) }
    }

    const fn rp2(self, p: u8) -> Reg16 {
        if p == 2 { self.pair() } else { Reg16::from_rp2(p) }
    }

    /// Pick the `(HL)` or `(IX+d)` handler.
    const fn mem(self, through_hl: H, indexed: H) -> H {
        if self.is_index() { indexed } else { through_hl }
    }

    const fn cb_table(self) -> Table {
        match self {
            Self::Hl => Table::Cb,
            Self::Ix => Table::DdCb,
            Self::Iy => Table::FdCb,
        }
    }
}

pub(super) const fn table(mode: IndexMode) -> [Descriptor; 256] {
    let mut t = [Descriptor::new(H::Nop, 4); 256];
    let mut i = 0;
    while i < 256 {
        t[i] = entry(i as u8, mode);
        i += 1;
    }
    t
}

const fn entry(op: u8, mode: IndexMode) -> Descriptor {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;

    let d = match x {
        0 => block0(y, z, mode),
        1 => block1(y, z, mode),
        2 => block2(y, z, mode),
        _ => block3(y, z, mode),
    };

    if !mode.is_index() || matches!(d.handler, H::Prefix) {
        return d;
    }
    // The DD/FD fetch costs 4; displacement addressing adds its own fetch and
    // address calculation on top.
    d.slower(match d.handler {
        H::LdOffN => 9,
        H::LdROff | H::LdOffR | H::AluOff | H::IncOff | H::DecOff => 12,
        _ => 4,
    })
}

/// `00 yyy zzz`: relative jumps, 16-bit loads, INC/DEC, LD r,n, accumulator ops.
const fn block0(y: u8, z: u8, mode: IndexMode) -> Descriptor {
    let p = y >> 1;
    let q = y & 1;
    let ix = O::Pair(mode.pair());

    match z {
        0 => match y {
            0 => Descriptor::new(H::Nop, 4),
            1 => Descriptor::new(H::ExAf, 4),
            2 => Descriptor::new(H::Djnz, 8).taken(13),
            3 => Descriptor::new(H::Jr, 12),
            _ => Descriptor::new(H::JrCond, 7)
                .op1(O::Cond(Condition::from_field(y - 4)))
                .taken(12),
        },
        1 => {
            if q == 0 {
                Descriptor::new(H::LdRrNn, 10).op1(O::Pair(mode.rp(p)))
            } else {
                Descriptor::new(H::AddRrRr, 11).op2(ix, O::Pair(mode.rp(p)))
            }
        }
        2 => match (q, p) {
            (0, 0) => Descriptor::new(H::LdIndA, 7).op2(O::Pair(Reg16::Bc), O::Reg(Reg8::A)),
            (0, 1) => Descriptor::new(H::LdIndA, 7).op2(O::Pair(Reg16::De), O::Reg(Reg8::A)),
            (0, 2) => Descriptor::new(H::LdAddrRr, 16).op1(ix),
            (0, _) => Descriptor::new(H::LdAddrA, 13).op1(O::Reg(Reg8::A)),
            (_, 0) => Descriptor::new(H::LdAInd, 7).op2(O::Reg(Reg8::A), O::Pair(Reg16::Bc)),
            (_, 1) => Descriptor::new(H::LdAInd, 7).op2(O::Reg(Reg8::A), O::Pair(Reg16::De)),
            (_, 2) => Descriptor::new(H::LdRrAddr, 16).op1(ix),
            _ => Descriptor::new(H::LdAAddr, 13).op1(O::Reg(Reg8::A)),
        },
        3 => {
            let h = if q == 0 { H::IncRr } else { H::DecRr };
            Descriptor::new(h, 6).op1(O::Pair(mode.rp(p)))
        }
        4 => {
            if y == 6 {
                Descriptor::new(mode.mem(H::IncInd, H::IncOff), 11).op1(ix)
            } else {
                Descriptor::new(H::IncR, 4).op1(O::Reg(mode.r8(y)))
            }
        }
        5 => {
            if y == 6 {
                Descriptor::new(mode.mem(H::DecInd, H::DecOff), 11).op1(ix)
            } else {
                Descriptor::new(H::DecR, 4).op1(O::Reg(mode.r8(y)))
            }
        }
        6 => {
            if y == 6 {
                Descriptor::new(mode.mem(H::LdIndN, H::LdOffN), 10).op1(ix)
            } else {
                Descriptor::new(H::LdRN, 7).op1(O::Reg(mode.r8(y)))
            }
        }
        _ => Descriptor::new(
            match y {
                0 => H::Rlca,
                1 => H::Rrca,
                2 => H::Rla,
                3 => H::Rra,
                4 => H::Daa,
                5 => H::Cpl,
                6 => H::Scf,
                _ => H::Ccf,
            },
            4,
        ),
    }
}

/// `01 yyy zzz`: LD r,r' and HALT.
const fn block1(y: u8, z: u8, mode: IndexMode) -> Descriptor {
    let ix = O::Pair(mode.pair());
    if y == 6 && z == 6 {
        Descriptor::new(H::Halt, 4)
    } else if z == 6 {
        // The register side of a memory load is never renamed
        Descriptor::new(mode.mem(H::LdRInd, H::LdROff), 7).op2(O::Reg(Reg8::from_field(y)), ix)
    } else if y == 6 {
        Descriptor::new(mode.mem(H::LdIndR, H::LdOffR), 7).op2(ix, O::Reg(Reg8::from_field(z)))
    } else {
        Descriptor::new(H::LdRR, 4).op2(O::Reg(mode.r8(y)), O::Reg(mode.r8(z)))
    }
}

/// `10 yyy zzz`: accumulator ALU on a register or `(HL)`.
const fn block2(y: u8, z: u8, mode: IndexMode) -> Descriptor {
    let alu = O::Alu(AluOp::from_field(y));
    if z == 6 {
        Descriptor::new(mode.mem(H::AluInd, H::AluOff), 7).op2(alu, O::Pair(mode.pair()))
    } else {
        Descriptor::new(H::AluR, 4).op2(alu, O::Reg(mode.r8(z)))
    }
}

/// `11 yyy zzz`: returns, jumps, calls, stack, prefixes, immediates, RST.
const fn block3(y: u8, z: u8, mode: IndexMode) -> Descriptor {
    let p = y >> 1;
    let q = y & 1;
    let ix = O::Pair(mode.pair());
    let cond = O::Cond(Condition::from_field(y));

    match z {
        0 => Descriptor::new(H::RetCond, 5).op1(cond).taken(11),
        1 => {
            if q == 0 {
                Descriptor::new(H::Pop, 10).op1(O::Pair(mode.rp2(p)))
            } else {
                match p {
                    0 => Descriptor::new(H::Ret, 10),
                    1 => Descriptor::new(H::Exx, 4),
                    2 => Descriptor::new(H::JpRr, 4).op1(ix),
                    _ => Descriptor::new(H::LdSpRr, 6).op2(O::Pair(Reg16::Sp), ix),
                }
            }
        }
        2 => Descriptor::new(H::JpCond, 10).op1(cond),
        3 => match y {
            0 => Descriptor::new(H::Jp, 10),
            1 => Descriptor::new(H::Prefix, 4).op1(O::Table(mode.cb_table())),
            2 => Descriptor::new(H::OutNA, 11).op1(O::Reg(Reg8::A)),
            3 => Descriptor::new(H::InAN, 11).op1(O::Reg(Reg8::A)),
            4 => Descriptor::new(H::ExSpRr, 19).op2(O::Pair(Reg16::Sp), ix),
            5 => Descriptor::new(H::ExDeHl, 4).op2(O::Pair(Reg16::De), O::Pair(Reg16::Hl)),
            6 => Descriptor::new(H::Di, 4),
            _ => Descriptor::new(H::Ei, 4),
        },
        4 => Descriptor::new(H::CallCond, 10).op1(cond).taken(17),
        5 => {
            if q == 0 {
                Descriptor::new(H::Push, 11).op1(O::Pair(mode.rp2(p)))
            } else {
                match p {
                    0 => Descriptor::new(H::Call, 17),
                    1 => Descriptor::new(H::Prefix, 4).op1(O::Table(Table::Dd)),
                    2 => Descriptor::new(H::Prefix, 4).op1(O::Table(Table::Ed)),
                    _ => Descriptor::new(H::Prefix, 4).op1(O::Table(Table::Fd)),
                }
            }
        }
        6 => Descriptor::new(H::AluN, 7).op1(O::Alu(AluOp::from_field(y))),
        _ => Descriptor::new(H::Rst, 11).op1(O::Vector(y * 8)),
    }
}
