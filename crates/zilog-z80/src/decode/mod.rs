//! Opcode descriptor tables.
//!
//! Seven fixed 256-entry tables map an opcode byte to the handler that runs
//! it, the handler's operand tags and its cost. The tables are built by
//! `const fn` at compile time and shared read-only by every CPU instance.
//!
//! Costs are whole-instruction costs: they include every prefix byte and,
//! for DD CB d op / FD CB d op, the displacement fetch.

mod base;
mod bits;
mod extended;

use std::fmt;

use crate::alu::{AluOp, ShiftOp};
use crate::error::TableError;
use crate::flags::{CF, PF, SF, ZF};
use crate::registers::{Reg8, Reg16};

use base::IndexMode;

static MAIN: [Descriptor; 256] = base::table(IndexMode::Hl);
static DD: [Descriptor; 256] = base::table(IndexMode::Ix);
static FD: [Descriptor; 256] = base::table(IndexMode::Iy);
static CB: [Descriptor; 256] = bits::table();
static DDCB: [Descriptor; 256] = bits::index_table(IndexMode::Ix);
static FDCB: [Descriptor; 256] = bits::index_table(IndexMode::Iy);
static ED: [Descriptor; 256] = extended::table();

/// One of the seven dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Main,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

impl Table {
    pub const ALL: [Self; 7] = [
        Self::Main,
        Self::Cb,
        Self::Ed,
        Self::Dd,
        Self::Fd,
        Self::DdCb,
        Self::FdCb,
    ];

    /// The table's 256 descriptors.
    #[must_use]
    pub fn descriptors(self) -> &'static [Descriptor; 256] {
        match self {
            Self::Main => &MAIN,
            Self::Cb => &CB,
            Self::Ed => &ED,
            Self::Dd => &DD,
            Self::Fd => &FD,
            Self::DdCb => &DDCB,
            Self::FdCb => &FDCB,
        }
    }

    #[must_use]
    pub fn lookup(self, opcode: u8) -> &'static Descriptor {
        &self.descriptors()[usize::from(opcode)]
    }

    /// True for the DD and FD tables, where a further prefix byte is absorbed.
    #[must_use]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::Dd | Self::Fd)
    }

    /// True for the DD CB / FD CB tables, whose displacement precedes the opcode.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        matches!(self, Self::DdCb | Self::FdCb)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Main => "main",
            Self::Cb => "CB",
            Self::Ed => "ED",
            Self::Dd => "DD",
            Self::Fd => "FD",
            Self::DdCb => "DDCB",
            Self::FdCb => "FDCB",
        })
    }
}

/// Cost of one outcome of an instruction.
///
/// `mcycles` bus cycles of 4 T-states each, except the last, which takes
/// `last` T-states. The parts always sum to `tstates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cost {
    pub tstates: u8,
    pub mcycles: u8,
    pub last: u8,
}

impl Cost {
    /// Split `tstates` into 4-state bus cycles, rounding half up.
    #[must_use]
    pub const fn of(tstates: u8) -> Self {
        let mut mcycles = (tstates + 2) / 4;
        if mcycles == 0 {
            mcycles = 1;
        }
        Self {
            tstates,
            mcycles,
            last: tstates - (mcycles - 1) * 4,
        }
    }

    const fn plus(self, extra: u8) -> Self {
        Self::of(self.tstates + extra)
    }
}

/// What decides whether the taken cost applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchClass {
    None,
    /// JR/JP/CALL/RET on a flag condition.
    Conditional,
    /// DJNZ.
    DecrementBranch,
    /// LDIR/LDDR.
    BlockTransfer,
    /// CPIR/CPDR.
    BlockCompare,
    /// INIR/INDR.
    BlockInput,
    /// OTIR/OTDR.
    BlockOutput,
}

/// Flag condition encoded in bits 5-3 of conditional opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Nz,
    Z,
    Nc,
    C,
    Po,
    Pe,
    P,
    M,
}

impl Condition {
    #[must_use]
    pub const fn from_field(y: u8) -> Self {
        match y & 7 {
            0 => Self::Nz,
            1 => Self::Z,
            2 => Self::Nc,
            3 => Self::C,
            4 => Self::Po,
            5 => Self::Pe,
            6 => Self::P,
            _ => Self::M,
        }
    }

    /// Does the condition hold for flag byte `f`?
    #[must_use]
    pub const fn holds(self, f: u8) -> bool {
        match self {
            Self::Nz => f & ZF == 0,
            Self::Z => f & ZF != 0,
            Self::Nc => f & CF == 0,
            Self::C => f & CF != 0,
            Self::Po => f & PF == 0,
            Self::Pe => f & PF != 0,
            Self::P => f & SF == 0,
            Self::M => f & SF != 0,
        }
    }
}

/// An operand tag carried by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Reg(Reg8),
    Pair(Reg16),
    Cond(Condition),
    /// Bit number for BIT/RES/SET.
    Bit(u8),
    Alu(AluOp),
    Shift(ShiftOp),
    /// RST target address.
    Vector(u8),
    /// Interrupt mode for IM.
    Mode(u8),
    /// Table selected by a prefix byte.
    Table(Table),
}

/// The shape an operand slot must have for a given handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Reg,
    Pair,
    Cond,
    Bit,
    Alu,
    Shift,
    Vector,
    Mode,
    Table,
}

impl Operand {
    #[must_use]
    pub const fn kind(self) -> OperandKind {
        match self {
            Self::None => OperandKind::None,
            Self::Reg(_) => OperandKind::Reg,
            Self::Pair(_) => OperandKind::Pair,
            Self::Cond(_) => OperandKind::Cond,
            Self::Bit(_) => OperandKind::Bit,
            Self::Alu(_) => OperandKind::Alu,
            Self::Shift(_) => OperandKind::Shift,
            Self::Vector(_) => OperandKind::Vector,
            Self::Mode(_) => OperandKind::Mode,
            Self::Table(_) => OperandKind::Table,
        }
    }
}

/// Instruction handlers, one per operation and addressing shape.
///
/// Suffixes name the shape: `R` register, `N` immediate byte, `Ind` through
/// a register pair (`(HL)`, `(BC)`...), `Off` indexed `(IX+d)`/`(IY+d)`,
/// `Addr` direct `(nn)`, `Rr` register pair, `Nn` immediate word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Nop,
    /// Prefix byte: switch to the table in operand 0.
    Prefix,

    // 8-bit loads
    LdRR,
    LdRN,
    LdRInd,
    LdROff,
    LdIndR,
    LdOffR,
    LdIndN,
    LdOffN,
    LdAInd,
    LdIndA,
    LdAAddr,
    LdAddrA,
    LdAIr,

    // 16-bit loads, stack and exchanges
    LdRrNn,
    LdRrAddr,
    LdAddrRr,
    LdSpRr,
    Push,
    Pop,
    ExAf,
    Exx,
    ExDeHl,
    ExSpRr,

    // Arithmetic and logic
    AluR,
    AluInd,
    AluOff,
    AluN,
    IncR,
    DecR,
    IncInd,
    DecInd,
    IncOff,
    DecOff,
    IncRr,
    DecRr,
    AddRrRr,
    AdcHlRr,
    SbcHlRr,
    Daa,
    Cpl,
    Neg,
    Scf,
    Ccf,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Rld,
    Rrd,

    // Bit operations
    ShiftR,
    ShiftInd,
    ShiftOff,
    ShiftOffR,
    BitR,
    BitInd,
    BitOff,
    ResR,
    ResInd,
    ResOff,
    ResOffR,
    SetR,
    SetInd,
    SetOff,
    SetOffR,

    // Control transfer
    Jp,
    JpCond,
    JpRr,
    Jr,
    JrCond,
    Djnz,
    Call,
    CallCond,
    Ret,
    RetCond,
    Retn,
    Reti,
    Rst,
    Halt,
    Di,
    Ei,
    Im,

    // I/O
    InAN,
    OutNA,
    InRC,
    InFlagsC,
    OutCR,
    OutC0,

    // Block instructions
    Ldi,
    Ldd,
    Ldir,
    Lddr,
    Cpi,
    Cpd,
    Cpir,
    Cpdr,
    Ini,
    Ind,
    Inir,
    Indr,
    Outi,
    Outd,
    Otir,
    Otdr,
}

impl Handler {
    /// Operand shapes this handler reads, slot by slot.
    #[must_use]
    pub const fn operand_kinds(self) -> [OperandKind; 3] {
        use OperandKind as K;
        match self {
            Self::Prefix => [K::Table, K::None, K::None],
            Self::LdRR | Self::LdAIr => [K::Reg, K::Reg, K::None],
            Self::LdRN
            | Self::LdAAddr
            | Self::LdAddrA
            | Self::IncR
            | Self::DecR
            | Self::InAN
            | Self::OutNA
            | Self::InRC
            | Self::OutCR => [K::Reg, K::None, K::None],
            Self::LdRInd | Self::LdROff | Self::LdAInd => [K::Reg, K::Pair, K::None],
            Self::LdIndR | Self::LdOffR | Self::LdIndA => [K::Pair, K::Reg, K::None],
            Self::LdIndN
            | Self::LdOffN
            | Self::LdRrNn
            | Self::LdRrAddr
            | Self::LdAddrRr
            | Self::Push
            | Self::Pop
            | Self::IncInd
            | Self::DecInd
            | Self::IncOff
            | Self::DecOff
            | Self::IncRr
            | Self::DecRr
            | Self::JpRr => [K::Pair, K::None, K::None],
            Self::LdSpRr
            | Self::ExDeHl
            | Self::ExSpRr
            | Self::AddRrRr
            | Self::AdcHlRr
            | Self::SbcHlRr => [K::Pair, K::Pair, K::None],
            Self::AluR => [K::Alu, K::Reg, K::None],
            Self::AluInd | Self::AluOff => [K::Alu, K::Pair, K::None],
            Self::AluN => [K::Alu, K::None, K::None],
            Self::ShiftR => [K::Shift, K::Reg, K::None],
            Self::ShiftInd | Self::ShiftOff => [K::Shift, K::Pair, K::None],
            Self::ShiftOffR => [K::Shift, K::Pair, K::Reg],
            Self::BitR | Self::ResR | Self::SetR => [K::Bit, K::Reg, K::None],
            Self::BitInd
            | Self::BitOff
            | Self::ResInd
            | Self::ResOff
            | Self::SetInd
            | Self::SetOff => [K::Bit, K::Pair, K::None],
            Self::ResOffR | Self::SetOffR => [K::Bit, K::Pair, K::Reg],
            Self::JpCond | Self::JrCond | Self::CallCond | Self::RetCond => {
                [K::Cond, K::None, K::None]
            }
            Self::Rst => [K::Vector, K::None, K::None],
            Self::Im => [K::Mode, K::None, K::None],
            _ => [K::None, K::None, K::None],
        }
    }

    /// The branch class every descriptor using this handler must carry.
    #[must_use]
    pub const fn branch_class(self) -> BranchClass {
        match self {
            Self::JpCond | Self::JrCond | Self::CallCond | Self::RetCond => {
                BranchClass::Conditional
            }
            Self::Djnz => BranchClass::DecrementBranch,
            Self::Ldir | Self::Lddr => BranchClass::BlockTransfer,
            Self::Cpir | Self::Cpdr => BranchClass::BlockCompare,
            Self::Inir | Self::Indr => BranchClass::BlockInput,
            Self::Otir | Self::Otdr => BranchClass::BlockOutput,
            _ => BranchClass::None,
        }
    }
}

/// Everything the engine needs to run one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub handler: Handler,
    pub operands: [Operand; 3],
    /// Cost when a conditional branch or repeat is taken.
    pub taken: Cost,
    /// Cost otherwise; the only cost for non-branching handlers.
    pub not_taken: Cost,
    pub branch: BranchClass,
}

impl Descriptor {
    pub(crate) const fn new(handler: Handler, tstates: u8) -> Self {
        Self {
            handler,
            operands: [Operand::None; 3],
            taken: Cost::of(tstates),
            not_taken: Cost::of(tstates),
            branch: handler.branch_class(),
        }
    }

    pub(crate) const fn op1(self, a: Operand) -> Self {
        Self { operands: [a, Operand::None, Operand::None], ..self }
    }

    pub(crate) const fn op2(self, a: Operand, b: Operand) -> Self {
        Self { operands: [a, b, Operand::None], ..self }
    }

    pub(crate) const fn op3(self, a: Operand, b: Operand, c: Operand) -> Self {
        Self { operands: [a, b, c], ..self }
    }

    /// Set the cost of the taken outcome.
    pub(crate) const fn taken(self, tstates: u8) -> Self {
        Self { taken: Cost::of(tstates), ..self }
    }

    /// Add a fixed latency to both outcomes.
    pub(crate) const fn slower(self, extra: u8) -> Self {
        Self {
            taken: self.taken.plus(extra),
            not_taken: self.not_taken.plus(extra),
            ..self
        }
    }

    /// Register named by operand `i`.
    #[must_use]
    pub const fn reg(&self, i: usize) -> Reg8 {
        match self.operands[i] {
            Operand::Reg(r) => r,
            _ => Reg8::A,
        }
    }

    /// Register pair named by operand `i`.
    #[must_use]
    pub const fn pair(&self, i: usize) -> Reg16 {
        match self.operands[i] {
            Operand::Pair(p) => p,
            _ => Reg16::Hl,
        }
    }

    /// Condition in operand 0.
    #[must_use]
    pub const fn cond(&self) -> Condition {
        match self.operands[0] {
            Operand::Cond(c) => c,
            _ => Condition::Nz,
        }
    }

    /// Small numeric operand in slot 0 (bit number, RST vector or IM mode).
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self.operands[0] {
            Operand::Bit(n) | Operand::Vector(n) | Operand::Mode(n) => n,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn alu_op(&self) -> AluOp {
        match self.operands[0] {
            Operand::Alu(op) => op,
            _ => AluOp::Add,
        }
    }

    #[must_use]
    pub const fn shift_op(&self) -> ShiftOp {
        match self.operands[0] {
            Operand::Shift(op) => op,
            _ => ShiftOp::Rlc,
        }
    }

    /// Table a prefix descriptor switches to.
    #[must_use]
    pub const fn next_table(&self) -> Table {
        match self.operands[0] {
            Operand::Table(t) => t,
            _ => Table::Main,
        }
    }
}

/// Check every descriptor in every table for internal consistency.
///
/// The tables are constants, so this only ever fails on a build defect. The
/// engine does not call it.
pub fn validate_tables() -> Result<(), TableError> {
    for table in Table::ALL {
        for (opcode, d) in (0u8..=255).zip(table.descriptors().iter()) {
            validate(table, opcode, d)?;
        }
    }
    Ok(())
}

fn validate(table: Table, opcode: u8, d: &Descriptor) -> Result<(), TableError> {
    for cost in [d.taken, d.not_taken] {
        let mcycles = Cost::of(cost.tstates).mcycles;
        if cost.mcycles != mcycles {
            return Err(TableError::MCycleMismatch {
                table,
                opcode,
                tstates: cost.tstates,
                mcycles: cost.mcycles,
            });
        }
        let expected = cost.tstates - (cost.mcycles - 1) * 4;
        if cost.last != expected {
            return Err(TableError::LastStepMismatch {
                table,
                opcode,
                last: cost.last,
                expected,
            });
        }
    }

    if d.taken.tstates < d.not_taken.tstates {
        return Err(TableError::TakenCheaperThanNotTaken {
            table,
            opcode,
            taken: d.taken.tstates,
            not_taken: d.not_taken.tstates,
        });
    }
    if d.branch == BranchClass::None && d.taken != d.not_taken {
        return Err(TableError::MissingBranchClass { table, opcode });
    }
    if d.branch != d.handler.branch_class() {
        return Err(TableError::UnexpectedBranchClass { table, opcode });
    }

    for (index, (operand, kind)) in d.operands.iter().zip(d.handler.operand_kinds()).enumerate() {
        if operand.kind() != kind {
            return Err(TableError::OperandMismatch {
                table,
                opcode,
                index,
                handler: d.handler,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_consistent() {
        assert_eq!(validate_tables(), Ok(()));
    }

    #[test]
    fn cost_split_sums_to_total() {
        for t in 4..=23u8 {
            let c = Cost::of(t);
            assert_eq!(u32::from(c.mcycles - 1) * 4 + u32::from(c.last), u32::from(t));
        }
        assert_eq!(Cost::of(7), Cost { tstates: 7, mcycles: 2, last: 3 });
        assert_eq!(Cost::of(10), Cost { tstates: 10, mcycles: 3, last: 2 });
        assert_eq!(Cost::of(21), Cost { tstates: 21, mcycles: 5, last: 5 });
    }

    #[test]
    fn prefixes_route_to_their_tables() {
        assert_eq!(Table::Main.lookup(0xCB).next_table(), Table::Cb);
        assert_eq!(Table::Main.lookup(0xED).next_table(), Table::Ed);
        assert_eq!(Table::Main.lookup(0xDD).next_table(), Table::Dd);
        assert_eq!(Table::Main.lookup(0xFD).next_table(), Table::Fd);
        assert_eq!(Table::Dd.lookup(0xCB).next_table(), Table::DdCb);
        assert_eq!(Table::Fd.lookup(0xCB).next_table(), Table::FdCb);
        assert_eq!(Table::Dd.lookup(0xFD).next_table(), Table::Fd);
        assert_eq!(Table::Fd.lookup(0xED).next_table(), Table::Ed);
    }

    #[test]
    fn every_prefix_pair_resolves_to_one_handler() {
        for table in Table::ALL {
            for op in 0..=255u8 {
                let d = table.lookup(op);
                if d.handler == Handler::Prefix {
                    // Only main, DD and FD hold prefix slots
                    assert!(matches!(table, Table::Main | Table::Dd | Table::Fd));
                    assert!(matches!(op, 0xCB | 0xDD | 0xED | 0xFD));
                }
            }
        }
        let prefixes = (0..=255u8)
            .filter(|&op| Table::Main.lookup(op).handler == Handler::Prefix)
            .count();
        assert_eq!(prefixes, 4);
    }

    #[test]
    fn well_known_costs() {
        let cases = [
            (Table::Main, 0x00, 4, 4),   // NOP
            (Table::Main, 0x10, 13, 8),  // DJNZ
            (Table::Main, 0x20, 12, 7),  // JR NZ
            (Table::Main, 0xC4, 17, 10), // CALL NZ
            (Table::Main, 0xC0, 11, 5),  // RET NZ
            (Table::Main, 0xC2, 10, 10), // JP NZ
            (Table::Main, 0x36, 10, 10), // LD (HL),n
            (Table::Main, 0xE3, 19, 19), // EX (SP),HL
            (Table::Cb, 0x46, 12, 12),   // BIT 0,(HL)
            (Table::Cb, 0x06, 15, 15),   // RLC (HL)
            (Table::Ed, 0xB0, 21, 16),   // LDIR
            (Table::Ed, 0xB1, 21, 16),   // CPIR
            (Table::Ed, 0xA0, 16, 16),   // LDI
            (Table::Ed, 0x63, 20, 20),   // LD (nn),HL mirror
            (Table::Ed, 0x00, 8, 8),     // undefined
            (Table::Dd, 0x21, 14, 14),   // LD IX,nn
            (Table::Dd, 0x7E, 19, 19),   // LD A,(IX+d)
            (Table::Dd, 0x36, 19, 19),   // LD (IX+d),n
            (Table::Dd, 0x34, 23, 23),   // INC (IX+d)
            (Table::Dd, 0xE3, 23, 23),   // EX (SP),IX
            (Table::Dd, 0x00, 8, 8),     // absorbed prefix + NOP
            (Table::Fd, 0x20, 16, 11),   // absorbed prefix + JR NZ
            (Table::DdCb, 0x46, 20, 20), // BIT 0,(IX+d)
            (Table::FdCb, 0x06, 23, 23), // RLC (IY+d)
            (Table::FdCb, 0xC0, 23, 23), // SET 0,(IY+d),B
        ];
        for (table, op, taken, not_taken) in cases {
            let d = table.lookup(op);
            assert_eq!(d.taken.tstates, taken, "{table} {op:02X} taken");
            assert_eq!(d.not_taken.tstates, not_taken, "{table} {op:02X} not taken");
        }
    }

    #[test]
    fn index_tables_rename_hl() {
        let d = Table::Dd.lookup(0x44); // LD B,IXH
        assert_eq!(d.handler, Handler::LdRR);
        assert_eq!(d.operands[1], Operand::Reg(Reg8::Ixh));

        let d = Table::Fd.lookup(0x66); // LD H,(IY+d) keeps the real H
        assert_eq!(d.handler, Handler::LdROff);
        assert_eq!(d.operands[0], Operand::Reg(Reg8::H));
        assert_eq!(d.operands[1], Operand::Pair(Reg16::Iy));

        let d = Table::Dd.lookup(0xEB); // EX DE,HL is untouched by DD
        assert_eq!(d.operands, [Operand::Pair(Reg16::De), Operand::Pair(Reg16::Hl), Operand::None]);

        let d = Table::DdCb.lookup(0x00); // RLC (IX+d),B
        assert_eq!(d.handler, Handler::ShiftOffR);
        assert_eq!(d.operands[2], Operand::Reg(Reg8::B));
    }

    #[test]
    fn conditions_read_flags() {
        assert!(Condition::from_field(0).holds(0));
        assert!(!Condition::Z.holds(0));
        assert!(Condition::Pe.holds(PF));
        assert!(Condition::M.holds(SF));
        assert!(Condition::from_field(3).holds(CF));
    }
}
