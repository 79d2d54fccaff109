//! Descriptor table defects.

use thiserror::Error;

use crate::decode::{Handler, Table};

/// A malformed descriptor, found by [`validate_tables`](crate::validate_tables).
///
/// The tables are compile-time constants, so any of these is a build defect;
/// the core itself never produces or checks for them while running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("{table} {opcode:02X}: {mcycles} bus cycles recorded for {tstates} T-states")]
    MCycleMismatch {
        table: Table,
        opcode: u8,
        tstates: u8,
        mcycles: u8,
    },

    #[error("{table} {opcode:02X}: final bus cycle is {last}T, expected {expected}T")]
    LastStepMismatch {
        table: Table,
        opcode: u8,
        last: u8,
        expected: u8,
    },

    #[error("{table} {opcode:02X}: taken cost {taken}T is below not-taken cost {not_taken}T")]
    TakenCheaperThanNotTaken {
        table: Table,
        opcode: u8,
        taken: u8,
        not_taken: u8,
    },

    #[error("{table} {opcode:02X}: costs differ but no branch class is set")]
    MissingBranchClass { table: Table, opcode: u8 },

    #[error("{table} {opcode:02X}: branch class set on a handler that never branches")]
    UnexpectedBranchClass { table: Table, opcode: u8 },

    #[error("{table} {opcode:02X}: operand {index} does not fit {handler:?}")]
    OperandMismatch {
        table: Table,
        opcode: u8,
        index: usize,
        handler: Handler,
    },
}
