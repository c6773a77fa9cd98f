//! Decode and parse errors for Intcode programs.

use thiserror::Error;

/// Errors that occur while decoding the instruction at a given address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The opcode cell, taken mod 100, is not in the opcode table.
    #[error("unknown opcode {value} at address {address}")]
    UnknownOpcode { address: usize, value: i64 },

    /// One of the mode digits of the opcode cell is not 0, 1 or 2.
    #[error("unknown parameter mode {digit} in opcode {value} at address {address}")]
    UnknownMode {
        address: usize,
        value: i64,
        digit: i64,
    },
}

/// Errors from parsing the comma-separated program text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no integers at all.
    #[error("empty program")]
    Empty,

    /// A field could not be parsed as a signed 64-bit integer.
    #[error("invalid integer {token:?} at field {index}")]
    InvalidInteger { index: usize, token: String },
}
