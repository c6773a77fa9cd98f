//! Runtime errors for the Intcode VM.
//!
//! Every error is fatal: the machine is faulted and will return the same
//! error from any further step.

use intcode_common::DecodeError;
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// The instruction at the instruction pointer could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An Input instruction ran with no pending input value.
    #[error("input required but none queued at address {address}")]
    InputStarved { address: usize },

    /// An operand resolved to a negative memory address.
    #[error("negative memory address {value} referenced by instruction at {address}")]
    NegativeAddress { address: usize, value: i64 },

    /// Memory could not grow far enough to hold a referenced cell.
    #[error("instruction at {address} needs memory cell {cell}, which cannot be allocated")]
    OutOfMemory { address: usize, cell: usize },
}

/// Memory could not grow to cover a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot grow memory to hold cell {address}")]
pub struct MemoryError {
    pub address: usize,
}

impl MemoryError {
    /// Attribute the failure to the instruction at `address`.
    pub fn at(self, address: usize) -> VmError {
        VmError::OutOfMemory {
            address,
            cell: self.address,
        }
    }
}

impl VmError {
    /// Address of the instruction that faulted.
    pub fn address(&self) -> usize {
        match self {
            VmError::Decode(DecodeError::UnknownOpcode { address, .. })
            | VmError::Decode(DecodeError::UnknownMode { address, .. })
            | VmError::InputStarved { address }
            | VmError::NegativeAddress { address, .. }
            | VmError::OutOfMemory { address, .. } => *address,
        }
    }
}
