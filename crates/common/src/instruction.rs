//! Instruction decoding.
//!
//! An instruction starts with an opcode cell laid out in decimal:
//! ```text
//!   C B A O O
//!   | | | +-+-- opcode (cell mod 100)
//!   | | +------ mode of operand 0
//!   | +-------- mode of operand 1
//!   +---------- mode of operand 2
//! ```
//! followed by as many operand cells as the opcode takes.

use crate::error::DecodeError;
use crate::mode::ParameterMode;
use crate::opcode::Opcode;

/// A decoded instruction. Lives for one decode-execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode cell.
    pub address: usize,
    /// The operation to perform.
    pub opcode: Opcode,
    /// Mode per operand slot. Unused slots are `Position`.
    pub modes: [ParameterMode; 3],
    /// Raw operand cells. Unused slots are zero.
    pub params: [i64; 3],
}

impl Instruction {
    /// Decode the instruction whose opcode cell is at `address`.
    ///
    /// `fetch` returns the cell at an address; it is called for the opcode
    /// cell and then exactly once per operand.
    pub fn decode<F>(address: usize, mut fetch: F) -> Result<Self, DecodeError>
    where
        F: FnMut(usize) -> i64,
    {
        let cell = fetch(address);
        let opcode = Opcode::from_code(cell % 100).ok_or(DecodeError::UnknownOpcode {
            address,
            value: cell,
        })?;

        let digits = Self::mode_digits(cell);
        let mut modes = [ParameterMode::Position; 3];
        let mut params = [0i64; 3];

        for k in 0..opcode.operand_count() {
            modes[k] = ParameterMode::from_digit(digits[k]).ok_or(DecodeError::UnknownMode {
                address,
                value: cell,
                digit: digits[k],
            })?;
            params[k] = fetch(address + 1 + k);
        }

        Ok(Self {
            address,
            opcode,
            modes,
            params,
        })
    }

    /// Split an opcode cell into its hundreds, thousands and ten-thousands digits.
    pub fn mode_digits(cell: i64) -> [i64; 3] {
        [cell / 100 % 10, cell / 1000 % 10, cell / 10000 % 10]
    }

    /// Instruction length in cells.
    pub fn length(&self) -> usize {
        self.opcode.length()
    }

    /// The used operands as `(raw, mode)` pairs.
    pub fn operands(&self) -> impl Iterator<Item = (i64, ParameterMode)> + '_ {
        self.params
            .iter()
            .copied()
            .zip(self.modes.iter().copied())
            .take(self.opcode.operand_count())
    }
}
