//! Opcode definitions for the Intcode instruction set.
//!
//! An opcode is the value of the opcode cell taken mod 100. The higher
//! decimal digits of the cell carry parameter modes and are handled by
//! [`crate::instruction`].

/// Identifies the operation to perform.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `dst := a + b`
    Add = 1,
    /// `dst := a * b`
    Multiply = 2,
    /// `dst := next pending input`
    Input = 3,
    /// Publish `a` on the output register.
    Output = 4,
    /// Jump to `target` if `cond != 0`.
    JumpIfTrue = 5,
    /// Jump to `target` if `cond == 0`.
    JumpIfFalse = 6,
    /// `dst := (a < b) as i64`
    LessThan = 7,
    /// `dst := (a == b) as i64`
    Equals = 8,
    /// `relative_base += a`
    AdjustRelativeBase = 9,
    /// Stop the machine.
    Halt = 99,
}

/// All valid opcodes, in table order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 10] = [
    Opcode::Add,
    Opcode::Multiply,
    Opcode::Input,
    Opcode::Output,
    Opcode::JumpIfTrue,
    Opcode::JumpIfFalse,
    Opcode::LessThan,
    Opcode::Equals,
    Opcode::AdjustRelativeBase,
    Opcode::Halt,
];

impl Opcode {
    /// Look up the opcode for a value that has already been reduced mod 100.
    ///
    /// Returns `None` for values outside the table.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Opcode::Add),
            2 => Some(Opcode::Multiply),
            3 => Some(Opcode::Input),
            4 => Some(Opcode::Output),
            5 => Some(Opcode::JumpIfTrue),
            6 => Some(Opcode::JumpIfFalse),
            7 => Some(Opcode::LessThan),
            8 => Some(Opcode::Equals),
            9 => Some(Opcode::AdjustRelativeBase),
            99 => Some(Opcode::Halt),
            _ => None,
        }
    }

    /// Number of operand cells that follow the opcode cell.
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Total instruction length in cells, opcode cell included.
    pub fn length(self) -> usize {
        1 + self.operand_count()
    }

    /// Whether the last operand is a write destination rather than a value.
    pub fn writes_last_operand(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Multiply | Opcode::Input | Opcode::LessThan | Opcode::Equals
        )
    }

    /// Short upper-case name used in logs.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JT",
            Opcode::JumpIfFalse => "JF",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustRelativeBase => "ARB",
            Opcode::Halt => "HALT",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
