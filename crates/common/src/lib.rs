//! Intcode common types and instruction decoding.
//!
//! This crate provides the vocabulary shared by the interpreter and its
//! drivers:
//!
//! - [`Opcode`] — the ten operations of the instruction set
//! - [`ParameterMode`] — position, immediate and relative addressing
//! - [`Instruction`] — a decoded instruction and the decoder itself
//! - [`Program`] — the comma-separated program text format
//! - [`DecodeError`], [`ParseError`] — decode and parse failures

pub mod error;
pub mod instruction;
pub mod mode;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, ParseError};
pub use instruction::Instruction;
pub use mode::ParameterMode;
pub use opcode::Opcode;
pub use program::Program;
