//! Intcode virtual machine — executes programs over a growable memory tape.
//!
//! The VM has:
//! - A single flat memory shared by code and data, grown on demand
//! - An instruction pointer and a relative base register
//! - A FIFO of pending input values and a one-slot output register
//!
//! Callers drive it one step at a time, to completion with [`VM::run`], or
//! cooperatively with [`VM::run_until_output_or_halt`], which suspends
//! whenever a value is produced or input is needed.
//!
//! # Usage
//!
//! ```
//! use intcode_common::Program;
//! use intcode_vm::{Event, VM};
//!
//! let program: Program = "3,0,4,0,99".parse().unwrap();
//! let mut vm = VM::new(&program);
//!
//! assert_eq!(vm.run_until_output_or_halt().unwrap(), Event::AwaitingInput);
//! vm.provide_input(7);
//! assert_eq!(vm.run_until_output_or_halt().unwrap(), Event::Produced(7));
//! assert_eq!(vm.run_until_output_or_halt().unwrap(), Event::Halted);
//! ```

pub mod error;
pub mod execute;
pub mod machine;
pub mod memory;

pub use error::{MemoryError, VmError};
pub use machine::{Event, State, VM};
pub use memory::Memory;

use intcode_common::Program;

/// Run a program that takes no input and return everything it outputs.
///
/// # Errors
///
/// Returns [`VmError`] on an undecodable instruction, a negative or
/// unallocatable address, or any Input instruction (nothing is ever queued).
pub fn run(program: &Program) -> Result<Vec<i64>, VmError> {
    VM::new(program).run()
}

/// Run a program to completion with a fixed list of inputs.
pub fn run_with_inputs<I>(program: &Program, inputs: I) -> Result<Vec<i64>, VmError>
where
    I: IntoIterator<Item = i64>,
{
    let mut vm = VM::new(program);
    vm.provide_inputs(inputs);
    vm.run()
}
