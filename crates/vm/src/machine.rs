//! VM state: memory, registers, I/O slots and the observable machine state.

use std::collections::VecDeque;

use crate::error::{MemoryError, VmError};
use crate::memory::Memory;
use intcode_common::{Instruction, ParameterMode, Program};
use tracing::debug;

/// Observable state of the machine between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The next instruction can execute.
    Running,
    /// The next instruction is Input and no value is queued.
    AwaitingInput,
    /// An Output instruction has produced a value the caller has not taken.
    OutputReady,
    /// Opcode 99 has executed. Terminal.
    Halted,
}

/// Why [`VM::run_until_output_or_halt`] returned control to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// An Output instruction produced this value. The output slot is cleared.
    Produced(i64),
    /// The machine needs an input value before it can continue.
    AwaitingInput,
    /// The machine has halted.
    Halted,
}

/// The Intcode virtual machine.
#[derive(Debug, Clone)]
pub struct VM {
    /// Code and data.
    pub(crate) memory: Memory,
    /// Address of the next opcode cell.
    pub(crate) ip: usize,
    /// Offset applied to relative-mode operands.
    pub(crate) relative_base: i64,
    /// Pending input values, consumed front first.
    pub(crate) inputs: VecDeque<i64>,
    /// Last value produced by an Output instruction.
    pub(crate) output: i64,
    pub(crate) output_ready: bool,
    /// Set when a step declined to run Input on an empty queue.
    pub(crate) awaiting_input: bool,
    pub(crate) halted: bool,
    /// First fatal error. Once set no further instruction executes.
    pub(crate) fault: Option<VmError>,
}

impl VM {
    /// Create a VM with `program` loaded at address 0.
    pub fn new(program: &Program) -> Self {
        Self::from_cells(program.cells.clone())
    }

    /// Create a VM whose memory starts as `cells`.
    pub fn from_cells(cells: Vec<i64>) -> Self {
        Self {
            memory: Memory::new(cells),
            ip: 0,
            relative_base: 0,
            inputs: VecDeque::new(),
            output: 0,
            output_ready: false,
            awaiting_input: false,
            halted: false,
            fault: None,
        }
    }

    /// Replace memory with `cells` and reset every register and slot.
    pub fn load(&mut self, cells: &[i64]) {
        self.memory.load(cells);
        self.ip = 0;
        self.relative_base = 0;
        self.inputs.clear();
        self.output = 0;
        self.output_ready = false;
        self.awaiting_input = false;
        self.halted = false;
        self.fault = None;
    }

    /// Queue one value for the next Input instruction.
    pub fn provide_input(&mut self, value: i64) {
        self.inputs.push_back(value);
        self.awaiting_input = false;
    }

    /// Queue several values, consumed in iteration order.
    pub fn provide_inputs<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = i64>,
    {
        for value in values {
            self.provide_input(value);
        }
    }

    /// Number of queued input values.
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// The output register, if a value is ready and not yet taken.
    pub fn output(&self) -> Option<i64> {
        self.output_ready.then_some(self.output)
    }

    /// Take the ready output value, clearing the output-ready flag.
    pub fn take_output(&mut self) -> Option<i64> {
        let value = self.output();
        self.output_ready = false;
        value
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The error that faulted the machine, if any.
    pub fn fault(&self) -> Option<&VmError> {
        self.fault.as_ref()
    }

    pub fn state(&self) -> State {
        if self.halted {
            State::Halted
        } else if self.output_ready {
            State::OutputReady
        } else if self.awaiting_input {
            State::AwaitingInput
        } else {
            State::Running
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Read a cell without growing memory. Unwritten cells read as zero.
    pub fn peek(&self, address: usize) -> i64 {
        self.memory.as_slice().get(address).copied().unwrap_or(0)
    }

    /// Overwrite a cell, growing memory if needed.
    pub fn poke(&mut self, address: usize, value: i64) -> Result<(), MemoryError> {
        self.memory.write(address, value)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Decode the instruction at the instruction pointer.
    pub(crate) fn decode(&mut self) -> Result<Instruction, VmError> {
        let ip = self.ip;
        let memory = &mut self.memory;
        let mut refused = None;
        let decoded = Instruction::decode(ip, |address| {
            memory.read(address).unwrap_or_else(|err| {
                refused.get_or_insert(err);
                0
            })
        });
        if let Some(err) = refused {
            return Err(err.at(ip));
        }
        Ok(decoded?)
    }

    /// Translate a signed address into a memory index.
    pub(crate) fn resolve(&self, instr: &Instruction, value: i64) -> Result<usize, VmError> {
        usize::try_from(value).map_err(|_| VmError::NegativeAddress {
            address: instr.address,
            value,
        })
    }

    /// Value of operand `k` for reading.
    pub(crate) fn read_operand(&mut self, instr: &Instruction, k: usize) -> Result<i64, VmError> {
        let raw = instr.params[k];
        match instr.modes[k] {
            ParameterMode::Immediate => Ok(raw),
            ParameterMode::Position => {
                let address = self.resolve(instr, raw)?;
                self.memory.read(address).map_err(|err| err.at(instr.address))
            }
            ParameterMode::Relative => {
                let address = self.resolve(instr, self.relative_base.wrapping_add(raw))?;
                self.memory.read(address).map_err(|err| err.at(instr.address))
            }
        }
    }

    /// Address named by the destination operand, which is always the last.
    ///
    /// The cell is grown into existence here so the write that follows
    /// cannot fail. Immediate mode never appears on a destination in valid
    /// programs and is treated like position mode.
    pub(crate) fn write_address(&mut self, instr: &Instruction) -> Result<usize, VmError> {
        debug_assert!(instr.opcode.writes_last_operand());
        let k = instr.opcode.operand_count() - 1;
        let raw = instr.params[k];
        let address = match instr.modes[k] {
            ParameterMode::Position | ParameterMode::Immediate => self.resolve(instr, raw)?,
            ParameterMode::Relative => self.resolve(instr, self.relative_base.wrapping_add(raw))?,
        };
        self.memory.read(address).map_err(|err| err.at(instr.address))?;
        Ok(address)
    }

    /// Write `value` to a destination returned by [`VM::write_address`].
    pub(crate) fn store(
        &mut self,
        instr: &Instruction,
        address: usize,
        value: i64,
    ) -> Result<(), VmError> {
        self.memory
            .write(address, value)
            .map_err(|err| err.at(instr.address))
    }

    /// Record a fatal error and hand it back for propagation.
    pub(crate) fn fail(&mut self, err: VmError) -> VmError {
        debug!(ip = self.ip, error = %err, "vm faulted");
        self.fault = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_vm_is_running() {
        let vm = VM::from_cells(vec![99]);
        assert_eq!(vm.state(), State::Running);
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.relative_base(), 0);
        assert!(!vm.is_halted());
        assert_eq!(vm.output(), None);
    }

    #[test]
    fn inputs_are_fifo() {
        let mut vm = VM::from_cells(vec![99]);
        vm.provide_inputs([1, 2, 3]);
        assert_eq!(vm.pending_inputs(), 3);
        assert_eq!(vm.inputs.pop_front(), Some(1));
    }

    #[test]
    fn peek_does_not_grow() {
        let vm = VM::from_cells(vec![1, 2]);
        assert_eq!(vm.peek(1000), 0);
        assert_eq!(vm.memory().len(), 2);
    }

    #[test]
    fn poke_grows() {
        let mut vm = VM::from_cells(vec![1, 2]);
        vm.poke(10, 42).unwrap();
        assert_eq!(vm.peek(10), 42);
        assert_eq!(vm.peek(1), 2);
    }

    #[test]
    fn load_resets_registers() {
        let mut vm = VM::from_cells(vec![99]);
        vm.ip = 7;
        vm.relative_base = 3;
        vm.halted = true;
        vm.output_ready = true;
        vm.provide_input(1);
        vm.load(&[1, 0, 0, 0, 99]);
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.relative_base(), 0);
        assert_eq!(vm.pending_inputs(), 0);
        assert_eq!(vm.state(), State::Running);
        assert_eq!(vm.memory().as_slice(), &[1, 0, 0, 0, 99]);
    }

    #[test]
    fn take_output_clears_flag() {
        let mut vm = VM::from_cells(vec![99]);
        vm.output = 5;
        vm.output_ready = true;
        assert_eq!(vm.state(), State::OutputReady);
        assert_eq!(vm.take_output(), Some(5));
        assert_eq!(vm.take_output(), None);
        assert_eq!(vm.state(), State::Running);
    }
}
