//! Step, run loops and opcode dispatch for the Intcode VM.

use crate::error::VmError;
use crate::machine::{Event, State, VM};
use intcode_common::{Instruction, Opcode};
use tracing::{debug, trace};

impl VM {
    /// Decode and execute exactly one instruction.
    ///
    /// An Input instruction with nothing queued does not execute: the
    /// instruction pointer stays put and `State::AwaitingInput` is returned.
    /// A halted machine executes nothing and reports `State::Halted`.
    pub fn step(&mut self) -> Result<State, VmError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        if self.halted {
            return Ok(State::Halted);
        }

        let instr = match self.decode() {
            Ok(instr) => instr,
            Err(err) => return Err(self.fail(err)),
        };

        if instr.opcode == Opcode::Input && self.inputs.is_empty() {
            if !self.awaiting_input {
                debug!(ip = self.ip, "awaiting input");
            }
            self.awaiting_input = true;
            return Ok(State::AwaitingInput);
        }
        self.awaiting_input = false;

        trace!(
            ip = self.ip,
            op = instr.opcode.mnemonic(),
            params = ?&instr.params[..instr.opcode.operand_count()],
            rb = self.relative_base,
            "exec"
        );

        if let Err(err) = self.execute(&instr) {
            return Err(self.fail(err));
        }
        Ok(self.state())
    }

    /// Run until the machine halts, collecting every output produced.
    ///
    /// Running out of input is fatal here: the caller was expected to
    /// queue everything up front.
    pub fn run(&mut self) -> Result<Vec<i64>, VmError> {
        let mut outputs = Vec::new();
        loop {
            match self.run_until_output_or_halt()? {
                Event::Produced(value) => outputs.push(value),
                Event::Halted => return Ok(outputs),
                Event::AwaitingInput => {
                    let err = VmError::InputStarved { address: self.ip };
                    return Err(self.fail(err));
                }
            }
        }
    }

    /// Run until an output is produced, input is needed, or the machine halts.
    ///
    /// A value left unread in the output slot from an earlier step is
    /// returned first.
    pub fn run_until_output_or_halt(&mut self) -> Result<Event, VmError> {
        if let Some(value) = self.take_output() {
            return Ok(Event::Produced(value));
        }
        loop {
            match self.step()? {
                State::Running => {}
                State::OutputReady => {
                    let value = self.output;
                    self.output_ready = false;
                    return Ok(Event::Produced(value));
                }
                State::AwaitingInput => return Ok(Event::AwaitingInput),
                State::Halted => return Ok(Event::Halted),
            }
        }
    }

    /// Perform the effect of a decoded instruction.
    ///
    /// Every operand is resolved before anything is written, so a failing
    /// instruction leaves memory and registers untouched.
    fn execute(&mut self, instr: &Instruction) -> Result<(), VmError> {
        match instr.opcode {
            Opcode::Add => self.exec_binary(instr, i64::wrapping_add)?,
            Opcode::Multiply => self.exec_binary(instr, i64::wrapping_mul)?,
            Opcode::LessThan => self.exec_binary(instr, |a, b| (a < b) as i64)?,
            Opcode::Equals => self.exec_binary(instr, |a, b| (a == b) as i64)?,
            Opcode::Input => self.exec_input(instr)?,
            Opcode::Output => self.exec_output(instr)?,
            Opcode::JumpIfTrue => self.exec_jump(instr, |cond| cond != 0)?,
            Opcode::JumpIfFalse => self.exec_jump(instr, |cond| cond == 0)?,
            Opcode::AdjustRelativeBase => {
                let delta = self.read_operand(instr, 0)?;
                self.relative_base = self.relative_base.wrapping_add(delta);
                self.ip += instr.length();
            }
            Opcode::Halt => {
                debug!(ip = self.ip, "halted");
                self.halted = true;
            }
        }
        Ok(())
    }

    /// `dst := op(a, b)` for the three-operand opcodes.
    fn exec_binary(&mut self, instr: &Instruction, op: fn(i64, i64) -> i64) -> Result<(), VmError> {
        let a = self.read_operand(instr, 0)?;
        let b = self.read_operand(instr, 1)?;
        let dst = self.write_address(instr)?;
        self.store(instr, dst, op(a, b))?;
        self.ip += instr.length();
        Ok(())
    }

    fn exec_input(&mut self, instr: &Instruction) -> Result<(), VmError> {
        let dst = self.write_address(instr)?;
        let value = self
            .inputs
            .pop_front()
            .ok_or(VmError::InputStarved { address: instr.address })?;
        self.store(instr, dst, value)?;
        self.ip += instr.length();
        Ok(())
    }

    fn exec_output(&mut self, instr: &Instruction) -> Result<(), VmError> {
        let value = self.read_operand(instr, 0)?;
        if self.output_ready {
            trace!(ip = self.ip, lost = self.output, "unread output overwritten");
        }
        self.output = value;
        self.output_ready = true;
        self.ip += instr.length();
        Ok(())
    }

    fn exec_jump(&mut self, instr: &Instruction, taken: fn(i64) -> bool) -> Result<(), VmError> {
        let cond = self.read_operand(instr, 0)?;
        let target = self.read_operand(instr, 1)?;
        if taken(cond) {
            self.ip = self.resolve(instr, target)?;
        } else {
            self.ip += instr.length();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_advances_by_instruction_length() {
        let mut vm = VM::from_cells(vec![1101, 1, 2, 5, 99, 0]);
        assert_eq!(vm.step(), Ok(State::Running));
        assert_eq!(vm.ip(), 4);
        assert_eq!(vm.peek(5), 3);
    }

    #[test]
    fn halt_leaves_ip_unchanged() {
        let mut vm = VM::from_cells(vec![99]);
        assert_eq!(vm.step(), Ok(State::Halted));
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.step(), Ok(State::Halted));
        assert_eq!(vm.ip(), 0);
    }

    #[test]
    fn input_without_value_suspends_in_place() {
        let mut vm = VM::from_cells(vec![3, 0, 99]);
        assert_eq!(vm.step(), Ok(State::AwaitingInput));
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.state(), State::AwaitingInput);
        vm.provide_input(12);
        assert_eq!(vm.state(), State::Running);
        assert_eq!(vm.step(), Ok(State::Running));
        assert_eq!(vm.peek(0), 12);
    }

    #[test]
    fn jump_to_negative_target_faults_without_moving() {
        let mut vm = VM::from_cells(vec![1105, 1, -4]);
        let err = vm.step().unwrap_err();
        assert_eq!(
            err,
            VmError::NegativeAddress {
                address: 0,
                value: -4
            }
        );
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.step(), Err(err));
    }

    #[test]
    fn failing_instruction_writes_nothing() {
        // Second operand is a negative position; the destination must stay 0.
        let mut vm = VM::from_cells(vec![1, 0, -1, 4, 0]);
        assert!(vm.step().is_err());
        assert_eq!(vm.peek(4), 0);
    }

    #[test]
    fn executing_past_a_patched_input_clears_the_wait() {
        let mut vm = VM::from_cells(vec![3, 0, 0, 0, 99]);
        assert_eq!(vm.step(), Ok(State::AwaitingInput));
        vm.poke(0, 1101).unwrap();
        assert_eq!(vm.step(), Ok(State::Running));
        assert_eq!(vm.ip(), 4);
        assert_eq!(vm.step(), Ok(State::Halted));
    }

    #[test]
    fn unallocatable_destination_faults_before_consuming_input() {
        let mut vm = VM::from_cells(vec![3, 1 << 62, 99]);
        vm.provide_input(5);
        let err = vm.step().unwrap_err();
        assert_eq!(
            err,
            VmError::OutOfMemory {
                address: 0,
                cell: 1 << 62
            }
        );
        assert_eq!(vm.pending_inputs(), 1);
        assert_eq!(vm.memory().len(), 3);
    }

    #[test]
    fn immediate_destination_acts_as_position() {
        let mut vm = VM::from_cells(vec![11101, 2, 3, 5, 99, 0]);
        vm.run().unwrap();
        assert_eq!(vm.peek(5), 5);
    }

    #[test]
    fn arithmetic_wraps() {
        let mut vm = VM::from_cells(vec![1101, i64::MAX, 1, 5, 99, 0]);
        vm.run().unwrap();
        assert_eq!(vm.peek(5), i64::MIN);
    }
}
