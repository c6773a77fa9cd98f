//! ASCII adapter: text in, text out.
//!
//! Many Intcode programs talk in ASCII codes, one character per value.
//! Values above 127 are not characters; they are reported separately
//! (a final answer, a score) instead of being mangled into text.

use intcode_common::Program;
use intcode_vm::{Event, VmError, VM};
use tracing::debug;

/// Everything a machine printed between two input requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsciiOutput {
    /// Values in `0..=127`, as text.
    pub text: String,
    /// Values outside the ASCII range, in production order.
    pub values: Vec<i64>,
}

/// A VM driven with lines of text.
#[derive(Debug, Clone)]
pub struct AsciiMachine {
    vm: VM,
}

impl AsciiMachine {
    pub fn new(program: &Program) -> Self {
        Self {
            vm: VM::new(program),
        }
    }

    /// Queue `line` followed by a newline.
    pub fn send_line(&mut self, line: &str) {
        debug!(line, "sending line");
        self.vm
            .provide_inputs(line.bytes().map(i64::from).chain(std::iter::once(10)));
    }

    /// Run until the machine wants input it does not have, or halts.
    pub fn read_until_input(&mut self) -> Result<AsciiOutput, VmError> {
        let mut out = AsciiOutput::default();
        loop {
            match self.vm.run_until_output_or_halt()? {
                Event::Produced(value) => match u8::try_from(value) {
                    Ok(byte) if byte.is_ascii() => out.text.push(char::from(byte)),
                    _ => out.values.push(value),
                },
                Event::AwaitingInput | Event::Halted => return Ok(out),
            }
        }
    }

    pub fn is_halted(&self) -> bool {
        self.vm.is_halted()
    }

    pub fn vm(&self) -> &VM {
        &self.vm
    }

    /// Mutable access, for patching memory before the first read.
    pub fn vm_mut(&mut self) -> &mut VM {
        &mut self.vm
    }
}
