//! CLI command implementations.
//!
//! Each command reports its own errors on stderr and returns the exit code
//! to use on failure.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use intcode_cli::{best_phase_setting, AsciiMachine, Pipeline};
use intcode_common::Program;
use intcode_vm::VM;
use tracing::{debug, info};

/// Exit code for unreadable or malformed input.
const EXIT_INPUT: i32 = 1;
/// Exit code for a VM fault.
const EXIT_RUNTIME: i32 = 3;

/// Run a program to completion with fixed inputs and memory patches.
pub fn run(
    path: &Path,
    inputs: &[i64],
    patches: &[(usize, i64)],
    dumps: &[usize],
) -> Result<(), i32> {
    let program = read_program(path)?;
    let mut vm = VM::new(&program);
    apply_patches(&mut vm, patches)?;
    vm.provide_inputs(inputs.iter().copied());

    let outputs = vm.run().map_err(|e| {
        eprintln!("runtime error: {e}");
        EXIT_RUNTIME
    })?;
    info!(outputs = outputs.len(), "program halted");

    for value in outputs {
        println!("{value}");
    }
    for &address in dumps {
        println!("{address}={}", vm.peek(address));
    }
    Ok(())
}

/// Drive an ASCII program with lines from a script file or stdin.
pub fn ascii(
    path: &Path,
    script: Option<&PathBuf>,
    patches: &[(usize, i64)],
) -> Result<(), i32> {
    let program = read_program(path)?;
    let mut machine = AsciiMachine::new(&program);
    apply_patches(machine.vm_mut(), patches)?;

    let reader: Box<dyn BufRead> = match script {
        Some(script) => {
            let file = fs::File::open(script).map_err(|e| {
                eprintln!("error: cannot read '{}': {e}", script.display());
                EXIT_INPUT
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut lines = reader.lines();
    let mut stdout = io::stdout();

    loop {
        let out = machine.read_until_input().map_err(|e| {
            eprintln!("runtime error: {e}");
            EXIT_RUNTIME
        })?;
        print!("{}", out.text);
        if !out.text.is_empty() && !out.text.ends_with('\n') && !out.values.is_empty() {
            println!();
        }
        for value in &out.values {
            println!("{value}");
        }
        stdout.flush().map_err(|e| {
            eprintln!("error: cannot write output: {e}");
            EXIT_INPUT
        })?;

        if machine.is_halted() {
            return Ok(());
        }

        match lines.next() {
            Some(Ok(line)) => machine.send_line(&line),
            Some(Err(e)) => {
                eprintln!("error: cannot read input: {e}");
                return Err(EXIT_INPUT);
            }
            None => {
                eprintln!("runtime error: program wants input but none is left");
                return Err(EXIT_RUNTIME);
            }
        }
    }
}

/// Run an amplifier pipeline, or search for its best phase ordering.
pub fn chain(path: &Path, phases: &[i64], feedback: bool, search: bool) -> Result<(), i32> {
    let program = read_program(path)?;

    if search {
        let (order, signal) = best_phase_setting(&program, phases, feedback).map_err(|e| {
            eprintln!("runtime error: {e}");
            EXIT_RUNTIME
        })?;
        let order: Vec<String> = order.iter().map(i64::to_string).collect();
        println!("{} -> {signal}", order.join(","));
        return Ok(());
    }

    let mut pipeline = Pipeline::new(&program, phases);
    let result = if feedback {
        pipeline.run_feedback(0)
    } else {
        pipeline.run_serial(0)
    };
    let signal = result.map_err(|e| {
        eprintln!("runtime error: {e}");
        EXIT_RUNTIME
    })?;
    println!("{signal}");
    Ok(())
}

// --- Helpers ---

/// Read and parse a comma-separated program file.
fn read_program(path: &Path) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        EXIT_INPUT
    })?;

    let program = Program::parse(&text).map_err(|e| {
        eprintln!("error: invalid program '{}': {e}", path.display());
        EXIT_INPUT
    })?;
    debug!(cells = program.len(), path = %path.display(), "loaded program");
    Ok(program)
}

/// Overwrite memory cells before the first instruction runs.
fn apply_patches(vm: &mut VM, patches: &[(usize, i64)]) -> Result<(), i32> {
    for &(address, value) in patches {
        debug!(address, value, "patching memory");
        vm.poke(address, value).map_err(|e| {
            eprintln!("error: cannot patch address {address}: {e}");
            EXIT_INPUT
        })?;
    }
    Ok(())
}

/// Parse an `ADDR=VALUE` memory patch.
pub fn parse_patch(s: &str) -> Result<(usize, i64), String> {
    let (address, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got '{s}'"))?;
    let address = address
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid address '{address}': {e}"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid value '{value}': {e}"))?;
    Ok((address, value))
}
