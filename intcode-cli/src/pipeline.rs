//! Amplifier pipelines: one VM per stage, each stage's output feeding the
//! next stage's input.
//!
//! Every stage is configured by a phase value, which is the first input it
//! ever receives. In serial mode the signal passes through each stage once.
//! In feedback mode the last stage's output loops back to the first stage
//! until the last stage halts.

use intcode_common::Program;
use intcode_vm::{Event, VmError, VM};
use thiserror::Error;
use tracing::debug;

/// Errors from driving a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("pipeline has no stages")]
    Empty,

    #[error("stage {stage}: {source}")]
    Stage {
        stage: usize,
        #[source]
        source: VmError,
    },

    /// A stage halted where a signal was expected.
    #[error("stage {stage} halted without producing a signal")]
    NoSignal { stage: usize },

    /// A stage asked for more than one input in a single pass.
    #[error("stage {stage} asked for more input than the pipeline provides")]
    Starved { stage: usize },
}

/// A chain of machines running the same program with different phases.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<VM>,
}

impl Pipeline {
    /// Build one stage per phase, each with its phase already queued.
    pub fn new(program: &Program, phases: &[i64]) -> Self {
        let stages = phases
            .iter()
            .map(|&phase| {
                let mut vm = VM::new(program);
                vm.provide_input(phase);
                vm
            })
            .collect();
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Pass `signal` through every stage once and return the final output.
    pub fn run_serial(&mut self, signal: i64) -> Result<i64, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::Empty);
        }
        let mut signal = signal;
        for stage in 0..self.stages.len() {
            signal = match self.pass(stage, signal)? {
                Some(value) => value,
                None => return Err(PipelineError::NoSignal { stage }),
            };
        }
        Ok(signal)
    }

    /// Loop signals around the pipeline until the last stage halts.
    ///
    /// Returns the last signal the final stage produced.
    pub fn run_feedback(&mut self, signal: i64) -> Result<i64, PipelineError> {
        let last = self.stages.len().checked_sub(1).ok_or(PipelineError::Empty)?;
        let mut signal = signal;
        let mut thruster = None;
        let mut round = 0usize;

        loop {
            for stage in 0..self.stages.len() {
                if let Some(value) = self.pass(stage, signal)? {
                    signal = value;
                    if stage == last {
                        thruster = Some(value);
                    }
                }
            }
            round += 1;

            if self.stages[last].is_halted() {
                debug!(rounds = round, "feedback loop settled");
                return thruster.ok_or(PipelineError::NoSignal { stage: last });
            }
        }
    }

    /// Feed one signal to `stage` and run it to its next output.
    ///
    /// `None` means the stage halted; a halted stage passes nothing on.
    fn pass(&mut self, stage: usize, signal: i64) -> Result<Option<i64>, PipelineError> {
        let vm = &mut self.stages[stage];
        if vm.is_halted() {
            return Ok(None);
        }
        vm.provide_input(signal);
        match vm
            .run_until_output_or_halt()
            .map_err(|source| PipelineError::Stage { stage, source })?
        {
            Event::Produced(value) => {
                debug!(stage, input = signal, output = value, "stage produced");
                Ok(Some(value))
            }
            Event::Halted => Ok(None),
            Event::AwaitingInput => Err(PipelineError::Starved { stage }),
        }
    }
}

/// Try every ordering of `phases` and return the one giving the largest signal.
pub fn best_phase_setting(
    program: &Program,
    phases: &[i64],
    feedback: bool,
) -> Result<(Vec<i64>, i64), PipelineError> {
    let mut best: Option<(Vec<i64>, i64)> = None;
    for order in permutations(phases) {
        let mut pipeline = Pipeline::new(program, &order);
        let signal = if feedback {
            pipeline.run_feedback(0)?
        } else {
            pipeline.run_serial(0)?
        };
        if best.as_ref().map_or(true, |(_, s)| signal > *s) {
            best = Some((order, signal));
        }
    }
    best.ok_or(PipelineError::Empty)
}

/// All orderings of `items`, in lexicographic order of positions.
fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut used = vec![false; items.len()];
    let mut current = Vec::with_capacity(items.len());
    permute(items, &mut used, &mut current, &mut out);
    out
}

fn permute(items: &[i64], used: &mut [bool], current: &mut Vec<i64>, out: &mut Vec<Vec<i64>>) {
    if current.len() == items.len() {
        out.push(current.clone());
        return;
    }
    for i in 0..items.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(items[i]);
        permute(items, used, current, out);
        current.pop();
        used[i] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial_program() -> Program {
        "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0"
            .parse()
            .unwrap()
    }

    fn feedback_program() -> Program {
        "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5"
            .parse()
            .unwrap()
    }

    #[test]
    fn serial_chain() {
        let mut pipeline = Pipeline::new(&serial_program(), &[4, 3, 2, 1, 0]);
        assert_eq!(pipeline.len(), 5);
        assert_eq!(pipeline.run_serial(0), Ok(43210));
    }

    #[test]
    fn feedback_loop() {
        let mut pipeline = Pipeline::new(&feedback_program(), &[9, 8, 7, 6, 5]);
        assert_eq!(pipeline.run_feedback(0), Ok(139629729));
    }

    #[test]
    fn search_finds_best_serial_order() {
        let (order, signal) = best_phase_setting(&serial_program(), &[0, 1, 2, 3, 4], false).unwrap();
        assert_eq!(order, vec![4, 3, 2, 1, 0]);
        assert_eq!(signal, 43210);
    }

    #[test]
    fn search_finds_best_feedback_order() {
        let (order, signal) =
            best_phase_setting(&feedback_program(), &[5, 6, 7, 8, 9], true).unwrap();
        assert_eq!(order, vec![9, 8, 7, 6, 5]);
        assert_eq!(signal, 139629729);
    }

    #[test]
    fn empty_pipeline() {
        let mut pipeline = Pipeline::new(&serial_program(), &[]);
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run_serial(0), Err(PipelineError::Empty));
        assert_eq!(pipeline.run_feedback(0), Err(PipelineError::Empty));
        assert_eq!(
            best_phase_setting(&serial_program(), &[], false),
            Err(PipelineError::Empty)
        );
    }

    #[test]
    fn stage_halting_silently_is_an_error() {
        let mut pipeline = Pipeline::new(&Program::new(vec![3, 0, 3, 0, 99]), &[1, 2]);
        assert_eq!(pipeline.run_serial(0), Err(PipelineError::NoSignal { stage: 0 }));
    }

    #[test]
    fn stage_wanting_extra_input_is_starved() {
        let mut pipeline = Pipeline::new(&Program::new(vec![3, 0, 3, 0, 3, 0, 4, 0, 99]), &[1]);
        assert_eq!(pipeline.run_serial(0), Err(PipelineError::Starved { stage: 0 }));
    }

    #[test]
    fn stage_fault_carries_stage_index() {
        let mut pipeline = Pipeline::new(&Program::new(vec![3, 0, 3, 0, 77]), &[1, 2]);
        let err = pipeline.run_serial(5).unwrap_err();
        assert!(matches!(err, PipelineError::Stage { stage: 0, .. }));
        assert_eq!(err.to_string(), "stage 0: unknown opcode 77 at address 4");
    }

    #[test]
    fn permutation_count() {
        assert_eq!(permutations(&[1, 2, 3]).len(), 6);
        assert_eq!(permutations(&[7]), vec![vec![7]]);
        assert!(permutations(&[]).is_empty());
    }
}
