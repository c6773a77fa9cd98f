//! Collaborators that drive the Intcode VM through its cooperative I/O
//! surface.
//!
//! - [`ascii`] — line-oriented text sessions
//! - [`pipeline`] — chains of machines passing signals stage to stage

pub mod ascii;
pub mod pipeline;

pub use ascii::{AsciiMachine, AsciiOutput};
pub use pipeline::{best_phase_setting, Pipeline, PipelineError};
