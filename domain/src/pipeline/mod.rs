//! Pipeline run records

pub mod entities;
pub mod output;

pub use entities::{PhaseRecord, PipelineRun};
pub use output::{Extraction, PhaseOutput, ResponseShape};
