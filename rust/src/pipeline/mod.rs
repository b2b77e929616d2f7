//! Hash pipeline core: the closed step catalog, the sequential evaluator, and
//! the avalanche comparison built on top of it. Callers own their `Pipeline`
//! values; nothing in this module keeps process-wide mutable state.

pub mod avalanche;
pub mod catalog;
pub mod evaluator;
pub mod presets;
pub mod state;

pub use avalanche::{avalanche_report, avalanche_survey, AvalancheRow, SurveySummary};
pub use catalog::{catalog, Step, StepInfo};
pub use evaluator::{evaluate, Pipeline, PipelineError, RunResult, TraceEntry};
pub use state::{HashState, StepResult};
