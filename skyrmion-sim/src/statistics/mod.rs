pub mod convergence;
pub mod results;
mod stats;

pub use convergence::{ConvergenceReason, ConvergenceTracker};
pub use results::{EnsembleSummary, RunOutcome, RunSummary, SweepRecord};
pub use stats::Statistics;
