pub mod proposal;
pub mod schedule;
pub mod sweep;

pub use proposal::propose;
pub use schedule::Schedule;
pub use sweep::{metropolis_accept, metropolis_step, metropolis_sweep, StepOutcome, SweepTally};
