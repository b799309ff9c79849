pub mod engine;

pub use engine::{EngineState, MonteCarloEngine, SimulationState};

use std::sync::atomic::AtomicBool;

use validator::Validate;

use crate::config::{LatticeConfig, SimConfig};
use crate::error::Result;
use crate::geometry::{InitialState, Lattice};
use crate::parallel::par_over_engines;
use crate::spins::EnergyCoefficients;
use crate::statistics::{EnsembleSummary, RunSummary, SweepRecord};

/// Build `n_runs` independent engines for the same physical system.
///
/// Run `r` uses generator seed `config.seed + r`; a [`InitialState::Random`]
/// start is reseeded the same way so every run begins from its own texture.
pub fn build_ensemble(
    lattice_config: &LatticeConfig,
    init: &InitialState,
    coeffs: EnergyCoefficients,
    config: &SimConfig,
    n_runs: usize,
) -> Result<Vec<MonteCarloEngine>> {
    lattice_config.validate()?;
    config.validate()?;
    (0..n_runs as u64)
        .map(|r| {
            let init = match init {
                InitialState::Random { seed } => InitialState::Random {
                    seed: seed.wrapping_add(r),
                },
                other => other.clone(),
            };
            let config = SimConfig {
                seed: config.seed.wrapping_add(r),
                ..config.clone()
            };
            let lattice = Lattice::new(lattice_config, &init)?;
            MonteCarloEngine::new(lattice, coeffs, config)
        })
        .collect()
}

/// Run every engine to completion, in parallel unless `sequential`.
///
/// `interrupted` is shared: once set, each engine stops at its next sweep
/// boundary. `on_sweep` is called from worker threads after every sweep of
/// every engine. Summaries come back in engine order; average them with
/// [`EnsembleSummary::aggregate`] (or use [`run_ensemble`]).
pub fn run_parallel(
    engines: &mut [MonteCarloEngine],
    interrupted: &AtomicBool,
    sequential: bool,
    on_sweep: &(dyn Fn(&SweepRecord) + Sync),
) -> Vec<RunSummary> {
    par_over_engines(engines, sequential, |engine| {
        engine.run(interrupted, on_sweep)
    })
}

/// [`run_parallel`] followed by [`EnsembleSummary::aggregate`].
pub fn run_ensemble(
    engines: &mut [MonteCarloEngine],
    interrupted: &AtomicBool,
    sequential: bool,
    on_sweep: &(dyn Fn(&SweepRecord) + Sync),
) -> (Vec<RunSummary>, EnsembleSummary) {
    let runs = run_parallel(engines, interrupted, sequential, on_sweep);
    let summary = EnsembleSummary::aggregate(&runs);
    (runs, summary)
}
