use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::Serialize;
use tracing::{debug, info, trace, warn};
use validator::Validate;

use crate::config::SimConfig;
use crate::error::Result;
use crate::geometry::{InitialState, Lattice, Snapshot};
use crate::mcmc::{metropolis_step, metropolis_sweep, StepOutcome, SweepTally};
use crate::spins::{EnergyCoefficients, EnergyModel};
use crate::statistics::{
    ConvergenceReason, ConvergenceTracker, RunOutcome, RunSummary, SweepRecord,
};
use crate::topology;

/// Relative cache drift above which a resync is reported.
const DRIFT_WARN: f64 = 1e-8;

/// Lifecycle of a [`MonteCarloEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Initialized,
    Running,
    Converged(ConvergenceReason),
    Stopped,
}

/// Mutable per-run bookkeeping. Reset only when a new run starts.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Temperature of the current (or next) sweep.
    pub temperature: f64,
    /// Completed sweeps.
    pub sweep: usize,
    /// Single-site proposals made.
    pub steps: u64,
    pub accepted: u64,
    /// Running total energy, updated by accepted deltas.
    pub energy: f64,
    /// Next site of the current sweep; zero at a sweep boundary.
    cursor: usize,
    /// Tally of the sweep in progress.
    tally: SweepTally,
    rng: Xoshiro256StarStar,
}

impl SimulationState {
    fn new(config: &SimConfig, energy: f64) -> Self {
        Self {
            temperature: config
                .schedule
                .temperature_with_reheat(0, config.reheat_interval),
            sweep: 0,
            steps: 0,
            accepted: 0,
            energy,
            cursor: 0,
            tally: SweepTally::default(),
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
        }
    }

    pub fn at_sweep_boundary(&self) -> bool {
        self.cursor == 0
    }
}

/// Metropolis Monte Carlo driver for one lattice.
///
/// Sites are visited in raster order (`i` fastest, then `j`); one sweep is
/// `width * height` proposals. The temperature is taken from the schedule at
/// the start of each sweep and held for the whole sweep. All randomness comes
/// from one [`Xoshiro256StarStar`] seeded from [`SimConfig::seed`], so a given
/// configuration and initial lattice always produce the same trajectory.
///
/// The engine is the only writer of its lattice. Independent engines share
/// nothing and can run on different threads (see [`run_parallel`](super::run_parallel)).
#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    lattice: Lattice,
    model: EnergyModel,
    config: SimConfig,
    sim: SimulationState,
    status: EngineState,
    convergence: ConvergenceTracker,
    trace: Vec<SweepRecord>,
}

impl MonteCarloEngine {
    /// Take ownership of `lattice` and validate everything before any sweep.
    pub fn new(lattice: Lattice, coeffs: EnergyCoefficients, config: SimConfig) -> Result<Self> {
        config.validate()?;
        let model = EnergyModel::new(coeffs)?;
        let energy = model.total_energy(&lattice);
        let sim = SimulationState::new(&config, energy);
        let convergence = ConvergenceTracker::new(&config.convergence);
        Ok(Self {
            lattice,
            model,
            config,
            sim,
            status: EngineState::Initialized,
            convergence,
            trace: Vec::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        self.status
    }

    pub fn simulation_state(&self) -> &SimulationState {
        &self.sim
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn model(&self) -> &EnergyModel {
        &self.model
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn temperature(&self) -> f64 {
        self.sim.temperature
    }

    /// Cached total energy (kept in sync by accepted deltas and periodic resyncs).
    pub fn energy(&self) -> f64 {
        self.sim.energy
    }

    pub fn trace(&self) -> &[SweepRecord] {
        &self.trace
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lattice.snapshot()
    }

    fn is_finished(&self) -> bool {
        matches!(
            self.status,
            EngineState::Converged(_) | EngineState::Stopped
        )
    }

    /// Enter `Running` and pick up the temperature of a new sweep.
    fn begin(&mut self) {
        if self.status == EngineState::Initialized {
            debug!(
                width = self.lattice.width,
                height = self.lattice.height,
                seed = self.config.seed,
                energy = self.sim.energy,
                "starting Monte Carlo run"
            );
            self.status = EngineState::Running;
        }
        if self.sim.at_sweep_boundary() {
            self.sim.temperature = self
                .config
                .schedule
                .temperature_with_reheat(self.sim.sweep, self.config.reheat_interval);
        }
    }

    #[inline]
    fn kt(&self) -> f64 {
        self.config.boltzmann * self.sim.temperature
    }

    /// One proposal at the next site of the raster sweep.
    ///
    /// Returns `None` once the run has converged or been stopped.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if self.is_finished() {
            return None;
        }
        self.begin();

        let kt = self.kt();
        let site = self.sim.cursor;
        let outcome = metropolis_step(
            &mut self.lattice,
            &self.model,
            self.config.proposal,
            kt,
            site,
            &mut self.sim.rng,
        );
        self.sim.tally.record(&outcome);
        self.sim.cursor += 1;
        if self.sim.cursor == self.lattice.n_sites {
            self.finish_sweep();
        }
        Some(outcome)
    }

    /// Complete the current sweep (a full one at a sweep boundary).
    ///
    /// Returns `None` once the run has converged or been stopped.
    pub fn sweep(&mut self) -> Option<SweepRecord> {
        if self.is_finished() {
            return None;
        }
        self.begin();

        let kt = self.kt();
        let remaining = self.sim.cursor..self.lattice.n_sites;
        let tally = metropolis_sweep(
            &mut self.lattice,
            &self.model,
            self.config.proposal,
            kt,
            remaining,
            &mut self.sim.rng,
        );
        self.sim.tally.proposed += tally.proposed;
        self.sim.tally.accepted += tally.accepted;
        self.sim.tally.delta_energy += tally.delta_energy;
        Some(self.finish_sweep())
    }

    fn finish_sweep(&mut self) -> SweepRecord {
        let tally = std::mem::take(&mut self.sim.tally);
        self.sim.cursor = 0;
        self.sim.sweep += 1;
        self.sim.steps += tally.proposed as u64;
        self.sim.accepted += tally.accepted as u64;
        self.sim.energy += tally.delta_energy;

        debug_assert!(
            self.lattice.max_norm_error() < 1e-9,
            "spin left the unit sphere"
        );

        if self
            .config
            .resync_interval
            .is_some_and(|k| self.sim.sweep % k == 0)
        {
            self.resync_energy();
        }

        let record = SweepRecord {
            sweep: self.sim.sweep,
            temperature: self.sim.temperature,
            energy: self.sim.energy,
            acceptance_rate: tally.acceptance_rate(),
        };
        trace!(
            sweep = record.sweep,
            temperature = record.temperature,
            energy = record.energy,
            acceptance = record.acceptance_rate,
            "sweep"
        );
        if self.config.record_trace {
            self.trace.push(record);
        }

        if let Some(reason) = self.convergence.push(self.sim.sweep, self.sim.energy) {
            info!(
                sweep = self.sim.sweep,
                energy = self.sim.energy,
                ?reason,
                "run converged"
            );
            self.status = EngineState::Converged(reason);
        }
        record
    }

    /// Replace the cached energy with a from-scratch evaluation.
    fn resync_energy(&mut self) {
        let exact = self.model.total_energy(&self.lattice);
        let drift = exact - self.sim.energy;
        if drift.abs() > DRIFT_WARN * exact.abs().max(1.0) {
            warn!(sweep = self.sim.sweep, drift, "energy cache drifted");
        }
        self.sim.energy = exact;
    }

    /// Stop the run at a sweep boundary, finishing a partial sweep first.
    pub fn stop(&mut self) {
        if self.status == EngineState::Stopped {
            return;
        }
        if self.status == EngineState::Running && !self.sim.at_sweep_boundary() {
            self.sweep();
        }
        info!(sweep = self.sim.sweep, energy = self.sim.energy, "run stopped");
        self.status = EngineState::Stopped;
    }

    /// Sweep until converged, or until `interrupted` is observed at a sweep
    /// boundary (the run is then stopped). `on_sweep` is called after every
    /// completed sweep (useful for progress bars).
    pub fn run(
        &mut self,
        interrupted: &AtomicBool,
        on_sweep: &(dyn Fn(&SweepRecord) + Sync),
    ) -> RunSummary {
        while !self.is_finished() {
            if interrupted.load(Ordering::Relaxed) && self.sim.at_sweep_boundary() {
                self.stop();
                break;
            }
            if let Some(record) = self.sweep() {
                on_sweep(&record);
            }
        }
        self.summary()
    }

    /// [`run`](Self::run) without an interrupt flag or callback.
    pub fn run_to_completion(&mut self) -> RunSummary {
        self.run(&AtomicBool::new(false), &|_| {})
    }

    /// Re-fill the lattice from `init` and rewind to `Initialized` with a
    /// freshly seeded generator.
    pub fn reset(&mut self, init: &InitialState) -> Result<()> {
        self.lattice.initialize(init)?;
        let energy = self.model.total_energy(&self.lattice);
        self.sim = SimulationState::new(&self.config, energy);
        self.convergence.clear();
        self.trace.clear();
        self.status = EngineState::Initialized;
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        let outcome = match self.status {
            EngineState::Converged(reason) => RunOutcome::Converged(reason),
            EngineState::Stopped => RunOutcome::Stopped,
            EngineState::Initialized | EngineState::Running => RunOutcome::InProgress,
        };
        let energy_terms = self.model.energy_terms(&self.lattice);
        let acceptance_rate = if self.sim.steps == 0 {
            0.0
        } else {
            self.sim.accepted as f64 / self.sim.steps as f64
        };
        RunSummary {
            outcome,
            sweeps: self.sim.sweep,
            steps: self.sim.steps,
            temperature: self.sim.temperature,
            energy: energy_terms.total(),
            energy_terms,
            magnetization: self.lattice.mean_magnetization().to_array(),
            acceptance_rate,
            topological_charge: topology::topological_charge(&self.lattice).ok(),
            trace: self.trace.clone(),
        }
    }
}
