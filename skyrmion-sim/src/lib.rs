//! Classical Heisenberg spins on a 2D square lattice with exchange,
//! Dzyaloshinskii–Moriya, Zeeman and uniaxial anisotropy energies.
//!
//! [`MonteCarloEngine`] anneals a [`Lattice`] with single-site Metropolis
//! updates; [`topology::topological_charge`] measures the skyrmion number of
//! the result. Independent runs can be spread over threads with
//! [`simulation::run_parallel`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod simulation;
pub mod spins;
pub mod statistics;
pub mod topology;

mod parallel;

pub use config::{
    Boundary, Chirality, ConvergenceConfig, LatticeConfig, Proposal, SimConfig, Topology,
};
pub use error::{Result, SimError};
pub use geometry::{InitialState, Lattice, Neighbor, SkyrmionSeed, Snapshot};
pub use mcmc::{Schedule, StepOutcome};
pub use simulation::{
    build_ensemble, run_ensemble, run_parallel, EngineState, MonteCarloEngine,
};
pub use spins::{EnergyCoefficients, EnergyModel, EnergyTerms, Vec3};
pub use statistics::{
    ConvergenceReason, EnsembleSummary, RunOutcome, RunSummary, SweepRecord,
};
pub use topology::{analyze, topological_charge, OrderParameterResult};
