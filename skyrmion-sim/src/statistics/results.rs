use serde::Serialize;

use super::convergence::ConvergenceReason;
use super::stats::Statistics;
use crate::spins::EnergyTerms;

/// One line of the per-sweep diagnostics trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRecord {
    /// Sweeps completed, 1-based.
    pub sweep: usize,
    pub temperature: f64,
    /// Total energy after the sweep.
    pub energy: f64,
    pub acceptance_rate: f64,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Converged(ConvergenceReason),
    Stopped,
    /// Summary taken before the run ended.
    InProgress,
}

/// End-of-run observables for one engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub sweeps: usize,
    pub steps: u64,
    pub temperature: f64,
    pub energy: f64,
    pub energy_terms: EnergyTerms,
    /// Lattice-averaged spin.
    pub magnetization: [f64; 3],
    /// Accepted / proposed over the whole run.
    pub acceptance_rate: f64,
    /// `None` when the lattice is too small to hold a plaquette.
    pub topological_charge: Option<f64>,
    /// Empty unless the trace was enabled.
    pub trace: Vec<SweepRecord>,
}

/// Mean and spread of [`RunSummary`] observables over independent runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub n_runs: usize,
    pub n_converged: usize,
    pub energy_mean: f64,
    pub energy_variance: f64,
    pub acceptance_mean: f64,
    /// Averaged over runs that report a charge; zero if none do.
    pub charge_mean: f64,
    pub charge_variance: f64,
    /// Mean of `|Q|`; distinguishes `+1/-1` mixtures from zero charge.
    pub abs_charge_mean: f64,
}

impl EnsembleSummary {
    /// Average [`RunSummary`]s across independent runs.
    pub fn aggregate(results: &[RunSummary]) -> Self {
        let energy: Statistics = results.iter().map(|r| r.energy).collect();
        let acceptance: Statistics = results.iter().map(|r| r.acceptance_rate).collect();
        let charge: Statistics = results.iter().filter_map(|r| r.topological_charge).collect();
        let abs_charge: Statistics = results
            .iter()
            .filter_map(|r| r.topological_charge.map(f64::abs))
            .collect();

        Self {
            n_runs: results.len(),
            n_converged: results
                .iter()
                .filter(|r| matches!(r.outcome, RunOutcome::Converged(_)))
                .count(),
            energy_mean: energy.mean(),
            energy_variance: energy.variance(),
            acceptance_mean: acceptance.mean(),
            charge_mean: charge.mean(),
            charge_variance: charge.variance(),
            abs_charge_mean: abs_charge.mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(energy: f64, charge: Option<f64>, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            sweeps: 10,
            steps: 1000,
            temperature: 0.1,
            energy,
            energy_terms: EnergyTerms::default(),
            magnetization: [0.0, 0.0, 1.0],
            acceptance_rate: 0.5,
            topological_charge: charge,
            trace: vec![],
        }
    }

    #[test]
    fn test_aggregate() {
        let runs = [
            summary(-10.0, Some(1.0), RunOutcome::Converged(ConvergenceReason::MaxSweeps)),
            summary(-12.0, Some(-1.0), RunOutcome::Stopped),
            summary(-14.0, None, RunOutcome::Converged(ConvergenceReason::EnergyPlateau)),
        ];
        let agg = EnsembleSummary::aggregate(&runs);
        assert_eq!(agg.n_runs, 3);
        assert_eq!(agg.n_converged, 2);
        assert!((agg.energy_mean + 12.0).abs() < 1e-12);
        assert!((agg.energy_variance - 4.0).abs() < 1e-12);
        assert_eq!(agg.charge_mean, 0.0);
        assert_eq!(agg.abs_charge_mean, 1.0);
        assert!((agg.acceptance_mean - 0.5).abs() < 1e-12);
    }
}
