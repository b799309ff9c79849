use std::collections::VecDeque;

use serde::Serialize;

use crate::config::ConvergenceConfig;

/// Why a run was declared converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceReason {
    /// Energy moved less than the tolerance over the last `window` sweeps.
    EnergyPlateau,
    /// The sweep budget ran out first.
    MaxSweeps,
}

/// Sliding window of per-sweep energies.
///
/// A plateau is declared when `|E(n) - E(n - window)| < tolerance`. This is a
/// stop heuristic; it says nothing about reaching the global minimum.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    window: usize,
    tolerance: f64,
    max_sweeps: usize,
    history: VecDeque<f64>,
}

impl ConvergenceTracker {
    pub fn new(config: &ConvergenceConfig) -> Self {
        Self {
            window: config.window,
            tolerance: config.tolerance,
            max_sweeps: config.max_sweeps,
            history: VecDeque::with_capacity(config.window + 1),
        }
    }

    /// Record the energy after sweep number `sweeps_done` (1-based count).
    pub fn push(&mut self, sweeps_done: usize, energy: f64) -> Option<ConvergenceReason> {
        self.history.push_back(energy);
        if self.history.len() > self.window + 1 {
            self.history.pop_front();
        }

        if self.tolerance > 0.0 && self.history.len() == self.window + 1 {
            let oldest = self.history[0];
            if (energy - oldest).abs() < self.tolerance {
                return Some(ConvergenceReason::EnergyPlateau);
            }
        }
        (sweeps_done >= self.max_sweeps).then_some(ConvergenceReason::MaxSweeps)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(window: usize, tolerance: f64, max_sweeps: usize) -> ConvergenceTracker {
        ConvergenceTracker::new(&ConvergenceConfig {
            window,
            tolerance,
            max_sweeps,
        })
    }

    #[test]
    fn test_plateau_needs_full_window() {
        let mut t = tracker(3, 0.1, 100);
        assert_eq!(t.push(1, 5.0), None);
        assert_eq!(t.push(2, 5.0), None);
        assert_eq!(t.push(3, 5.0), None);
        assert_eq!(t.push(4, 5.0), Some(ConvergenceReason::EnergyPlateau));
    }

    #[test]
    fn test_moving_energy_is_not_converged() {
        let mut t = tracker(2, 0.5, 100);
        for n in 1..50 {
            assert_eq!(t.push(n, -(n as f64)), None);
        }
    }

    #[test]
    fn test_max_sweeps_and_disabled_plateau() {
        let mut t = tracker(1, 0.0, 3);
        assert_eq!(t.push(1, 1.0), None);
        assert_eq!(t.push(2, 1.0), None);
        assert_eq!(t.push(3, 1.0), Some(ConvergenceReason::MaxSweeps));
    }
}
