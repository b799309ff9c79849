use std::ops::Range;

use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

use super::proposal::propose;
use crate::config::Proposal;
use crate::geometry::Lattice;
use crate::spins::EnergyModel;

/// Result of one single-site Metropolis update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub site: usize,
    /// Energy change of the proposal (committed only if `accepted`).
    pub delta: f64,
    pub accepted: bool,
}

/// Accepted-move bookkeeping for a run of single-site updates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepTally {
    pub proposed: usize,
    pub accepted: usize,
    /// Sum of `delta` over accepted moves.
    pub delta_energy: f64,
}

impl SweepTally {
    #[inline]
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.proposed += 1;
        if outcome.accepted {
            self.accepted += 1;
            self.delta_energy += outcome.delta;
        }
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.proposed as f64
    }
}

/// Metropolis rule: downhill moves always pass; uphill moves pass with
/// probability `exp(-delta / kt)`, tested against one uniform draw in `[0, 1)`.
/// At `kt == 0` uphill moves are rejected without consuming a draw.
#[inline]
pub fn metropolis_accept(delta: f64, kt: f64, rng: &mut Xoshiro256StarStar) -> bool {
    if delta <= 0.0 {
        return true;
    }
    if kt <= 0.0 {
        return false;
    }
    rng.gen::<f64>() < (-delta / kt).exp()
}

/// Propose, evaluate and (maybe) commit a new spin at `site`.
#[inline]
pub fn metropolis_step(
    lattice: &mut Lattice,
    model: &EnergyModel,
    proposal: Proposal,
    kt: f64,
    site: usize,
    rng: &mut Xoshiro256StarStar,
) -> StepOutcome {
    let proposed = propose(proposal, lattice.spin(site), rng);
    let delta = model.delta_energy(lattice, site, proposed);
    let accepted = metropolis_accept(delta, kt, rng);
    if accepted {
        lattice.commit(site, proposed);
    }
    StepOutcome {
        site,
        delta,
        accepted,
    }
}

/// Raster-order Metropolis pass over the flat sites in `sites`.
///
/// A full sweep is `0..lattice.n_sites`: `i` fastest, then `j`.
#[cfg_attr(feature = "profile", inline(never))]
pub fn metropolis_sweep(
    lattice: &mut Lattice,
    model: &EnergyModel,
    proposal: Proposal,
    kt: f64,
    sites: Range<usize>,
    rng: &mut Xoshiro256StarStar,
) -> SweepTally {
    let mut tally = SweepTally::default();
    for site in sites {
        let outcome = metropolis_step(lattice, model, proposal, kt, site, rng);
        tally.record(&outcome);
    }
    tally
}
