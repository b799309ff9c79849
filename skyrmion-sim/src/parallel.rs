use rayon::prelude::*;

use crate::simulation::MonteCarloEngine;

/// Dispatch a per-engine closure over independent engines, optionally in parallel.
///
/// Engines own their lattice and generator, so each task touches disjoint
/// state. Results come back in engine order.
///
/// When `sequential` is true, engines are processed on the current thread
/// (no rayon overhead, best when an outer level already saturates the cores).
pub fn par_over_engines<T: Send>(
    engines: &mut [MonteCarloEngine],
    sequential: bool,
    body: impl Fn(&mut MonteCarloEngine) -> T + Send + Sync,
) -> Vec<T> {
    if sequential || engines.len() == 1 {
        engines.iter_mut().map(body).collect()
    } else {
        engines.par_iter_mut().map(body).collect()
    }
}
