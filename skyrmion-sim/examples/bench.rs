use std::sync::atomic::AtomicBool;
use std::time::Instant;

use skyrmion_sim::config::*;
use skyrmion_sim::{
    build_ensemble, run_ensemble, EnergyCoefficients, InitialState, Schedule, Vec3,
};

const L: usize = 64;
const N_SWEEPS: usize = 200;
const N_RUNS: usize = 16;

fn main() {
    let lattice = LatticeConfig::periodic(L, L);
    let coeffs = EnergyCoefficients {
        exchange: 1.0,
        dmi: 1.0,
        field: Vec3::new(0.0, 0.0, 0.4),
        ..EnergyCoefficients::default()
    };
    let config = SimConfig {
        schedule: Schedule::geometric_between(2.0, 0.05, N_SWEEPS),
        convergence: ConvergenceConfig {
            window: 1,
            tolerance: 0.0,
            max_sweeps: N_SWEEPS,
        },
        ..SimConfig::default()
    };

    let mut engines = build_ensemble(
        &lattice,
        &InitialState::Random { seed: 42 },
        coeffs,
        &config,
        N_RUNS,
    )
    .unwrap();

    println!(
        "Lattice: {}x{}  |  Sweeps: {}  |  Runs: {}",
        L, L, N_SWEEPS, N_RUNS
    );
    println!("Config: J=1, D=1, Bz=0.4, small-angle proposal, geometric 2.0 -> 0.05");
    println!("{}", "-".repeat(70));

    let interrupted = AtomicBool::new(false);
    let t0 = Instant::now();
    let (_, summary) = run_ensemble(&mut engines, &interrupted, false, &|_| {});
    let elapsed = t0.elapsed().as_secs_f64();

    let per_sweep = elapsed / N_SWEEPS as f64 * 1000.0;
    let flips = (L * L * N_SWEEPS * N_RUNS) as f64 / elapsed / 1e6;
    println!("Total: {:.3} s  |  {:.3} ms/sweep  |  {:.1} M proposals/s", elapsed, per_sweep, flips);
    println!(
        "E = {:.3} +- {:.3}  |  <|Q|> = {:.3}",
        summary.energy_mean,
        summary.energy_variance.sqrt(),
        summary.abs_charge_mean
    );
}
