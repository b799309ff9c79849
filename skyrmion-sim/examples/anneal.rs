use std::sync::atomic::AtomicBool;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use skyrmion_sim::config::*;
use skyrmion_sim::{
    topology, EnergyCoefficients, InitialState, Lattice, MonteCarloEngine, Schedule, Vec3,
};

const L: usize = 32;
const N_SWEEPS: usize = 3000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let lattice = Lattice::new(
        &LatticeConfig::periodic(L, L),
        &InitialState::Random { seed: 7 },
    )
    .unwrap();
    let coeffs = EnergyCoefficients {
        exchange: 1.0,
        dmi: 1.0,
        field: Vec3::new(0.0, 0.0, 0.5),
        ..EnergyCoefficients::default()
    };
    let config = SimConfig {
        schedule: Schedule::geometric_between(2.0, 0.01, N_SWEEPS),
        convergence: ConvergenceConfig {
            window: 200,
            tolerance: 1e-4,
            max_sweeps: N_SWEEPS,
        },
        ..SimConfig::default()
    };
    let mut engine = MonteCarloEngine::new(lattice, coeffs, config).unwrap();

    let pb = ProgressBar::new(N_SWEEPS as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    pb.set_message("sweeps");

    let summary = engine.run(&AtomicBool::new(false), &|_| pb.inc(1));
    pb.finish();

    println!("{:?} after {} sweeps", summary.outcome, summary.sweeps);
    println!(
        "E = {:.4}  (exchange {:.4}, dmi {:.4}, zeeman {:.4}, anisotropy {:.4})",
        summary.energy,
        summary.energy_terms.exchange,
        summary.energy_terms.dmi,
        summary.energy_terms.zeeman,
        summary.energy_terms.anisotropy
    );
    println!("acceptance = {:.3}", summary.acceptance_rate);

    let order = topology::analyze(engine.lattice(), true).unwrap();
    println!("Q = {:.4}", order.charge);
    if let Some(density) = order.density {
        for j in (0..L).rev() {
            let row: String = (0..L)
                .map(|i| {
                    let q = density[j * L + i];
                    if q > 0.02 {
                        '+'
                    } else if q < -0.02 {
                        '-'
                    } else if engine.lattice().spin(j * L + i).z < 0.0 {
                        'o'
                    } else {
                        '.'
                    }
                })
                .collect();
            println!("{row}");
        }
    }
}
