// tests/scenarios.rs
//
// End-to-end annealing scenarios.
// Run only these with: cargo test --test scenarios

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use skyrmion_sim::config::{ConvergenceConfig, LatticeConfig, Proposal, SimConfig};
use skyrmion_sim::topology::{analyze, integer_distance, topological_charge};
use skyrmion_sim::{
    EnergyCoefficients, InitialState, Lattice, MonteCarloEngine, RunOutcome, Schedule, Vec3,
};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Largest single-plaquette charge and the summed `|q|` over all plaquettes.
fn density_profile(lattice: &Lattice) -> (f64, f64) {
    let density = analyze(lattice, true).unwrap().density.unwrap();
    let max = density.iter().fold(0.0f64, |m, q| m.max(q.abs()));
    let total = density.iter().map(|q| q.abs()).sum();
    (max, total)
}

fn fixed_sweeps(schedule: Schedule, sweeps: usize) -> SimConfig {
    SimConfig {
        schedule,
        convergence: ConvergenceConfig {
            window: 1,
            tolerance: 0.0,
            max_sweeps: sweeps,
        },
        record_trace: true,
        ..SimConfig::default()
    }
}

fn skyrmion_coefficients() -> EnergyCoefficients {
    EnergyCoefficients {
        exchange: 1.0,
        dmi: 1.0,
        field: Vec3::new(0.0, 0.0, 0.4),
        ..EnergyCoefficients::default()
    }
}

fn engine(
    lattice: LatticeConfig,
    init: InitialState,
    coeffs: EnergyCoefficients,
    config: SimConfig,
) -> MonteCarloEngine {
    let lattice = Lattice::new(&lattice, &init).unwrap();
    MonteCarloEngine::new(lattice, coeffs, config).unwrap()
}

#[test]
fn ferromagnet_at_zero_temperature_stays_put() {
    // Aligned spins are the ground state: every trial costs exchange energy.
    let mut e = engine(
        LatticeConfig::periodic(10, 10),
        InitialState::Uniform(Vec3::Z),
        EnergyCoefficients::default(),
        fixed_sweeps(Schedule::Constant { temperature: 0.0 }, 50),
    );
    let e0 = e.energy();
    assert!(approx_eq(e0, -200.0, 1e-9));

    e.run_to_completion();
    for s in e.lattice().spins() {
        assert!(approx_eq(s.z, 1.0, 1e-12), "spin drifted to {s:?}");
    }
    assert!(approx_eq(e.model().total_energy(e.lattice()), e0, 1e-9));
}

#[test]
fn same_seed_gives_identical_trajectories() {
    let build = || {
        engine(
            LatticeConfig::periodic(12, 12),
            InitialState::Random { seed: 3 },
            skyrmion_coefficients(),
            fixed_sweeps(Schedule::geometric_between(1.5, 0.1, 40), 40),
        )
    };
    let mut a = build();
    let mut b = build();
    let sa = a.run_to_completion();
    let sb = b.run_to_completion();
    assert_eq!(sa.trace, sb.trace);
    assert_eq!(a.lattice().spins(), b.lattice().spins());

    let other = SimConfig {
        seed: 43,
        ..a.config().clone()
    };
    let mut c = engine(
        LatticeConfig::periodic(12, 12),
        InitialState::Random { seed: 3 },
        skyrmion_coefficients(),
        other,
    );
    let sc = c.run_to_completion();
    assert_ne!(sa.trace, sc.trace);
}

#[test]
fn zero_temperature_only_goes_downhill() {
    let mut e = engine(
        LatticeConfig::open(9, 7),
        InitialState::Random { seed: 5 },
        skyrmion_coefficients(),
        fixed_sweeps(Schedule::Constant { temperature: 0.0 }, 20),
    );
    while let Some(outcome) = e.step() {
        if outcome.accepted {
            assert!(outcome.delta <= 0.0, "accepted uphill move {outcome:?}");
        }
    }
    let energies: Vec<f64> = e.trace().iter().map(|r| r.energy).collect();
    assert_eq!(energies.len(), 20);
    for w in energies.windows(2) {
        assert!(w[1] <= w[0] + 1e-9, "energy rose from {} to {}", w[0], w[1]);
    }
}

#[test]
fn spins_stay_on_the_unit_sphere() {
    for proposal in [Proposal::Global, Proposal::SmallAngle { step: 0.9 }] {
        let config = SimConfig {
            proposal,
            ..fixed_sweeps(Schedule::Constant { temperature: 5.0 }, 30)
        };
        let mut e = engine(
            LatticeConfig::periodic(8, 8),
            InitialState::Random { seed: 9 },
            skyrmion_coefficients(),
            config,
        );
        e.run_to_completion();
        assert!(e.lattice().max_norm_error() < 1e-12);
    }
}

#[test]
fn annealing_with_dmi_orders_the_texture() {
    let config = fixed_sweeps(Schedule::geometric_between(2.0, 0.01, 2000), 2000);
    let mut e = engine(
        LatticeConfig::periodic(20, 20),
        InitialState::Random { seed: 42 },
        skyrmion_coefficients(),
        config,
    );
    let q0 = topological_charge(e.lattice()).unwrap();
    let (max0, activity0) = density_profile(e.lattice());
    let e0 = e.energy();

    let summary = e.run_to_completion();
    assert_eq!(summary.sweeps, 2000);
    assert!(approx_eq(summary.temperature, 0.01, 1e-9));

    // A random start sits near zero energy; the annealed texture is well below.
    assert!(summary.energy < e0 - 400.0, "E: {e0} -> {}", summary.energy);
    assert!(approx_eq(
        summary.energy_terms.total(),
        e.model().total_energy(e.lattice()),
        1e-9
    ));

    let q = summary.topological_charge.unwrap();
    assert!(integer_distance(q) < 0.3, "Q = {q}");
    assert!(integer_distance(q) <= integer_distance(q0) + 1e-6);

    // The random start is covered in lattice-scale +/- charge; after cooling the
    // charge density is smooth and cancels far less.
    let (max1, activity1) = density_profile(e.lattice());
    assert!(max1 < 0.3, "singular plaquette left with q = {max1}");
    assert!(max1 < max0, "max plaquette charge {max0} -> {max1}");
    assert!(
        activity1 < 0.5 * activity0,
        "sum |q| {activity0} -> {activity1}"
    );
    assert!(q.abs() <= activity1 + 1e-9);

    // Low-temperature acceptance is well below the hot start.
    let trace = &summary.trace;
    assert!(trace[trace.len() - 1].acceptance_rate < trace[0].acceptance_rate);
}

#[test]
fn interrupt_stops_at_a_sweep_boundary() {
    let mut e = engine(
        LatticeConfig::periodic(6, 6),
        InitialState::Random { seed: 1 },
        EnergyCoefficients::default(),
        fixed_sweeps(Schedule::Constant { temperature: 1.0 }, 1000),
    );
    let interrupted = AtomicBool::new(false);
    let seen = AtomicUsize::new(0);
    let summary = e.run(&interrupted, &|_| {
        if seen.fetch_add(1, Ordering::Relaxed) + 1 == 5 {
            interrupted.store(true, Ordering::Relaxed);
        }
    });
    assert_eq!(summary.outcome, RunOutcome::Stopped);
    assert_eq!(summary.sweeps, 5);
    assert_eq!(summary.steps, 5 * 36);
    assert!(e.sweep().is_none());
}

#[test]
fn seeded_skyrmion_energy_breakdown_is_consistent() {
    let seed = skyrmion_sim::SkyrmionSeed::centered(20, 20, 4.0);
    let e = engine(
        LatticeConfig::periodic(20, 20),
        InitialState::Skyrmion(seed),
        skyrmion_coefficients(),
        SimConfig::default(),
    );
    let summary = e.summary();
    assert_eq!(summary.outcome, RunOutcome::InProgress);
    assert_eq!(summary.sweeps, 0);
    assert!(approx_eq(summary.energy, e.energy(), 1e-9));
    assert!(approx_eq(summary.topological_charge.unwrap().abs(), 1.0, 1e-6));
}
