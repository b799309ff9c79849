use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::mcmc::schedule::Schedule;

/// Seed used when a configuration does not override it.
pub const DEFAULT_SEED: u64 = 42;

/// Small-angle step used when a proposal is parsed without an explicit size.
pub const DEFAULT_STEP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Periodic,
    Open,
}

impl TryFrom<&str> for Boundary {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "periodic" => Ok(Self::Periodic),
            "open" => Ok(Self::Open),
            _ => Err(format!(
                "unknown boundary '{s}', expected 'periodic' or 'open'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// 4 nearest neighbors.
    VonNeumann,
    /// 4 nearest plus 4 diagonal neighbors, all with the same couplings.
    Moore,
}

impl TryFrom<&str> for Topology {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "von_neumann" | "4" => Ok(Self::VonNeumann),
            "moore" | "8" => Ok(Self::Moore),
            _ => Err(format!(
                "unknown topology '{s}', expected 'von_neumann' or 'moore'"
            )),
        }
    }
}

/// Orientation of the DM vector `d_ij` relative to the bond direction `r_ij`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chirality {
    /// `d_ij = z × r_ij`; stabilizes Néel skyrmions.
    Interfacial,
    /// `d_ij = r_ij`; stabilizes Bloch skyrmions.
    Bulk,
}

impl TryFrom<&str> for Chirality {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "interfacial" | "neel" => Ok(Self::Interfacial),
            "bulk" | "bloch" => Ok(Self::Bulk),
            _ => Err(format!(
                "unknown chirality '{s}', expected 'interfacial' or 'bulk'"
            )),
        }
    }
}

/// How a trial spin is generated from the current one.
///
/// `SmallAngle` keeps the acceptance rate high at low temperature; `Global`
/// decorrelates faster at high temperature but is mostly rejected once the
/// lattice has ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proposal {
    /// `s + step * u` with `u` uniform on the sphere, then normalized.
    SmallAngle { step: f64 },
    /// Fresh direction uniform on the sphere.
    Global,
}

impl TryFrom<&str> for Proposal {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "global" => Ok(Self::Global),
            "small_angle" => Ok(Self::SmallAngle { step: DEFAULT_STEP }),
            _ if s.starts_with("small_angle:") => {
                let step: f64 = s["small_angle:".len()..].parse().map_err(|_| {
                    format!("invalid step in '{s}', expected 'small_angle:X' with 0 < X < 1")
                })?;
                Ok(Self::SmallAngle { step })
            }
            _ => Err(format!(
                "unknown proposal '{s}', expected 'global', 'small_angle' or 'small_angle:X'"
            )),
        }
    }
}

fn validate_lattice_config(cfg: &LatticeConfig) -> Result<(), ValidationError> {
    if cfg.width < 1 || cfg.height < 1 {
        return Err(ValidationError::new("lattice width and height must be >= 1"));
    }
    if cfg
        .width
        .checked_mul(cfg.height)
        .map_or(true, |n| n >= u32::MAX as usize)
    {
        return Err(ValidationError::new("lattice has too many sites"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_lattice_config"))]
pub struct LatticeConfig {
    pub width: usize,
    pub height: usize,
    pub boundary: Boundary,
    pub topology: Topology,
}

impl LatticeConfig {
    /// Periodic 4-neighbor lattice, the usual choice for bulk-like films.
    pub fn periodic(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            boundary: Boundary::Periodic,
            topology: Topology::VonNeumann,
        }
    }

    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            boundary: Boundary::Open,
            topology: Topology::VonNeumann,
        }
    }
}

fn validate_convergence_config(cfg: &ConvergenceConfig) -> Result<(), ValidationError> {
    if cfg.max_sweeps < 1 {
        return Err(ValidationError::new("max_sweeps must be >= 1"));
    }
    if cfg.window < 1 {
        return Err(ValidationError::new("convergence window must be >= 1"));
    }
    if !(cfg.tolerance.is_finite() && cfg.tolerance >= 0.0) {
        return Err(ValidationError::new(
            "convergence tolerance must be finite and >= 0",
        ));
    }
    Ok(())
}

/// Stop criteria: energy plateau over `window` sweeps, or `max_sweeps`.
///
/// A `tolerance` of zero disables the plateau test.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_convergence_config"))]
pub struct ConvergenceConfig {
    pub window: usize,
    pub tolerance: f64,
    pub max_sweeps: usize,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            window: 100,
            tolerance: 1e-6,
            max_sweeps: 10_000,
        }
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if let Proposal::SmallAngle { step } = cfg.proposal {
        if !(step > 0.0 && step < 1.0) {
            return Err(ValidationError::new(
                "small-angle step must satisfy 0 < step < 1",
            ));
        }
    }
    cfg.schedule.check()?;
    if !(cfg.boltzmann.is_finite() && cfg.boltzmann > 0.0) {
        return Err(ValidationError::new("boltzmann constant must be > 0"));
    }
    if cfg.reheat_interval == Some(0) {
        return Err(ValidationError::new("reheat_interval must be >= 1"));
    }
    if cfg.resync_interval == Some(0) {
        return Err(ValidationError::new("resync_interval must be >= 1"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    pub proposal: Proposal,
    pub schedule: Schedule,
    /// Restart the schedule every this many sweeps. `None` keeps the
    /// temperature non-increasing for the whole run.
    pub reheat_interval: Option<usize>,
    #[validate]
    pub convergence: ConvergenceConfig,
    pub seed: u64,
    /// `k_B` in the Boltzmann factor `exp(-dE / (k_B T))`.
    pub boltzmann: f64,
    /// Keep a per-sweep [`SweepRecord`](crate::statistics::SweepRecord) trace.
    pub record_trace: bool,
    /// Recompute the cached energy from scratch every this many sweeps.
    pub resync_interval: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            proposal: Proposal::SmallAngle { step: DEFAULT_STEP },
            schedule: Schedule::Constant { temperature: 1.0 },
            reheat_interval: None,
            convergence: ConvergenceConfig::default(),
            seed: DEFAULT_SEED,
            boltzmann: 1.0,
            record_trace: false,
            resync_interval: Some(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!(Boundary::try_from("open"), Ok(Boundary::Open));
        assert_eq!(Topology::try_from("8"), Ok(Topology::Moore));
        assert_eq!(Chirality::try_from("bloch"), Ok(Chirality::Bulk));
        assert!(Boundary::try_from("twisted").is_err());
    }

    #[test]
    fn test_parse_proposal() {
        assert_eq!(Proposal::try_from("global"), Ok(Proposal::Global));
        assert_eq!(
            Proposal::try_from("small_angle"),
            Ok(Proposal::SmallAngle { step: DEFAULT_STEP })
        );
        assert_eq!(
            Proposal::try_from("small_angle:0.35"),
            Ok(Proposal::SmallAngle { step: 0.35 })
        );
        assert!(Proposal::try_from("small_angle:big").is_err());
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        assert!(LatticeConfig::periodic(0, 4).validate().is_err());
        assert!(LatticeConfig::open(4, 0).validate().is_err());
        assert!(LatticeConfig::periodic(1, 1).validate().is_ok());
    }

    #[test]
    fn test_sim_config_validation() {
        assert!(SimConfig::default().validate().is_ok());

        let cfg = SimConfig {
            proposal: Proposal::SmallAngle { step: 1.5 },
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig {
            schedule: Schedule::Constant { temperature: -0.5 },
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig {
            convergence: ConvergenceConfig {
                max_sweeps: 0,
                ..ConvergenceConfig::default()
            },
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig {
            boltzmann: 0.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
