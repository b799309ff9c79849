use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Annealing schedule: temperature as a function of the completed sweep count.
///
/// Every variant is non-increasing in the sweep count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    Constant {
        temperature: f64,
    },
    /// `T_n = max(start * factor^n, floor)`, `0 < factor < 1`.
    Geometric { start: f64, factor: f64, floor: f64 },
    /// Straight line from `start` to `end` over `sweeps` sweeps, then held at `end`.
    Linear { start: f64, end: f64, sweeps: usize },
}

impl Schedule {
    /// Geometric schedule that reaches `end` on sweep `sweeps - 1` and holds there.
    pub fn geometric_between(start: f64, end: f64, sweeps: usize) -> Self {
        let steps = sweeps.max(2) - 1;
        let factor = (end / start).powf(1.0 / steps as f64);
        Self::Geometric {
            start,
            factor,
            floor: end,
        }
    }

    pub fn initial(&self) -> f64 {
        self.temperature_at(0)
    }

    /// Temperature for sweep number `sweep` (0-based).
    pub fn temperature_at(&self, sweep: usize) -> f64 {
        match *self {
            Self::Constant { temperature } => temperature,
            Self::Geometric {
                start,
                factor,
                floor,
            } => (start * factor.powf(sweep as f64)).max(floor),
            Self::Linear { start, end, sweeps } => {
                if sweep >= sweeps {
                    return end;
                }
                let frac = sweep as f64 / sweeps as f64;
                (start + (end - start) * frac).max(end)
            }
        }
    }

    /// Temperature with an optional reheating period: the schedule restarts
    /// from its initial temperature every `reheat_interval` sweeps.
    pub fn temperature_with_reheat(&self, sweep: usize, reheat_interval: Option<usize>) -> f64 {
        let local = reheat_interval.map_or(sweep, |k| sweep % k);
        self.temperature_at(local)
    }

    pub(crate) fn check(&self) -> Result<(), ValidationError> {
        let non_negative = |t: f64| t.is_finite() && t >= 0.0;
        match *self {
            Self::Constant { temperature } => {
                if !non_negative(temperature) {
                    return Err(ValidationError::new("temperature must be finite and >= 0"));
                }
            }
            Self::Geometric {
                start,
                factor,
                floor,
            } => {
                if !non_negative(start) || !non_negative(floor) {
                    return Err(ValidationError::new(
                        "geometric start and floor temperatures must be finite and >= 0",
                    ));
                }
                if !(factor > 0.0 && factor < 1.0) {
                    return Err(ValidationError::new(
                        "geometric cooling factor must satisfy 0 < factor < 1",
                    ));
                }
                if floor > start {
                    return Err(ValidationError::new(
                        "geometric floor must not exceed the start temperature",
                    ));
                }
            }
            Self::Linear { start, end, sweeps } => {
                if !non_negative(start) || !non_negative(end) {
                    return Err(ValidationError::new(
                        "linear start and end temperatures must be finite and >= 0",
                    ));
                }
                if end > start {
                    return Err(ValidationError::new(
                        "linear schedule must not heat (end <= start)",
                    ));
                }
                if sweeps < 1 {
                    return Err(ValidationError::new("linear schedule sweeps must be >= 1"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometric_between_hits_endpoints() {
        let s = Schedule::geometric_between(2.0, 0.01, 2000);
        assert!(s.check().is_ok());
        assert_eq!(s.initial(), 2.0);
        assert!((s.temperature_at(1999) - 0.01).abs() < 1e-9);
        assert_eq!(s.temperature_at(50_000), 0.01);
    }

    #[test]
    fn test_schedules_never_heat() {
        let schedules = [
            Schedule::Constant { temperature: 0.7 },
            Schedule::Geometric {
                start: 3.0,
                factor: 0.97,
                floor: 0.05,
            },
            Schedule::Linear {
                start: 1.5,
                end: 0.0,
                sweeps: 300,
            },
        ];
        for s in schedules {
            let mut prev = s.initial();
            for n in 1..1000 {
                let t = s.temperature_at(n);
                assert!(t <= prev, "{s:?} heated at sweep {n}: {prev} -> {t}");
                assert!(t >= 0.0);
                prev = t;
            }
        }
    }

    #[test]
    fn test_linear_holds_end() {
        let s = Schedule::Linear {
            start: 1.0,
            end: 0.2,
            sweeps: 4,
        };
        assert!((s.temperature_at(2) - 0.6).abs() < 1e-12);
        assert_eq!(s.temperature_at(4), 0.2);
        assert_eq!(s.temperature_at(9), 0.2);
        for n in 0..4 {
            assert!(s.temperature_at(n) >= 0.2);
        }
    }

    #[test]
    fn test_reheat_restarts_cycle() {
        let s = Schedule::Geometric {
            start: 1.0,
            factor: 0.5,
            floor: 0.0,
        };
        assert_eq!(s.temperature_with_reheat(3, Some(4)), 0.125);
        assert_eq!(s.temperature_with_reheat(4, Some(4)), 1.0);
        assert_eq!(s.temperature_with_reheat(4, None), 0.0625);
    }

    #[test]
    fn test_invalid_schedules() {
        assert!(Schedule::Constant { temperature: -1.0 }.check().is_err());
        assert!(Schedule::Geometric {
            start: 1.0,
            factor: 1.0,
            floor: 0.0
        }
        .check()
        .is_err());
        assert!(Schedule::Linear {
            start: 0.5,
            end: 1.0,
            sweeps: 10
        }
        .check()
        .is_err());
        assert!(Schedule::Constant {
            temperature: f64::NAN
        }
        .check()
        .is_err());
    }
}
