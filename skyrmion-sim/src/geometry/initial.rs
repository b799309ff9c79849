use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::spins::Vec3;

/// How a [`Lattice`](super::Lattice) is filled at construction or reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    /// Every spin along the given (normalized) direction.
    Uniform(Vec3),
    /// Independent directions uniform on the sphere, drawn from a generator
    /// seeded with `seed`.
    Random { seed: u64 },
    /// Caller-supplied field in row-major order (`j * width + i`).
    Field(Vec<Vec3>),
    /// A single skyrmion in a uniform background.
    Skyrmion(SkyrmionSeed),
}

impl Default for InitialState {
    fn default() -> Self {
        Self::Uniform(Vec3::Z)
    }
}

/// Skyrmion profile `theta(r) = 2 atan(exp((radius - r) / wall_width))`.
///
/// The core points along `core_polarity * z`, the background along the
/// opposite direction. `helicity` rotates the in-plane component:
/// `0` gives a Néel (radial) texture, `pi / 2` a Bloch (tangential) one.
/// Distances use the minimum image on periodic lattices.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_skyrmion_seed"))]
pub struct SkyrmionSeed {
    pub center: (f64, f64),
    pub radius: f64,
    pub wall_width: f64,
    pub helicity: f64,
    pub core_polarity: f64,
}

fn validate_skyrmion_seed(seed: &SkyrmionSeed) -> Result<(), ValidationError> {
    let fields = [
        seed.center.0,
        seed.center.1,
        seed.radius,
        seed.wall_width,
        seed.helicity,
        seed.core_polarity,
    ];
    if !fields.iter().all(|v| v.is_finite()) {
        return Err(ValidationError::new("skyrmion seed fields must be finite"));
    }
    if seed.radius < 0.0 {
        return Err(ValidationError::new("skyrmion radius must be >= 0"));
    }
    if seed.wall_width <= 0.0 {
        return Err(ValidationError::new("skyrmion wall width must be > 0"));
    }
    Ok(())
}

impl SkyrmionSeed {
    /// Néel skyrmion with its core pointing along `-z`, centred on the lattice.
    pub fn centered(width: usize, height: usize, radius: f64) -> Self {
        Self {
            center: ((width as f64 - 1.0) / 2.0, (height as f64 - 1.0) / 2.0),
            radius,
            wall_width: (radius / 2.0).max(0.5),
            helicity: 0.0,
            core_polarity: -1.0,
        }
    }

    /// Spin at displacement `(dx, dy)` from the centre. Expects a validated seed.
    pub(crate) fn spin_at(&self, dx: f64, dy: f64) -> Vec3 {
        let p = if self.core_polarity < 0.0 { -1.0 } else { 1.0 };
        let r = (dx * dx + dy * dy).sqrt();
        let theta = 2.0 * ((self.radius - r) / self.wall_width).exp().atan();
        let phi = dy.atan2(dx) + self.helicity;
        let (st, ct) = theta.sin_cos();
        Vec3::new(st * phi.cos(), st * phi.sin(), -p * ct)
    }
}
