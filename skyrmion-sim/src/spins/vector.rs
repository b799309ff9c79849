use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Vectors shorter than this are treated as degenerate and cannot become spins.
pub const DEGENERATE_NORM: f64 = 1e-12;

/// Plain 3-vector. Lattice spins are kept at unit length by the lattice itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product `self × other`.
    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Unit vector along `self`, or [`SimError::InvalidSpin`] if `self` is
    /// non-finite or shorter than [`DEGENERATE_NORM`].
    pub fn normalized(self) -> Result<Vec3> {
        let n = self.norm();
        if !self.is_finite() || n < DEGENERATE_NORM {
            return Err(SimError::InvalidSpin {
                x: self.x,
                y: self.y,
                z: self.z,
            });
        }
        Ok(self * (1.0 / n))
    }

    /// Divide by the norm without checking for degeneracy.
    ///
    /// Callers guarantee `self.norm()` is bounded away from zero.
    #[inline]
    pub(crate) fn normalized_unchecked(self) -> Vec3 {
        let n = self.norm();
        debug_assert!(n >= DEGENERATE_NORM, "normalizing degenerate vector {self:?}");
        self * (1.0 / n)
    }

    /// Direction drawn uniformly on the unit sphere.
    ///
    /// Uses `z ~ U[-1, 1)`, `phi ~ U[0, 2pi)`, which is exactly uniform
    /// (Archimedes' hat-box theorem) and consumes two draws per call.
    pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
        let z: f64 = 2.0 * rng.gen::<f64>() - 1.0;
        let phi: f64 = TAU * rng.gen::<f64>();
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Self {
        Vec3::new(a[0], a[1], a[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, o: Vec3) {
        self.x += o.x;
        self.y += o.y;
        self.z += o.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_cross_follows_right_hand_rule() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
        assert_eq!(Vec3::Z.cross(Vec3::X), Vec3::Y);
        assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_degenerate_vectors_are_rejected() {
        assert!(matches!(
            Vec3::ZERO.normalized(),
            Err(SimError::InvalidSpin { .. })
        ));
        assert!(Vec3::new(1e-13, 0.0, 0.0).normalized().is_err());
        assert!(Vec3::new(f64::NAN, 1.0, 0.0).normalized().is_err());
        assert!(Vec3::new(f64::INFINITY, 0.0, 0.0).normalized().is_err());
    }

    #[test]
    fn test_random_unit_is_unit_and_unbiased() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let n = 20_000;
        let mut mean = Vec3::ZERO;
        for _ in 0..n {
            let v = Vec3::random_unit(&mut rng);
            assert!((v.norm() - 1.0).abs() < 1e-12);
            mean += v;
        }
        let mean = mean * (1.0 / n as f64);
        // Standard error per component is ~ 1/sqrt(3n) ~ 0.004.
        assert!(mean.norm() < 0.03, "mean direction {mean:?}");
    }

    proptest! {
        #[test]
        fn normalized_has_unit_norm(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            z in -1e6f64..1e6,
        ) {
            let v = Vec3::new(x, y, z);
            prop_assume!(v.norm() > 1e-6);
            let u = v.normalized().unwrap();
            prop_assert!((u.norm() - 1.0).abs() < 1e-12);
            prop_assert!(u.dot(v) > 0.0);
        }
    }
}
