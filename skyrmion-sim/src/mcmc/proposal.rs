use rand::Rng;

use crate::config::Proposal;
use crate::spins::Vec3;

/// Draw a trial spin for a site currently holding `current` (a unit vector).
///
/// The result is always a unit vector: a small-angle step `0 < step < 1`
/// keeps `|current + step * u| >= 1 - step` away from zero.
#[inline]
pub fn propose<R: Rng + ?Sized>(proposal: Proposal, current: Vec3, rng: &mut R) -> Vec3 {
    match proposal {
        Proposal::SmallAngle { step } => {
            (current + Vec3::random_unit(rng) * step).normalized_unchecked()
        }
        Proposal::Global => Vec3::random_unit(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_small_angle_stays_close() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let step = 0.1;
        for _ in 0..1000 {
            let s = propose(Proposal::SmallAngle { step }, Vec3::Z, &mut rng);
            assert!((s.norm() - 1.0).abs() < 1e-12);
            // Angle to the original spin is at most asin(step).
            assert!(s.dot(Vec3::Z) >= (1.0 - step * step).sqrt() - 1e-12);
        }
    }

    #[test]
    fn test_global_covers_both_hemispheres() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let flips = (0..1000)
            .map(|_| propose(Proposal::Global, Vec3::Z, &mut rng))
            .filter(|s| s.z < 0.0)
            .count();
        assert!((400..600).contains(&flips), "{flips} of 1000 in lower hemisphere");
    }
}
