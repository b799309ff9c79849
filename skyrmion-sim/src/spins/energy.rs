use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::vector::Vec3;
use crate::config::Chirality;
use crate::error;
use crate::geometry::{moore, Lattice};

fn validate_coefficients(c: &EnergyCoefficients) -> Result<(), ValidationError> {
    if !(c.exchange.is_finite() && c.dmi.is_finite() && c.anisotropy.is_finite()) {
        return Err(ValidationError::new("energy coefficients must be finite"));
    }
    if !c.field.is_finite() || !c.anisotropy_axis.is_finite() {
        return Err(ValidationError::new("field and anisotropy axis must be finite"));
    }
    if c.anisotropy != 0.0 && c.anisotropy_axis.norm() < super::vector::DEGENERATE_NORM {
        return Err(ValidationError::new(
            "anisotropy axis must be non-zero when K != 0",
        ));
    }
    Ok(())
}

/// Coupling constants of the Hamiltonian
///
/// `E = -J Σ_<ij> Si·Sj + D Σ_<ij> dij·(Si × Sj) - Σ_i B·Si - K Σ_i (Si·a)²`.
///
/// The sign of `dmi` selects the handedness; `chirality` selects the DM vector.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_coefficients"))]
pub struct EnergyCoefficients {
    /// `J`. Positive is ferromagnetic.
    pub exchange: f64,
    /// `D`.
    pub dmi: f64,
    pub chirality: Chirality,
    /// `B`, in energy units.
    pub field: Vec3,
    /// `K`. Positive favors the axis, negative the plane perpendicular to it.
    pub anisotropy: f64,
    pub anisotropy_axis: Vec3,
}

impl Default for EnergyCoefficients {
    fn default() -> Self {
        Self {
            exchange: 1.0,
            dmi: 0.0,
            chirality: Chirality::Interfacial,
            field: Vec3::ZERO,
            anisotropy: 0.0,
            anisotropy_axis: Vec3::Z,
        }
    }
}

/// Per-term breakdown of the total energy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyTerms {
    pub exchange: f64,
    pub dmi: f64,
    pub zeeman: f64,
    pub anisotropy: f64,
}

impl EnergyTerms {
    pub fn total(&self) -> f64 {
        self.exchange + self.dmi + self.zeeman + self.anisotropy
    }
}

/// Evaluates the Hamiltonian on a [`Lattice`]. Holds no simulation state.
///
/// Assumes every lattice spin is normalized, which the lattice enforces.
#[derive(Debug, Clone)]
pub struct EnergyModel {
    coeffs: EnergyCoefficients,
    /// Normalized anisotropy axis.
    axis: Vec3,
    /// DM vector per forward bond direction of the Moore stencil. The von
    /// Neumann directions are its leading entries.
    dm_vectors: Vec<Vec3>,
}

impl EnergyModel {
    /// Validate `coeffs` and precompute the DM vectors.
    ///
    /// The DM table covers both stencils, so one model evaluates any [`Lattice`].
    pub fn new(coeffs: EnergyCoefficients) -> error::Result<Self> {
        coeffs.validate()?;
        let axis = if coeffs.anisotropy == 0.0 {
            Vec3::Z
        } else {
            coeffs.anisotropy_axis.normalized()?
        };
        let dm_vectors = moore()
            .into_iter()
            .map(|offset| dm_vector(coeffs.chirality, offset))
            .collect();
        Ok(Self {
            coeffs,
            axis,
            dm_vectors,
        })
    }

    pub fn coefficients(&self) -> &EnergyCoefficients {
        &self.coeffs
    }

    /// DM vector `d` for forward bond direction `d`.
    pub fn dm_vector(&self, d: usize) -> Vec3 {
        self.dm_vectors[d]
    }

    /// On-site (Zeeman + anisotropy) energy of `spin`.
    #[inline]
    fn onsite(&self, spin: Vec3) -> f64 {
        let proj = spin.dot(self.axis);
        -self.coeffs.field.dot(spin) - self.coeffs.anisotropy * proj * proj
    }

    /// Energy of site `site` if it held `spin`, counting each bond to a
    /// neighbor once plus the on-site terms. Neighbors are read from `lattice`.
    #[inline]
    pub fn site_energy(&self, lattice: &Lattice, site: usize, spin: Vec3) -> f64 {
        let j = self.coeffs.exchange;
        let dmi = self.coeffs.dmi;
        let mut dot_sum = 0.0;
        let mut dm_sum = 0.0;
        for d in 0..lattice.n_neighbors {
            let dv = self.dm_vectors[d];
            if let Some(n) = lattice.neighbor(site, d, true) {
                let sn = lattice.spin(n);
                dot_sum += spin.dot(sn);
                dm_sum += dv.dot(spin.cross(sn));
            }
            if let Some(n) = lattice.neighbor(site, d, false) {
                // Bond (n -> site) points along +offset: d·(Sn × S).
                let sn = lattice.spin(n);
                dot_sum += spin.dot(sn);
                dm_sum += dv.dot(sn.cross(spin));
            }
        }
        -j * dot_sum + dmi * dm_sum + self.onsite(spin)
    }

    /// Energy attributable to `(i, j)`: its bonds and its on-site terms.
    pub fn local_energy(&self, lattice: &Lattice, i: isize, j: isize) -> error::Result<f64> {
        let site = lattice.resolve(i, j)?;
        Ok(self.site_energy(lattice, site, lattice.spin(site)))
    }

    /// Change in total energy if `site` were set to `proposed`.
    ///
    /// O(neighbor count). Exact, because every term containing the site's spin
    /// appears in its local energy exactly once.
    #[inline]
    pub fn delta_energy(&self, lattice: &Lattice, site: usize, proposed: Vec3) -> f64 {
        self.site_energy(lattice, site, proposed)
            - self.site_energy(lattice, site, lattice.spin(site))
    }

    /// Every term summed over the lattice, each bond counted once.
    pub fn energy_terms(&self, lattice: &Lattice) -> EnergyTerms {
        let mut dot_sum = 0.0;
        let mut dm_sum = 0.0;
        let mut zeeman = 0.0;
        let mut aniso = 0.0;
        for site in 0..lattice.n_sites {
            let s = lattice.spin(site);
            for d in 0..lattice.n_neighbors {
                if let Some(n) = lattice.neighbor(site, d, true) {
                    let sn = lattice.spin(n);
                    dot_sum += s.dot(sn);
                    dm_sum += self.dm_vectors[d].dot(s.cross(sn));
                }
            }
            zeeman -= self.coeffs.field.dot(s);
            let proj = s.dot(self.axis);
            aniso -= self.coeffs.anisotropy * proj * proj;
        }
        EnergyTerms {
            exchange: -self.coeffs.exchange * dot_sum,
            dmi: self.coeffs.dmi * dm_sum,
            zeeman,
            anisotropy: aniso,
        }
    }

    /// Total energy. O(sites * neighbors); for diagnostics, not the sweep loop.
    pub fn total_energy(&self, lattice: &Lattice) -> f64 {
        self.energy_terms(lattice).total()
    }
}

/// DM vector for a bond with lattice offset `(di, dj)`.
///
/// The bond direction `r` is the normalized offset. Interfacial: `z × r`;
/// bulk: `r`. Both are odd in `r`, so reversing a bond flips `d` and the
/// pair energy `d·(Si × Sj)` is independent of which end is called `i`.
pub fn dm_vector(chirality: Chirality, (di, dj): (isize, isize)) -> Vec3 {
    let len = ((di * di + dj * dj) as f64).sqrt();
    let r = Vec3::new(di as f64 / len, dj as f64 / len, 0.0);
    match chirality {
        Chirality::Interfacial => Vec3::Z.cross(r),
        Chirality::Bulk => r,
    }
}
