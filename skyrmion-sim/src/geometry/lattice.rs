use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::initial::InitialState;
use super::offsets::{moore, von_neumann};
use crate::config::{Boundary, LatticeConfig, Topology};
use crate::error::{Result, SimError};
use crate::spins::Vec3;

/// Marks a missing neighbor (open edge or self-bond) in the neighbor table.
const NO_NEIGHBOR: u32 = u32::MAX;

/// One adjacent site as seen from a central site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Coordinates of the neighbor after wrapping.
    pub site: (usize, usize),
    /// Displacement `(di, dj)` from the central site before wrapping.
    pub offset: (isize, isize),
    pub spin: Vec3,
}

/// Read-only copy of the spin field for external rendering or persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major (`j * width + i`) spin components.
    pub spins: Vec<[f64; 3]>,
}

impl Snapshot {
    pub fn get(&self, i: usize, j: usize) -> [f64; 3] {
        self.spins[j * self.width + i]
    }
}

/// 2D lattice of unit spins with a precomputed neighbor table.
///
/// Site `(i, j)` has flat index `j * width + i`, so iterating flat indices
/// upward is a raster scan with `i` varying fastest. The neighbor table stores,
/// for every site and forward bond direction `d`, the flat index of the
/// forward (`+offset`) and backward (`-offset`) neighbor, or [`NO_NEIGHBOR`].
///
/// Every stored spin has unit norm; all writes go through normalization.
#[derive(Debug, Clone)]
pub struct Lattice {
    pub width: usize,
    pub height: usize,
    /// `width * height`.
    pub n_sites: usize,
    pub boundary: Boundary,
    pub topology: Topology,
    /// Number of forward bond directions (2 for von Neumann, 4 for Moore).
    pub n_neighbors: usize,
    offsets: Vec<(isize, isize)>,
    /// Layout: `neighbors[(site * n_neighbors + d) * 2 + dir]`, `dir = 0`
    /// forward and `dir = 1` backward.
    neighbors: Vec<u32>,
    spins: Vec<Vec3>,
}

impl Lattice {
    /// Build a lattice and fill it according to `init`.
    pub fn new(config: &LatticeConfig, init: &InitialState) -> Result<Self> {
        config.validate()?;

        let LatticeConfig {
            width,
            height,
            boundary,
            topology,
        } = *config;
        let offsets = match topology {
            Topology::VonNeumann => von_neumann(),
            Topology::Moore => moore(),
        };
        let n_neighbors = offsets.len();
        let n_sites = width * height;

        let mut neighbors = vec![NO_NEIGHBOR; n_sites * n_neighbors * 2];
        for site in 0..n_sites {
            let (i, j) = (site % width, site / width);
            for (d, &(di, dj)) in offsets.iter().enumerate() {
                for (dir, sign) in [(0, 1isize), (1, -1isize)] {
                    let ni = i as isize + sign * di;
                    let nj = j as isize + sign * dj;
                    let target = match boundary {
                        Boundary::Periodic => Some((
                            ni.rem_euclid(width as isize) as usize,
                            nj.rem_euclid(height as isize) as usize,
                        )),
                        Boundary::Open => (ni >= 0
                            && nj >= 0
                            && (ni as usize) < width
                            && (nj as usize) < height)
                            .then_some((ni as usize, nj as usize)),
                    };
                    if let Some((ti, tj)) = target {
                        let flat = tj * width + ti;
                        if flat != site {
                            neighbors[(site * n_neighbors + d) * 2 + dir] = flat as u32;
                        }
                    }
                }
            }
        }

        let mut lattice = Self {
            width,
            height,
            n_sites,
            boundary,
            topology,
            n_neighbors,
            offsets,
            neighbors,
            spins: vec![Vec3::Z; n_sites],
        };
        lattice.initialize(init)?;
        Ok(lattice)
    }

    /// Refill every spin according to `init`.
    ///
    /// On error the lattice is left untouched.
    pub fn initialize(&mut self, init: &InitialState) -> Result<()> {
        let spins = match init {
            InitialState::Uniform(v) => vec![v.normalized()?; self.n_sites],
            InitialState::Random { seed } => {
                let mut rng = Xoshiro256StarStar::seed_from_u64(*seed);
                (0..self.n_sites)
                    .map(|_| Vec3::random_unit(&mut rng).normalized_unchecked())
                    .collect()
            }
            InitialState::Field(field) => {
                if field.len() != self.n_sites {
                    return Err(SimError::Configuration(format!(
                        "initial field has {} spins, lattice has {}",
                        field.len(),
                        self.n_sites
                    )));
                }
                field
                    .iter()
                    .map(|v| v.normalized())
                    .collect::<Result<Vec<_>>>()?
            }
            InitialState::Skyrmion(seed) => {
                seed.validate()?;
                (0..self.n_sites)
                    .map(|site| {
                        let (i, j) = self.coords(site);
                        let dx = self.displacement(i as f64 - seed.center.0, self.width);
                        let dy = self.displacement(j as f64 - seed.center.1, self.height);
                        seed.spin_at(dx, dy).normalized()
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };
        self.spins = spins;
        Ok(())
    }

    /// Minimum-image displacement along an axis of length `extent`.
    fn displacement(&self, delta: f64, extent: usize) -> f64 {
        match self.boundary {
            Boundary::Open => delta,
            Boundary::Periodic => {
                let l = extent as f64;
                delta - l * (delta / l).round()
            }
        }
    }

    #[inline]
    pub fn flat(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.width && j < self.height);
        j * self.width + i
    }

    #[inline]
    pub fn coords(&self, flat: usize) -> (usize, usize) {
        (flat % self.width, flat / self.width)
    }

    /// Map signed coordinates onto a flat index: wrapped when periodic,
    /// [`SimError::OutOfRange`] when open and outside the lattice.
    pub fn resolve(&self, i: isize, j: isize) -> Result<usize> {
        match self.boundary {
            Boundary::Periodic => {
                let wi = i.rem_euclid(self.width as isize) as usize;
                let wj = j.rem_euclid(self.height as isize) as usize;
                Ok(self.flat(wi, wj))
            }
            Boundary::Open => {
                if i < 0 || j < 0 || i as usize >= self.width || j as usize >= self.height {
                    return Err(SimError::OutOfRange {
                        i,
                        j,
                        width: self.width,
                        height: self.height,
                    });
                }
                Ok(self.flat(i as usize, j as usize))
            }
        }
    }

    pub fn get(&self, i: isize, j: isize) -> Result<Vec3> {
        Ok(self.spins[self.resolve(i, j)?])
    }

    /// Normalize `spin` and store it at `(i, j)`.
    pub fn set(&mut self, i: isize, j: isize, spin: Vec3) -> Result<()> {
        let site = self.resolve(i, j)?;
        self.spins[site] = spin.normalized()?;
        Ok(())
    }

    /// Spin at flat index `site`.
    #[inline]
    pub fn spin(&self, site: usize) -> Vec3 {
        self.spins[site]
    }

    pub fn spins(&self) -> &[Vec3] {
        &self.spins
    }

    /// Store an already-normalized spin. Used by the Monte Carlo commit path.
    #[inline]
    pub(crate) fn commit(&mut self, site: usize, spin: Vec3) {
        debug_assert!(
            (spin.norm() - 1.0).abs() < 1e-9,
            "committing non-unit spin {spin:?} at site {site}"
        );
        self.spins[site] = spin;
    }

    /// Forward offset `(di, dj)` of bond direction `d`.
    #[inline]
    pub fn offset(&self, d: usize) -> (isize, isize) {
        self.offsets[d]
    }

    /// Flat index of the neighbor of `site` along bond direction `d`, if any.
    /// `forward = true` means `+offset`, `forward = false` means `-offset`.
    #[inline]
    pub fn neighbor(&self, site: usize, d: usize, forward: bool) -> Option<usize> {
        let n = self.neighbors[(site * self.n_neighbors + d) * 2 + (!forward as usize)];
        (n != NO_NEIGHBOR).then_some(n as usize)
    }

    /// All existing neighbors of `(i, j)`, forward then backward per bond direction.
    pub fn neighbors(&self, i: isize, j: isize) -> Result<Vec<Neighbor>> {
        let site = self.resolve(i, j)?;
        let mut out = Vec::with_capacity(2 * self.n_neighbors);
        for d in 0..self.n_neighbors {
            let (di, dj) = self.offsets[d];
            for (forward, sign) in [(true, 1isize), (false, -1isize)] {
                if let Some(n) = self.neighbor(site, d, forward) {
                    out.push(Neighbor {
                        site: self.coords(n),
                        offset: (sign * di, sign * dj),
                        spin: self.spins[n],
                    });
                }
            }
        }
        Ok(out)
    }

    /// Lattice-averaged spin vector.
    pub fn mean_magnetization(&self) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for &s in &self.spins {
            sum += s;
        }
        sum * (1.0 / self.n_sites as f64)
    }

    /// Largest `| |s| - 1 |` over all sites. A non-finite spin counts as infinite.
    pub fn max_norm_error(&self) -> f64 {
        self.spins
            .iter()
            .map(|s| {
                let err = (s.norm() - 1.0).abs();
                if err.is_nan() {
                    f64::INFINITY
                } else {
                    err
                }
            })
            .fold(0.0, f64::max)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            spins: self.spins.iter().map(|s| s.to_array()).collect(),
        }
    }
}
