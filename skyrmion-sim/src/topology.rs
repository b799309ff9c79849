//! Topological (skyrmion) charge of a spin texture.
//!
//! The continuum charge `Q = (1/4pi) ∫ S·(∂x S × ∂y S) dA` is discretized by
//! splitting every elementary square plaquette into two counter-clockwise
//! triangles and summing the signed solid angle each triangle of spins spans
//! on the unit sphere (Berg–Lüscher). On a periodic lattice the triangles tile
//! a closed surface and `Q` is an integer up to rounding; on an open lattice
//! boundary plaquettes are simply absent and `Q` can be fractional.

use serde::Serialize;

use crate::config::Boundary;
use crate::error::{Result, SimError};
use crate::geometry::Lattice;
use crate::spins::Vec3;

/// Charge estimate plus an optional per-plaquette map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderParameterResult {
    pub charge: f64,
    /// Charge of the plaquette whose lower-left corner is `(i, j)`, stored at
    /// `j * width + i`. Plaquettes that do not exist (last row and column of
    /// an open lattice) hold zero.
    pub density: Option<Vec<f64>>,
}

/// Signed solid angle subtended by three unit vectors, in `(-2pi, 2pi]`.
#[inline]
pub fn solid_angle(s1: Vec3, s2: Vec3, s3: Vec3) -> f64 {
    let triple = s1.dot(s2.cross(s3));
    let denom = 1.0 + s1.dot(s2) + s2.dot(s3) + s3.dot(s1);
    2.0 * triple.atan2(denom)
}

fn check_dimensions(lattice: &Lattice) -> Result<()> {
    if lattice.width < 2 || lattice.height < 2 {
        return Err(SimError::DimensionTooSmall {
            operation: "topological charge",
            width: lattice.width,
            height: lattice.height,
            min_width: 2,
            min_height: 2,
        });
    }
    Ok(())
}

/// Charge of the plaquette with lower-left corner `(i, j)`; corners wrap.
fn plaquette_charge(lattice: &Lattice, i: usize, j: usize) -> f64 {
    let ip = (i + 1) % lattice.width;
    let jp = (j + 1) % lattice.height;
    let s00 = lattice.spin(lattice.flat(i, j));
    let s10 = lattice.spin(lattice.flat(ip, j));
    let s11 = lattice.spin(lattice.flat(ip, jp));
    let s01 = lattice.spin(lattice.flat(i, jp));
    (solid_angle(s00, s10, s11) + solid_angle(s00, s11, s01)) / (4.0 * std::f64::consts::PI)
}

/// Number of plaquette rows/columns: wrapping ones are included when periodic.
fn plaquette_extent(lattice: &Lattice) -> (usize, usize) {
    match lattice.boundary {
        Boundary::Periodic => (lattice.width, lattice.height),
        Boundary::Open => (lattice.width - 1, lattice.height - 1),
    }
}

/// Total topological charge. Read-only over `lattice`.
pub fn topological_charge(lattice: &Lattice) -> Result<f64> {
    check_dimensions(lattice)?;
    let (pw, ph) = plaquette_extent(lattice);
    let mut q = 0.0;
    for j in 0..ph {
        for i in 0..pw {
            q += plaquette_charge(lattice, i, j);
        }
    }
    Ok(q)
}

/// Topological charge, with the per-plaquette density when `with_density`.
pub fn analyze(lattice: &Lattice, with_density: bool) -> Result<OrderParameterResult> {
    if !with_density {
        return Ok(OrderParameterResult {
            charge: topological_charge(lattice)?,
            density: None,
        });
    }
    check_dimensions(lattice)?;
    let (pw, ph) = plaquette_extent(lattice);
    let mut density = vec![0.0; lattice.n_sites];
    let mut q = 0.0;
    for j in 0..ph {
        for i in 0..pw {
            let c = plaquette_charge(lattice, i, j);
            density[j * lattice.width + i] = c;
            q += c;
        }
    }
    Ok(OrderParameterResult {
        charge: q,
        density: Some(density),
    })
}

/// Distance from `q` to the nearest integer.
pub fn integer_distance(q: f64) -> f64 {
    (q - q.round()).abs()
}
