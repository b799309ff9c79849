pub mod energy;
pub mod vector;

pub use energy::{dm_vector, EnergyCoefficients, EnergyModel, EnergyTerms};
pub use vector::Vec3;
