pub mod initial;
pub mod lattice;
pub mod offsets;

pub use initial::{InitialState, SkyrmionSeed};
pub use lattice::{Lattice, Neighbor, Snapshot};
pub use offsets::{moore, von_neumann};
