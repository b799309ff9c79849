use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

/// Errors reported to callers at construction time or at a specific call site.
///
/// Metropolis rejections are not errors; they never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Site index outside `[0, width) x [0, height)` on an open-boundary lattice.
    #[error("site ({i}, {j}) is outside the {width}x{height} open lattice")]
    OutOfRange {
        i: isize,
        j: isize,
        width: usize,
        height: usize,
    },

    /// Vector that cannot be normalized onto the unit sphere.
    #[error("degenerate spin [{x}, {y}, {z}] cannot be normalized")]
    InvalidSpin { x: f64, y: f64, z: f64 },

    /// Lattice too small for the requested geometric operation.
    #[error("{operation} needs at least a {min_width}x{min_height} lattice, got {width}x{height}")]
    DimensionTooSmall {
        operation: &'static str,
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    /// Non-physical or inconsistent configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<validator::ValidationErrors> for SimError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Configuration(format!("{e}"))
    }
}
