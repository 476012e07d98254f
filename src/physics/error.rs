//! Physics error types.
//!
//! Configuration errors are fatal at startup and never reach the solver.
//! Geometry errors are local to a single collider pair: the pair is
//! skipped and logged, and the rest of the step continues.

use thiserror::Error;

/// Rejected at configuration build time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("substeps must be at least 1, got {0}")]
    InvalidSubsteps(u32),
    #[error("velocity iterations must be at least 1, got {0}")]
    InvalidVelocityIterations(u32),
    #[error("position iterations must be at least 1, got {0}")]
    InvalidPositionIterations(u32),
    #[error("penetration tolerance must be non-negative, got {0}")]
    NegativePenetrationTolerance(f32),
    #[error("tile size must be positive, got {0}x{1}")]
    InvalidTileSize(f32, f32),
}

/// Per-pair collision geometry failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Extension point: a shape pair combination with no manifold
    /// algorithm. The current circle/polygon matrix is fully covered.
    #[error("no contact algorithm for shape pair {0} vs {1}")]
    UnsupportedPair(&'static str, &'static str),
    /// Fully coincident centers leave no direction to separate along.
    #[error("zero-length contact normal between coincident shapes")]
    DegenerateNormal,
    #[error("circle radius must be positive, got {0}")]
    InvalidRadius(f32),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon vertices must be convex and wound counter-clockwise")]
    NonConvex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InvalidSubsteps(0);
        assert_eq!(err.to_string(), "substeps must be at least 1, got 0");

        let err = GeometryError::TooFewVertices(2);
        assert_eq!(err.to_string(), "polygon needs at least 3 vertices, got 2");
    }
}
