use thiserror::Error;

/// Failure kinds raised by the steering engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwarmError {
    /// Two flyers came closer than the collision radius.
    #[error("collision: distance {distance:.4} is below the collision radius {radius}")]
    Collision { distance: f32, radius: f32 },
    /// Zero-vector normalization or a centroid over an empty set.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
