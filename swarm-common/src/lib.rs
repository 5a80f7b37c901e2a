pub mod config;
pub mod error;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    AttractorConfig, AttractorOrbit, CohesionConfig, DistancesConfig, InitialConditions, LoopMode,
    OrbitConfig, OrbitPhase, OutputConfig, SimulationSection, SwarmConfig,
};
pub use error::SwarmError;
pub use sim_params::SimParams;
pub use snapshot::{Snapshot, SnapshotPoint, ATTRACTOR_LABEL, FLYER_LABEL};
pub use vecmath::{clamp, subtract, Vec3};
