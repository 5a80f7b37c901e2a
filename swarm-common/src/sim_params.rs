use serde::{Deserialize, Serialize};

use crate::config::LoopMode;

/// Simulation parameters derived from the configuration, used frequently during ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    pub mode: LoopMode,

    // Ticks
    pub total_ticks: u64,
    pub sleep_ms: u64,
    pub snapshot_interval: u64,

    // Distances
    pub target_distance_between_flyers: f32,
    pub near_distance: f32, // Settle threshold (between_flyers / 3)
    pub target_distance_from_attractors: f32,

    // Rule scales
    pub separation_scale: f32,
    pub flock_scale: f32,
    pub attractor_scale: f32,

    // Orbits
    pub orbit_enabled: bool,
    pub orbit_radius: f32,
    pub orbit_speed: f32,

    pub detect_collisions: bool,
    pub max_settle_iterations: u32,
    pub label_flyers_by_id: bool,
}
