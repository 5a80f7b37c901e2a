use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use crate::error::SwarmError;
use crate::sim_params::SimParams;
use std::path::Path;
use std::str::FromStr;

/// Which tick loop drives the swarm.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Separate from nearby flyers, cohere with the flock, approach attractors.
    Flocking,
    /// Settle each flyer against its close neighbors and attractors before moving on.
    Settle,
}

impl LoopMode {
    /// Snapshot cadence used when the config does not set one.
    pub fn default_snapshot_interval(self) -> u64 {
        match self {
            LoopMode::Flocking => 1,
            LoopMode::Settle => 5,
        }
    }
}

impl FromStr for LoopMode {
    type Err = SwarmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flocking" => Ok(LoopMode::Flocking),
            "settle" => Ok(LoopMode::Settle),
            other => Err(SwarmError::InvalidConfig(format!("unknown loop mode '{}'", other))),
        }
    }
}

// Tick loop settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationSection {
    #[serde(default = "default_mode")]
    pub mode: LoopMode,
    #[serde(default = "default_total_ticks")]
    pub total_ticks: u64,
    #[serde(default)]
    pub sleep_ms: u64,
    #[serde(default)]
    pub detect_collisions: bool,
    #[serde(default = "default_max_settle_iterations")]
    pub max_settle_iterations: u32,
}

// Target spacing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DistancesConfig {
    #[serde(default = "default_between_flyers")]
    pub between_flyers: f32,
    #[serde(default = "default_from_attractors")]
    pub from_attractors: f32,
}

// Acceleration scales applied by the flocking loop
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CohesionConfig {
    #[serde(default = "default_separation_scale")]
    pub separation_scale: f32,
    #[serde(default = "default_flock_scale")]
    pub flock_scale: f32,
    #[serde(default = "default_attractor_scale")]
    pub attractor_scale: f32,
}

// Initial population, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    #[serde(default = "default_num_flyers")]
    pub num_flyers: u32,
    /// Each axis is drawn uniformly from `[-spawn_extent, spawn_extent]`.
    #[serde(default = "default_spawn_extent")]
    pub spawn_extent: f32,
    #[serde(default = "default_initial_velocity")]
    pub initial_velocity: [f32; 3],
    #[serde(default)]
    pub seed: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrbitPhase {
    /// x = r cos(a), y = r sin(a)
    CosSin,
    /// x = r sin(a), y = r cos(a)
    SinCos,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AttractorOrbit {
    /// Multiplier applied to the shared orbit radius.
    pub radius_scale: f32,
    pub phase: OrbitPhase,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AttractorConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub orbit: Option<AttractorOrbit>,
}

// Shared orbit motion settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrbitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_orbit_radius")]
    pub radius: f32,
    #[serde(default = "default_orbit_speed")]
    pub speed: f32,
}

// Frame output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_frame_path")]
    pub frame_path: String,
    pub format: Option<String>, // "tsv", "json", "bincode", "messagepack"
    #[serde(default)]
    pub snapshot_interval: Option<u64>,
    #[serde(default)]
    pub label_flyers_by_id: bool,
}

// Main swarm configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SwarmConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub distances: DistancesConfig,
    #[serde(default)]
    pub cohesion: CohesionConfig,
    #[serde(default)]
    pub initial_conditions: InitialConditions,
    #[serde(default = "default_attractors")]
    pub attractors: Vec<AttractorConfig>,
    #[serde(default)]
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SwarmConfig {
    /// Loads the swarm configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to load config from '{}'", path_ref.display()))
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SwarmConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SwarmError> {
        let invalid = |msg: &str| Err(SwarmError::InvalidConfig(msg.to_string()));
        if self.distances.between_flyers <= 0.0 {
            return invalid("distances.between_flyers must be positive");
        }
        if self.distances.from_attractors <= 0.0 {
            return invalid("distances.from_attractors must be positive");
        }
        if self.initial_conditions.num_flyers == 0 {
            return invalid("initial_conditions.num_flyers must be greater than 0");
        }
        if self.initial_conditions.spawn_extent < 0.0 {
            return invalid("initial_conditions.spawn_extent must not be negative");
        }
        if self.simulation.max_settle_iterations == 0 {
            return invalid("simulation.max_settle_iterations must be greater than 0");
        }
        if self.output.snapshot_interval == Some(0) {
            return invalid("output.snapshot_interval must be greater than 0");
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let mode = self.simulation.mode;
        let between = self.distances.between_flyers;

        SimParams {
            mode,
            total_ticks: self.simulation.total_ticks,
            sleep_ms: self.simulation.sleep_ms,
            snapshot_interval: self
                .output
                .snapshot_interval
                .unwrap_or_else(|| mode.default_snapshot_interval())
                .max(1),
            target_distance_between_flyers: between,
            near_distance: between / 3.0,
            target_distance_from_attractors: self.distances.from_attractors,
            separation_scale: self.cohesion.separation_scale,
            flock_scale: self.cohesion.flock_scale,
            attractor_scale: self.cohesion.attractor_scale,
            orbit_enabled: self.orbit.enabled,
            orbit_radius: self.orbit.radius,
            orbit_speed: self.orbit.speed,
            detect_collisions: self.simulation.detect_collisions,
            max_settle_iterations: self.simulation.max_settle_iterations,
            label_flyers_by_id: self.output.label_flyers_by_id,
        }
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        SwarmConfig {
            simulation: SimulationSection::default(),
            distances: DistancesConfig::default(),
            cohesion: CohesionConfig::default(),
            initial_conditions: InitialConditions::default(),
            attractors: default_attractors(),
            orbit: OrbitConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        SimulationSection {
            mode: default_mode(),
            total_ticks: default_total_ticks(),
            sleep_ms: 0,
            detect_collisions: false,
            max_settle_iterations: default_max_settle_iterations(),
        }
    }
}

impl Default for DistancesConfig {
    fn default() -> Self {
        DistancesConfig {
            between_flyers: default_between_flyers(),
            from_attractors: default_from_attractors(),
        }
    }
}

impl Default for CohesionConfig {
    fn default() -> Self {
        CohesionConfig {
            separation_scale: default_separation_scale(),
            flock_scale: default_flock_scale(),
            attractor_scale: default_attractor_scale(),
        }
    }
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions {
            num_flyers: default_num_flyers(),
            spawn_extent: default_spawn_extent(),
            initial_velocity: default_initial_velocity(),
            seed: 0,
        }
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            enabled: true,
            radius: default_orbit_radius(),
            speed: default_orbit_speed(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            frame_path: default_frame_path(),
            format: None,
            snapshot_interval: None,
            label_flyers_by_id: false,
        }
    }
}

fn default_mode() -> LoopMode {
    LoopMode::Flocking
}

fn default_total_ticks() -> u64 {
    100_000_000
}

fn default_max_settle_iterations() -> u32 {
    1000
}

fn default_between_flyers() -> f32 {
    20.0
}

fn default_from_attractors() -> f32 {
    50.0
}

fn default_separation_scale() -> f32 {
    1.0
}

fn default_flock_scale() -> f32 {
    1e-2
}

fn default_attractor_scale() -> f32 {
    1e-1
}

fn default_num_flyers() -> u32 {
    200
}

fn default_spawn_extent() -> f32 {
    200.0
}

fn default_initial_velocity() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_true() -> bool {
    true
}

fn default_orbit_radius() -> f32 {
    100.0
}

fn default_orbit_speed() -> f32 {
    1.0
}

fn default_frame_path() -> String {
    "frame.txt".to_string()
}

// Two driven orbits plus a third attractor resting at the origin.
fn default_attractors() -> Vec<AttractorConfig> {
    vec![
        AttractorConfig {
            id: Some("0".to_string()),
            position: [0.0; 3],
            orbit: Some(AttractorOrbit { radius_scale: 0.5, phase: OrbitPhase::CosSin }),
        },
        AttractorConfig {
            id: Some("1".to_string()),
            position: [0.0; 3],
            orbit: Some(AttractorOrbit { radius_scale: 1.5, phase: OrbitPhase::SinCos }),
        },
        AttractorConfig {
            id: Some("2".to_string()),
            position: [0.0; 3],
            orbit: None,
        },
    ]
}
