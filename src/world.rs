use anyhow::Result;
use rand::distr::Uniform;
use rand::prelude::*;
use swarm_common::{
    AttractorConfig, AttractorOrbit, OrbitPhase, SimParams, Snapshot, SnapshotPoint, SwarmConfig,
    ATTRACTOR_LABEL, FLYER_LABEL,
};

use crate::flyer::{Flyer, Position, Velocity};

/// A flyer other agents steer toward, optionally driven along a circular orbit.
#[derive(Debug, Clone)]
pub struct Attractor {
    pub body: Flyer,
    pub orbit: Option<AttractorOrbit>,
}

impl Attractor {
    pub fn fixed(position: Position) -> Self {
        Attractor { body: Flyer::stationary(position), orbit: None }
    }

    fn from_config(config: &AttractorConfig) -> Self {
        let [x, y, z] = config.position;
        Attractor {
            body: Flyer::new(config.id.clone(), Position::new(x, y, z), Velocity::default()),
            orbit: config.orbit.clone(),
        }
    }
}

/// The flyer population and attractor set. Neither list changes shape after
/// construction; only element contents are mutated.
#[derive(Debug, Clone)]
pub struct World {
    pub flyers: Vec<Flyer>,
    pub attractors: Vec<Attractor>,
}

impl World {
    /// Places the initial population and the configured attractors.
    pub fn new(config: &SwarmConfig, rng: &mut StdRng) -> Result<Self> {
        let flyers = place_initial_flyers(config, rng)?;
        let attractors = config.attractors.iter().map(Attractor::from_config).collect();
        Ok(World { flyers, attractors })
    }

    pub fn from_parts(flyers: Vec<Flyer>, attractors: Vec<Attractor>) -> Self {
        World { flyers, attractors }
    }

    /// Borrowed view of every attractor body.
    pub fn attractor_bodies(&self) -> Vec<&Flyer> {
        self.attractors.iter().map(|a| &a.body).collect()
    }

    /// Moves orbiting attractors to their position for `tick`. The orbit angle
    /// advances one degree per tick and wraps every 360 ticks.
    pub fn advance_orbits(&mut self, tick: u64, params: &SimParams) {
        let angle_deg = (tick % 360) as f32;
        let angle = params.orbit_speed * angle_deg.to_radians();
        for attractor in &mut self.attractors {
            let Some(orbit) = &attractor.orbit else { continue };
            let radius = params.orbit_radius * orbit.radius_scale;
            let (x, y) = match orbit.phase {
                OrbitPhase::CosSin => (radius * angle.cos(), radius * angle.sin()),
                OrbitPhase::SinCos => (radius * angle.sin(), radius * angle.cos()),
            };
            attractor.body.position.x = x;
            attractor.body.position.y = y;
        }
    }

    /// Exports every position as labelled points.
    pub fn snapshot(&self, tick: u64, label_flyers_by_id: bool) -> Snapshot {
        let point = |flyer: &Flyer, label: &str| {
            SnapshotPoint::new(flyer.position.x, flyer.position.y, flyer.position.z, label)
        };
        Snapshot {
            tick,
            attractors: self.attractors.iter().map(|a| point(&a.body, ATTRACTOR_LABEL)).collect(),
            flyers: self
                .flyers
                .iter()
                .map(|f| {
                    let label = match (&f.id, label_flyers_by_id) {
                        (Some(id), true) => id.as_str(),
                        _ => FLYER_LABEL,
                    };
                    point(f, label)
                })
                .collect(),
        }
    }
}

/// Scatters the initial population uniformly inside the spawn cube.
fn place_initial_flyers(config: &SwarmConfig, rng: &mut StdRng) -> Result<Vec<Flyer>> {
    let ic = &config.initial_conditions;
    let extent = ic.spawn_extent;
    let axis = Uniform::new_inclusive(-extent, extent)?;
    let [dx, dy, dz] = ic.initial_velocity;

    let flyers = (0..ic.num_flyers)
        .map(|i| {
            let position = Position::new(rng.sample(axis), rng.sample(axis), rng.sample(axis));
            Flyer::new(Some(i.to_string()), position, Velocity::new(dx, dy, dz))
        })
        .collect();
    Ok(flyers)
}
