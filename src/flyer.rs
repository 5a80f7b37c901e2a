use serde::{Deserialize, Serialize};
use swarm_common::{clamp, SwarmError, Vec3};

use crate::rules::Steering;

/// Per-axis cap on the acceleration a single rule may apply.
pub const MAX_ACCELERATION: f32 = 1.0;
/// Per-axis cap on velocity.
pub const MAX_VELOCITY: f32 = 1.0;
/// Flyers closer than this have collided.
pub const COLLISION_RADIUS: f32 = 1.0;

/// A point in 3D space.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Position { x, y, z }
    }

    pub fn to_vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2) + (other.z - self.z).powi(2)).sqrt()
    }

    /// `self - other` as a vector.
    pub fn difference(&self, other: &Position) -> Vec3 {
        self.to_vector() - other.to_vector()
    }
}

/// Per-tick displacement.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
}

impl Velocity {
    pub fn new(dx: f32, dy: f32, dz: f32) -> Self {
        Velocity { dx, dy, dz }
    }

    pub fn to_vector(self) -> Vec3 {
        Vec3::new(self.dx, self.dy, self.dz)
    }

    pub fn to_planar(self) -> Vec3 {
        Vec3::planar(self.dx, self.dy)
    }
}

/// A simulated agent or attractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flyer {
    pub id: Option<String>,
    pub position: Position,
    pub velocity: Velocity,
}

impl Flyer {
    pub fn new(id: Option<String>, position: Position, velocity: Velocity) -> Self {
        Flyer { id, position, velocity }
    }

    /// A motionless, unnamed flyer; the usual shape of an attractor.
    pub fn stationary(position: Position) -> Self {
        Flyer::new(None, position, Velocity::default())
    }

    pub fn distance_to(&self, other: &Flyer) -> f32 {
        self.position.distance_to(&other.position)
    }

    /// Fails with [`SwarmError::Collision`] when any of `others` lies inside the
    /// collision radius. Never mutates state.
    pub fn check_collision(&self, others: &[&Flyer]) -> Result<(), SwarmError> {
        let nearest = others
            .iter()
            .map(|other| self.distance_to(other))
            .fold(f32::INFINITY, f32::min);
        if nearest < COLLISION_RADIUS {
            return Err(SwarmError::Collision { distance: nearest, radius: COLLISION_RADIUS });
        }
        Ok(())
    }

    /// Adds a rule's acceleration to the velocity, then clamps each touched axis
    /// to `[-MAX_VELOCITY, MAX_VELOCITY]`. Planar steering leaves `dz` alone.
    pub fn steer(&mut self, steering: Steering) {
        let a = steering.acceleration;
        self.velocity.dx = clamp(self.velocity.dx + a.x, -MAX_VELOCITY, MAX_VELOCITY);
        self.velocity.dy = clamp(self.velocity.dy + a.y, -MAX_VELOCITY, MAX_VELOCITY);
        if !steering.planar {
            self.velocity.dz = clamp(self.velocity.dz + a.z, -MAX_VELOCITY, MAX_VELOCITY);
        }
    }

    /// Applies an optional steering result; `None` means no correction.
    pub fn steer_opt(&mut self, steering: Option<Steering>) {
        if let Some(steering) = steering {
            self.steer(steering);
        }
    }

    /// Integrates velocity into position. Positions are unbounded.
    pub fn update(&mut self) {
        self.position.x += self.velocity.dx;
        self.position.y += self.velocity.dy;
        self.position.z += self.velocity.dz;
    }
}
