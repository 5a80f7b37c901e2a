//! Steering engine for a swarm of point flyers moving in 3D around attractors.

pub mod flyer;
pub mod neighbors;
pub mod rules;
pub mod simulation;
pub mod sink;
pub mod world;

pub use flyer::{Flyer, Position, Velocity, COLLISION_RADIUS, MAX_ACCELERATION, MAX_VELOCITY};
pub use rules::Steering;
pub use simulation::{SettleOutcome, Simulation, TickReport};
pub use sink::{FrameFileSink, FrameFormat, MemorySink, SnapshotSink};
pub use world::{Attractor, World};
