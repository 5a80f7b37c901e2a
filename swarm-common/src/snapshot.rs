use serde::{Deserialize, Serialize};

/// Label used for attractor points in exported frames.
pub const ATTRACTOR_LABEL: &str = "💰";
/// Label used for flyers when they are not labelled by id.
pub const FLYER_LABEL: &str = "*";

/// One labelled point in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub label: String,
}

impl SnapshotPoint {
    pub fn new(x: f32, y: f32, z: f32, label: impl Into<String>) -> Self {
        SnapshotPoint { x, y, z, label: label.into() }
    }
}

/// A point-in-time export of all attractor and flyer positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick index at which the snapshot was taken.
    pub tick: u64,
    pub attractors: Vec<SnapshotPoint>,
    pub flyers: Vec<SnapshotPoint>,
}

impl Snapshot {
    /// All points, attractors first, in frame order.
    pub fn points(&self) -> impl Iterator<Item = &SnapshotPoint> {
        self.attractors.iter().chain(self.flyers.iter())
    }
}
