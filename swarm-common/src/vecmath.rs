use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::SwarmError;

/// A simple 3D vector struct.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    /// Creates a zero vector.
    pub fn zero() -> Self {
        Vec3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Creates a vector in the x/y plane (z = 0).
    pub fn planar(x: f32, y: f32) -> Self {
        Vec3 { x, y, z: 0.0 }
    }

    /// Drops the z component.
    pub fn to_planar(self) -> Self {
        Vec3::planar(self.x, self.y)
    }

    /// True when every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Calculates the squared length (magnitude) of the vector.
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculates the length (magnitude) of the vector.
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector pointing the same way.
    ///
    /// Fails with [`SwarmError::DegenerateGeometry`] on the zero vector, so call
    /// sites that can produce one must check [`Vec3::is_zero`] first.
    pub fn normalize(&self) -> Result<Self, SwarmError> {
        if self.is_zero() {
            return Err(SwarmError::DegenerateGeometry("cannot normalize a zero vector"));
        }
        Ok(self.scale(1.0 / self.length()))
    }

    /// Calculates the distance to another vector (point).
    pub fn distance(&self, other: Vec3) -> f32 {
        (other - *self).length()
    }

    /// Scales the vector by a scalar value. Direction is preserved for positive scalars.
    pub fn scale(&self, scalar: f32) -> Self {
        Vec3 { x: self.x * scalar, y: self.y * scalar, z: self.z * scalar }
    }

    /// Clamps each component independently to `[-max, max]`.
    /// This is a per-axis clamp, never a magnitude clamp.
    pub fn clamp_components(&self, max: f32) -> Self {
        Vec3 {
            x: clamp(self.x, -max, max),
            y: clamp(self.y, -max, max),
            z: clamp(self.z, -max, max),
        }
    }

    /// Arithmetic mean of a set of points, `None` for an empty set.
    pub fn centroid<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut sum = Vec3::zero();
        let mut count = 0usize;
        for p in points {
            sum = sum + p;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y, z: self.z - other.z }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        self.scale(scalar)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self { x: self.x / scalar, y: self.y / scalar, z: self.z / scalar }
    }
}

/// Vector from `b` to `a` (`a - b`).
pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

/// Clamps a value between a minimum and maximum.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
