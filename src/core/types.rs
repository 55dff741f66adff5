//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First block is enough to tell entities apart in logs
        let simple = self.0.simple().to_string();
        write!(f, "{}", &simple[..8])
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Angle(pub f32);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn from_degrees(degrees: f32) -> Self {
        Self(degrees.to_radians())
    }

    /// Unit vector pointing along this angle
    pub fn to_vec(&self) -> Vec2 {
        Vec2::new(self.0.cos(), self.0.sin())
    }

    /// Rotate a vector by this angle
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        let (sin, cos) = self.0.sin_cos();
        Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }
}

impl std::ops::Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Box2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn centered(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn intersects(&self, other: &Box2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_vec() {
        let v = Angle::from_degrees(90.0).to_vec();
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_rotate_round_trip() {
        let angle = Angle::from_degrees(37.0);
        let v = Vec2::new(0.4, -1.2);
        let back = (-angle).rotate(angle.rotate(v));
        assert!((back - v).length() < 1e-5);
    }

    #[test]
    fn test_box_intersection() {
        let a = Box2::centered(Vec2::ZERO, Vec2::splat(0.5));
        let b = Box2::centered(Vec2::new(0.9, 0.0), Vec2::splat(0.5));
        let c = Box2::centered(Vec2::new(2.0, 0.0), Vec2::splat(0.5));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Vec2::new(0.5, -0.5)));
    }

    #[test]
    fn test_entity_display_is_short() {
        let id = EntityId::new();
        assert_eq!(id.to_string().len(), 8);
    }
}
