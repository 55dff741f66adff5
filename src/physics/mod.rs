//! Physics-side component data the gameplay layer reads and writes
//!
//! Only bookkeeping lives here: collision masks, transforms and accumulated
//! impulses. Collision resolution belongs to the host.

pub mod fixture;

pub use fixture::{collision_group, Fixture, Fixtures};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::Angle;

/// World placement of an entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: Angle,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: Angle::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Static,
    Dynamic,
}

/// Rigid body state tracked for an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub body_type: BodyType,
    pub mass: f32,
    pub linear_velocity: Vec2,
}

impl PhysicsBody {
    pub fn dynamic(mass: f32) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass,
            linear_velocity: Vec2::ZERO,
        }
    }

    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            mass: 0.0,
            linear_velocity: Vec2::ZERO,
        }
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Instantaneous change in momentum
    pub fn apply_linear_impulse(&mut self, impulse: Vec2) {
        if self.is_static() || self.mass <= 0.0 {
            return;
        }
        self.linear_velocity += impulse / self.mass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_divides_by_mass() {
        let mut body = PhysicsBody::dynamic(2.0);
        body.apply_linear_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(body.linear_velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_static_body_ignores_impulse() {
        let mut body = PhysicsBody::fixed();
        body.apply_linear_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(body.linear_velocity, Vec2::ZERO);
    }
}
