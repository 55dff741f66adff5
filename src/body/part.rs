//! Body parts (limbs) and their health

use serde::{Deserialize, Serialize};
use std::fmt;

/// Humanoid body part types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartType {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl PartType {
    /// Returns all part types
    pub fn all() -> [PartType; 6] {
        [
            PartType::Head,
            PartType::Torso,
            PartType::LeftArm,
            PartType::RightArm,
            PartType::LeftLeg,
            PartType::RightLeg,
        ]
    }

    /// Starting max health for a freshly assembled humanoid
    pub fn default_max_health(&self) -> i32 {
        match self {
            PartType::Torso => 150,
            PartType::Head | PartType::LeftLeg | PartType::RightLeg => 80,
            PartType::LeftArm | PartType::RightArm => 70,
        }
    }

    pub fn is_torso(&self) -> bool {
        matches!(self, PartType::Torso)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PartType::Head => "head",
            PartType::Torso => "torso",
            PartType::LeftArm => "left arm",
            PartType::RightArm => "right arm",
            PartType::LeftLeg => "left leg",
            PartType::RightLeg => "right leg",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A limb with independent health
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPart {
    pub part_type: PartType,
    health: i32,
    max_health: i32,
}

impl BodyPart {
    pub fn new(part_type: PartType) -> Self {
        Self::with_max_health(part_type, part_type.default_max_health())
    }

    pub fn with_max_health(part_type: PartType, max_health: i32) -> Self {
        let max_health = max_health.max(0);
        Self {
            part_type,
            health: max_health,
            max_health,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Set health, clamped to `[0, max_health]`
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }

    /// Remaining health as a fraction of max
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}
