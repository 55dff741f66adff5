//! Body part zones for picking a limb by cursor position
//!
//! Zone anchors live in a normalized sprite frame: x and y in [-1, 1], with
//! negative y towards the head. A humanoid sprite is assumed to be 1 × 2 world
//! units.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::body::part::PartType;
use crate::core::types::Angle;

/// Sprite size the zones are normalized against
const SPRITE_SIZE: Vec2 = Vec2::new(1.0, 2.0);

/// Squared distance beyond which a click hits no zone
const MAX_ZONE_DISTANCE_SQ: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartZones {
    pub zones: Vec<(Vec2, PartType)>,
}

impl Default for PartZones {
    fn default() -> Self {
        Self {
            zones: vec![
                (Vec2::new(0.0, -0.8), PartType::Head),
                (Vec2::new(0.0, -0.3), PartType::Torso),
                (Vec2::new(-0.5, -0.3), PartType::LeftArm),
                (Vec2::new(0.5, -0.3), PartType::RightArm),
                (Vec2::new(-0.3, 0.5), PartType::LeftLeg),
                (Vec2::new(0.3, 0.5), PartType::RightLeg),
            ],
        }
    }
}

impl PartZones {
    /// Body part under `click_pos` on a target at `target_pos` rotated by `target_rotation`
    pub fn part_at_position(
        &self,
        target_pos: Vec2,
        target_rotation: Angle,
        click_pos: Vec2,
    ) -> Option<PartType> {
        let local = (-target_rotation).rotate(click_pos - target_pos);
        let normalized = (local / (SPRITE_SIZE / 2.0)).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        self.nearest(normalized)
    }

    /// Closest zone anchor to a normalized point
    pub fn nearest(&self, point: Vec2) -> Option<PartType> {
        let (distance, part) = self
            .zones
            .iter()
            .map(|(anchor, part)| (anchor.distance_squared(point), *part))
            .min_by(|a, b| a.0.total_cmp(&b.0))?;

        (distance <= MAX_ZONE_DISTANCE_SQ).then_some(part)
    }
}
