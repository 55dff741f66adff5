//! Fixtures and collision groups

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::Box2;

/// Collision layer bits
pub mod collision_group {
    pub const OPAQUE: u32 = 1 << 0;
    pub const IMPASSABLE: u32 = 1 << 1;
    /// Waist-height obstacles: tables, flaps. Cleared while down.
    pub const MID_IMPASSABLE: u32 = 1 << 2;
    pub const HIGH_IMPASSABLE: u32 = 1 << 3;
    pub const LOW_IMPASSABLE: u32 = 1 << 4;
    pub const BULLET_IMPASSABLE: u32 = 1 << 6;

    pub const MOB_MASK: u32 = IMPASSABLE | HIGH_IMPASSABLE | MID_IMPASSABLE | LOW_IMPASSABLE;
    pub const MOB_LAYER: u32 = OPAQUE | BULLET_IMPASSABLE;
    pub const TABLE_LAYER: u32 = MID_IMPASSABLE;
}

/// A named collision shape on a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub layer: u32,
    pub mask: u32,
    /// Shape bounds relative to the owning entity
    pub bounds: Box2,
}

impl Fixture {
    pub fn has_mask_bits(&self, bits: u32) -> bool {
        self.mask & bits != 0
    }
}

/// All fixtures of one entity, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixtures {
    pub fixtures: BTreeMap<String, Fixture>,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, fixture: Fixture) -> Self {
        self.fixtures.insert(id.to_string(), fixture);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Fixture> {
        self.fixtures.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Fixture)> {
        self.fixtures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_mob_mask_includes_mid_impassable() {
        let fixture = Fixture {
            layer: collision_group::MOB_LAYER,
            mask: collision_group::MOB_MASK,
            bounds: Box2::centered(Vec2::ZERO, Vec2::splat(0.35)),
        };
        assert!(fixture.has_mask_bits(collision_group::MID_IMPASSABLE));
        assert!(!fixture.has_mask_bits(collision_group::OPAQUE));
    }
}
