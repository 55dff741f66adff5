//! Movement speed modifiers
//!
//! Systems never set speed directly. A refresh raises
//! `RefreshMovementSpeedModifiers`, every interested listener multiplies its
//! factor in, and the product is handed back to the host.

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::ecs::events::EventBus;
use crate::host::{ComponentQuery, MovementHost};

/// Current walk/sprint multipliers of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSpeedModifier {
    pub walk: f32,
    pub sprint: f32,
}

impl Default for MovementSpeedModifier {
    fn default() -> Self {
        Self { walk: 1.0, sprint: 1.0 }
    }
}

/// Collects speed factors from listeners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshMovementSpeedModifiers {
    pub walk: f32,
    pub sprint: f32,
}

impl Default for RefreshMovementSpeedModifiers {
    fn default() -> Self {
        Self { walk: 1.0, sprint: 1.0 }
    }
}

impl RefreshMovementSpeedModifiers {
    /// Same factor for walking and sprinting
    pub fn modify_speed(&mut self, multiplier: f32) {
        self.walk *= multiplier;
        self.sprint *= multiplier;
    }
}

/// Recompute an entity's speed multipliers from all listeners
pub fn refresh_movement_speed<H>(host: &mut H, bus: &mut EventBus<H>, entity: EntityId)
where
    H: ComponentQuery + MovementHost + 'static,
{
    let mut ev = RefreshMovementSpeedModifiers::default();
    bus.raise(host, entity, &mut ev);
    host.set_movement_speed_modifiers(entity, ev.walk, ev.sprint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_multiply() {
        let mut ev = RefreshMovementSpeedModifiers::default();
        ev.modify_speed(0.5);
        ev.modify_speed(0.2);
        assert!((ev.walk - 0.1).abs() < 1e-6);
        assert!((ev.sprint - 0.1).abs() < 1e-6);
    }
}
