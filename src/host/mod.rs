//! Host collaborator interfaces
//!
//! The gameplay systems never own entities, physics or audio. They talk to
//! the host through these traits. `ecs::World` is the in-memory host that
//! implements all of them.

use glam::Vec2;

use crate::body::part::BodyPart;
use crate::core::types::{Angle, Box2, EntityId};
use crate::ecs::component::ComponentKind;
use crate::physics::Fixtures;
use crate::stance::component::{RotationState, SoundSpecifier, StandingState};

/// Component presence, used for event routing
pub trait ComponentQuery {
    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool;
}

/// Replication marker
pub trait SyncHost {
    /// Flag a component as changed for propagation to remote observers
    fn mark_dirty(&mut self, entity: EntityId, kind: ComponentKind);
}

/// Body structure and limb containers
pub trait BodyHost: SyncHost {
    /// Root limb entity held by a body
    fn body_root(&self, body: EntityId) -> Option<EntityId>;

    /// `root` and every limb below it, pre-order
    fn body_parts(&self, root: EntityId) -> Vec<EntityId>;

    fn body_part(&self, part: EntityId) -> Option<&BodyPart>;

    fn body_part_mut(&mut self, part: EntityId) -> Option<&mut BodyPart>;

    /// Detach a limb from whatever contains it
    fn try_remove_from_container(&mut self, part: EntityId) -> bool;

    /// Destroy the whole body
    fn gib_body(&mut self, body: EntityId, gib_organs: bool);
}

/// Transforms, impulses and collision masks
pub trait PhysicsHost {
    fn apply_linear_impulse(&mut self, entity: EntityId, impulse: Vec2);

    fn set_world_rotation(&mut self, entity: EntityId, rotation: Angle);

    fn world_position(&self, entity: EntityId) -> Option<Vec2>;

    fn fixtures(&self, entity: EntityId) -> Option<&Fixtures>;

    fn set_collision_mask(&mut self, entity: EntityId, fixture_id: &str, mask: u32);

    /// Static-body entities whose fixtures overlap `bounds`
    fn intersecting_static(&self, bounds: Box2) -> Vec<EntityId>;
}

/// Movement speed recompute target
pub trait MovementHost {
    fn set_movement_speed_modifiers(&mut self, entity: EntityId, walk: f32, sprint: f32);
}

/// Everything the stance controller touches
pub trait StanceHost: ComponentQuery + SyncHost + PhysicsHost + MovementHost {
    fn standing_state(&self, entity: EntityId) -> Option<&StandingState>;

    fn standing_state_mut(&mut self, entity: EntityId) -> Option<&mut StandingState>;

    fn entity_exists(&self, entity: EntityId) -> bool;

    fn has_hands(&self, entity: EntityId) -> bool;

    fn set_rotation_state(&mut self, entity: EntityId, state: RotationState);

    /// Predicted audio: played locally for `user`, broadcast to others
    fn play_predicted(&mut self, sound: &SoundSpecifier, source: EntityId, user: EntityId);

    fn is_climbable(&self, entity: EntityId) -> bool;

    fn is_climbing(&self, entity: EntityId) -> bool;

    fn forcibly_set_climbing(&mut self, entity: EntityId, climbable: EntityId);
}
