//! Notifications raised around stance changes
//!
//! Attempt events are cancellable: a listener vetoes by returning
//! `Vote::Veto`. The rest are plain notifications.

use crate::core::types::EntityId;

/// Raised before going down; any veto keeps the entity standing
#[derive(Debug, Clone, Copy, Default)]
pub struct DownAttempt;

/// Raised before standing up; any veto keeps the entity down
#[derive(Debug, Clone, Copy, Default)]
pub struct StandAttempt;

/// Raised after an entity went down
#[derive(Debug, Clone, Copy, Default)]
pub struct Downed;

/// Raised after an entity stood up
#[derive(Debug, Clone, Copy, Default)]
pub struct Stood;

/// Asks whoever holds items for this entity to drop them
#[derive(Debug, Clone, Copy, Default)]
pub struct DropHandItems;

/// Two mobs are about to push each other
#[derive(Debug, Clone, Copy)]
pub struct AttemptMobCollide {
    pub other: EntityId,
}

/// This entity is about to be pushed by a moving mob
#[derive(Debug, Clone, Copy)]
pub struct AttemptMobTargetCollide {
    pub mover: EntityId,
}

/// A climb interaction finished
#[derive(Debug, Clone, Copy)]
pub struct EndClimb {
    pub climbable: Option<EntityId>,
}
