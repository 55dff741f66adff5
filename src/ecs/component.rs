//! Component kinds and lifecycle stages
//!
//! Events are routed by component kind, and dirty marks name the kind that
//! changed, so every component the gameplay layer touches has a tag here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Body,
    BodyPart,
    StandingState,
    Fixtures,
    Physics,
    Transform,
    Appearance,
    Hands,
    Climbable,
    Climbing,
    MovementSpeed,
    PartZones,
}

/// Where a component is in its lifetime
///
/// Ordered: anything at or before `Starting` has not been seen by a player yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum LifeStage {
    PreAdd,
    Added,
    Initialized,
    #[default]
    Starting,
    Running,
    Stopping,
    Deleted,
}

impl LifeStage {
    /// Still being constructed or streamed in
    pub fn is_starting(&self) -> bool {
        *self <= LifeStage::Starting
    }
}
