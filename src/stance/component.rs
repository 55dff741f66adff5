//! Standing state component

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ecs::component::LifeStage;

/// Sprite orientation driven by stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationState {
    #[default]
    Vertical,
    Horizontal,
}

/// Path of a sound resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundSpecifier(pub String);

impl Default for SoundSpecifier {
    fn default() -> Self {
        Self("/Audio/Effects/thudswoosh.ogg".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingState {
    pub standing: bool,

    /// Fixtures whose mid-impassable mask bit was cleared on going down
    pub changed_fixtures: BTreeSet<String>,

    pub down_sound: SoundSpecifier,

    /// Not replicated; tracked by the host
    #[serde(skip)]
    pub life_stage: LifeStage,
}

impl Default for StandingState {
    fn default() -> Self {
        Self {
            standing: true,
            changed_fixtures: BTreeSet::new(),
            down_sound: SoundSpecifier::default(),
            life_stage: LifeStage::Starting,
        }
    }
}

impl StandingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self) -> bool {
        !self.standing
    }
}
