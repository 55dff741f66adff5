//! Standing and lying down

pub mod component;
pub mod events;
pub mod system;
pub mod toggle;

pub use component::{RotationState, SoundSpecifier, StandingState};
pub use events::{
    AttemptMobCollide, AttemptMobTargetCollide, DownAttempt, Downed, DropHandItems, EndClimb,
    StandAttempt, Stood,
};
pub use system::{is_down, restore_changed_fixtures, DownOptions, StandingStateSystem};
pub use toggle::{handle_input, toggle_prone, InputBindings, InputCommand, Session, ToggleOutcome};
