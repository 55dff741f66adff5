//! Toggle-prone input command
//!
//! Pressing the bound key flips the player's attached entity between
//! standing and down. Going down this way is quiet and keeps held items.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::types::EntityId;
use crate::ecs::events::EventBus;
use crate::host::StanceHost;
use crate::stance::system::{DownOptions, StandingStateSystem};

/// Input function bound to toggle-prone by default
pub const TOGGLE_PRONE_FUNCTION: &str = "ToggleStanding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    ToggleProne,
}

/// Maps input function names to commands
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: AHashMap<String, InputCommand>,
}

impl InputBindings {
    /// No bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: AHashMap::new(),
        }
    }

    pub fn bind(&mut self, function: &str, command: InputCommand) {
        self.bindings.insert(function.to_string(), command);
    }

    pub fn unbind(&mut self, function: &str) -> Option<InputCommand> {
        self.bindings.remove(function)
    }

    pub fn command_for(&self, function: &str) -> Option<InputCommand> {
        self.bindings.get(function).copied()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(TOGGLE_PRONE_FUNCTION, InputCommand::ToggleProne);
        bindings
    }
}

/// A connected player
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub name: String,
    /// Entity the player currently controls
    pub attached_entity: Option<EntityId>,
}

impl Session {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attached_entity: None,
        }
    }

    pub fn attached_to(name: &str, entity: EntityId) -> Self {
        Self {
            name: name.to_string(),
            attached_entity: Some(entity),
        }
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToggleOutcome {
    /// No attached entity, or it cannot stand or lie down
    Ignored,
    Downed,
    Stood,
    /// A listener blocked the change
    Vetoed,
}

/// Flip the session's attached entity between standing and down
pub fn toggle_prone<H: StanceHost + 'static>(
    system: &StandingStateSystem,
    host: &mut H,
    bus: &mut EventBus<H>,
    session: &Session,
) -> ToggleOutcome {
    let Some(uid) = session.attached_entity else {
        return ToggleOutcome::Ignored;
    };
    if !host.entity_exists(uid) {
        return ToggleOutcome::Ignored;
    }
    let Some(state) = host.standing_state(uid) else {
        return ToggleOutcome::Ignored;
    };

    if state.standing {
        let options = DownOptions {
            play_sound: false,
            drop_held_items: false,
            force: false,
        };
        if system.down(host, bus, uid, options) {
            ToggleOutcome::Downed
        } else {
            ToggleOutcome::Vetoed
        }
    } else if system.stand(host, bus, uid, false) {
        ToggleOutcome::Stood
    } else {
        ToggleOutcome::Vetoed
    }
}

/// Dispatch an input function pressed by `session`
///
/// Unbound functions are ignored.
pub fn handle_input<H: StanceHost + 'static>(
    bindings: &InputBindings,
    system: &StandingStateSystem,
    host: &mut H,
    bus: &mut EventBus<H>,
    session: &Session,
    function: &str,
) -> ToggleOutcome {
    match bindings.command_for(function) {
        Some(InputCommand::ToggleProne) => {
            tracing::debug!("{} toggles prone", session.name);
            toggle_prone(system, host, bus, session)
        }
        None => ToggleOutcome::Ignored,
    }
}
