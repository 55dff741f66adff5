//! Stand/prone state machine
//!
//! Two states, `Standing` and `Down`. Going down clears the mid-impassable
//! bit on every fixture that had it, so the entity can crawl under tables;
//! standing up puts the bits back, unless the entity ends up on top of a
//! climbable, in which case the climb takes over its collision.

use crate::core::config::StanceConfig;
use crate::core::types::{Box2, EntityId};
use crate::ecs::component::ComponentKind;
use crate::ecs::events::{EventBus, Vote};
use crate::host::StanceHost;
use crate::movement::{refresh_movement_speed, RefreshMovementSpeedModifiers};
use crate::physics::collision_group;
use crate::stance::component::RotationState;
use crate::stance::events::{
    AttemptMobCollide, AttemptMobTargetCollide, DownAttempt, Downed, DropHandItems, EndClimb,
    StandAttempt, Stood,
};
use glam::Vec2;

/// Collision bit toggled by stance
///
/// Only a single layer is handled; the restore logic assumes one bit.
const STANDING_COLLISION_LAYER: u32 = collision_group::MID_IMPASSABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownOptions {
    pub play_sound: bool,
    /// Drop held items first; happens even if going down is then vetoed
    pub drop_held_items: bool,
    /// Skip the cancellable attempt notification
    pub force: bool,
}

impl Default for DownOptions {
    fn default() -> Self {
        Self {
            play_sound: true,
            drop_held_items: true,
            force: false,
        }
    }
}

/// Is the entity down? False when it has no standing state at all.
pub fn is_down<H: StanceHost>(host: &H, uid: EntityId) -> bool {
    host.standing_state(uid)
        .map(|state| state.is_down())
        .unwrap_or(false)
}

pub struct StandingStateSystem {
    config: StanceConfig,
}

impl StandingStateSystem {
    pub fn new(config: StanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StanceConfig {
        &self.config
    }

    /// Hook collision vetoes, the speed modifier and the end-of-climb fixup
    pub fn register<H: StanceHost + 'static>(&self, bus: &mut EventBus<H>) {
        bus.subscribe::<AttemptMobCollide>(ComponentKind::StandingState, |host, uid, _| {
            Vote::veto_if(is_down(host, uid))
        });

        bus.subscribe::<AttemptMobTargetCollide>(ComponentKind::StandingState, |host, uid, _| {
            Vote::veto_if(is_down(host, uid))
        });

        let multiplier = self.config.down_speed_multiplier;
        bus.subscribe::<RefreshMovementSpeedModifiers>(
            ComponentKind::StandingState,
            move |host, uid, ev| {
                if is_down(host, uid) {
                    ev.modify_speed(multiplier);
                }
                Vote::Allow
            },
        );

        // A climb can end without going through stand()
        bus.subscribe::<EndClimb>(ComponentKind::StandingState, |host, uid, _| {
            restore_changed_fixtures(host, uid);
            Vote::Allow
        });
    }

    /// Knock the entity down
    ///
    /// Returns true if the entity is down afterwards (including when it
    /// already was), false if it has no standing state or a listener vetoed.
    pub fn down<H: StanceHost + 'static>(
        &self,
        host: &mut H,
        bus: &mut EventBus<H>,
        uid: EntityId,
        options: DownOptions,
    ) -> bool {
        let Some(state) = host.standing_state(uid) else {
            return false;
        };
        if !state.standing {
            return true;
        }

        if options.drop_held_items && host.has_hands(uid) {
            bus.raise(host, uid, &mut DropHandItems);
        }

        if !options.force && bus.raise(host, uid, &mut DownAttempt).is_vetoed() {
            return false;
        }

        let Some(state) = host.standing_state_mut(uid) else {
            return false;
        };
        state.standing = false;
        host.mark_dirty(uid, ComponentKind::StandingState);
        bus.raise(host, uid, &mut Downed);
        refresh_movement_speed(host, bus, uid);
        host.set_rotation_state(uid, RotationState::Horizontal);

        // Let the entity slide under tables and flaps
        let blocking: Vec<(String, u32)> = host
            .fixtures(uid)
            .map(|fixtures| {
                fixtures
                    .iter()
                    .filter(|(_, fixture)| fixture.has_mask_bits(STANDING_COLLISION_LAYER))
                    .map(|(key, fixture)| (key.clone(), fixture.mask))
                    .collect()
            })
            .unwrap_or_default();

        for (key, mask) in blocking {
            host.set_collision_mask(uid, &key, mask & !STANDING_COLLISION_LAYER);
            if let Some(state) = host.standing_state_mut(uid) {
                state.changed_fixtures.insert(key);
            }
        }

        let Some(state) = host.standing_state(uid) else {
            return true;
        };

        // Just added or streamed in: nobody saw it fall
        if state.life_stage.is_starting() {
            return true;
        }

        if options.play_sound {
            let sound = state.down_sound.clone();
            host.play_predicted(&sound, uid, uid);
        }

        true
    }

    /// Get the entity back up
    ///
    /// Returns true if the entity is standing afterwards, false if it has no
    /// standing state or a listener vetoed.
    pub fn stand<H: StanceHost + 'static>(
        &self,
        host: &mut H,
        bus: &mut EventBus<H>,
        uid: EntityId,
        force: bool,
    ) -> bool {
        let Some(state) = host.standing_state(uid) else {
            return false;
        };
        if state.standing {
            return true;
        }

        if !force && bus.raise(host, uid, &mut StandAttempt).is_vetoed() {
            return false;
        }

        let Some(state) = host.standing_state_mut(uid) else {
            return false;
        };
        state.standing = true;
        host.mark_dirty(uid, ComponentKind::StandingState);
        bus.raise(host, uid, &mut Stood);
        refresh_movement_speed(host, bus, uid);
        host.set_rotation_state(uid, RotationState::Vertical);

        // Climbing manages collision on its own
        if self.try_climb_on_stand(host, uid) {
            return true;
        }

        restore_changed_fixtures(host, uid);
        true
    }

    /// Start climbing a climbable the entity is standing up on
    fn try_climb_on_stand<H: StanceHost>(&self, host: &mut H, uid: EntityId) -> bool {
        let Some(position) = host.world_position(uid) else {
            return false;
        };
        let bounds = Box2::centered(position, Vec2::splat(self.config.climb_probe_half_extent));

        for other in host.intersecting_static(bounds) {
            if other == uid || !host.is_climbable(other) {
                continue;
            }
            if !host.is_climbing(uid) {
                host.forcibly_set_climbing(uid, other);
                return true;
            }
        }
        false
    }
}

/// Put the mid-impassable bit back on every recorded fixture and forget them
///
/// Returns how many fixtures were restored. Safe to call repeatedly: once
/// the set is empty it does nothing.
pub fn restore_changed_fixtures<H: StanceHost>(host: &mut H, uid: EntityId) -> usize {
    let Some(state) = host.standing_state_mut(uid) else {
        return 0;
    };
    if state.changed_fixtures.is_empty() {
        return 0;
    }
    let changed = std::mem::take(&mut state.changed_fixtures);
    host.mark_dirty(uid, ComponentKind::StandingState);

    let mut restored = 0;
    for key in changed {
        let Some(mask) = host
            .fixtures(uid)
            .and_then(|fixtures| fixtures.get(&key))
            .map(|fixture| fixture.mask)
        else {
            continue;
        };
        host.set_collision_mask(uid, &key, mask | STANDING_COLLISION_LAYER);
        restored += 1;
    }
    restored
}
