//! Simulation - wires the reference host, the event bus and both systems
//!
//! The bus is kept apart from the world so a handler can borrow the world
//! mutably while the bus dispatches. Stance transitions are driven from out
//! here, never from inside a handler.

use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

use crate::body::damage::{DamageChanged, DamageSpecifier};
use crate::body::examine::{self, ExaminedEvent};
use crate::body::router::{DamageLog, DamageOutcome, DamageRouter};
use crate::body::tree::Body;
use crate::body::zones::PartZones;
use crate::core::config::ModConfig;
use crate::core::error::Result;
use crate::core::random::{RandomSource, SimRng};
use crate::core::types::{Box2, EntityId};
use crate::ecs::events::{EventBus, Vote};
use crate::ecs::sync::ComponentDelta;
use crate::ecs::world::World;
use crate::movement::refresh_movement_speed;
use crate::physics::{collision_group, Fixture, Fixtures, PhysicsBody};
use crate::stance::component::StandingState;
use crate::stance::events::{AttemptMobCollide, AttemptMobTargetCollide, EndClimb};
use crate::stance::system::{DownOptions, StandingStateSystem};
use crate::stance::toggle::{handle_input, toggle_prone, InputBindings, Session, ToggleOutcome};

/// Mass of a freshly spawned humanoid
const HUMANOID_MASS: f32 = 70.0;

/// Fixture id used for the main collision shape of spawned entities
pub const MAIN_FIXTURE: &str = "fix1";

pub struct Simulation {
    pub world: World,
    pub bus: EventBus<World>,
    pub bindings: InputBindings,
    stance: StandingStateSystem,
    config: ModConfig,
    damage_log: DamageLog,
}

impl Simulation {
    /// Simulation with a seeded random source
    pub fn new(config: ModConfig, seed: u64) -> Self {
        Self::with_random(config, SimRng::seeded(seed))
    }

    /// Simulation whose damage router draws from `rng`
    pub fn with_random<R: RandomSource + 'static>(config: ModConfig, rng: R) -> Self {
        let mut bus: EventBus<World> = EventBus::new();
        let damage_log: DamageLog = Rc::new(RefCell::new(Vec::new()));

        DamageRouter::new(config.damage.clone(), rng).register(&mut bus, damage_log.clone());

        let stance = StandingStateSystem::new(config.stance.clone());
        stance.register(&mut bus);

        examine::register(&mut bus);

        Self {
            world: World::new(),
            bus,
            bindings: InputBindings::default(),
            stance,
            config,
            damage_log,
        }
    }

    pub fn config(&self) -> &ModConfig {
        &self.config
    }

    pub fn stance(&self) -> &StandingStateSystem {
        &self.stance
    }

    /// Spawn a standing humanoid with a full body at `position`
    pub fn spawn_humanoid(&mut self, name: &str, position: Vec2) -> EntityId {
        let uid = self.world.spawn_at(name, position);
        self.world.insert_body(uid, Body::humanoid());
        self.world.insert_physics(uid, PhysicsBody::dynamic(HUMANOID_MASS));
        self.world.insert_fixtures(
            uid,
            Fixtures::new().with(
                MAIN_FIXTURE,
                Fixture {
                    layer: collision_group::MOB_LAYER,
                    mask: collision_group::MOB_MASK,
                    bounds: Box2::centered(Vec2::ZERO, Vec2::splat(0.35)),
                },
            ),
        );
        self.world.insert_standing_state(uid, StandingState::new());
        self.world.insert_hands(uid);
        self.world.insert_climbing(uid);
        self.world.insert_part_zones(uid, PartZones::default());
        refresh_movement_speed(&mut self.world, &mut self.bus, uid);

        tracing::debug!("Spawned humanoid {} ({}) at {}", name, uid, position);
        uid
    }

    /// Spawn a static climbable table at `position`
    pub fn spawn_table(&mut self, position: Vec2) -> EntityId {
        let uid = self.world.spawn_at("table", position);
        self.world.insert_physics(uid, PhysicsBody::fixed());
        self.world.insert_fixtures(
            uid,
            Fixtures::new().with(
                MAIN_FIXTURE,
                Fixture {
                    layer: collision_group::TABLE_LAYER,
                    mask: 0,
                    bounds: Box2::centered(Vec2::ZERO, Vec2::splat(0.45)),
                },
            ),
        );
        self.world.insert_climbable(uid);
        uid
    }

    /// Apply a damage increase to `body` and return what the router did
    pub fn apply_damage(&mut self, body: EntityId, delta: DamageSpecifier) -> Option<DamageOutcome> {
        let before = self.damage_log.borrow().len();
        let mut ev = DamageChanged::increased(delta);
        self.bus.raise(&mut self.world, body, &mut ev);

        self.damage_log.borrow().get(before).cloned()
    }

    /// Every outcome recorded so far
    pub fn damage_outcomes(&self) -> Vec<DamageOutcome> {
        self.damage_log.borrow().clone()
    }

    pub fn down(&mut self, uid: EntityId, options: DownOptions) -> bool {
        self.stance.down(&mut self.world, &mut self.bus, uid, options)
    }

    pub fn stand(&mut self, uid: EntityId, force: bool) -> bool {
        self.stance.stand(&mut self.world, &mut self.bus, uid, force)
    }

    /// Leave a climbable; returns what was being climbed
    pub fn end_climb(&mut self, uid: EntityId) -> Option<EntityId> {
        let climbable = self.world.stop_climbing(uid);
        self.bus
            .raise(&mut self.world, uid, &mut EndClimb { climbable });
        climbable
    }

    pub fn toggle_prone(&mut self, session: &Session) -> ToggleOutcome {
        toggle_prone(&self.stance, &mut self.world, &mut self.bus, session)
    }

    /// Dispatch a bound input function for `session`
    pub fn input(&mut self, session: &Session, function: &str) -> ToggleOutcome {
        handle_input(
            &self.bindings,
            &self.stance,
            &mut self.world,
            &mut self.bus,
            session,
            function,
        )
    }

    /// Would `mover` physically push `target`? Both sides get a say.
    pub fn mobs_collide(&mut self, mover: EntityId, target: EntityId) -> bool {
        let mover_vote = self
            .bus
            .raise(&mut self.world, mover, &mut AttemptMobCollide { other: target });
        let target_vote = self
            .bus
            .raise(&mut self.world, target, &mut AttemptMobTargetCollide { mover });
        mover_vote.and(target_vote) == Vote::Allow
    }

    /// Examine `target` at a world position; returns the collected lines
    pub fn examine(&mut self, examiner: EntityId, target: EntityId, location: Vec2) -> Vec<String> {
        let mut ev = ExaminedEvent::new(examiner, target, location);
        self.bus.raise(&mut self.world, target, &mut ev);
        ev.message().to_vec()
    }

    pub fn tick(&mut self) {
        self.world.tick();
    }

    /// Drain replication snapshots for everything changed since the last call
    pub fn sync(&mut self) -> Result<Vec<ComponentDelta>> {
        self.world.drain_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::damage::DamageType;
    use crate::core::fixed_point::Fixed2;
    use crate::ecs::component::ComponentKind;
    use crate::host::StanceHost;

    #[test]
    fn test_spawned_humanoid_has_full_kit() {
        let mut sim = Simulation::new(ModConfig::default(), 1);
        let uid = sim.spawn_humanoid("urist", Vec2::ZERO);

        assert!(sim.world.standing_state(uid).unwrap().standing);
        assert_eq!(sim.world.body(uid).unwrap().tree.len(), 6);
        assert!(sim.world.has_hands(uid));
        assert_eq!(sim.world.movement_speed(uid).unwrap().walk, 1.0);
    }

    #[test]
    fn test_heat_is_routed_to_a_limb() {
        let mut sim = Simulation::new(ModConfig::default(), 7);
        let uid = sim.spawn_humanoid("urist", Vec2::ZERO);

        let outcome = sim
            .apply_damage(uid, DamageSpecifier::new().with(DamageType::Heat, Fixed2::from_int(10)))
            .unwrap();
        assert_eq!(outcome.secondary, 5);
        assert_eq!(outcome.health_before - outcome.health_after, 5);
        assert_eq!(sim.damage_outcomes().len(), 1);
    }

    #[test]
    fn test_down_mobs_do_not_collide() {
        let mut sim = Simulation::new(ModConfig::default(), 1);
        let a = sim.spawn_humanoid("a", Vec2::ZERO);
        let b = sim.spawn_humanoid("b", Vec2::new(0.5, 0.0));
        sim.tick();

        assert!(sim.mobs_collide(a, b));
        sim.down(b, DownOptions::default());
        assert!(!sim.mobs_collide(a, b));
        assert!(!sim.mobs_collide(b, a));
    }

    #[test]
    fn test_sync_reports_stance_change() {
        let mut sim = Simulation::new(ModConfig::default(), 1);
        let uid = sim.spawn_humanoid("urist", Vec2::ZERO);
        sim.tick();
        sim.sync().unwrap();

        sim.down(uid, DownOptions::default());
        let deltas = sim.sync().unwrap();
        let stance = deltas
            .iter()
            .find(|d| d.kind == ComponentKind::StandingState)
            .unwrap();
        assert_eq!(stance.payload["standing"], serde_json::Value::Bool(false));
        assert!(deltas.iter().any(|d| d.kind == ComponentKind::Fixtures));
    }
}
