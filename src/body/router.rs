//! Damage router: spreads a body's incoming damage onto one of its limbs
//!
//! On every net increase in damage a single limb is picked uniformly at
//! random. Secondary damage wears it down to a floor; brute damage can take
//! it to zero, which severs a limb or, with enough force, gibs the body
//! through the torso.

use glam::Vec2;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::body::damage::{classify, DamageBreakdown, DamageChanged};
use crate::body::part::PartType;
use crate::core::config::DamageConfig;
use crate::core::random::RandomSource;
use crate::core::types::{Angle, EntityId};
use crate::ecs::component::ComponentKind;
use crate::ecs::events::{EventBus, Vote};
use crate::host::{BodyHost, ComponentQuery, PhysicsHost};

/// Structural result of one damage event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Consequence {
    /// Limb survived, or the damage was not brute
    None,
    /// Torso hit zero but the blow was under the gib threshold
    TorsoHeld,
    /// Torso hit zero hard enough to destroy the body
    Gibbed,
    /// Limb came off; `impulse` is set when it was flung
    Severed { impulse: Option<Vec2> },
    /// Limb hit zero but its container refused to let go
    SeveranceFailed,
}

/// What the router did with one damage event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageOutcome {
    pub body: EntityId,
    pub target: EntityId,
    pub part_type: PartType,
    pub brute: i32,
    pub secondary: i32,
    pub health_before: i32,
    pub health_after: i32,
    pub consequence: Consequence,
}

/// Outcomes recorded by a router registered on a bus
pub type DamageLog = Rc<RefCell<Vec<DamageOutcome>>>;

pub struct DamageRouter<R: RandomSource> {
    config: DamageConfig,
    rng: R,
}

impl<R: RandomSource> DamageRouter<R> {
    pub fn new(config: DamageConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &DamageConfig {
        &self.config
    }

    /// Handle a damage change on `body`
    ///
    /// Returns `None` when nothing was routed: a decrease, no delta, or no
    /// resolvable limbs.
    pub fn on_damage_changed<H>(
        &mut self,
        host: &mut H,
        body: EntityId,
        ev: &DamageChanged,
    ) -> Option<DamageOutcome>
    where
        H: BodyHost + PhysicsHost,
    {
        if !ev.damage_increased {
            return None;
        }
        let delta = ev.delta.as_ref()?;

        let root = host.body_root(body)?;
        host.body_part(root)?;

        let parts = host.body_parts(root);
        let target = *self.rng.pick(&parts)?;

        let DamageBreakdown {
            brute,
            secondary,
            is_brute,
        } = classify(delta);

        let floor = self.config.other_damage_floor;
        let part = host.body_part_mut(target)?;
        let part_type = part.part_type;
        let health_before = part.health();

        if secondary > 0 && part.health() > floor {
            let health = floor.max(part.health() - secondary);
            tracing::debug!(
                "Other damage {} {} -> {} / {}",
                part_type,
                part.health(),
                health,
                part.max_health()
            );
            part.set_health(health);
        }

        let mut outcome = DamageOutcome {
            body,
            target,
            part_type,
            brute,
            secondary,
            health_before,
            health_after: part.health(),
            consequence: Consequence::None,
        };

        if brute <= 0 {
            if outcome.health_after != health_before {
                host.mark_dirty(target, ComponentKind::BodyPart);
            }
            return Some(outcome);
        }

        let health = 0.max(part.health() - brute);
        tracing::debug!(
            "Brute damage {} {} -> {} / {}",
            part_type,
            part.health(),
            health,
            part.max_health()
        );
        part.set_health(health);
        outcome.health_after = part.health();
        host.mark_dirty(target, ComponentKind::BodyPart);

        if !is_brute || outcome.health_after > 0 {
            return Some(outcome);
        }

        tracing::debug!("Brute damage destroyed {}", part_type);

        if part_type.is_torso() {
            outcome.consequence = if brute >= self.config.torso_brute_threshold {
                tracing::info!("Torso destroyed, gibbing body {}", body);
                host.gib_body(body, true);
                Consequence::Gibbed
            } else {
                Consequence::TorsoHeld
            };
            return Some(outcome);
        }

        outcome.consequence = if host.try_remove_from_container(target) {
            tracing::info!("Severed {} from body {}", part_type, body);
            let impulse = (brute >= self.config.sever_threshold).then(|| self.fling_part(host, target));
            Consequence::Severed { impulse }
        } else {
            Consequence::SeveranceFailed
        };

        Some(outcome)
    }

    /// Throw a severed limb in a random direction with a random spin
    fn fling_part<H: PhysicsHost>(&mut self, host: &mut H, part: EntityId) -> Vec2 {
        let angle = self.rng.next_angle();
        let jitter = Angle::from_degrees(self.config.sever_angle_jitter_degrees);
        let direction = self.rng.next_angle_between(angle - jitter, angle + jitter);
        let magnitude = self.config.sever_impulse + self.rng.next_float(self.config.sever_impulse_variance);
        let impulse = direction.to_vec() * magnitude;

        host.set_world_rotation(part, self.rng.next_angle());
        host.apply_linear_impulse(part, impulse);
        impulse
    }
}

impl<R: RandomSource + 'static> DamageRouter<R> {
    /// Subscribe to `DamageChanged` on bodies, recording outcomes in `log`
    pub fn register<H>(mut self, bus: &mut EventBus<H>, log: DamageLog)
    where
        H: BodyHost + PhysicsHost + ComponentQuery + 'static,
    {
        bus.subscribe::<DamageChanged>(ComponentKind::Body, move |host, body, ev| {
            if let Some(outcome) = self.on_damage_changed(host, body, ev) {
                log.borrow_mut().push(outcome);
            }
            Vote::Allow
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::damage::{DamageSpecifier, DamageType};
    use crate::body::part::BodyPart;
    use crate::body::tree::{Body, BodyTree};
    use crate::core::fixed_point::Fixed2;
    use crate::core::random::SimRng;
    use crate::core::types::Box2;
    use crate::ecs::world::World;
    use crate::host::SyncHost;
    use crate::physics::Fixtures;

    /// Body made of a single limb so the random pick is forced
    fn single_limb_body(world: &mut World, part: BodyPart) -> (EntityId, EntityId) {
        let mut tree = BodyTree::new();
        let limb_entity = EntityId::new();
        tree.set_root(limb_entity, part);
        let body = world.spawn_at("body", Vec2::ZERO);
        world.insert_body(body, Body::new(tree));
        (body, limb_entity)
    }

    fn router() -> DamageRouter<SimRng> {
        DamageRouter::new(DamageConfig::default(), SimRng::seeded(3))
    }

    fn hit(damage_type: DamageType, amount: i64) -> DamageChanged {
        DamageChanged::increased(DamageSpecifier::new().with(damage_type, Fixed2::from_int(amount)))
    }

    #[test]
    fn test_decrease_is_ignored() {
        let mut world = World::new();
        let (body, limb) = single_limb_body(&mut world, BodyPart::new(PartType::Head));
        let mut ev = hit(DamageType::Slash, 5);
        ev.damage_increased = false;

        assert!(router().on_damage_changed(&mut world, body, &ev).is_none());
        assert_eq!(world.limb(limb).unwrap().health(), 80);
    }

    #[test]
    fn test_missing_delta_is_ignored() {
        let mut world = World::new();
        let (body, _) = single_limb_body(&mut world, BodyPart::new(PartType::Head));
        let ev = DamageChanged {
            delta: None,
            damage_increased: true,
        };
        assert!(router().on_damage_changed(&mut world, body, &ev).is_none());
    }

    #[test]
    fn test_body_without_root_is_ignored() {
        let mut world = World::new();
        let body = world.spawn("empty");
        world.insert_body(body, Body::new(BodyTree::new()));
        assert!(router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Slash, 5))
            .is_none());
    }

    #[test]
    fn test_brute_reduces_and_marks_dirty() {
        let mut world = World::new();
        let (body, limb) = single_limb_body(&mut world, BodyPart::new(PartType::Head));

        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Slash, 5))
            .unwrap();

        assert_eq!(outcome.brute, 20);
        assert_eq!(outcome.health_after, 60);
        assert_eq!(outcome.consequence, Consequence::None);
        assert!(world.pending_dirty().contains(&(limb, ComponentKind::BodyPart)));
    }

    #[test]
    fn test_secondary_stops_at_floor() {
        let mut world = World::new();
        let (body, limb) =
            single_limb_body(&mut world, BodyPart::with_max_health(PartType::LeftArm, 60));

        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Heat, 100))
            .unwrap();

        assert_eq!(outcome.secondary, 50);
        assert_eq!(world.limb(limb).unwrap().health(), 50);
        assert_eq!(outcome.consequence, Consequence::None);
    }

    #[test]
    fn test_secondary_below_floor_does_nothing() {
        let mut world = World::new();
        let mut part = BodyPart::new(PartType::LeftArm);
        part.set_health(40);
        let (body, limb) = single_limb_body(&mut world, part);

        router().on_damage_changed(&mut world, body, &hit(DamageType::Caustic, 10));
        assert_eq!(world.limb(limb).unwrap().health(), 40);
    }

    #[test]
    fn test_torso_below_threshold_holds() {
        let mut world = World::new();
        let mut torso = BodyPart::new(PartType::Torso);
        torso.set_health(10);
        let (body, limb) = single_limb_body(&mut world, torso);

        // Slash 5 -> 20 brute, under the gib threshold
        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Slash, 5))
            .unwrap();

        assert_eq!(outcome.consequence, Consequence::TorsoHeld);
        assert_eq!(world.limb(limb).unwrap().health(), 0);
        assert!(world.is_part_attached(limb));
        assert!(world.gib_log().is_empty());
    }

    #[test]
    fn test_torso_at_threshold_gibs() {
        let mut world = World::new();
        let mut torso = BodyPart::new(PartType::Torso);
        torso.set_health(10);
        let (body, _) = single_limb_body(&mut world, torso);

        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Slash, 10))
            .unwrap();

        assert_eq!(outcome.brute, 40);
        assert_eq!(outcome.consequence, Consequence::Gibbed);
        assert_eq!(world.gib_log().len(), 1);
        assert!(world.gib_log()[0].gib_organs);
    }

    #[test]
    fn test_limb_severed_and_flung() {
        let mut world = World::new();
        let mut arm = BodyPart::new(PartType::RightArm);
        arm.set_health(5);
        let (body, limb) = single_limb_body(&mut world, arm);

        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Piercing, 4))
            .unwrap();

        let Consequence::Severed { impulse: Some(impulse) } = outcome.consequence else {
            panic!("expected a flung limb, got {:?}", outcome.consequence);
        };
        let magnitude = impulse.length();
        assert!((25.0..=26.5).contains(&magnitude), "magnitude {}", magnitude);
        assert!(!world.is_part_attached(limb));
        assert!(world.physics(limb).unwrap().linear_velocity.length() > 0.0);
    }

    #[test]
    fn test_weak_blow_severs_without_fling() {
        let mut world = World::new();
        let mut leg = BodyPart::new(PartType::LeftLeg);
        leg.set_health(1);
        let (body, limb) = single_limb_body(&mut world, leg);

        // Blunt 2 -> 1 brute, under the sever threshold
        let outcome = router()
            .on_damage_changed(&mut world, body, &hit(DamageType::Blunt, 2))
            .unwrap();

        assert_eq!(outcome.consequence, Consequence::Severed { impulse: None });
        assert!(!world.is_part_attached(limb));
        assert_eq!(world.physics(limb).unwrap().linear_velocity, Vec2::ZERO);
    }

    /// World whose limb containers never let go
    struct StuckContainers {
        world: World,
        impulses: Vec<(EntityId, Vec2)>,
    }

    impl SyncHost for StuckContainers {
        fn mark_dirty(&mut self, entity: EntityId, kind: ComponentKind) {
            self.world.mark_dirty(entity, kind);
        }
    }

    impl BodyHost for StuckContainers {
        fn body_root(&self, body: EntityId) -> Option<EntityId> {
            self.world.body_root(body)
        }

        fn body_parts(&self, root: EntityId) -> Vec<EntityId> {
            self.world.body_parts(root)
        }

        fn body_part(&self, part: EntityId) -> Option<&BodyPart> {
            self.world.body_part(part)
        }

        fn body_part_mut(&mut self, part: EntityId) -> Option<&mut BodyPart> {
            self.world.body_part_mut(part)
        }

        fn try_remove_from_container(&mut self, _part: EntityId) -> bool {
            false
        }

        fn gib_body(&mut self, body: EntityId, gib_organs: bool) {
            self.world.gib_body(body, gib_organs);
        }
    }

    impl PhysicsHost for StuckContainers {
        fn apply_linear_impulse(&mut self, entity: EntityId, impulse: Vec2) {
            self.impulses.push((entity, impulse));
        }

        fn set_world_rotation(&mut self, entity: EntityId, rotation: Angle) {
            self.world.set_world_rotation(entity, rotation);
        }

        fn world_position(&self, entity: EntityId) -> Option<Vec2> {
            self.world.world_position(entity)
        }

        fn fixtures(&self, entity: EntityId) -> Option<&Fixtures> {
            self.world.fixtures(entity)
        }

        fn set_collision_mask(&mut self, entity: EntityId, fixture_id: &str, mask: u32) {
            self.world.set_collision_mask(entity, fixture_id, mask);
        }

        fn intersecting_static(&self, bounds: Box2) -> Vec<EntityId> {
            self.world.intersecting_static(bounds)
        }
    }

    #[test]
    fn test_stuck_limb_is_not_flung() {
        let mut world = World::new();
        let mut arm = BodyPart::new(PartType::LeftArm);
        arm.set_health(5);
        let (body, limb) = single_limb_body(&mut world, arm);
        let mut host = StuckContainers {
            world,
            impulses: Vec::new(),
        };

        // Piercing 4 -> 8 brute, enough to fling if it came off
        let outcome = router()
            .on_damage_changed(&mut host, body, &hit(DamageType::Piercing, 4))
            .unwrap();

        assert_eq!(outcome.consequence, Consequence::SeveranceFailed);
        assert_eq!(outcome.health_after, 0);
        assert_eq!(host.world.limb(limb).unwrap().health(), 0);
        assert!(host.world.is_part_attached(limb));
        assert!(host.impulses.is_empty());
        assert!(host.world.gib_log().is_empty());
    }

    #[test]
    fn test_registered_router_logs_outcomes() {
        let mut world = World::new();
        let mut bus: EventBus<World> = EventBus::new();
        let log = DamageLog::default();
        router().register(&mut bus, log.clone());

        let (body, _) = single_limb_body(&mut world, BodyPart::new(PartType::Head));
        bus.raise(&mut world, body, &mut hit(DamageType::Slash, 1));

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].brute, 4);
    }
}
