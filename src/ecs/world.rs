//! ECS World - in-memory host holding every component the gameplay layer uses
//!
//! Implements all collaborator traits from `host`. It does bookkeeping only:
//! impulses change a stored velocity, audio and gib requests are logged, and
//! dirty marks queue component snapshots for replication.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use serde::Serialize;

use crate::body::part::BodyPart;
use crate::body::tree::{Body, LimbId};
use crate::body::zones::PartZones;
use crate::core::error::{LimbError, Result};
use crate::core::types::{Angle, Box2, EntityId, Tick};
use crate::ecs::component::{ComponentKind, LifeStage};
use crate::ecs::sync::ComponentDelta;
use crate::host::{BodyHost, ComponentQuery, MovementHost, PhysicsHost, StanceHost, SyncHost};
use crate::movement::MovementSpeedModifier;
use crate::physics::{Fixtures, PhysicsBody, Transform};
use crate::stance::component::{RotationState, SoundSpecifier, StandingState};

/// Mass given to a limb once it is loose
pub const LOOSE_LIMB_MASS: f32 = 1.0;

/// Climbing state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Climbing {
    pub climbing_on: Option<EntityId>,
}

impl Climbing {
    pub fn is_climbing(&self) -> bool {
        self.climbing_on.is_some()
    }
}

/// Logged audio request
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRequest {
    pub sound: SoundSpecifier,
    pub source: EntityId,
    pub user: EntityId,
}

/// Logged whole-body destruction
#[derive(Debug, Clone, PartialEq)]
pub struct GibRecord {
    pub body: EntityId,
    pub parts: Vec<EntityId>,
    pub gib_organs: bool,
}

/// The game world containing all entities
pub struct World {
    pub current_tick: Tick,
    entity_registry: AHashMap<EntityId, String>,
    bodies: AHashMap<EntityId, Body>,
    part_owners: AHashMap<EntityId, (EntityId, LimbId)>,
    transforms: AHashMap<EntityId, Transform>,
    physics: AHashMap<EntityId, PhysicsBody>,
    fixtures: AHashMap<EntityId, Fixtures>,
    standing: AHashMap<EntityId, StandingState>,
    appearance: AHashMap<EntityId, RotationState>,
    movement: AHashMap<EntityId, MovementSpeedModifier>,
    climbing: AHashMap<EntityId, Climbing>,
    part_zones: AHashMap<EntityId, PartZones>,
    hands: AHashSet<EntityId>,
    climbables: AHashSet<EntityId>,
    dirty: Vec<(EntityId, ComponentKind)>,
    audio_log: Vec<AudioRequest>,
    gib_log: Vec<GibRecord>,
}

impl World {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            entity_registry: AHashMap::new(),
            bodies: AHashMap::new(),
            part_owners: AHashMap::new(),
            transforms: AHashMap::new(),
            physics: AHashMap::new(),
            fixtures: AHashMap::new(),
            standing: AHashMap::new(),
            appearance: AHashMap::new(),
            movement: AHashMap::new(),
            climbing: AHashMap::new(),
            part_zones: AHashMap::new(),
            hands: AHashSet::new(),
            climbables: AHashSet::new(),
            dirty: Vec::new(),
            audio_log: Vec::new(),
            gib_log: Vec::new(),
        }
    }

    pub fn spawn(&mut self, name: &str) -> EntityId {
        let entity_id = EntityId::new();
        self.entity_registry.insert(entity_id, name.to_string());
        entity_id
    }

    /// Spawn with a transform at `position`
    pub fn spawn_at(&mut self, name: &str, position: Vec2) -> EntityId {
        let entity_id = self.spawn(name);
        self.transforms.insert(entity_id, Transform::at(position));
        entity_id
    }

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entity_registry.get(&entity).map(String::as_str)
    }

    pub fn entity_count(&self) -> usize {
        self.entity_registry.len()
    }

    /// Advance one tick; components added last tick start running
    pub fn tick(&mut self) {
        self.current_tick += 1;
        for state in self.standing.values_mut() {
            if state.life_stage.is_starting() {
                state.life_stage = LifeStage::Running;
            }
        }
    }

    // === Component insertion ===

    /// Attach a body and register every limb in it as an entity
    pub fn insert_body(&mut self, entity: EntityId, body: Body) {
        for (limb, record) in body.tree.iter() {
            self.entity_registry
                .insert(record.entity, record.part.part_type.name().to_string());
            self.part_owners.insert(record.entity, (entity, limb));
        }
        self.bodies.insert(entity, body);
    }

    pub fn insert_physics(&mut self, entity: EntityId, body: PhysicsBody) {
        self.physics.insert(entity, body);
    }

    pub fn insert_fixtures(&mut self, entity: EntityId, fixtures: Fixtures) {
        self.fixtures.insert(entity, fixtures);
    }

    pub fn insert_standing_state(&mut self, entity: EntityId, state: StandingState) {
        self.standing.insert(entity, state);
        self.appearance.entry(entity).or_default();
    }

    pub fn insert_hands(&mut self, entity: EntityId) {
        self.hands.insert(entity);
    }

    pub fn insert_climbable(&mut self, entity: EntityId) {
        self.climbables.insert(entity);
    }

    pub fn insert_climbing(&mut self, entity: EntityId) {
        self.climbing.entry(entity).or_default();
    }

    pub fn insert_part_zones(&mut self, entity: EntityId, zones: PartZones) {
        self.part_zones.insert(entity, zones);
    }

    // === Component access ===

    pub fn body(&self, entity: EntityId) -> Option<&Body> {
        self.bodies.get(&entity)
    }

    pub fn body_mut(&mut self, entity: EntityId) -> Option<&mut Body> {
        self.bodies.get_mut(&entity)
    }

    /// Body that a limb belongs to, whether attached or loose
    pub fn part_owner(&self, part: EntityId) -> Option<EntityId> {
        self.part_owners.get(&part).map(|(body, _)| *body)
    }

    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.transforms.get(&entity)
    }

    pub fn physics(&self, entity: EntityId) -> Option<&PhysicsBody> {
        self.physics.get(&entity)
    }

    pub fn rotation_state(&self, entity: EntityId) -> Option<RotationState> {
        self.appearance.get(&entity).copied()
    }

    pub fn movement_speed(&self, entity: EntityId) -> Option<MovementSpeedModifier> {
        self.movement.get(&entity).copied()
    }

    pub fn climbing(&self, entity: EntityId) -> Option<&Climbing> {
        self.climbing.get(&entity)
    }

    pub fn part_zones(&self, entity: EntityId) -> Option<&PartZones> {
        self.part_zones.get(&entity)
    }

    /// Strict standing-state lookup
    pub fn try_standing_state(&self, entity: EntityId) -> Result<&StandingState> {
        if !self.entity_registry.contains_key(&entity) {
            return Err(LimbError::EntityNotFound(entity));
        }
        self.standing
            .get(&entity)
            .ok_or(LimbError::ComponentNotFound {
                entity,
                kind: ComponentKind::StandingState,
            })
    }

    /// Limb record of a part entity
    pub fn limb(&self, part: EntityId) -> Option<&BodyPart> {
        let (body, limb) = self.part_owners.get(&part)?;
        self.bodies.get(body)?.tree.get(*limb).map(|record| &record.part)
    }

    /// Is the limb still connected to its body's root?
    pub fn is_part_attached(&self, part: EntityId) -> bool {
        let Some((body, limb)) = self.part_owners.get(&part) else {
            return false;
        };
        self.bodies
            .get(body)
            .map(|b| b.tree.attached_limbs().contains(limb))
            .unwrap_or(false)
    }

    /// Leave a climbable
    pub fn stop_climbing(&mut self, entity: EntityId) -> Option<EntityId> {
        let climbing = self.climbing.get_mut(&entity)?;
        let was_on = climbing.climbing_on.take();
        if was_on.is_some() {
            self.mark_dirty(entity, ComponentKind::Climbing);
        }
        was_on
    }

    // === Host logs ===

    pub fn audio_log(&self) -> &[AudioRequest] {
        &self.audio_log
    }

    pub fn gib_log(&self) -> &[GibRecord] {
        &self.gib_log
    }

    pub fn pending_dirty(&self) -> &[(EntityId, ComponentKind)] {
        &self.dirty
    }

    /// Serialize every dirty component and clear the queue
    pub fn drain_dirty(&mut self) -> Result<Vec<ComponentDelta>> {
        let dirty = std::mem::take(&mut self.dirty);
        let mut deltas = Vec::with_capacity(dirty.len());
        for (entity, kind) in dirty {
            if let Some(payload) = self.snapshot(entity, kind)? {
                deltas.push(ComponentDelta {
                    entity,
                    kind,
                    payload,
                });
            }
        }
        Ok(deltas)
    }

    fn snapshot(&self, entity: EntityId, kind: ComponentKind) -> Result<Option<serde_json::Value>> {
        let value = match kind {
            ComponentKind::Body => self.bodies.get(&entity).map(serde_json::to_value),
            ComponentKind::BodyPart => self.limb(entity).map(serde_json::to_value),
            ComponentKind::StandingState => self.standing.get(&entity).map(serde_json::to_value),
            ComponentKind::Fixtures => self.fixtures.get(&entity).map(serde_json::to_value),
            ComponentKind::Transform => self.transforms.get(&entity).map(serde_json::to_value),
            ComponentKind::Physics => self.physics.get(&entity).map(serde_json::to_value),
            ComponentKind::Appearance => self.appearance.get(&entity).map(serde_json::to_value),
            ComponentKind::MovementSpeed => self.movement.get(&entity).map(serde_json::to_value),
            ComponentKind::Climbing => self.climbing.get(&entity).map(serde_json::to_value),
            ComponentKind::Hands | ComponentKind::Climbable | ComponentKind::PartZones => None,
        };
        Ok(value.transpose()?)
    }

    /// Give a loose limb its own transform and rigid body at the body's spot
    fn release_limb(&mut self, body: EntityId, part: EntityId) {
        let origin = self.transforms.get(&body).copied().unwrap_or_default();
        self.transforms.insert(part, origin);
        self.physics
            .entry(part)
            .or_insert_with(|| PhysicsBody::dynamic(LOOSE_LIMB_MASS));
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentQuery for World {
    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Body => self.bodies.contains_key(&entity),
            ComponentKind::BodyPart => self.part_owners.contains_key(&entity),
            ComponentKind::StandingState => self.standing.contains_key(&entity),
            ComponentKind::Fixtures => self.fixtures.contains_key(&entity),
            ComponentKind::Physics => self.physics.contains_key(&entity),
            ComponentKind::Transform => self.transforms.contains_key(&entity),
            ComponentKind::Appearance => self.appearance.contains_key(&entity),
            ComponentKind::Hands => self.hands.contains(&entity),
            ComponentKind::Climbable => self.climbables.contains(&entity),
            ComponentKind::Climbing => self.climbing.contains_key(&entity),
            ComponentKind::MovementSpeed => self.movement.contains_key(&entity),
            ComponentKind::PartZones => self.part_zones.contains_key(&entity),
        }
    }
}

impl SyncHost for World {
    fn mark_dirty(&mut self, entity: EntityId, kind: ComponentKind) {
        if !self.dirty.contains(&(entity, kind)) {
            self.dirty.push((entity, kind));
        }
    }
}

impl BodyHost for World {
    fn body_root(&self, body: EntityId) -> Option<EntityId> {
        self.bodies.get(&body)?.root_entity()
    }

    fn body_parts(&self, root: EntityId) -> Vec<EntityId> {
        let Some((body, limb)) = self.part_owners.get(&root) else {
            return Vec::new();
        };
        let Some(body) = self.bodies.get(body) else {
            return Vec::new();
        };
        body.tree
            .traverse(*limb)
            .into_iter()
            .filter_map(|id| body.tree.get(id).map(|record| record.entity))
            .collect()
    }

    fn body_part(&self, part: EntityId) -> Option<&BodyPart> {
        self.limb(part)
    }

    fn body_part_mut(&mut self, part: EntityId) -> Option<&mut BodyPart> {
        let (body, limb) = self.part_owners.get(&part)?;
        self.bodies
            .get_mut(body)?
            .tree
            .get_mut(*limb)
            .map(|record| &mut record.part)
    }

    fn try_remove_from_container(&mut self, part: EntityId) -> bool {
        let Some(&(body, limb)) = self.part_owners.get(&part) else {
            return false;
        };
        let detached = self
            .bodies
            .get_mut(&body)
            .map(|b| b.tree.detach(limb))
            .unwrap_or(false);

        if detached {
            self.release_limb(body, part);
            self.mark_dirty(body, ComponentKind::Body);
        }
        detached
    }

    fn gib_body(&mut self, body: EntityId, gib_organs: bool) {
        let Some(b) = self.bodies.get_mut(&body) else {
            return;
        };
        if b.gibbed {
            return;
        }

        let limbs = b.tree.attached_limbs();
        let mut parts = Vec::with_capacity(limbs.len());
        for limb in limbs {
            b.tree.detach(limb);
            if let Some(record) = b.tree.get(limb) {
                parts.push(record.entity);
            }
        }
        b.gibbed = true;

        for &part in &parts {
            self.release_limb(body, part);
        }

        tracing::info!("Body {} gibbed into {} parts", body, parts.len());
        self.mark_dirty(body, ComponentKind::Body);
        self.gib_log.push(GibRecord {
            body,
            parts,
            gib_organs,
        });
    }
}

impl PhysicsHost for World {
    fn apply_linear_impulse(&mut self, entity: EntityId, impulse: Vec2) {
        if let Some(body) = self.physics.get_mut(&entity) {
            body.apply_linear_impulse(impulse);
            self.mark_dirty(entity, ComponentKind::Physics);
        }
    }

    fn set_world_rotation(&mut self, entity: EntityId, rotation: Angle) {
        if let Some(transform) = self.transforms.get_mut(&entity) {
            transform.rotation = rotation;
            self.mark_dirty(entity, ComponentKind::Transform);
        }
    }

    fn world_position(&self, entity: EntityId) -> Option<Vec2> {
        self.transforms.get(&entity).map(|t| t.position)
    }

    fn fixtures(&self, entity: EntityId) -> Option<&Fixtures> {
        self.fixtures.get(&entity)
    }

    fn set_collision_mask(&mut self, entity: EntityId, fixture_id: &str, mask: u32) {
        let Some(fixture) = self
            .fixtures
            .get_mut(&entity)
            .and_then(|f| f.get_mut(fixture_id))
        else {
            return;
        };
        if fixture.mask == mask {
            return;
        }
        fixture.mask = mask;
        self.mark_dirty(entity, ComponentKind::Fixtures);
    }

    fn intersecting_static(&self, bounds: Box2) -> Vec<EntityId> {
        let mut hits: Vec<EntityId> = self
            .physics
            .iter()
            .filter(|(_, body)| body.is_static())
            .filter_map(|(entity, _)| {
                let position = self.transforms.get(entity)?.position;
                let fixtures = self.fixtures.get(entity)?;
                fixtures
                    .iter()
                    .any(|(_, f)| f.bounds.translated(position).intersects(&bounds))
                    .then_some(*entity)
            })
            .collect();
        // Storage order is unspecified
        hits.sort();
        hits
    }
}

impl MovementHost for World {
    fn set_movement_speed_modifiers(&mut self, entity: EntityId, walk: f32, sprint: f32) {
        let modifier = MovementSpeedModifier { walk, sprint };
        if self.movement.get(&entity) == Some(&modifier) {
            return;
        }
        self.movement.insert(entity, modifier);
        self.mark_dirty(entity, ComponentKind::MovementSpeed);
    }
}

impl StanceHost for World {
    fn standing_state(&self, entity: EntityId) -> Option<&StandingState> {
        self.standing.get(&entity)
    }

    fn standing_state_mut(&mut self, entity: EntityId) -> Option<&mut StandingState> {
        self.standing.get_mut(&entity)
    }

    fn entity_exists(&self, entity: EntityId) -> bool {
        self.entity_registry.contains_key(&entity)
    }

    fn has_hands(&self, entity: EntityId) -> bool {
        self.hands.contains(&entity)
    }

    fn set_rotation_state(&mut self, entity: EntityId, state: RotationState) {
        self.appearance.insert(entity, state);
        self.mark_dirty(entity, ComponentKind::Appearance);
    }

    fn play_predicted(&mut self, sound: &SoundSpecifier, source: EntityId, user: EntityId) {
        tracing::debug!("Play {} at {}", sound.0, source);
        self.audio_log.push(AudioRequest {
            sound: sound.clone(),
            source,
            user,
        });
    }

    fn is_climbable(&self, entity: EntityId) -> bool {
        self.climbables.contains(&entity)
    }

    fn is_climbing(&self, entity: EntityId) -> bool {
        self.climbing
            .get(&entity)
            .map(|c| c.is_climbing())
            .unwrap_or(false)
    }

    fn forcibly_set_climbing(&mut self, entity: EntityId, climbable: EntityId) {
        self.climbing.entry(entity).or_default().climbing_on = Some(climbable);
        self.mark_dirty(entity, ComponentKind::Climbing);
        tracing::debug!("{} forced onto climbable {}", entity, climbable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{collision_group, Fixture};

    fn table(world: &mut World, position: Vec2) -> EntityId {
        let table = world.spawn_at("table", position);
        world.insert_physics(table, PhysicsBody::fixed());
        world.insert_fixtures(
            table,
            Fixtures::new().with(
                "fix1",
                Fixture {
                    layer: collision_group::TABLE_LAYER,
                    mask: 0,
                    bounds: Box2::centered(Vec2::ZERO, Vec2::splat(0.45)),
                },
            ),
        );
        world.insert_climbable(table);
        table
    }

    #[test]
    fn test_body_parts_from_root() {
        let mut world = World::new();
        let body = world.spawn_at("urist", Vec2::ZERO);
        world.insert_body(body, Body::humanoid());

        let root = world.body_root(body).unwrap();
        let parts = world.body_parts(root);
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], root);
        assert!(parts.iter().all(|p| world.has_component(*p, ComponentKind::BodyPart)));
    }

    #[test]
    fn test_remove_from_container_releases_limb() {
        let mut world = World::new();
        let body = world.spawn_at("urist", Vec2::new(3.0, 4.0));
        world.insert_body(body, Body::humanoid());
        let root = world.body_root(body).unwrap();
        let arm = world.body_parts(root)[2];

        assert!(world.try_remove_from_container(arm));
        assert!(!world.is_part_attached(arm));
        assert_eq!(world.world_position(arm), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(world.body_parts(root).len(), 5);

        // Second removal fails
        assert!(!world.try_remove_from_container(arm));
    }

    #[test]
    fn test_gib_releases_every_attached_limb_once() {
        let mut world = World::new();
        let body = world.spawn_at("urist", Vec2::ZERO);
        world.insert_body(body, Body::humanoid());

        world.gib_body(body, true);
        world.gib_body(body, true);

        assert_eq!(world.gib_log().len(), 1);
        assert_eq!(world.gib_log()[0].parts.len(), 6);
        assert!(world.body(body).unwrap().gibbed);
        assert!(world.body_root(body).is_none());
    }

    #[test]
    fn test_intersecting_static_finds_tables_only() {
        let mut world = World::new();
        let near = table(&mut world, Vec2::new(0.2, 0.0));
        let _far = table(&mut world, Vec2::new(5.0, 0.0));
        let crate_ = world.spawn_at("crate", Vec2::ZERO);
        world.insert_physics(crate_, PhysicsBody::dynamic(10.0));

        let hits = world.intersecting_static(Box2::centered(Vec2::ZERO, Vec2::splat(0.1)));
        assert_eq!(hits, vec![near]);
    }

    #[test]
    fn test_drain_dirty_serializes_and_clears() {
        let mut world = World::new();
        let mob = world.spawn("mob");
        world.insert_standing_state(mob, StandingState::new());
        world.mark_dirty(mob, ComponentKind::StandingState);
        world.mark_dirty(mob, ComponentKind::StandingState);

        let deltas = world.drain_dirty().unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].payload["standing"], serde_json::Value::Bool(true));
        assert!(world.pending_dirty().is_empty());
    }

    #[test]
    fn test_tick_promotes_life_stage() {
        let mut world = World::new();
        let mob = world.spawn("mob");
        world.insert_standing_state(mob, StandingState::new());
        assert_eq!(world.standing_state(mob).unwrap().life_stage, LifeStage::Starting);

        world.tick();
        assert_eq!(world.standing_state(mob).unwrap().life_stage, LifeStage::Running);
    }

    #[test]
    fn test_try_standing_state_errors() {
        let mut world = World::new();
        let ghost = EntityId::new();
        assert!(matches!(
            world.try_standing_state(ghost),
            Err(LimbError::EntityNotFound(_))
        ));

        let mob = world.spawn("mob");
        assert!(matches!(
            world.try_standing_state(mob),
            Err(LimbError::ComponentNotFound { .. })
        ));
    }
}
