//! Examining a body part under the cursor

use glam::Vec2;

use crate::body::part::{BodyPart, PartType};
use crate::core::types::EntityId;
use crate::ecs::component::ComponentKind;
use crate::ecs::events::{EventBus, Vote};
use crate::ecs::world::World;

/// Raised on the examined entity; listeners append text
#[derive(Debug, Clone, PartialEq)]
pub struct ExaminedEvent {
    pub examiner: EntityId,
    pub examined: EntityId,
    /// Cursor position in world coordinates
    pub location: Vec2,
    lines: Vec<String>,
}

impl ExaminedEvent {
    pub fn new(examiner: EntityId, examined: EntityId, location: Vec2) -> Self {
        Self {
            examiner,
            examined,
            location,
            lines: Vec::new(),
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn message(&self) -> &[String] {
        &self.lines
    }
}

/// One-word condition of a limb
pub fn condition(part: &BodyPart) -> &'static str {
    let fraction = part.health_fraction();
    if fraction >= 1.0 {
        "unharmed"
    } else if fraction > 0.66 {
        "lightly wounded"
    } else if fraction > 0.33 {
        "wounded"
    } else if fraction > 0.0 {
        "badly wounded"
    } else {
        "mangled"
    }
}

/// Describe the limb of `part_type` on `body`
pub fn describe_part(world: &World, body: EntityId, part_type: PartType) -> Option<String> {
    let tree = &world.body(body)?.tree;
    let attached = tree.attached_limbs();

    for limb in &attached {
        let Some(record) = tree.get(*limb) else {
            continue;
        };
        if record.part.part_type == part_type {
            return Some(format!("The {} is {}.", part_type, condition(&record.part)));
        }
    }

    // Known to the body but no longer attached
    let seen = tree.iter().any(|(_, record)| record.part.part_type == part_type);
    seen.then(|| format!("The {} is missing.", part_type))
}

/// Subscribe the limb description to examine events on zoned bodies
pub fn register(bus: &mut EventBus<World>) {
    bus.subscribe::<ExaminedEvent>(ComponentKind::PartZones, |world, uid, ev| {
        let (Some(zones), Some(transform)) = (world.part_zones(uid), world.transform(uid)) else {
            return Vote::Allow;
        };
        let Some(part_type) = zones.part_at_position(transform.position, transform.rotation, ev.location)
        else {
            return Vote::Allow;
        };
        if let Some(line) = describe_part(world, uid, part_type) {
            ev.push_text(line);
        }
        Vote::Allow
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::tree::Body;
    use crate::body::zones::PartZones;
    use crate::host::BodyHost;

    #[test]
    fn test_condition_words() {
        let mut part = BodyPart::with_max_health(PartType::Head, 100);
        assert_eq!(condition(&part), "unharmed");
        part.set_health(50);
        assert_eq!(condition(&part), "wounded");
        part.set_health(10);
        assert_eq!(condition(&part), "badly wounded");
        part.set_health(0);
        assert_eq!(condition(&part), "mangled");
    }

    #[test]
    fn test_examine_reports_limb_under_cursor() {
        let mut world = World::new();
        let mut bus: EventBus<World> = EventBus::new();
        register(&mut bus);

        let body = world.spawn_at("urist", Vec2::ZERO);
        world.insert_body(body, Body::humanoid());
        world.insert_part_zones(body, PartZones::default());

        let mut ev = ExaminedEvent::new(EntityId::new(), body, Vec2::new(0.0, -0.8));
        bus.raise(&mut world, body, &mut ev);
        assert_eq!(ev.message(), ["The head is unharmed.".to_string()]);
    }

    #[test]
    fn test_examine_reports_missing_limb() {
        let mut world = World::new();
        let body = world.spawn_at("urist", Vec2::ZERO);
        world.insert_body(body, Body::humanoid());

        let root = world.body_root(body).unwrap();
        let head = world.body_parts(root)[1];
        world.try_remove_from_container(head);

        assert_eq!(
            describe_part(&world, body, PartType::Head).as_deref(),
            Some("The head is missing.")
        );
    }
}
