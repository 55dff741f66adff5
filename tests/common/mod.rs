//! Shared helpers for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use limb_stance::body::PartType;
use limb_stance::core::{Angle, EntityId, ModConfig, RandomSource};
use limb_stance::host::BodyHost;
use limb_stance::simulation::Simulation;

/// Limb order of a humanoid body: root first, then children as attached
pub const TORSO: usize = 0;
pub const HEAD: usize = 1;
pub const LEFT_ARM: usize = 2;
pub const RIGHT_LEG: usize = 5;

#[derive(Default)]
struct Script {
    picks: VecDeque<usize>,
    fraction: f32,
}

/// Random source driven by the test
///
/// Picks come from a queue (index 0 once it runs dry); every float is the
/// same fraction of its range. Clones share the script, so a test can keep
/// one handle after the router took the other.
#[derive(Clone, Default)]
pub struct ScriptedRandom {
    script: Rc<RefCell<Script>>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_pick(&self, index: usize) {
        self.script.borrow_mut().picks.push_back(index);
    }

    /// Fraction in `[0, 1)` used for every float and angle draw
    pub fn set_fraction(&self, fraction: f32) {
        self.script.borrow_mut().fraction = fraction;
    }

    fn fraction(&self) -> f32 {
        self.script.borrow().fraction
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        let next = self.script.borrow_mut().picks.pop_front().unwrap_or(0);
        next.min(len.saturating_sub(1))
    }

    fn next_float(&mut self, max: f32) -> f32 {
        self.fraction() * max
    }

    fn next_angle(&mut self) -> Angle {
        Angle(self.fraction() * TAU)
    }

    fn next_angle_between(&mut self, min: Angle, max: Angle) -> Angle {
        Angle(min.0 + self.fraction() * (max.0 - min.0))
    }
}

/// Simulation driven by a scripted random source, with one humanoid at the origin
pub fn scripted_sim() -> (Simulation, ScriptedRandom, EntityId) {
    let rng = ScriptedRandom::new();
    let mut sim = Simulation::with_random(ModConfig::default(), rng.clone());
    let uid = sim.spawn_humanoid("urist", Vec2::ZERO);
    sim.tick();
    (sim, rng, uid)
}

/// Limb entity of `part_type` on `body`, attached or not
pub fn limb_of(sim: &Simulation, body: EntityId, part_type: PartType) -> EntityId {
    let tree = &sim.world.body(body).expect("body").tree;
    tree.iter()
        .find(|(_, record)| record.part.part_type == part_type)
        .map(|(_, record)| record.entity)
        .expect("limb")
}

/// Health of every limb on `body`, in arena order
pub fn limb_healths(sim: &Simulation, body: EntityId) -> Vec<i32> {
    let tree = &sim.world.body(body).expect("body").tree;
    tree.iter()
        .map(|(_, record)| sim.world.body_part(record.entity).map(|p| p.health()).unwrap_or(-1))
        .collect()
}
