//! Limb Stance - limb damage routing and stand/prone state for a 2D game
//!
//! Two gameplay systems sit on top of a host ECS:
//! - `body::router` spreads incoming damage onto one limb at a time, severing
//!   or gibbing when a limb reaches zero
//! - `stance::system` lets mobs lie down and get up, adjusting collision,
//!   speed and sprite orientation
//!
//! `ecs::World` is an in-memory host that implements every `host` trait.

pub mod body;
pub mod core;
pub mod ecs;
pub mod host;
pub mod movement;
pub mod physics;
pub mod simulation;
pub mod stance;
