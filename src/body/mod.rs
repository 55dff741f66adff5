//! Bodies, limbs and damage routing

pub mod damage;
pub mod examine;
pub mod part;
pub mod router;
pub mod tree;
pub mod zones;

pub use damage::{classify, DamageBreakdown, DamageChanged, DamageSpecifier, DamageType};
pub use examine::ExaminedEvent;
pub use part::{BodyPart, PartType};
pub use router::{Consequence, DamageLog, DamageOutcome, DamageRouter};
pub use tree::{Body, BodyTree, LimbId};
pub use zones::PartZones;
