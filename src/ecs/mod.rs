//! Entity storage, event routing and replication

pub mod component;
pub mod events;
pub mod sync;
pub mod world;

pub use component::{ComponentKind, LifeStage};
pub use events::{EventBus, Vote};
pub use sync::ComponentDelta;
pub use world::World;
