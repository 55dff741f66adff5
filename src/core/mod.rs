pub mod config;
pub mod error;
pub mod fixed_point;
pub mod random;
pub mod types;

pub use config::{DamageConfig, ModConfig, StanceConfig};
pub use error::{LimbError, Result};
pub use fixed_point::Fixed2;
pub use random::{RandomSource, SimRng};
pub use types::{Angle, Box2, EntityId, Tick};
