//! Gameplay configuration with documented constants
//!
//! Every threshold used by the damage router and stance controller lives
//! here. Defaults reproduce the tuned values; a TOML file can override any
//! subset of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{LimbError, Result};

// Damage routing
pub const OTHER_DAMAGE_FLOOR: i32 = 50;
pub const TORSO_BRUTE_THRESHOLD: i32 = 40;
pub const SEVER_THRESHOLD: i32 = 8;
pub const SEVER_IMPULSE: f32 = 25.0;
pub const SEVER_IMPULSE_VARIANCE: f32 = 1.5;
pub const SEVER_ANGLE_JITTER_DEGREES: f32 = 30.0;

// Stance
pub const DOWN_SPEED_MULTIPLIER: f32 = 0.2;
pub const CLIMB_PROBE_HALF_EXTENT: f32 = 0.1;

/// Tunables for distributing damage over limbs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Secondary (burn/shock) damage never takes a limb below this health
    pub other_damage_floor: i32,

    /// Minimum brute total that gibs the body once the torso is at zero
    ///
    /// Below it the torso just sits at zero health, still attached.
    pub torso_brute_threshold: i32,

    /// Minimum brute total that flings a limb after it is severed
    pub sever_threshold: i32,

    /// Base impulse applied to a flung limb (world units)
    pub sever_impulse: f32,

    /// Extra impulse drawn uniformly from `[0, variance)`
    pub sever_impulse_variance: f32,

    /// Half-width of the cone around the random fling direction
    pub sever_angle_jitter_degrees: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            other_damage_floor: OTHER_DAMAGE_FLOOR,
            torso_brute_threshold: TORSO_BRUTE_THRESHOLD,
            sever_threshold: SEVER_THRESHOLD,
            sever_impulse: SEVER_IMPULSE,
            sever_impulse_variance: SEVER_IMPULSE_VARIANCE,
            sever_angle_jitter_degrees: SEVER_ANGLE_JITTER_DEGREES,
        }
    }
}

/// Tunables for the stand/prone state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceConfig {
    /// Movement speed multiplier applied while down
    pub down_speed_multiplier: f32,

    /// Half-extent of the box probed for climbables when standing up
    pub climb_probe_half_extent: f32,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            down_speed_multiplier: DOWN_SPEED_MULTIPLIER,
            climb_probe_half_extent: CLIMB_PROBE_HALF_EXTENT,
        }
    }
}

/// Full configuration, one section per system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    pub damage: DamageConfig,
    pub stance: StanceConfig,
}

impl ModConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ModConfig = toml::from_str(content)?;
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected config: {}", e);
            return Err(e);
        }
        Ok(config)
    }

    /// Load a TOML file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let damage = &self.damage;

        if damage.other_damage_floor < 0 {
            return Err(LimbError::InvalidConfig(format!(
                "other_damage_floor ({}) must not be negative",
                damage.other_damage_floor
            )));
        }

        if damage.torso_brute_threshold <= 0 || damage.sever_threshold <= 0 {
            return Err(LimbError::InvalidConfig(
                "brute thresholds must be positive".into(),
            ));
        }

        if damage.sever_impulse < 0.0 || damage.sever_impulse_variance < 0.0 {
            return Err(LimbError::InvalidConfig(
                "sever impulse and variance must not be negative".into(),
            ));
        }

        if !(0.0..=180.0).contains(&damage.sever_angle_jitter_degrees) {
            return Err(LimbError::InvalidConfig(format!(
                "sever_angle_jitter_degrees ({}) should be within [0, 180]",
                damage.sever_angle_jitter_degrees
            )));
        }

        let stance = &self.stance;

        if !(0.0..=1.0).contains(&stance.down_speed_multiplier) {
            return Err(LimbError::InvalidConfig(format!(
                "down_speed_multiplier ({}) should be within [0, 1]",
                stance.down_speed_multiplier
            )));
        }

        if stance.climb_probe_half_extent <= 0.0 {
            return Err(LimbError::InvalidConfig(
                "climb_probe_half_extent must be positive".into(),
            ));
        }

        Ok(())
    }
}
