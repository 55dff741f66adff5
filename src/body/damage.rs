//! Damage types, damage deltas and their classification
//!
//! A delta maps damage types to magnitudes. Classification sorts each
//! positive entry into a bucket and scales it:
//!
//! | Bucket    | Types                                                | Scale |
//! |-----------|------------------------------------------------------|-------|
//! | Brute     | Slash ×4, Piercing ×2, Blunt ×0.5                    |       |
//! | Secondary | Shock, Cold, Heat, Caustic                           | ×0.5  |
//! | Ignored   | Asphyxiation, Bloodloss, Radiation, Poison, Cellular | —     |
//!
//! Each scaled entry is rounded up once, then summed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::fixed_point::Fixed2;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DamageType {
    // Brute
    Slash,
    Piercing,
    Blunt,
    // Burn and friends
    Shock,
    Cold,
    Heat,
    Caustic,
    // Airloss
    Asphyxiation,
    Bloodloss,
    // Toxin
    Radiation,
    Poison,
    // Genetic
    Cellular,
    /// Tag this layer has no rule for
    Other(String),
}

/// Which bucket a damage type feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageBucket {
    Brute,
    Secondary,
    Ignored,
    Unknown,
}

impl DamageType {
    pub fn bucket(&self) -> DamageBucket {
        match self {
            DamageType::Slash | DamageType::Piercing | DamageType::Blunt => DamageBucket::Brute,
            DamageType::Shock | DamageType::Cold | DamageType::Heat | DamageType::Caustic => {
                DamageBucket::Secondary
            }
            DamageType::Asphyxiation
            | DamageType::Bloodloss
            | DamageType::Radiation
            | DamageType::Poison
            | DamageType::Cellular => DamageBucket::Ignored,
            DamageType::Other(_) => DamageBucket::Unknown,
        }
    }

    /// Multiplier as an exact fraction `(numerator, denominator)`
    pub fn multiplier(&self) -> (i64, i64) {
        match self {
            DamageType::Slash => (4, 1),
            DamageType::Piercing => (2, 1),
            DamageType::Blunt => (1, 2),
            DamageType::Shock | DamageType::Cold | DamageType::Heat | DamageType::Caustic => (1, 2),
            _ => (0, 1),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DamageType::Slash => "Slash",
            DamageType::Piercing => "Piercing",
            DamageType::Blunt => "Blunt",
            DamageType::Shock => "Shock",
            DamageType::Cold => "Cold",
            DamageType::Heat => "Heat",
            DamageType::Caustic => "Caustic",
            DamageType::Asphyxiation => "Asphyxiation",
            DamageType::Bloodloss => "Bloodloss",
            DamageType::Radiation => "Radiation",
            DamageType::Poison => "Poison",
            DamageType::Cellular => "Cellular",
            DamageType::Other(tag) => tag,
        }
    }
}

impl FromStr for DamageType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Slash" => DamageType::Slash,
            "Piercing" => DamageType::Piercing,
            "Blunt" => DamageType::Blunt,
            "Shock" => DamageType::Shock,
            "Cold" => DamageType::Cold,
            "Heat" => DamageType::Heat,
            "Caustic" => DamageType::Caustic,
            "Asphyxiation" => DamageType::Asphyxiation,
            "Bloodloss" => DamageType::Bloodloss,
            "Radiation" => DamageType::Radiation,
            "Poison" => DamageType::Poison,
            "Cellular" => DamageType::Cellular,
            other => DamageType::Other(other.to_string()),
        })
    }
}

impl From<String> for DamageType {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(damage_type) => damage_type,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for DamageType {
    fn from(tag: &str) -> Self {
        DamageType::from(tag.to_string())
    }
}

impl From<DamageType> for String {
    fn from(damage_type: DamageType) -> Self {
        damage_type.as_str().to_string()
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Damage magnitudes by type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageSpecifier {
    pub damage: BTreeMap<DamageType, Fixed2>,
}

impl DamageSpecifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, damage_type: DamageType, amount: Fixed2) -> Self {
        self.damage.insert(damage_type, amount);
        self
    }

    /// Build from string tags, e.g. parsed input
    pub fn from_tags<'a>(entries: impl IntoIterator<Item = (&'a str, Fixed2)>) -> Self {
        let mut spec = Self::new();
        for (tag, amount) in entries {
            // Parsing into DamageType cannot fail
            if let Ok(damage_type) = tag.parse::<DamageType>() {
                *spec.damage.entry(damage_type).or_default() += amount;
            }
        }
        spec
    }

    pub fn total(&self) -> Fixed2 {
        self.damage.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DamageType, &Fixed2)> {
        self.damage.iter()
    }
}

/// Raised by the host when a damageable entity's damage changed
#[derive(Debug, Clone, PartialEq)]
pub struct DamageChanged {
    /// What changed; absent when the host only resynchronized
    pub delta: Option<DamageSpecifier>,
    /// Whether the change was a net increase
    pub damage_increased: bool,
}

impl DamageChanged {
    pub fn increased(delta: DamageSpecifier) -> Self {
        Self {
            delta: Some(delta),
            damage_increased: true,
        }
    }
}

/// Bucket totals for one delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageBreakdown {
    pub brute: i32,
    pub secondary: i32,
    /// A brute-type entry with positive magnitude was present
    pub is_brute: bool,
}

/// Sort a delta into brute and secondary totals
pub fn classify(delta: &DamageSpecifier) -> DamageBreakdown {
    let mut breakdown = DamageBreakdown::default();

    for (damage_type, value) in delta.iter() {
        if !value.is_positive() {
            tracing::debug!("{} zero damage", damage_type);
            continue;
        }

        let (num, den) = damage_type.multiplier();
        let contribution = value.scaled_ceil(num, den).clamp(0, i32::MAX as i64) as i32;

        match damage_type.bucket() {
            DamageBucket::Brute => {
                breakdown.brute = breakdown.brute.saturating_add(contribution);
                breakdown.is_brute = true;
                tracing::debug!("Brute damage {} {} -> {}", damage_type, value, contribution);
            }
            DamageBucket::Secondary => {
                breakdown.secondary = breakdown.secondary.saturating_add(contribution);
                tracing::debug!("Other damage {} {} -> {}", damage_type, value, contribution);
            }
            DamageBucket::Ignored => {
                tracing::debug!("Damage ignored {}", damage_type);
            }
            DamageBucket::Unknown => {
                tracing::warn!("Unrecognized damage type {}", damage_type);
            }
        }
    }

    breakdown
}
