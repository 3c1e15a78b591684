//! Tier Definition Structures
//!
//! Ordered sets of unlockable activity tiers, including TOML
//! deserialization (Raw*) and validated versions.

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::experience::MAX_LEVEL;
use crate::skills::Skill;

/// One unlockable activity variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Level needed to use this tier
    pub min_level: i32,
    /// Experience awarded for one repetition
    pub action_xp: i64,
    pub name: String,
}

impl TierDefinition {
    pub fn new(min_level: i32, action_xp: i64, name: impl Into<String>) -> Self {
        Self {
            min_level,
            action_xp,
            name: name.into(),
        }
    }
}

// ============================================================================
// Raw TOML Structures
// ============================================================================

fn default_action_name() -> String {
    "action".to_string()
}

/// Raw tier entry from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawTier {
    pub name: String,
    pub min_level: i32,
    pub action_xp: i64,
}

/// Raw tier set from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawTierSet {
    pub display_name: Option<String>,
    pub skill: String,
    #[serde(default = "default_action_name")]
    pub action_name: String,
    #[serde(default)]
    pub tiers: Vec<RawTier>,
}

// ============================================================================
// Validated Structures
// ============================================================================

/// A validated, ordered tier set for one skill.
///
/// Minimum levels are strictly increasing and every action cost is positive.
/// The last tier is the top tier and stays in effect up to the level cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSet {
    pub id: String,
    pub display_name: String,
    pub skill: Skill,
    /// Singular noun for one repetition ("lap", "cast")
    pub action_name: String,
    tiers: Vec<TierDefinition>,
}

impl TierSet {
    pub fn new(
        id: &str,
        display_name: &str,
        skill: Skill,
        action_name: &str,
        tiers: Vec<TierDefinition>,
    ) -> Result<Self, DataError> {
        let invalid = |reason: String| DataError::InvalidTierSet {
            id: id.to_string(),
            reason,
        };

        if tiers.is_empty() {
            return Err(invalid("no tiers defined".to_string()));
        }
        for tier in &tiers {
            if tier.min_level < 1 || tier.min_level > MAX_LEVEL {
                return Err(invalid(format!(
                    "tier '{}' has out of range level {}",
                    tier.name, tier.min_level
                )));
            }
            if tier.action_xp <= 0 {
                return Err(invalid(format!(
                    "tier '{}' has non-positive action xp {}",
                    tier.name, tier.action_xp
                )));
            }
        }
        for pair in tiers.windows(2) {
            if pair[0].min_level >= pair[1].min_level {
                return Err(invalid(format!(
                    "tier '{}' (level {}) does not come after '{}' (level {})",
                    pair[1].name, pair[1].min_level, pair[0].name, pair[0].min_level
                )));
            }
        }

        Ok(Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            skill,
            action_name: action_name.to_string(),
            tiers,
        })
    }

    /// Create a validated TierSet from raw TOML data
    pub fn from_raw(id: &str, raw: &RawTierSet) -> Result<Self, DataError> {
        let skill = Skill::from_alias(&raw.skill)
            .ok_or_else(|| DataError::UnknownSkill(raw.skill.clone()))?;
        let display_name = raw
            .display_name
            .clone()
            .unwrap_or_else(|| id.replace('_', " "));
        let tiers = raw
            .tiers
            .iter()
            .map(|t| TierDefinition::new(t.min_level, t.action_xp, t.name.clone()))
            .collect();

        Self::new(id, &display_name, skill, &raw.action_name, tiers)
    }

    /// Tiers in ascending level order; never empty
    pub fn tiers(&self) -> &[TierDefinition] {
        &self.tiers
    }

    pub fn first(&self) -> &TierDefinition {
        &self.tiers[0]
    }

    pub fn top(&self) -> &TierDefinition {
        &self.tiers[self.tiers.len() - 1]
    }

    /// Look up a tier by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&TierDefinition> {
        self.tiers
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Built-in Sets
// ============================================================================

/// Rooftop agility courses: (level, lap xp, course)
const ROOFTOP_COURSES: [(i32, i64, &str); 9] = [
    (10, 120, "Draynor"),
    (20, 180, "Al Kharid"),
    (30, 238, "Varrock"),
    (40, 240, "Canifis"),
    (50, 440, "Falador"),
    (60, 570, "Seers"),
    (70, 890, "Pollnivneach"),
    (80, 780, "Rellekka"),
    (90, 793, "Ardougne"),
];

pub const AGILITY_ROOFTOPS_ID: &str = "agility_rooftops";

/// The rooftop course set, always available without data files.
pub fn agility_rooftops() -> TierSet {
    TierSet {
        id: AGILITY_ROOFTOPS_ID.to_string(),
        display_name: "Rooftop Agility".to_string(),
        skill: Skill::Agility,
        action_name: "lap".to_string(),
        tiers: ROOFTOP_COURSES
            .iter()
            .map(|&(level, xp, name)| TierDefinition::new(level, xp, name))
            .collect(),
    }
}
