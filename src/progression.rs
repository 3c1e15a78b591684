//! Threshold progression engine.
//!
//! Pure functions answering "how many more actions until the next boundary",
//! where a boundary is either the next level or the next unlockable tier.
//!
//! Action counts follow the conservative rounding rule used by the bot since
//! its first release: `floor(gap / action_xp) + 1`. An exact multiple (and a
//! zero gap) therefore reports one action more than strictly necessary.
//!
//! Counts that can hit the level cap are returned as `Option`, where `None`
//! means the cap is already reached and no further actions are needed.

use serde::Serialize;

use crate::error::ProgressError;
use crate::experience::ExperienceTable;
use crate::tiers::TierDefinition;

// ============================================================================
// Level Gaps
// ============================================================================

/// Experience remaining until the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "experience", rename_all = "snake_case")]
pub enum LevelGap {
    Remaining(i64),
    /// Already at the table's highest level
    Capped,
}

impl LevelGap {
    pub fn remaining(&self) -> Option<i64> {
        match self {
            LevelGap::Remaining(xp) => Some(*xp),
            LevelGap::Capped => None,
        }
    }

    pub fn is_capped(&self) -> bool {
        matches!(self, LevelGap::Capped)
    }

    /// Actions of `action_xp` each to close this gap; `None` when capped
    pub fn actions(&self, action_xp: i64) -> Result<Option<i64>, ProgressError> {
        match self {
            LevelGap::Remaining(gap) => actions_to_cross(*gap, action_xp).map(Some),
            LevelGap::Capped => {
                validate_action_xp(action_xp)?;
                Ok(None)
            }
        }
    }
}

/// Experience needed to reach the level after the one `experience` holds.
pub fn next_level_gap(table: &ExperienceTable, experience: i64) -> Result<LevelGap, ProgressError> {
    let level = table.level_for_experience(experience)?;
    if level >= table.max_level() {
        return Ok(LevelGap::Capped);
    }
    let next = table.experience_for_level(level + 1)?;
    Ok(LevelGap::Remaining(next - experience))
}

/// Experience needed to reach `target_level`; `None` once it is held.
pub fn experience_to_level(
    table: &ExperienceTable,
    experience: i64,
    target_level: i32,
) -> Result<Option<i64>, ProgressError> {
    if experience < 0 {
        return Err(ProgressError::ExperienceOutOfRange(experience));
    }
    let target = table.experience_for_level(target_level)?;
    if experience >= target {
        return Ok(None);
    }
    Ok(Some(target - experience))
}

// ============================================================================
// Action Counts
// ============================================================================

fn validate_action_xp(action_xp: i64) -> Result<(), ProgressError> {
    if action_xp <= 0 {
        return Err(ProgressError::InvalidActionCost(action_xp));
    }
    Ok(())
}

/// Repetitions of a fixed-xp action to cover `gap`: `floor(gap / action_xp) + 1`.
pub fn actions_to_cross(gap: i64, action_xp: i64) -> Result<i64, ProgressError> {
    validate_action_xp(action_xp)?;
    if gap < 0 {
        return Err(ProgressError::NegativeGap(gap));
    }
    Ok(gap / action_xp + 1)
}

/// Actions of `action_xp` each until the next level; `None` when capped.
pub fn actions_to_level_up(
    table: &ExperienceTable,
    experience: i64,
    action_xp: i64,
) -> Result<Option<i64>, ProgressError> {
    next_level_gap(table, experience)?.actions(action_xp)
}

/// Actions of `action_xp` each until `target_level`; `None` once it is held.
pub fn actions_to_level(
    table: &ExperienceTable,
    experience: i64,
    target_level: i32,
    action_xp: i64,
) -> Result<Option<i64>, ProgressError> {
    validate_action_xp(action_xp)?;
    match experience_to_level(table, experience, target_level)? {
        Some(gap) => actions_to_cross(gap, action_xp).map(Some),
        None => Ok(None),
    }
}

/// Hours needed for `actions` at `actions_per_hour`.
pub fn hours_for_actions(actions: i64, actions_per_hour: i64) -> Result<f64, ProgressError> {
    if actions_per_hour <= 0 {
        return Err(ProgressError::InvalidRate(actions_per_hour));
    }
    Ok(actions as f64 / actions_per_hour as f64)
}

// ============================================================================
// Tier Selection
// ============================================================================

/// The tier a level currently qualifies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentTier<'a> {
    /// Level is below the first tier's requirement
    BelowFirst,
    Unlocked { index: usize, tier: &'a TierDefinition },
}

impl<'a> CurrentTier<'a> {
    pub fn tier(&self) -> Option<&'a TierDefinition> {
        match self {
            CurrentTier::BelowFirst => None,
            CurrentTier::Unlocked { tier, .. } => Some(tier),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            CurrentTier::BelowFirst => None,
            CurrentTier::Unlocked { index, .. } => Some(*index),
        }
    }
}

/// The tier unlocked after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTier<'a> {
    Tier(&'a TierDefinition),
    /// Current tier is the last one
    Top,
}

impl<'a> NextTier<'a> {
    pub fn tier(&self) -> Option<&'a TierDefinition> {
        match self {
            NextTier::Tier(tier) => Some(tier),
            NextTier::Top => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSelection<'a> {
    pub current: CurrentTier<'a>,
    pub next: NextTier<'a>,
}

/// Highest tier whose minimum level does not exceed `level`, plus the one after it.
///
/// `tiers` must be in ascending minimum-level order.
pub fn select_tier(
    level: i32,
    tiers: &[TierDefinition],
) -> Result<TierSelection<'_>, ProgressError> {
    if tiers.is_empty() {
        return Err(ProgressError::UnknownTier);
    }

    let unlocked = tiers.partition_point(|t| t.min_level <= level);
    let next = match tiers.get(unlocked) {
        Some(tier) => NextTier::Tier(tier),
        None => NextTier::Top,
    };
    let current = match unlocked {
        0 => CurrentTier::BelowFirst,
        n => CurrentTier::Unlocked {
            index: n - 1,
            tier: &tiers[n - 1],
        },
    };

    Ok(TierSelection { current, next })
}

/// Actions on the current tier until the next tier unlocks.
///
/// At the top tier this counts actions until the table's max level instead.
/// Returns `None` when the top tier is in use and the max level is held.
pub fn actions_to_next_tier(
    table: &ExperienceTable,
    level: i32,
    experience: i64,
    tiers: &[TierDefinition],
) -> Result<Option<i64>, ProgressError> {
    let selection = select_tier(level, tiers)?;
    let current = selection
        .current
        .tier()
        .ok_or_else(|| ProgressError::BelowFirstTier {
            level,
            first: tiers[0].name.clone(),
            required: tiers[0].min_level,
        })?;

    let target_level = match selection.next {
        NextTier::Tier(next) => next.min_level,
        NextTier::Top => table.max_level(),
    };
    actions_to_level(table, experience, target_level, current.action_xp)
}

// ============================================================================
// Results
// ============================================================================

/// Everything derived for one skill and one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionResult {
    pub level: i32,
    pub experience: i64,
    pub next_level: LevelGap,
    /// Action cost the counts below are based on; `None` below the first tier
    pub action_xp: Option<i64>,
    pub actions_to_level_up: Option<i64>,
    pub current_tier: Option<String>,
    /// `None` when the current tier is the top tier
    pub next_tier: Option<String>,
    pub actions_to_next_tier: Option<i64>,
}

impl ProgressionResult {
    /// Progression for an activity with a single fixed action cost.
    pub fn for_action(
        table: &ExperienceTable,
        experience: i64,
        action_xp: i64,
    ) -> Result<Self, ProgressError> {
        let level = table.level_for_experience(experience)?;
        let next_level = next_level_gap(table, experience)?;
        Ok(Self {
            level,
            experience,
            next_level,
            action_xp: Some(action_xp),
            actions_to_level_up: next_level.actions(action_xp)?,
            current_tier: None,
            next_tier: None,
            actions_to_next_tier: None,
        })
    }

    /// Progression against a tier set, using the best unlocked tier.
    ///
    /// Below the first tier there is no action to count with, so only the
    /// level gap and the first tier to unlock are reported.
    pub fn for_tiers(
        table: &ExperienceTable,
        level: i32,
        experience: i64,
        tiers: &[TierDefinition],
    ) -> Result<Self, ProgressError> {
        let selection = select_tier(level, tiers)?;
        let next_level = next_level_gap(table, experience)?;
        let next_tier = selection.next.tier().map(|t| t.name.clone());

        let Some(current) = selection.current.tier() else {
            return Ok(Self {
                level,
                experience,
                next_level,
                action_xp: None,
                actions_to_level_up: None,
                current_tier: None,
                next_tier,
                actions_to_next_tier: None,
            });
        };

        Ok(Self {
            level,
            experience,
            next_level,
            action_xp: Some(current.action_xp),
            actions_to_level_up: next_level.actions(current.action_xp)?,
            current_tier: Some(current.name.clone()),
            next_tier,
            actions_to_next_tier: actions_to_next_tier(table, level, experience, tiers)?,
        })
    }
}
