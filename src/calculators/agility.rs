//! Rooftop agility course calculator.
//!
//! Picks the best course a player can run and counts laps on it to the next
//! level and to the next course.

use serde::Serialize;
use tracing::debug;

use super::CalcError;
use crate::experience::ExperienceTable;
use crate::progression::{LevelGap, NextTier, actions_to_next_tier, next_level_gap, select_tier};
use crate::skills::Skill;
use crate::snapshot::PlayerSnapshot;
use crate::source::HiscoreSource;
use crate::tiers::{TierSet, agility_rooftops};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgilityReport {
    pub player: String,
    pub level: i32,
    pub experience: i64,
    /// Best course available, `None` below the first course
    pub course: Option<String>,
    pub lap_xp: Option<i64>,
    /// Next course to unlock, `None` when already on the last one
    pub next_course: Option<String>,
    pub next_level: LevelGap,
    pub laps_to_level_up: Option<i64>,
    /// Laps until the next course, or until level 99 on the last course
    pub laps_to_next_course: Option<i64>,
}

pub struct AgilityCalculator<H> {
    hiscores: H,
    courses: TierSet,
    table: &'static ExperienceTable,
}

impl<H: HiscoreSource> AgilityCalculator<H> {
    /// Calculator over the built-in rooftop courses
    pub fn new(hiscores: H) -> Self {
        Self::with_courses(hiscores, agility_rooftops())
    }

    pub fn with_courses(hiscores: H, courses: TierSet) -> Self {
        Self {
            hiscores,
            courses,
            table: ExperienceTable::standard(),
        }
    }

    pub fn courses(&self) -> &TierSet {
        &self.courses
    }

    pub fn lookup(&self, player: &str) -> Result<AgilityReport, CalcError> {
        let snapshot = self.hiscores.lookup(player)?;
        self.report(&snapshot)
    }

    /// Build the report from an already fetched snapshot
    pub fn report(&self, snapshot: &PlayerSnapshot) -> Result<AgilityReport, CalcError> {
        let level = snapshot.level(Skill::Agility);
        let experience = snapshot.experience(Skill::Agility);
        let tiers = self.courses.tiers();

        let selection = select_tier(level, tiers)?;
        let next_level = next_level_gap(self.table, experience)?;
        let next_course = match selection.next {
            NextTier::Tier(tier) => Some(tier.name.clone()),
            NextTier::Top => None,
        };

        let report = match selection.current.tier() {
            Some(course) => AgilityReport {
                player: snapshot.player.clone(),
                level,
                experience,
                course: Some(course.name.clone()),
                lap_xp: Some(course.action_xp),
                next_course,
                next_level,
                laps_to_level_up: next_level.actions(course.action_xp)?,
                laps_to_next_course: actions_to_next_tier(self.table, level, experience, tiers)?,
            },
            None => AgilityReport {
                player: snapshot.player.clone(),
                level,
                experience,
                course: None,
                lap_xp: None,
                next_course,
                next_level,
                laps_to_level_up: None,
                laps_to_next_course: None,
            },
        };

        debug!(
            "Agility report for {}: level {} on {:?}",
            report.player, report.level, report.course
        );
        Ok(report)
    }
}
