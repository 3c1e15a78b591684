//! Player hiscore snapshots.
//!
//! A snapshot is a point-in-time read of one player's levels, experience and
//! ranks. Snapshots are produced by a [`crate::source::HiscoreSource`] and are
//! never cached here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, ProgressError};
use crate::experience::{ExperienceTable, MAX_LEVEL};
use crate::progression::{LevelGap, ProgressionResult, next_level_gap};
use crate::skills::Skill;
use crate::tiers::TierSet;

/// Hiscore rank, or unranked when the player is not on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Ranked(i64),
    Unranked,
}

impl Rank {
    /// The lite format uses -1 for unranked
    pub fn from_raw(value: i64) -> Self {
        if value < 1 {
            Rank::Unranked
        } else {
            Rank::Ranked(value)
        }
    }

    pub fn position(&self) -> Option<i64> {
        match self {
            Rank::Ranked(rank) => Some(*rank),
            Rank::Unranked => None,
        }
    }
}

/// One skill row of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub level: i32,
    pub experience: i64,
    pub rank: Rank,
}

impl SkillEntry {
    pub fn new(level: i32, experience: i64, rank: Rank) -> Self {
        Self {
            level,
            experience,
            rank,
        }
    }
}

/// Minigame rows of the lite format, in the order they follow the skills.
pub const MINIGAMES: [&str; 12] = [
    "League Points",
    "Bounty Hunter - Hunter",
    "Bounty Hunter - Rogue",
    "Clue Scrolls (all)",
    "Clue Scrolls (beginner)",
    "Clue Scrolls (easy)",
    "Clue Scrolls (medium)",
    "Clue Scrolls (hard)",
    "Clue Scrolls (elite)",
    "Clue Scrolls (master)",
    "LMS - Rank",
    "Soul Wars Zeal",
];

/// Boss rows of the lite format, in the order they follow the minigames.
pub const BOSSES: [&str; 47] = [
    "Abyssal Sire",
    "Alchemical Hydra",
    "Barrows Chests",
    "Bryophyta",
    "Callisto",
    "Cerberus",
    "Chambers of Xeric",
    "Chambers of Xeric: Challenge Mode",
    "Chaos Elemental",
    "Chaos Fanatic",
    "Commander Zilyana",
    "Corporeal Beast",
    "Crazy Archaeologist",
    "Dagannoth Prime",
    "Dagannoth Rex",
    "Dagannoth Supreme",
    "Deranged Archaeologist",
    "General Graardor",
    "Giant Mole",
    "Grotesque Guardians",
    "Hespori",
    "Kalphite Queen",
    "King Black Dragon",
    "Kraken",
    "Kree'Arra",
    "K'ril Tsutsaroth",
    "Mimic",
    "Nightmare",
    "Obor",
    "Sarachnis",
    "Scorpia",
    "Skotizo",
    "Tempoross",
    "The Gauntlet",
    "The Corrupted Gauntlet",
    "Theatre of Blood",
    "Thermonuclear Smoke Devil",
    "TzKal-Zuk",
    "TzTok-Jad",
    "Venenatis",
    "Vet'ion",
    "Vorkath",
    "Wintertodt",
    "Zalcano",
    "Zulrah",
    "Phosani's Nightmare",
    "Theatre of Blood: Hard Mode",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Minigame,
    Boss,
}

/// A minigame score or boss kill count from the rows after the skills
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityScore {
    pub name: String,
    pub kind: ActivityKind,
    pub rank: Rank,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player: String,
    pub fetched_at: DateTime<Utc>,
    skills: BTreeMap<Skill, SkillEntry>,
    /// Scored activities in hiscore order; unscored rows are left out
    #[serde(default)]
    activities: Vec<ActivityScore>,
}

impl PlayerSnapshot {
    pub fn new(player: &str, fetched_at: DateTime<Utc>) -> Self {
        Self {
            player: player.to_string(),
            fetched_at,
            skills: BTreeMap::new(),
            activities: Vec::new(),
        }
    }

    /// Parse the hiscore lite format: one `rank,level,experience` line per
    /// skill in hiscore order, then `rank,score` lines for minigames and
    /// bosses. Activity rows past the known ones are ignored.
    pub fn parse_lite(
        player: &str,
        text: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, DataError> {
        let mut snapshot = Self::new(player, fetched_at);
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        for skill in Skill::ALL {
            let (index, line) = lines.next().ok_or_else(|| DataError::MalformedSnapshot {
                line: snapshot.skills.len() + 1,
                reason: format!("missing row for {}", skill),
            })?;
            let entry = parse_lite_row(skill, index + 1, line)?;
            snapshot.skills.insert(skill, entry);
        }

        let activities = MINIGAMES
            .iter()
            .map(|name| (*name, ActivityKind::Minigame))
            .chain(BOSSES.iter().map(|name| (*name, ActivityKind::Boss)));
        for ((index, line), (name, kind)) in lines.zip(activities) {
            if let Some(score) = parse_activity_row(name, kind, index + 1, line)? {
                snapshot.activities.push(score);
            }
        }

        debug!(
            "Parsed hiscore snapshot for {} with {} scored activities",
            player,
            snapshot.activities.len()
        );
        Ok(snapshot)
    }

    pub fn insert(&mut self, skill: Skill, entry: SkillEntry) {
        self.skills.insert(skill, entry);
    }

    pub fn get(&self, skill: Skill) -> Option<&SkillEntry> {
        self.skills.get(&skill)
    }

    /// Level of a skill, 1 when the skill is missing
    pub fn level(&self, skill: Skill) -> i32 {
        self.get(skill).map_or(1, |e| e.level)
    }

    /// Experience of a skill, 0 when the skill is missing
    pub fn experience(&self, skill: Skill) -> i64 {
        self.get(skill).map_or(0, |e| e.experience)
    }

    pub fn push_activity(&mut self, score: ActivityScore) {
        self.activities.push(score);
    }

    pub fn activities(&self) -> &[ActivityScore] {
        &self.activities
    }

    /// Boss kill counts in hiscore order
    pub fn kill_counts(&self) -> impl Iterator<Item = &ActivityScore> {
        self.activities
            .iter()
            .filter(|a| a.kind == ActivityKind::Boss)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, &SkillEntry)> {
        self.skills.iter().map(|(skill, entry)| (*skill, entry))
    }

    /// Skills with a level table, i.e. everything but Overall
    pub fn trained_skills(&self) -> impl Iterator<Item = (Skill, &SkillEntry)> {
        self.iter().filter(|(skill, _)| !skill.is_overall())
    }

    /// The skill closest to its next level, by experience remaining.
    ///
    /// Capped skills are skipped; ties go to the skill listed first on the hiscores.
    pub fn closest_level_up(&self, table: &ExperienceTable) -> Option<(Skill, i64)> {
        self.trained_skills()
            .filter_map(|(skill, entry)| match next_level_gap(table, entry.experience) {
                Ok(LevelGap::Remaining(gap)) => Some((skill, gap)),
                _ => None,
            })
            .min_by_key(|&(_, gap)| gap)
    }

    /// Skills at level 99, in hiscore order.
    pub fn maxed_skills(&self) -> Vec<Skill> {
        self.trained_skills()
            .filter(|(_, entry)| entry.level >= MAX_LEVEL)
            .map(|(skill, _)| skill)
            .collect()
    }

    /// Progression in `skill` for an activity worth `action_xp` per action.
    pub fn progression(
        &self,
        skill: Skill,
        table: &ExperienceTable,
        action_xp: i64,
    ) -> Result<ProgressionResult, ProgressError> {
        ProgressionResult::for_action(table, self.experience(skill), action_xp)
    }

    /// Progression against a tier set, in the set's own skill.
    pub fn tier_progression(
        &self,
        set: &TierSet,
        table: &ExperienceTable,
    ) -> Result<ProgressionResult, ProgressError> {
        ProgressionResult::for_tiers(
            table,
            self.level(set.skill),
            self.experience(set.skill),
            set.tiers(),
        )
    }
}

fn parse_lite_row(skill: Skill, line_no: usize, line: &str) -> Result<SkillEntry, DataError> {
    let malformed = |reason: String| DataError::MalformedSnapshot {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 3 {
        return Err(malformed(format!(
            "expected rank,level,experience for {} but found {} fields",
            skill,
            fields.len()
        )));
    }

    let mut numbers = [0i64; 3];
    for (slot, field) in numbers.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse()
            .map_err(|_| malformed(format!("'{}' is not a number", field)))?;
    }
    let [rank, level, experience] = numbers;

    let level = i32::try_from(level).map_err(|_| malformed(format!("level {} too large", level)))?;
    let experience = if experience < 0 {
        // Unranked rows report -1 experience; fall back to the level minimum
        if skill.is_overall() {
            0
        } else {
            ExperienceTable::standard()
                .experience_for_level(level)
                .unwrap_or(0)
        }
    } else {
        experience
    };

    Ok(SkillEntry::new(level, experience, Rank::from_raw(rank)))
}

fn parse_activity_row(
    name: &str,
    kind: ActivityKind,
    line_no: usize,
    line: &str,
) -> Result<Option<ActivityScore>, DataError> {
    let malformed = |reason: String| DataError::MalformedSnapshot {
        line: line_no,
        reason,
    };

    let (rank, score) = line
        .trim()
        .split_once(',')
        .ok_or_else(|| malformed(format!("expected rank,score for {}", name)))?;
    let rank: i64 = rank
        .trim()
        .parse()
        .map_err(|_| malformed(format!("'{}' is not a number", rank)))?;
    let score: i64 = score
        .trim()
        .parse()
        .map_err(|_| malformed(format!("'{}' is not a number", score)))?;

    if score < 0 {
        return Ok(None);
    }
    Ok(Some(ActivityScore {
        name: name.to_string(),
        kind,
        rank: Rank::from_raw(rank),
        score,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::experience::{LEVEL_99_XP, experience_for_level};
    use crate::tiers::agility_rooftops;

    /// A lite response with the given (level, experience) for every skill
    /// after Overall, in hiscore order, followed by a couple of activity rows.
    pub(crate) fn lite_text(rows: &[(i32, i64)]) -> String {
        let total_level: i32 = rows.iter().map(|(l, _)| l).sum();
        let total_xp: i64 = rows.iter().map(|(_, x)| x).sum();
        let mut text = format!("1500,{},{}\n", total_level, total_xp);
        for (i, (level, xp)) in rows.iter().enumerate() {
            text.push_str(&format!("{},{},{}\n", 1000 + i, level, xp));
        }
        text.push_str("-1,-1\n250,12\n");
        text
    }

    pub(crate) fn sample_rows() -> Vec<(i32, i64)> {
        let mut rows: Vec<(i32, i64)> = (1..=23)
            .map(|level| (level + 40, experience_for_level(level + 40).unwrap() + 500))
            .collect();
        // Magic maxed, Agility mid-band
        rows[6] = (99, 14_200_000);
        rows[16] = (72, experience_for_level(72).unwrap() + 12_000);
        rows
    }

    #[test]
    fn test_parse_lite() {
        let snapshot =
            PlayerSnapshot::parse_lite("zezima", &lite_text(&sample_rows()), Utc::now()).unwrap();

        assert_eq!(snapshot.player, "zezima");
        assert_eq!(snapshot.iter().count(), 24);
        assert_eq!(snapshot.level(Skill::Attack), 41);
        assert_eq!(snapshot.level(Skill::Magic), 99);
        assert_eq!(snapshot.experience(Skill::Magic), 14_200_000);
        assert_eq!(
            snapshot.get(Skill::Attack).unwrap().rank,
            Rank::Ranked(1000)
        );
        assert_eq!(snapshot.get(Skill::Overall).unwrap().rank.position(), Some(1500));
    }

    #[test]
    fn test_parse_unranked_row() {
        let mut rows = sample_rows();
        rows[0] = (5, -1);
        let mut text = lite_text(&rows);
        // Replace the Attack rank with -1
        text = text.replacen("1000,5,-1", "-1,5,-1", 1);

        let snapshot = PlayerSnapshot::parse_lite("ironman", &text, Utc::now()).unwrap();
        let attack = snapshot.get(Skill::Attack).unwrap();
        assert_eq!(attack.rank, Rank::Unranked);
        assert_eq!(attack.experience, experience_for_level(5).unwrap());
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let err = PlayerSnapshot::parse_lite("short", "1,2,3\n4,5,6\n", Utc::now()).unwrap_err();
        assert!(matches!(err, DataError::MalformedSnapshot { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        let mut text = lite_text(&sample_rows());
        text = text.replacen("1000,", "abc,", 1);
        match PlayerSnapshot::parse_lite("typo", &text, Utc::now()) {
            Err(DataError::MalformedSnapshot { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_closest_level_up() {
        let table = ExperienceTable::standard();
        let mut snapshot = PlayerSnapshot::new("close", Utc::now());
        let entry =
            |level: i32, experience: i64| SkillEntry::new(level, experience, Rank::Unranked);
        snapshot.insert(Skill::Overall, entry(150, 50_000_000));
        snapshot.insert(Skill::Attack, entry(60, experience_for_level(61).unwrap() - 10));
        snapshot.insert(Skill::Cooking, entry(2, experience_for_level(3).unwrap() - 10));
        snapshot.insert(Skill::Magic, entry(99, LEVEL_99_XP));
        snapshot.insert(Skill::Fishing, entry(1, 0));

        // Attack and Cooking tie; Attack is listed first
        assert_eq!(snapshot.closest_level_up(table), Some((Skill::Attack, 10)));
        assert_eq!(snapshot.maxed_skills(), vec![Skill::Magic]);
    }

    #[test]
    fn test_closest_level_up_all_capped() {
        let mut snapshot = PlayerSnapshot::new("maxed", Utc::now());
        snapshot.insert(Skill::Attack, SkillEntry::new(99, LEVEL_99_XP, Rank::Ranked(1)));
        assert_eq!(snapshot.closest_level_up(ExperienceTable::standard()), None);
    }

    #[test]
    fn test_generic_progression_lookup() {
        let snapshot =
            PlayerSnapshot::parse_lite("lookup", &lite_text(&sample_rows()), Utc::now()).unwrap();
        let table = ExperienceTable::standard();

        let magic = snapshot.progression(Skill::Magic, table, 65).unwrap();
        assert_eq!(magic.actions_to_level_up, None);

        let agility = snapshot.tier_progression(&agility_rooftops(), table).unwrap();
        assert_eq!(agility.level, 72);
        assert_eq!(agility.current_tier.as_deref(), Some("Pollnivneach"));
    }

    #[test]
    fn test_tier_progression_below_first_tier() {
        let mut snapshot = PlayerSnapshot::new("newbie", Utc::now());
        snapshot.insert(Skill::Agility, SkillEntry::new(5, 400, Rank::Unranked));

        let result = snapshot
            .tier_progression(&agility_rooftops(), ExperienceTable::standard())
            .unwrap();
        assert_eq!(result.current_tier, None);
        assert_eq!(result.next_tier.as_deref(), Some("Draynor"));
        assert_eq!(result.actions_to_next_tier, None);
    }

    #[test]
    fn test_parse_kill_counts() {
        let mut text = lite_text(&sample_rows());
        // lite_text already wrote the first two minigame rows
        for _ in 2..MINIGAMES.len() {
            text.push_str("-1,-1\n");
        }
        for boss in BOSSES {
            match boss {
                "Abyssal Sire" => text.push_str("3000,12\n"),
                "Zulrah" => text.push_str("1200,540\n"),
                _ => text.push_str("-1,-1\n"),
            }
        }
        // A row added after the known activities
        text.push_str("10,10\n");

        let snapshot = PlayerSnapshot::parse_lite("bosser", &text, Utc::now()).unwrap();
        let kills: Vec<(&str, i64)> = snapshot
            .kill_counts()
            .map(|k| (k.name.as_str(), k.score))
            .collect();
        assert_eq!(kills, vec![("Abyssal Sire", 12), ("Zulrah", 540)]);
        assert_eq!(snapshot.kill_counts().nth(1).unwrap().rank, Rank::Ranked(1200));

        // The bounty hunter row is a minigame, not a kill count
        assert_eq!(snapshot.activities().len(), 3);
        assert_eq!(snapshot.activities()[0].name, "Bounty Hunter - Hunter");
        assert_eq!(snapshot.activities()[0].kind, ActivityKind::Minigame);
    }

    #[test]
    fn test_parse_rejects_bad_activity_row() {
        let mut text = lite_text(&sample_rows());
        text.push_str("oops\n");
        assert!(matches!(
            PlayerSnapshot::parse_lite("typo", &text, Utc::now()),
            Err(DataError::MalformedSnapshot { line: 27, .. })
        ));
    }
}
