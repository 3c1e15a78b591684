//! Recent activity series from an experience tracker.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::skills::Skill;

/// Window covered by an activity series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerPeriod {
    Week,
    Month,
    Year,
}

impl TrackerPeriod {
    /// Resolve the command used to ask for it (`xp`, `mxp`, `yxp`)
    pub fn from_command(command: &str) -> Option<Self> {
        match command.to_lowercase().as_str() {
            "xp" | "wxp" | "week" => Some(TrackerPeriod::Week),
            "mxp" | "month" => Some(TrackerPeriod::Month),
            "yxp" | "year" => Some(TrackerPeriod::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerPeriod::Week => "week",
            TrackerPeriod::Month => "month",
            TrackerPeriod::Year => "year",
        }
    }

    pub fn duration(&self) -> TimeDelta {
        match self {
            TrackerPeriod::Week => TimeDelta::days(7),
            TrackerPeriod::Month => TimeDelta::days(30),
            TrackerPeriod::Year => TimeDelta::days(365),
        }
    }

    /// How many top gainers are worth listing for the period
    pub fn top_count(&self) -> usize {
        match self {
            TrackerPeriod::Week => 5,
            TrackerPeriod::Month => 10,
            TrackerPeriod::Year => 15,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackerPeriod::Week => "Weekly activity",
            TrackerPeriod::Month => "Monthly activity",
            TrackerPeriod::Year => "Yearly activity",
        }
    }
}

/// Gains in one skill over the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityGain {
    pub experience_gained: i64,
    /// Positive when the player climbed the hiscores
    pub rank_change: i64,
    pub levels_gained: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySeries {
    pub player: String,
    pub period: TrackerPeriod,
    /// End of the window
    pub until: DateTime<Utc>,
    gains: BTreeMap<Skill, ActivityGain>,
    /// Boss kills gained over the period, by boss name
    #[serde(default)]
    kills: BTreeMap<String, i64>,
}

impl ActivitySeries {
    pub fn new(player: &str, period: TrackerPeriod, until: DateTime<Utc>) -> Self {
        Self {
            player: player.to_string(),
            period,
            until,
            gains: BTreeMap::new(),
            kills: BTreeMap::new(),
        }
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.until - self.period.duration()
    }

    pub fn record(&mut self, skill: Skill, gain: ActivityGain) {
        self.gains.insert(skill, gain);
    }

    pub fn get(&self, skill: Skill) -> Option<&ActivityGain> {
        self.gains.get(&skill)
    }

    /// Zero or negative counts are not recorded
    pub fn record_kills(&mut self, boss: &str, kills: i64) {
        if kills > 0 {
            self.kills.insert(boss.to_string(), kills);
        }
    }

    /// Bosses killed over the period, most kills first.
    pub fn recent_kills(&self) -> Vec<(&str, i64)> {
        let mut kills: Vec<(&str, i64)> = self
            .kills
            .iter()
            .map(|(boss, n)| (boss.as_str(), *n))
            .collect();
        kills.sort_by(|a, b| b.1.cmp(&a.1));
        kills
    }

    /// Overall gains; summed from the skills when no Overall row was recorded
    pub fn overall(&self) -> ActivityGain {
        if let Some(overall) = self.gains.get(&Skill::Overall) {
            return *overall;
        }
        self.skill_gains().fold(ActivityGain::default(), |acc, (_, gain)| ActivityGain {
            experience_gained: acc.experience_gained + gain.experience_gained,
            rank_change: 0,
            levels_gained: acc.levels_gained + gain.levels_gained,
        })
    }

    /// Skills sorted by experience gained, largest first, skipping idle skills.
    pub fn top_gains(&self, limit: usize) -> Vec<(Skill, ActivityGain)> {
        let mut gains: Vec<(Skill, ActivityGain)> = self
            .skill_gains()
            .filter(|(_, gain)| gain.experience_gained > 0)
            .map(|(skill, gain)| (skill, *gain))
            .collect();
        // Stable sort keeps hiscore order between equal gains
        gains.sort_by(|a, b| b.1.experience_gained.cmp(&a.1.experience_gained));
        gains.truncate(limit);
        gains
    }

    fn skill_gains(&self) -> impl Iterator<Item = (Skill, &ActivityGain)> {
        self.gains
            .iter()
            .filter(|(skill, _)| !skill.is_overall())
            .map(|(skill, gain)| (*skill, gain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gain(experience_gained: i64, levels_gained: i32) -> ActivityGain {
        ActivityGain {
            experience_gained,
            rank_change: 10,
            levels_gained,
        }
    }

    #[test]
    fn test_period_commands() {
        assert_eq!(TrackerPeriod::from_command("xp"), Some(TrackerPeriod::Week));
        assert_eq!(TrackerPeriod::from_command("MXP"), Some(TrackerPeriod::Month));
        assert_eq!(TrackerPeriod::from_command("yxp"), Some(TrackerPeriod::Year));
        assert_eq!(TrackerPeriod::from_command("dxp"), None);
        assert_eq!(TrackerPeriod::Month.top_count(), 10);
    }

    #[test]
    fn test_window() {
        let until = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let series = ActivitySeries::new("tracker", TrackerPeriod::Week, until);
        assert_eq!(series.since(), Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_top_gains() {
        let mut series = ActivitySeries::new("grinder", TrackerPeriod::Week, Utc::now());
        series.record(Skill::Overall, gain(900_000, 6));
        series.record(Skill::Agility, gain(300_000, 2));
        series.record(Skill::Magic, gain(500_000, 3));
        series.record(Skill::Cooking, gain(100_000, 1));
        series.record(Skill::Fishing, gain(0, 0));

        let top = series.top_gains(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, Skill::Magic);
        assert_eq!(top[1].0, Skill::Agility);

        // Idle skills never make the list
        assert_eq!(series.top_gains(10).len(), 3);
        assert_eq!(series.overall().experience_gained, 900_000);
    }

    #[test]
    fn test_overall_summed_without_row() {
        let mut series = ActivitySeries::new("partial", TrackerPeriod::Month, Utc::now());
        series.record(Skill::Attack, gain(1_000, 1));
        series.record(Skill::Strength, gain(2_500, 2));

        let overall = series.overall();
        assert_eq!(overall.experience_gained, 3_500);
        assert_eq!(overall.levels_gained, 3);
    }

    #[test]
    fn test_recent_kills() {
        let mut series = ActivitySeries::new("bosser", TrackerPeriod::Week, Utc::now());
        series.record_kills("Zulrah", 40);
        series.record_kills("Vorkath", 75);
        series.record_kills("Obor", 0);

        assert_eq!(series.recent_kills(), vec![("Vorkath", 75), ("Zulrah", 40)]);
    }

    #[test]
    fn test_series_without_kills_deserializes() {
        let json = r#"{"player":"old","period":"week","until":"2024-03-08T12:00:00Z","gains":{}}"#;
        let series: ActivitySeries = serde_json::from_str(json).unwrap();
        assert!(series.recent_kills().is_empty());
    }
}
