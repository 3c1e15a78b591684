//! Level ↔ experience conversion following the RuneScape curve.
//!
//! Level 1 = 0 XP, Level 2 = 83 XP, Level 99 = 13,034,431 XP.
//! The table is computed once and shared read-only; [`ExperienceTable::standard`]
//! covers levels 1 to 99.

use std::sync::LazyLock;

use crate::error::ProgressError;

/// Maximum skill level on the hiscores
pub const MAX_LEVEL: i32 = 99;

/// Highest virtual level the curve is defined for
pub const MAX_VIRTUAL_LEVEL: i32 = 126;

/// Experience required for level 99
pub const LEVEL_99_XP: i64 = 13_034_431;

/// Experience cap for a single skill
pub const MAX_EXPERIENCE: i64 = 200_000_000;

static STANDARD: LazyLock<ExperienceTable> = LazyLock::new(|| ExperienceTable::new(MAX_LEVEL));

/// Precomputed minimum experience for every level in `1..=max_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceTable {
    // thresholds[i] is the experience for level i + 1
    thresholds: Vec<i64>,
}

impl ExperienceTable {
    /// Build a table up to `max_level`, clamped to `1..=MAX_VIRTUAL_LEVEL`.
    pub fn new(max_level: i32) -> Self {
        let max_level = max_level.clamp(1, MAX_VIRTUAL_LEVEL);
        let mut thresholds = Vec::with_capacity(max_level as usize);
        thresholds.push(0);

        // Each level adds floor(l + 300 * 2^(l/7)) points; XP is a quarter of the running total
        let mut points: i64 = 0;
        for l in 1..max_level {
            points += (l as f64 + 300.0 * 2.0_f64.powf(l as f64 / 7.0)).floor() as i64;
            thresholds.push(points / 4);
        }

        Self { thresholds }
    }

    /// The shared 1..=99 table.
    pub fn standard() -> &'static ExperienceTable {
        &STANDARD
    }

    pub fn max_level(&self) -> i32 {
        self.thresholds.len() as i32
    }

    /// Experience required for the highest level in the table
    pub fn max_level_experience(&self) -> i64 {
        self.thresholds.last().copied().unwrap_or(0)
    }

    /// Minimum cumulative experience required to hold `level`.
    pub fn experience_for_level(&self, level: i32) -> Result<i64, ProgressError> {
        if level < 1 || level > self.max_level() {
            return Err(ProgressError::LevelOutOfRange {
                level,
                max: self.max_level(),
            });
        }
        Ok(self.thresholds[(level - 1) as usize])
    }

    /// Highest level whose requirement does not exceed `experience`.
    ///
    /// Experience beyond the top threshold still maps to the table's max level.
    pub fn level_for_experience(&self, experience: i64) -> Result<i32, ProgressError> {
        if experience < 0 {
            return Err(ProgressError::ExperienceOutOfRange(experience));
        }
        // Binary search; thresholds[0] == 0 so at least one entry matches
        let count = self.thresholds.partition_point(|&xp| xp <= experience);
        Ok(count as i32)
    }

    /// Fraction of the current level completed (0.0 to 1.0)
    pub fn level_progress(&self, experience: i64) -> Result<f32, ProgressError> {
        let level = self.level_for_experience(experience)?;
        if level >= self.max_level() {
            return Ok(1.0);
        }
        let current_level_xp = self.experience_for_level(level)?;
        let next_level_xp = self.experience_for_level(level + 1)?;
        let xp_in_level = experience - current_level_xp;
        let xp_needed = next_level_xp - current_level_xp;
        Ok((xp_in_level as f32 / xp_needed as f32).clamp(0.0, 1.0))
    }
}

impl Default for ExperienceTable {
    fn default() -> Self {
        Self::new(MAX_LEVEL)
    }
}

/// [`ExperienceTable::experience_for_level`] on the standard table.
pub fn experience_for_level(level: i32) -> Result<i64, ProgressError> {
    ExperienceTable::standard().experience_for_level(level)
}

/// [`ExperienceTable::level_for_experience`] on the standard table.
pub fn level_for_experience(experience: i64) -> Result<i32, ProgressError> {
    ExperienceTable::standard().level_for_experience(experience)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_table() {
        // Known hiscore values
        assert_eq!(experience_for_level(1).unwrap(), 0);
        assert_eq!(experience_for_level(2).unwrap(), 83);
        assert_eq!(experience_for_level(10).unwrap(), 1_154);
        assert_eq!(experience_for_level(50).unwrap(), 101_333);
        assert_eq!(experience_for_level(92).unwrap(), 6_517_253);
        assert_eq!(experience_for_level(99).unwrap(), LEVEL_99_XP);
    }

    #[test]
    fn test_table_strictly_increasing() {
        let table = ExperienceTable::standard();
        for level in 1..table.max_level() {
            assert!(
                table.experience_for_level(level).unwrap()
                    < table.experience_for_level(level + 1).unwrap()
            );
        }
    }

    #[test]
    fn test_out_of_range_levels() {
        assert_eq!(
            experience_for_level(0),
            Err(ProgressError::LevelOutOfRange { level: 0, max: 99 })
        );
        assert!(experience_for_level(100).unwrap_err().is_out_of_range());
        assert!(level_for_experience(-1).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_experience(0).unwrap(), 1);
        assert_eq!(level_for_experience(82).unwrap(), 1);
        assert_eq!(level_for_experience(83).unwrap(), 2);
        assert_eq!(level_for_experience(100).unwrap(), 2);
        assert_eq!(level_for_experience(LEVEL_99_XP - 1).unwrap(), 98);
        assert_eq!(level_for_experience(MAX_EXPERIENCE).unwrap(), 99);
    }

    #[test]
    fn test_round_trip() {
        for level in 1..99 {
            let xp = experience_for_level(level).unwrap();
            assert_eq!(level_for_experience(xp).unwrap(), level);
        }
    }

    #[test]
    fn test_floor_never_exceeds_experience() {
        for xp in (0..MAX_EXPERIENCE).step_by(97_003) {
            let level = level_for_experience(xp).unwrap();
            assert!(experience_for_level(level).unwrap() <= xp);
        }
    }

    #[test]
    fn test_virtual_levels() {
        let table = ExperienceTable::new(126);
        assert_eq!(table.max_level(), 126);
        assert_eq!(table.experience_for_level(99).unwrap(), LEVEL_99_XP);
        assert!(table.max_level_experience() < MAX_EXPERIENCE);
        assert_eq!(ExperienceTable::new(500).max_level(), MAX_VIRTUAL_LEVEL);
    }

    #[test]
    fn test_level_progress() {
        let table = ExperienceTable::standard();
        assert_eq!(table.level_progress(0).unwrap(), 0.0);
        assert_eq!(table.level_progress(LEVEL_99_XP).unwrap(), 1.0);
        let halfway = table.level_progress(41).unwrap();
        assert!(halfway > 0.4 && halfway < 0.6);
    }
}
