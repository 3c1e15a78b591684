//! High alchemy calculator.
//!
//! Needs two collaborators: hiscores for the player's Magic experience and a
//! price source for nature runes, one of which is used per cast.

use serde::Serialize;
use tracing::debug;

use super::CalcError;
use crate::error::ProgressError;
use crate::experience::{ExperienceTable, MAX_LEVEL};
use crate::progression::{actions_to_level, actions_to_level_up, hours_for_actions};
use crate::skills::Skill;
use crate::source::{HiscoreSource, PriceSource};

/// Magic experience per High Level Alchemy cast
pub const HIGH_ALCH_XP: i64 = 65;

/// Casts per hour when alching continuously
pub const ALCHS_PER_HOUR: i64 = 1200;

pub const NATURE_RUNE: &str = "Nature rune";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlchemySettings {
    pub cast_xp: i64,
    pub casts_per_hour: i64,
}

impl Default for AlchemySettings {
    fn default() -> Self {
        Self {
            cast_xp: HIGH_ALCH_XP,
            casts_per_hour: ALCHS_PER_HOUR,
        }
    }
}

/// Casts, rune cost and time to reach a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingCost {
    pub casts: i64,
    pub coins: i64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlchemyEstimate {
    pub player: String,
    pub level: i32,
    pub experience: i64,
    pub rune_price: i64,
    /// `None` once Magic is 99
    pub to_next_level: Option<TrainingCost>,
    pub to_level_99: Option<TrainingCost>,
}

pub struct AlchemyCalculator<H, P> {
    hiscores: H,
    prices: P,
    settings: AlchemySettings,
    table: &'static ExperienceTable,
}

impl<H: HiscoreSource, P: PriceSource> AlchemyCalculator<H, P> {
    pub fn new(hiscores: H, prices: P) -> Self {
        Self::with_settings(hiscores, prices, AlchemySettings::default())
    }

    pub fn with_settings(hiscores: H, prices: P, settings: AlchemySettings) -> Self {
        Self {
            hiscores,
            prices,
            settings,
            table: ExperienceTable::standard(),
        }
    }

    pub fn estimate(&self, player: &str) -> Result<AlchemyEstimate, CalcError> {
        let snapshot = self.hiscores.lookup(player)?;
        let rune_price = self.prices.price(NATURE_RUNE)?;
        let experience = snapshot.experience(Skill::Magic);

        let to_next_level = actions_to_level_up(self.table, experience, self.settings.cast_xp)?
            .map(|casts| self.cost(casts, rune_price))
            .transpose()?;
        let to_level_99 =
            actions_to_level(self.table, experience, MAX_LEVEL, self.settings.cast_xp)?
                .map(|casts| self.cost(casts, rune_price))
                .transpose()?;

        debug!(
            "Alchemy estimate for {}: {:?} casts to level up at {} gp per rune",
            player,
            to_next_level.map(|c| c.casts),
            rune_price
        );

        Ok(AlchemyEstimate {
            player: snapshot.player.clone(),
            level: self.table.level_for_experience(experience)?,
            experience,
            rune_price,
            to_next_level,
            to_level_99,
        })
    }

    fn cost(&self, casts: i64, rune_price: i64) -> Result<TrainingCost, ProgressError> {
        Ok(TrainingCost {
            casts,
            coins: casts
                .checked_mul(rune_price)
                .ok_or(ProgressError::CostOverflow {
                    actions: casts,
                    price: rune_price,
                })?,
            hours: hours_for_actions(casts, self.settings.casts_per_hour)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::{LEVEL_99_XP, experience_for_level};
    use crate::snapshot::{PlayerSnapshot, Rank, SkillEntry};
    use crate::source::{FixedPriceSource, MemorySource, SourceError};
    use chrono::Utc;

    fn hiscores(player: &str, experience: i64) -> MemorySource {
        let table = ExperienceTable::standard();
        let level = table.level_for_experience(experience).unwrap();
        let mut snapshot = PlayerSnapshot::new(player, Utc::now());
        snapshot.insert(Skill::Magic, SkillEntry::new(level, experience, Rank::Ranked(42)));
        let mut source = MemorySource::new();
        source.insert(snapshot);
        source
    }

    fn prices() -> FixedPriceSource {
        FixedPriceSource::new().with_price(NATURE_RUNE, 200)
    }

    #[test]
    fn test_estimate() {
        let xp = experience_for_level(55).unwrap();
        let calc = AlchemyCalculator::new(hiscores("alcher", xp), prices());
        let estimate = calc.estimate("alcher").unwrap();

        assert_eq!(estimate.level, 55);
        let gap = experience_for_level(56).unwrap() - xp;
        let next = estimate.to_next_level.unwrap();
        assert_eq!(next.casts, gap / HIGH_ALCH_XP + 1);
        assert_eq!(next.coins, next.casts * 200);
        assert_eq!(next.hours, next.casts as f64 / 1200.0);

        let to_99 = estimate.to_level_99.unwrap();
        assert_eq!(to_99.casts, (LEVEL_99_XP - xp) / HIGH_ALCH_XP + 1);
    }

    #[test]
    fn test_just_below_99() {
        let calc = AlchemyCalculator::new(hiscores("close", 13_000_000), prices());
        let estimate = calc.estimate("close").unwrap();

        // 34,431 xp left at 65 per cast
        assert_eq!(estimate.to_next_level.unwrap().casts, 530);
        assert_eq!(estimate.to_level_99.unwrap().casts, 530);
    }

    #[test]
    fn test_capped_magic() {
        let calc = AlchemyCalculator::new(hiscores("maxed", 13_100_000), prices());
        let estimate = calc.estimate("maxed").unwrap();

        assert_eq!(estimate.level, 99);
        assert_eq!(estimate.to_next_level, None);
        assert_eq!(estimate.to_level_99, None);
    }

    #[test]
    fn test_missing_price() {
        let calc = AlchemyCalculator::new(hiscores("alcher", 0), FixedPriceSource::new());
        assert!(matches!(
            calc.estimate("alcher"),
            Err(CalcError::Source(SourceError::UnknownItem(_)))
        ));
    }

    #[test]
    fn test_rune_price_overflow() {
        // Two casts to level 2 still fit; the casts to 99 do not
        let price = i64::MAX / 2;
        let prices = FixedPriceSource::new().with_price(NATURE_RUNE, price);
        let calc = AlchemyCalculator::new(hiscores("alcher", 0), prices);
        match calc.estimate("alcher") {
            Err(CalcError::Progress(ProgressError::CostOverflow { actions, price: p })) => {
                assert_eq!(p, price);
                assert_eq!(actions, LEVEL_99_XP / HIGH_ALCH_XP + 1);
            }
            other => panic!("expected cost overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_settings() {
        let settings = AlchemySettings {
            cast_xp: 0,
            casts_per_hour: ALCHS_PER_HOUR,
        };
        let calc = AlchemyCalculator::with_settings(hiscores("alcher", 0), prices(), settings);
        assert!(matches!(
            calc.estimate("alcher"),
            Err(CalcError::Progress(ProgressError::InvalidActionCost(0)))
        ));

        let settings = AlchemySettings {
            cast_xp: HIGH_ALCH_XP,
            casts_per_hour: 0,
        };
        let calc = AlchemyCalculator::with_settings(hiscores("alcher", 0), prices(), settings);
        assert!(matches!(
            calc.estimate("alcher"),
            Err(CalcError::Progress(ProgressError::InvalidRate(0)))
        ));
    }
}
