//! Combat level calculation.
//!
//! Formula:
//!   base   = (defence + hitpoints + floor(prayer / 2)) / 4
//!   melee  = 13/40 * (attack + strength)
//!   ranged = 13/40 * floor(3 * ranged / 2)
//!   magic  = 13/40 * floor(3 * magic / 2)
//!   combat = base + max(melee, ranged, magic)
//!
//! Range: 3 (fresh account, 10 Hitpoints) to 126 (all combat skills 99).

use serde::Serialize;

use crate::skills::Skill;
use crate::snapshot::PlayerSnapshot;

/// The style that contributes most to the combat level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Melee,
    Ranged,
    Magic,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Melee => "Melee",
            Discipline::Ranged => "Ranged",
            Discipline::Magic => "Magic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatLevels {
    pub attack: i32,
    pub strength: i32,
    pub defence: i32,
    pub hitpoints: i32,
    pub ranged: i32,
    pub magic: i32,
    pub prayer: i32,
}

impl Default for CombatLevels {
    /// A fresh account
    fn default() -> Self {
        Self {
            attack: 1,
            strength: 1,
            defence: 1,
            hitpoints: 10,
            ranged: 1,
            magic: 1,
            prayer: 1,
        }
    }
}

impl CombatLevels {
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Self {
            attack: snapshot.level(Skill::Attack),
            strength: snapshot.level(Skill::Strength),
            defence: snapshot.level(Skill::Defence),
            hitpoints: snapshot.level(Skill::Hitpoints).max(10),
            ranged: snapshot.level(Skill::Ranged),
            magic: snapshot.level(Skill::Magic),
            prayer: snapshot.level(Skill::Prayer),
        }
    }

    /// Exact combat level, e.g. 126.1 for a maxed account
    pub fn combat_level(&self) -> f64 {
        let (level, _) = self.breakdown();
        level
    }

    pub fn discipline(&self) -> Discipline {
        let (_, discipline) = self.breakdown();
        discipline
    }

    /// Combat level as shown in game
    pub fn display_level(&self) -> i32 {
        self.combat_level().floor() as i32
    }

    fn breakdown(&self) -> (f64, Discipline) {
        let base = (self.defence + self.hitpoints + self.prayer / 2) as f64 / 4.0;
        let melee = 0.325 * (self.attack + self.strength) as f64;
        let ranged = 0.325 * (self.ranged * 3 / 2) as f64;
        let magic = 0.325 * (self.magic * 3 / 2) as f64;

        // Ties favour melee, then ranged
        let (best, discipline) = if melee >= ranged && melee >= magic {
            (melee, Discipline::Melee)
        } else if ranged >= magic {
            (ranged, Discipline::Ranged)
        } else {
            (magic, Discipline::Magic)
        };
        (base + best, discipline)
    }
}
