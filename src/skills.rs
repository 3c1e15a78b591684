//! Hiscore skill identifiers.
//!
//! Skills are listed in hiscore order, which is also the line order of the
//! lite CSV format read by [`crate::snapshot`].

use serde::{Deserialize, Serialize};

/// Every skill row on the hiscore page, `Overall` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Overall,
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecraft,
    Hunter,
    Construction,
}

impl Skill {
    /// All skills in hiscore order.
    pub const ALL: [Skill; 24] = [
        Skill::Overall,
        Skill::Attack,
        Skill::Defence,
        Skill::Strength,
        Skill::Hitpoints,
        Skill::Ranged,
        Skill::Prayer,
        Skill::Magic,
        Skill::Cooking,
        Skill::Woodcutting,
        Skill::Fletching,
        Skill::Fishing,
        Skill::Firemaking,
        Skill::Crafting,
        Skill::Smithing,
        Skill::Mining,
        Skill::Herblore,
        Skill::Agility,
        Skill::Thieving,
        Skill::Slayer,
        Skill::Farming,
        Skill::Runecraft,
        Skill::Hunter,
        Skill::Construction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Overall => "overall",
            Skill::Attack => "attack",
            Skill::Defence => "defence",
            Skill::Strength => "strength",
            Skill::Hitpoints => "hitpoints",
            Skill::Ranged => "ranged",
            Skill::Prayer => "prayer",
            Skill::Magic => "magic",
            Skill::Cooking => "cooking",
            Skill::Woodcutting => "woodcutting",
            Skill::Fletching => "fletching",
            Skill::Fishing => "fishing",
            Skill::Firemaking => "firemaking",
            Skill::Crafting => "crafting",
            Skill::Smithing => "smithing",
            Skill::Mining => "mining",
            Skill::Herblore => "herblore",
            Skill::Agility => "agility",
            Skill::Thieving => "thieving",
            Skill::Slayer => "slayer",
            Skill::Farming => "farming",
            Skill::Runecraft => "runecraft",
            Skill::Hunter => "hunter",
            Skill::Construction => "construction",
        }
    }

    /// Capitalized name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Skill::Overall => "Overall",
            Skill::Attack => "Attack",
            Skill::Defence => "Defence",
            Skill::Strength => "Strength",
            Skill::Hitpoints => "Hitpoints",
            Skill::Ranged => "Ranged",
            Skill::Prayer => "Prayer",
            Skill::Magic => "Magic",
            Skill::Cooking => "Cooking",
            Skill::Woodcutting => "Woodcutting",
            Skill::Fletching => "Fletching",
            Skill::Fishing => "Fishing",
            Skill::Firemaking => "Firemaking",
            Skill::Crafting => "Crafting",
            Skill::Smithing => "Smithing",
            Skill::Mining => "Mining",
            Skill::Herblore => "Herblore",
            Skill::Agility => "Agility",
            Skill::Thieving => "Thieving",
            Skill::Slayer => "Slayer",
            Skill::Farming => "Farming",
            Skill::Runecraft => "Runecraft",
            Skill::Hunter => "Hunter",
            Skill::Construction => "Construction",
        }
    }

    /// Resolve a command name or one of its aliases, case-insensitively.
    pub fn from_alias(s: &str) -> Option<Self> {
        let skill = match s.trim().to_lowercase().as_str() {
            "overall" | "total" => Skill::Overall,
            "attack" | "att" => Skill::Attack,
            "defence" | "defense" | "def" => Skill::Defence,
            "strength" | "str" => Skill::Strength,
            "hitpoints" | "hp" | "health" => Skill::Hitpoints,
            "ranged" | "range" | "rng" => Skill::Ranged,
            "prayer" | "pray" => Skill::Prayer,
            "magic" | "mage" => Skill::Magic,
            "cooking" | "cook" => Skill::Cooking,
            "woodcutting" | "wc" => Skill::Woodcutting,
            "fletching" | "fletch" => Skill::Fletching,
            "fishing" | "fish" => Skill::Fishing,
            "firemaking" | "fm" => Skill::Firemaking,
            "crafting" | "craft" => Skill::Crafting,
            "smithing" | "smith" => Skill::Smithing,
            "mining" | "mine" => Skill::Mining,
            "herblore" | "herb" => Skill::Herblore,
            "agility" | "agil" => Skill::Agility,
            "thieving" | "thiev" | "thief" => Skill::Thieving,
            "slayer" | "slay" => Skill::Slayer,
            "farming" | "farm" => Skill::Farming,
            "runecraft" | "runecrafting" | "rc" => Skill::Runecraft,
            "hunter" | "hunt" => Skill::Hunter,
            "construction" | "con" => Skill::Construction,
            _ => return None,
        };
        Some(skill)
    }

    /// Overall is a sum of the others and has no level table of its own.
    pub fn is_overall(&self) -> bool {
        matches!(self, Skill::Overall)
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Skill::from_alias("att"), Some(Skill::Attack));
        assert_eq!(Skill::from_alias("Defense"), Some(Skill::Defence));
        assert_eq!(Skill::from_alias(" WC "), Some(Skill::Woodcutting));
        assert_eq!(Skill::from_alias("thief"), Some(Skill::Thieving));
        assert_eq!(Skill::from_alias("sailing"), None);
    }

    #[test]
    fn test_every_skill_resolves_by_id() {
        for skill in Skill::ALL {
            assert_eq!(Skill::from_alias(skill.as_str()), Some(skill));
        }
    }

    #[test]
    fn test_hiscore_order() {
        assert_eq!(Skill::ALL[0], Skill::Overall);
        assert_eq!(Skill::ALL[17], Skill::Agility);
        assert_eq!(Skill::ALL[23], Skill::Construction);
        assert!(Skill::Attack < Skill::Construction);
    }
}
