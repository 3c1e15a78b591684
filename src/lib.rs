//! Progression calculations over hiscore snapshots.
//!
//! Converts between levels and experience, picks the best unlocked tier of an
//! activity, and counts the actions needed to reach the next level or tier.
//! Data fetching lives behind the traits in [`source`].

pub mod activity;
pub mod calculators;
pub mod combat;
pub mod config;
pub mod error;
pub mod experience;
pub mod progression;
pub mod skills;
pub mod snapshot;
pub mod source;
pub mod tiers;

pub use error::{DataError, ProgressError};
pub use experience::{ExperienceTable, experience_for_level, level_for_experience};
pub use progression::{
    LevelGap, ProgressionResult, actions_to_cross, actions_to_next_tier, next_level_gap,
    select_tier,
};
pub use skills::Skill;
pub use snapshot::PlayerSnapshot;
pub use tiers::{TierDefinition, TierRegistry, TierSet};
