//! Error types for progression calculations and data loading.

use std::path::{Path, PathBuf};

/// Errors raised by the experience table and the progression engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    /// A level outside the table's supported range.
    #[error("level {level} is outside the supported range 1..={max}")]
    LevelOutOfRange {
        /// The requested level.
        level: i32,
        /// Highest level defined by the table.
        max: i32,
    },

    /// Experience values can never be negative.
    #[error("experience {0} is outside the supported range")]
    ExperienceOutOfRange(i64),

    /// An experience gap below zero was passed to an action count.
    #[error("experience gap {0} is negative")]
    NegativeGap(i64),

    /// Action cost must be a positive amount of experience.
    #[error("invalid action cost {0}: must be greater than zero")]
    InvalidActionCost(i64),

    /// Actions-per-hour rate must be positive.
    #[error("invalid action rate {0}: must be greater than zero")]
    InvalidRate(i64),

    /// Tier lookups need at least one tier.
    #[error("no tiers defined")]
    UnknownTier,

    /// Total coin cost does not fit in an `i64`.
    #[error("cost of {actions} actions at {price} coins each overflows")]
    CostOverflow { actions: i64, price: i64 },

    /// No tier unlocked yet, so there is no action to repeat.
    #[error("level {level} is below the first tier ({first} at level {required})")]
    BelowFirstTier {
        level: i32,
        first: String,
        required: i32,
    },
}

impl ProgressError {
    /// True for the out-of-range family (level, experience or gap).
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ProgressError::LevelOutOfRange { .. }
                | ProgressError::ExperienceOutOfRange(_)
                | ProgressError::NegativeGap(_)
        )
    }
}

/// Errors raised while loading tier files, config and snapshots.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A tier set that breaks the ordering or cost rules.
    #[error("invalid tier set '{id}': {reason}")]
    InvalidTierSet { id: String, reason: String },

    /// Unknown skill name in a data file.
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    /// Malformed hiscore lite data.
    #[error("malformed hiscore line {line}: {reason}")]
    MalformedSnapshot { line: usize, reason: String },
}

impl DataError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        DataError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn toml(path: &Path, source: toml::de::Error) -> Self {
        DataError::Toml {
            path: path.to_path_buf(),
            source,
        }
    }
}
