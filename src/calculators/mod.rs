//! Activity Calculators
//!
//! Skill-specific calculators built on the progression engine. Each one
//! holds the collaborators it reads from and returns a plain report.

pub mod agility;
pub mod alchemy;

pub use agility::{AgilityCalculator, AgilityReport};
pub use alchemy::{AlchemyCalculator, AlchemyEstimate, AlchemySettings, TrainingCost};

use crate::error::ProgressError;
use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Progress(#[from] ProgressError),
}
