//! Tier System
//!
//! Provides ordered tier definitions and a registry for loading them.

pub mod definition;
pub mod registry;

pub use definition::{AGILITY_ROOFTOPS_ID, TierDefinition, TierSet, agility_rooftops};
pub use registry::TierRegistry;
