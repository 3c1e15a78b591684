//! Tier Set Registry
//!
//! Loads and caches tier sets from TOML files.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::definition::{RawTierSet, TierSet, agility_rooftops};
use crate::error::DataError;
use crate::skills::Skill;

/// Registry for all tier sets
pub struct TierRegistry {
    sets: HashMap<String, TierSet>,
}

impl TierRegistry {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in sets
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(agility_rooftops());
        registry
    }

    /// Load all tier sets from `<data_dir>/tiers`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), DataError> {
        let tiers_dir = data_dir.join("tiers");

        if !tiers_dir.exists() {
            warn!("Tiers directory does not exist: {:?}", tiers_dir);
            return Ok(());
        }

        let entries =
            std::fs::read_dir(&tiers_dir).map_err(|e| DataError::io(&tiers_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| DataError::io(&tiers_dir, e))?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "toml") {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;

                // Parse as table of tier sets
                let table: HashMap<String, RawTierSet> =
                    toml::from_str(&content).map_err(|e| DataError::toml(&path, e))?;

                for (id, raw) in table {
                    let set = TierSet::from_raw(&id, &raw)?;
                    if self.sets.contains_key(&id) {
                        warn!("Duplicate tier set ID '{}' in {:?}, overwriting", id, path);
                    }
                    info!(
                        "Loaded tier set: {} ({}) - {} tiers for {}",
                        set.display_name,
                        id,
                        set.tiers().len(),
                        set.skill
                    );
                    self.sets.insert(id, set);
                }
            }
        }

        info!("Loaded {} tier sets", self.sets.len());

        Ok(())
    }

    /// Add or replace a set, keyed by its id
    pub fn insert(&mut self, set: TierSet) {
        self.sets.insert(set.id.clone(), set);
    }

    /// Get a tier set by ID
    pub fn get(&self, id: &str) -> Option<&TierSet> {
        self.sets.get(id)
    }

    /// Get all tier set IDs
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.sets.keys()
    }

    /// Tier sets that train the given skill, sorted by id
    pub fn for_skill(&self, skill: Skill) -> Vec<&TierSet> {
        let mut sets: Vec<&TierSet> = self.sets.values().filter(|s| s.skill == skill).collect();
        sets.sort_by(|a, b| a.id.cmp(&b.id));
        sets
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for TierRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
