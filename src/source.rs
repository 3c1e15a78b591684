//! External data collaborators.
//!
//! The calculators never fetch anything themselves; they are handed sources
//! that return already-parsed data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::activity::{ActivitySeries, TrackerPeriod};
use crate::error::DataError;
use crate::snapshot::PlayerSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("player '{0}' not found")]
    PlayerNotFound(String),

    #[error("no price known for '{0}'")]
    UnknownItem(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Hiscore lookups: player name to snapshot.
pub trait HiscoreSource {
    fn lookup(&self, player: &str) -> Result<PlayerSnapshot, SourceError>;
}

/// Tracker lookups: recent gains over a period.
pub trait ActivitySource {
    fn activity(&self, player: &str, period: TrackerPeriod) -> Result<ActivitySeries, SourceError>;
}

/// Item price lookups, in coins.
pub trait PriceSource {
    fn price(&self, item: &str) -> Result<i64, SourceError>;
}

impl<T: HiscoreSource + ?Sized> HiscoreSource for &T {
    fn lookup(&self, player: &str) -> Result<PlayerSnapshot, SourceError> {
        (**self).lookup(player)
    }
}

impl<T: ActivitySource + ?Sized> ActivitySource for &T {
    fn activity(&self, player: &str, period: TrackerPeriod) -> Result<ActivitySeries, SourceError> {
        (**self).activity(player, period)
    }
}

impl<T: PriceSource + ?Sized> PriceSource for &T {
    fn price(&self, item: &str) -> Result<i64, SourceError> {
        (**self).price(item)
    }
}

/// File-backed sources: `<dir>/<player>.csv` in the hiscore lite format and
/// `<dir>/<player>.<period>.json` for tracker series.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, player: &str, extension: &str) -> PathBuf {
        // Hiscore names are case-insensitive and use spaces and underscores interchangeably
        let file = player.trim().to_lowercase().replace(' ', "_");
        self.dir.join(format!("{}.{}", file, extension))
    }
}

impl HiscoreSource for FileSource {
    fn lookup(&self, player: &str) -> Result<PlayerSnapshot, SourceError> {
        let path = self.path_for(player, "csv");
        if !path.exists() {
            return Err(SourceError::PlayerNotFound(player.to_string()));
        }
        debug!("Reading hiscore snapshot from {:?}", path);
        let text = std::fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;
        let snapshot = PlayerSnapshot::parse_lite(player, &text, Utc::now())?;
        info!("Loaded hiscores for {}", player);
        Ok(snapshot)
    }
}

impl ActivitySource for FileSource {
    fn activity(&self, player: &str, period: TrackerPeriod) -> Result<ActivitySeries, SourceError> {
        let path = self.path_for(player, &format!("{}.json", period.as_str()));
        if !path.exists() {
            return Err(SourceError::PlayerNotFound(player.to_string()));
        }
        debug!("Reading activity series from {:?}", path);
        let text = std::fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;
        let series: ActivitySeries =
            serde_json::from_str(&text).map_err(|e| DataError::json(&path, e))?;
        Ok(series)
    }
}

/// Fixed item prices, e.g. from config.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceSource {
    prices: HashMap<String, i64>,
}

impl FixedPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, item: &str, price: i64) -> Self {
        self.prices.insert(item.to_lowercase(), price);
        self
    }
}

impl PriceSource for FixedPriceSource {
    fn price(&self, item: &str) -> Result<i64, SourceError> {
        self.prices
            .get(&item.to_lowercase())
            .copied()
            .ok_or_else(|| SourceError::UnknownItem(item.to_string()))
    }
}

/// In-memory hiscores and tracker data keyed by lowercase player name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshots: HashMap<String, PlayerSnapshot>,
    activity: HashMap<(String, TrackerPeriod), ActivitySeries>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: PlayerSnapshot) {
        self.snapshots.insert(snapshot.player.to_lowercase(), snapshot);
    }

    pub fn insert_activity(&mut self, series: ActivitySeries) {
        self.activity
            .insert((series.player.to_lowercase(), series.period), series);
    }
}

impl HiscoreSource for MemorySource {
    fn lookup(&self, player: &str) -> Result<PlayerSnapshot, SourceError> {
        self.snapshots
            .get(&player.to_lowercase())
            .cloned()
            .ok_or_else(|| SourceError::PlayerNotFound(player.to_string()))
    }
}

impl ActivitySource for MemorySource {
    fn activity(&self, player: &str, period: TrackerPeriod) -> Result<ActivitySeries, SourceError> {
        self.activity
            .get(&(player.to_lowercase(), period))
            .cloned()
            .ok_or_else(|| SourceError::PlayerNotFound(player.to_string()))
    }
}
