//! Reducer configuration.
//!
//! Values come from `PERP_INDEXER_`-prefixed environment variables, every one
//! of them optional:
//!
//! | Variable | Default |
//! |---|---|
//! | `PERP_INDEXER_EPOCH_START` | `1688169600` |
//! | `PERP_INDEXER_V2_USER_WINDOW_START` / `_END` | unset (no gating) |
//! | `PERP_INDEXER_V3_USER_WINDOW_START` / `_END` | `1681084800` / `1683072000` |
//! | `PERP_INDEXER_STAKING_WINDOW_START` / `_END` | `1693468800` / `1696060800` |

use serde::Deserialize;

use crate::error::IndexerError;

pub const ENV_PREFIX: &str = "PERP_INDEXER_";

/// Half-open `[start, end)` range of block timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: u64,
    pub end: u64,
}

impl TimeWindow {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Start of epoch `0` of the epoch rollups.
    #[serde(default = "default_epoch_start")]
    pub epoch_start: u64,

    pub v2_user_window_start: Option<u64>,
    pub v2_user_window_end: Option<u64>,

    #[serde(default = "default_v3_user_window_start")]
    pub v3_user_window_start: u64,
    #[serde(default = "default_v3_user_window_end")]
    pub v3_user_window_end: u64,

    #[serde(default = "default_staking_window_start")]
    pub staking_window_start: u64,
    #[serde(default = "default_staking_window_end")]
    pub staking_window_end: u64,
}

fn default_epoch_start() -> u64 {
    1_688_169_600
}

fn default_v3_user_window_start() -> u64 {
    1_681_084_800
}

fn default_v3_user_window_end() -> u64 {
    1_683_072_000
}

fn default_staking_window_start() -> u64 {
    1_693_468_800
}

fn default_staking_window_end() -> u64 {
    1_696_060_800
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            epoch_start: default_epoch_start(),
            v2_user_window_start: None,
            v2_user_window_end: None,
            v3_user_window_start: default_v3_user_window_start(),
            v3_user_window_end: default_v3_user_window_end(),
            staking_window_start: default_staking_window_start(),
            staking_window_end: default_staking_window_end(),
        }
    }
}

impl IndexerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, IndexerError> {
        Self::from_vars(std::env::vars())
    }

    /// Loads configuration from `(name, value)` pairs, names carrying
    /// [`ENV_PREFIX`].
    pub fn from_vars<I>(vars: I) -> Result<Self, IndexerError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), IndexerError> {
        if self.v2_user_window_start.is_some() != self.v2_user_window_end.is_some() {
            return Err(IndexerError::InvalidConfig(
                "v2 user window needs both start and end".to_string(),
            ));
        }
        let windows = [
            self.v2_user_window(),
            Some(self.v3_user_window()),
            Some(self.staking_window()),
        ];
        if windows.iter().flatten().any(|w| w.start > w.end) {
            return Err(IndexerError::InvalidConfig(
                "window start is after its end".to_string(),
            ));
        }
        Ok(())
    }

    /// User eligibility window of the second generation, if configured.
    pub fn v2_user_window(&self) -> Option<TimeWindow> {
        Some(TimeWindow::new(
            self.v2_user_window_start?,
            self.v2_user_window_end?,
        ))
    }

    pub fn v3_user_window(&self) -> TimeWindow {
        TimeWindow::new(self.v3_user_window_start, self.v3_user_window_end)
    }

    /// Campaign window of the first staking contract generation.
    pub fn staking_window(&self) -> TimeWindow {
        TimeWindow::new(self.staking_window_start, self.staking_window_end)
    }
}
