//! Runtime configuration for the coordinator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default seconds a waiting entry may sit in the queue before eviction.
pub const DEFAULT_QUEUE_TTL_SECS: u64 = 300;

/// Default seconds between eviction ticks.
pub const DEFAULT_EVICTION_TICK_SECS: u64 = 60;

/// Default number of records a leaderboard query returns.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Coordinator tuning knobs, loadable from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds a waiting entry may sit in the queue before eviction.
    pub queue_ttl_secs: u64,
    /// Seconds between eviction ticks.
    pub eviction_tick_secs: u64,
    /// Number of records a leaderboard query returns.
    pub leaderboard_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_ttl_secs: DEFAULT_QUEUE_TTL_SECS,
            eviction_tick_secs: DEFAULT_EVICTION_TICK_SECS,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

impl Config {
    /// Builds a config from `GRIDMATCH_*` environment variables, falling
    /// back to defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ttl) = read_env_u64("GRIDMATCH_QUEUE_TTL_SECS") {
            config.queue_ttl_secs = ttl;
        }
        if let Some(tick) = read_env_u64("GRIDMATCH_EVICTION_TICK_SECS") {
            config.eviction_tick_secs = tick;
        }
        if let Some(limit) = read_env_u64("GRIDMATCH_LEADERBOARD_LIMIT") {
            config.leaderboard_limit = limit as usize;
        }
        debug!(?config, "Configuration loaded");
        config
    }

    /// Queue ttl as a duration.
    pub fn queue_ttl(&self) -> Duration {
        Duration::from_secs(self.queue_ttl_secs)
    }

    /// Eviction tick as a duration.
    pub fn eviction_tick(&self) -> Duration {
        Duration::from_secs(self.eviction_tick_secs)
    }
}

fn read_env_u64(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, raw, "Ignoring unparseable environment value");
            None
        }
    }
}
