//! Runtime configuration
//!
//! The font cache reads its thresholds from [`FontCacheConfig`]. Defaults
//! suit interactive use; processes that lay out a lot of text in bursts can
//! tune them through the environment:
//!
//! ```bash
//! SCRIPTLINE_FONT_CACHE_MIN_KB=16384 \
//! SCRIPTLINE_FONT_CACHE_FAST_MS=2000 \
//! SCRIPTLINE_FONT_CACHE_SLOW_MS=60000 ./my_app
//! ```

use std::time::Duration;

use crate::error::{LayoutError, Result};

pub const ENV_MIN_KB: &str = "SCRIPTLINE_FONT_CACHE_MIN_KB";
pub const ENV_FAST_MS: &str = "SCRIPTLINE_FONT_CACHE_FAST_MS";
pub const ENV_SLOW_MS: &str = "SCRIPTLINE_FONT_CACHE_SLOW_MS";

/// Thresholds and timer intervals of the font cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontCacheConfig {
    /// The cache never shrinks its budget below this many kilobytes.
    pub min_cost_kb: usize,
    /// Decay interval while the budget is still shrinking.
    pub fast_interval: Duration,
    /// Decay interval once the budget stopped shrinking.
    pub slow_interval: Duration,
}

impl Default for FontCacheConfig {
    fn default() -> Self {
        Self {
            min_cost_kb: 4 * 1024,
            fast_interval: Duration::from_secs(10),
            slow_interval: Duration::from_secs(300),
        }
    }
}

fn parse_var(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| LayoutError::Config(format!("{name}={value:?}: {e}")))
}

impl FontCacheConfig {
    /// Defaults overridden by whichever `SCRIPTLINE_FONT_CACHE_*`
    /// variables are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`FontCacheConfig::from_env`] with an explicit variable
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_MIN_KB) {
            config.min_cost_kb = parse_var(ENV_MIN_KB, &value)? as usize;
            log::info!("font cache minimum set to {} kb via {}", config.min_cost_kb, ENV_MIN_KB);
        }
        if let Some(value) = lookup(ENV_FAST_MS) {
            config.fast_interval = Duration::from_millis(parse_var(ENV_FAST_MS, &value)?);
            log::info!("font cache fast interval set to {:?} via {}", config.fast_interval, ENV_FAST_MS);
        }
        if let Some(value) = lookup(ENV_SLOW_MS) {
            config.slow_interval = Duration::from_millis(parse_var(ENV_SLOW_MS, &value)?);
            log::info!("font cache slow interval set to {:?} via {}", config.slow_interval, ENV_SLOW_MS);
        }
        if config.fast_interval > config.slow_interval {
            return Err(LayoutError::Config(format!(
                "fast interval {:?} exceeds slow interval {:?}",
                config.fast_interval, config.slow_interval
            )));
        }
        Ok(config)
    }
}
