//! Keep font engines around while they are in use, shed them when idle
//!
//! Engines are expensive to build (table parsing, shaper plans), so the
//! cache hands out shared references keyed by family, size, style and
//! script. Every entry carries a cost in kilobytes; the cache tracks a
//! budget (`max_cost`) that grows to whatever is inserted and decays on a
//! timer once insertions stop:
//!
//! - each decay step halves the budget, but never below what is in use or
//!   the configured minimum
//! - entries only the cache still references are evicted, oldest and
//!   least hit first, until the total fits the budget
//! - while the budget keeps shrinking the timer runs at the fast
//!   interval; once it stops shrinking it slows down, and once the cache is
//!   at or below the minimum the timer stops
//!
//! Time comes from an injected [`Clock`], so the decay is deterministic
//! under test.

use std::sync::Arc;
use std::time::{Duration, Instant};

use icu_properties::props::Script;
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::FontCacheConfig;
use crate::traits::FontEngine;

/// A cache shared between layout sessions.
pub type SharedFontCache = Arc<Mutex<FontCache>>;

/// Source of the current time for the decay timer.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// What an engine was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: String,
    /// Pixel size as a raw 26.6 value.
    pub pixel_size: i32,
    pub weight: u16,
    pub italic: bool,
    pub script: Script,
}

struct CacheEntry {
    engine: Arc<dyn FontEngine>,
    hits: u32,
    timestamp: u64,
    cost_kb: usize,
}

impl CacheEntry {
    /// Held by nobody but the cache.
    fn is_unused(&self) -> bool {
        Arc::strong_count(&self.engine) == 1
    }
}

/// Cost in kilobytes charged for an engine of `bytes` bytes; at least 1.
pub fn cost_in_kb(bytes: usize) -> usize {
    (bytes.saturating_add(512) / 1024).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DecayTimer {
    fast: bool,
    due: Instant,
}

/// Font engines keyed by [`FontKey`] with cost-based decay.
pub struct FontCache {
    entries: LruCache<FontKey, CacheEntry>,
    config: FontCacheConfig,
    clock: Box<dyn Clock>,
    total_cost_kb: usize,
    max_cost_kb: usize,
    current_timestamp: u64,
    timer: Option<DecayTimer>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::with_clock(FontCacheConfig::default(), Box::new(SystemClock))
    }

    pub fn with_config(config: FontCacheConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: FontCacheConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: LruCache::unbounded(),
            config,
            clock,
            total_cost_kb: 0,
            max_cost_kb: config.min_cost_kb,
            current_timestamp: 0,
            timer: None,
        }
    }

    /// Wraps the cache for sharing between sessions.
    pub fn shared(self) -> SharedFontCache {
        Arc::new(Mutex::new(self))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_cost_kb(&self) -> usize {
        self.total_cost_kb
    }

    pub fn max_cost_kb(&self) -> usize {
        self.max_cost_kb
    }

    pub fn config(&self) -> &FontCacheConfig {
        &self.config
    }

    /// Whether the decay timer is armed, and at which speed.
    pub fn timer_is_fast(&self) -> Option<bool> {
        self.timer.map(|t| t.fast)
    }

    /// Looks up an engine, counting the hit.
    pub fn find(&mut self, key: &FontKey) -> Option<Arc<dyn FontEngine>> {
        self.current_timestamp += 1;
        let timestamp = self.current_timestamp;
        let entry = self.entries.get_mut(key)?;
        entry.hits = entry.hits.saturating_add(1);
        entry.timestamp = timestamp;
        Some(Arc::clone(&entry.engine))
    }

    /// Stores an engine, replacing any engine under the same key.
    pub fn insert(&mut self, key: FontKey, engine: Arc<dyn FontEngine>) {
        let cost_kb = cost_in_kb(engine.cache_cost());
        self.current_timestamp += 1;
        log::debug!(
            "font cache: inserting {} ({} px) for {:?}, {} kb",
            key.family,
            key.pixel_size as f32 / 64.0,
            key.script,
            cost_kb
        );
        let entry = CacheEntry {
            engine,
            hits: 0,
            timestamp: self.current_timestamp,
            cost_kb,
        };
        if let Some(old) = self.entries.put(key, entry) {
            self.total_cost_kb = self.total_cost_kb.saturating_sub(old.cost_kb);
        }
        self.increase_cost(cost_kb);
    }

    fn increase_cost(&mut self, cost_kb: usize) {
        self.total_cost_kb += cost_kb;
        if self.total_cost_kb > self.max_cost_kb {
            self.max_cost_kb = self.total_cost_kb;
            if !self.timer.is_some_and(|t| t.fast) {
                self.arm_timer(true);
            }
        }
    }

    fn arm_timer(&mut self, fast: bool) {
        let interval = if fast {
            self.config.fast_interval
        } else {
            self.config.slow_interval
        };
        self.timer = Some(DecayTimer {
            fast,
            due: self.clock.now() + interval,
        });
    }

    /// Drops every entry and resets the budget.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_cost_kb = 0;
        self.max_cost_kb = self.config.min_cost_kb;
        self.timer = None;
    }

    /// Runs a decay step if the timer is due. Returns whether one ran.
    pub fn maintain(&mut self) -> bool {
        match self.timer {
            Some(timer) if self.clock.now() >= timer.due => {
                self.decay();
                true
            },
            _ => false,
        }
    }

    /// One decay step, regardless of the timer.
    pub fn decay(&mut self) {
        let min_cost = self.config.min_cost_kb;
        if self.total_cost_kb <= self.max_cost_kb && self.max_cost_kb <= min_cost {
            log::trace!("font cache: under the minimum, stopping the timer");
            self.timer = None;
            return;
        }

        let in_use_bytes: usize = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_unused())
            .map(|(_, entry)| entry.engine.cache_cost())
            .sum();
        let in_use_kb = in_use_bytes.saturating_add(512) / 1024;
        let new_max = (self.max_cost_kb / 2).max(in_use_kb).max(min_cost);

        let fast = self.timer.is_some_and(|t| t.fast);
        if new_max == self.max_cost_kb {
            // the budget cannot shrink any further for now
            self.arm_timer(false);
            return;
        }
        self.arm_timer(true);
        if !fast {
            log::trace!("font cache: budget shrinking, switching to the fast timer");
        }
        self.max_cost_kb = new_max;

        while self.total_cost_kb > self.max_cost_kb {
            let victim = self
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_unused())
                .min_by_key(|(_, entry)| (entry.timestamp, entry.hits))
                .map(|(key, _)| key.clone());
            let Some(key) = victim else {
                break;
            };
            if let Some(entry) = self.entries.pop(&key) {
                log::debug!("font cache: evicting {} ({} kb)", key.family, entry.cost_kb);
                self.total_cost_kb = self.total_cost_kb.saturating_sub(entry.cost_kb);
            }
        }
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("entries", &self.entries.len())
            .field("total_cost_kb", &self.total_cost_kb)
            .field("max_cost_kb", &self.max_cost_kb)
            .field("timer", &self.timer)
            .finish()
    }
}
