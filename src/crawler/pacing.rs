//! Pacing, pauses and cooldown
//!
//! All waiting the crawler does goes through [`Pacer`], which owns the random
//! source, the sleeper and the clock. Production code uses tokio timers and
//! the system clock; tests plug in [`RecordingSleeper`] and [`ManualClock`] so
//! a full crawl runs instantly and every pause can be asserted.

use crate::config::PacingConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Records requested sleeps instead of waiting
///
/// When attached to a [`ManualClock`], each sleep advances that clock by the
/// requested duration, so time-based logic behaves as if the sleep happened.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
    clock: Option<Arc<ManualClock>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<ManualClock>) -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
            clock: Some(clock),
        }
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}

/// Applies the crawler's delays, pauses and cooldowns
pub struct Pacer {
    config: PacingConfig,
    rng: StdRng,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    window_start: Instant,
}

impl Pacer {
    /// Creates a pacer with an explicit sleeper and clock
    ///
    /// The random source is seeded from `config.random_seed` when set, which
    /// makes every delay and pause point reproducible.
    pub fn new(config: PacingConfig, sleeper: Arc<dyn Sleeper>, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let window_start = clock.now();

        Self {
            config,
            rng,
            sleeper,
            clock,
            window_start,
        }
    }

    /// Creates a pacer that really sleeps
    pub fn from_config(config: PacingConfig) -> Self {
        Self::new(config, Arc::new(TokioSleeper), Arc::new(SystemClock))
    }

    /// Sleeps for exactly `duration`
    pub async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            self.sleeper.sleep(duration).await;
        }
    }

    /// Draws a duration uniformly from `[low, high]` seconds
    pub fn uniform(&mut self, range: [f64; 2]) -> Duration {
        let [low, high] = range;
        if high <= low {
            return Duration::from_secs_f64(low.max(0.0));
        }
        Duration::from_secs_f64(self.rng.random_range(low..=high))
    }

    /// Draws a jitter uniformly from `[0, max]` seconds
    pub fn jitter(&mut self, max: f64) -> Duration {
        self.uniform([0.0, max])
    }

    /// Draws the number of entries until the next long pause
    pub fn draw_pause_interval(&mut self) -> u64 {
        let [low, high] = self.config.long_pause_every;
        u64::from(self.rng.random_range(low..=high))
    }

    /// Delay after each recorded entry
    pub async fn after_entry(&mut self) {
        let delay = self.uniform(self.config.entry_delay);
        self.sleep(delay).await;
    }

    /// Delay between two listing pages
    pub async fn between_pages(&mut self) {
        let delay = self.uniform(self.config.page_delay);
        self.sleep(delay).await;
    }

    /// Delay between two seeds
    pub async fn between_seeds(&mut self) {
        let delay = self.uniform(self.config.seed_delay);
        info!("Waiting {:.0}s before the next seed", delay.as_secs_f64());
        self.sleep(delay).await;
    }

    /// Long pause taken when the entry count crosses its threshold
    pub async fn long_pause(&mut self, count: u64) {
        let pause = self.uniform(self.config.long_pause);
        warn!(
            "Pausing {:.0}s after {} profiles",
            pause.as_secs_f64(),
            count
        );
        self.sleep(pause).await;
    }

    /// Takes the cooldown if the current window has run past its limit
    ///
    /// Returns true when a cooldown was taken. The window restarts after the
    /// cooldown, not when it was detected.
    pub async fn cooldown_if_due(&mut self) -> bool {
        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(self.window_start);
        if elapsed <= self.config.cooldown_after() {
            return false;
        }

        let cooldown = self.uniform(self.config.cooldown);
        warn!(
            "Running for {:.0} minutes, cooling down for {:.0}s",
            elapsed.as_secs_f64() / 60.0,
            cooldown.as_secs_f64()
        );
        self.sleep(cooldown).await;
        self.window_start = self.clock.now();
        true
    }
}

/// Entry count at which the next long pause is due
///
/// The threshold moves by a fresh random interval each time it fires, so
/// pauses do not land on a fixed cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseSchedule {
    next_pause: u64,
}

impl PauseSchedule {
    pub fn new(pacer: &mut Pacer) -> Self {
        Self {
            next_pause: pacer.draw_pause_interval(),
        }
    }

    pub fn next_pause(&self) -> u64 {
        self.next_pause
    }

    /// Checks `count` against the threshold and redraws it when crossed
    pub fn is_due(&mut self, count: u64, pacer: &mut Pacer) -> bool {
        if count < self.next_pause {
            return false;
        }
        self.next_pause = count + pacer.draw_pause_interval();
        true
    }
}
