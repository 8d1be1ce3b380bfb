//! Rate Limiting Infrastructure
//!
//! One `governor` limiter per client IP.
//!
//! - Each client gets its own direct limiter, full on first sight
//! - A single exclusive lock guards the whole table
//! - A background sweeper evicts clients idle longer than `idle_timeout`
//!
//! Time is read through a [`governor::clock::Clock`] so tests can drive
//! refills and evictions with a `FakeRelativeClock` instead of sleeping.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock, Reference};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Longest replenish period; a non-positive rate never refills within it
const MAX_REPLENISH_PERIOD: Duration = Duration::from_secs(24 * 3600);

// ============================================================================
// Configuration
// ============================================================================

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// When false, every request is allowed and no table is kept
    pub enabled: bool,
    /// Sustained rate (requests per second)
    pub requests_per_second: f64,
    /// Requests allowed back to back before the rate applies
    pub burst: u32,
    /// Clients unseen for longer than this are evicted by the sweeper
    pub idle_timeout: Duration,
    /// Sweeper cadence
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 2.0,
            burst: 4,
            idle_timeout: Duration::from_secs(3 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst,
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Looser limits for local work against a dev frontend
    pub fn development() -> Self {
        Self::new(20.0, 40)
    }

    /// `governor` quota: one cell every `1 / requests_per_second`, `burst` cells deep
    pub fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);

        let period = if self.requests_per_second > 0.0 {
            Duration::try_from_secs_f64(self.requests_per_second.recip())
                .unwrap_or(MAX_REPLENISH_PERIOD)
                .clamp(Duration::from_nanos(1), MAX_REPLENISH_PERIOD)
        } else {
            MAX_REPLENISH_PERIOD
        };

        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst)
    }
}

// ============================================================================
// Registry
// ============================================================================

type ClientLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

struct ClientEntry<C: Clock> {
    limiter: ClientLimiter<C>,
    last_seen: C::Instant,
}

struct RegistryInner<C: Clock> {
    config: RateLimitConfig,
    quota: Quota,
    clock: C,
    /// `None` when limiting is disabled
    clients: Option<Mutex<HashMap<String, ClientEntry<C>>>>,
}

/// Per-client rate limiter table
///
/// Cheap to clone; clones share the same table.
///
/// ## Examples
/// ```rust
/// use platform::rate_limit::{RateLimitConfig, RateLimiterRegistry};
///
/// # async fn demo() {
/// let registry = RateLimiterRegistry::new(RateLimitConfig::new(1.0, 2));
/// assert!(registry.allow("203.0.113.7").await);
/// assert!(registry.allow("203.0.113.7").await);
/// assert!(!registry.allow("203.0.113.7").await);
/// # }
/// ```
pub struct RateLimiterRegistry<C: Clock = DefaultClock> {
    inner: Arc<RegistryInner<C>>,
}

impl<C: Clock> Clone for RateLimiterRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl RateLimiterRegistry {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C> RateLimiterRegistry<C>
where
    C: Clock + Clone + Send + Sync + 'static,
{
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        let clients = config.enabled.then(|| Mutex::new(HashMap::new()));
        Self {
            inner: Arc::new(RegistryInner {
                quota: config.quota(),
                config,
                clock,
                clients,
            }),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.clients.is_some()
    }

    /// Decide whether `client` may proceed, consuming one cell if so.
    pub async fn allow(&self, client: &str) -> bool {
        let Some(clients) = &self.inner.clients else {
            return true;
        };

        let now = self.inner.clock.now();

        let mut clients = clients.lock().await;
        let entry = clients
            .entry(client.to_owned())
            .or_insert_with(|| ClientEntry {
                limiter: RateLimiter::direct_with_clock(
                    self.inner.quota,
                    self.inner.clock.clone(),
                ),
                last_seen: now,
            });
        entry.last_seen = now;
        entry.limiter.check().is_ok()
    }

    /// Evict clients idle longer than `idle_timeout`. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let Some(clients) = &self.inner.clients else {
            return 0;
        };

        let idle_timeout = self.inner.config.idle_timeout;
        let now = self.inner.clock.now();

        let mut clients = clients.lock().await;
        let before = clients.len();
        clients.retain(|_, entry| {
            Duration::from(now.duration_since(entry.last_seen)) <= idle_timeout
        });
        before - clients.len()
    }

    /// Number of tracked clients
    pub async fn len(&self) -> usize {
        match &self.inner.clients {
            Some(clients) => clients.lock().await.len(),
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Spawn the periodic sweeper on the current tokio runtime.
    ///
    /// Nothing is spawned when limiting is disabled.
    pub fn start_sweeper(&self) -> SweeperHandle {
        if !self.is_enabled() {
            return SweeperHandle { task: None };
        }

        let registry = self.clone();
        let period = self.inner.config.sweep_interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = registry.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "Evicted idle rate limiter clients");
                }
            }
        });

        tracing::debug!(interval_secs = period.as_secs(), "Rate limiter sweeper started");

        SweeperHandle { task: Some(task) }
    }
}

/// Owns the sweeper task; stopping or dropping it aborts the task.
#[derive(Debug)]
pub struct SweeperHandle {
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Rate limiter sweeper stopped");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
