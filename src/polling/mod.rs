//! # Polling Controller
//!
//! Owns the repeating status fetch for one order.
//!
//! ## Lifecycle
//!
//! - [`PollingController::start`] fires one fetch immediately, then one per interval.
//!   Starting again first stops the running schedule, so at most one timer exists.
//! - [`PollingController::stop`] cancels the schedule and its in-flight fetches. It is
//!   idempotent and a no-op when nothing runs.
//! - Dropping the controller stops it.
//!
//! ## Generations
//!
//! Every start and every stop advances a generation counter. A fetch only delivers
//! its [`TickOutcome`] if the generation it was issued under is still current, and
//! the check happens under the same lock `stop` takes to advance it. Once `stop`
//! returns, the callback is never invoked again for that schedule.
//!
//! Ticks are driven by the interval, not by fetch completion: a slow fetch can
//! overlap the next one. Each outcome carries a per-generation `sequence` so the
//! consumer can drop a response that arrives after a newer one.
//!
//! Failed fetches are delivered as `Err` outcomes and never stop the schedule.

use crate::config::MIN_POLL_INTERVAL;
use crate::gateway::{GatewayError, OrderGateway};
use crate::model::{OrderId, OrderView};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub order_id: OrderId,
    /// Generation the fetch was issued under.
    pub generation: u64,
    /// 1-based tick number within the generation.
    pub sequence: u64,
    pub result: Result<OrderView, GatewayError>,
}

/// Callback receiving every delivered tick. Runs while the generation lock is held,
/// so it must not block.
pub type TickCallback = Arc<dyn Fn(TickOutcome) + Send + Sync>;

struct Schedule {
    order_id: OrderId,
    handle: JoinHandle<()>,
}

pub struct PollingController {
    gateway: Arc<dyn OrderGateway>,
    request_timeout: Duration,
    generation: Arc<Mutex<u64>>,
    schedule: Option<Schedule>,
}

impl PollingController {
    /// Creates an idle controller. Each fetch is bounded by `request_timeout`.
    pub fn new(gateway: Arc<dyn OrderGateway>, request_timeout: Duration) -> Self {
        Self {
            gateway,
            request_timeout,
            generation: Arc::new(Mutex::new(0)),
            schedule: None,
        }
    }

    /// Starts polling `order_id` every `interval`, stopping any previous schedule first.
    ///
    /// An `interval` below [`MIN_POLL_INTERVAL`] is raised to it. Returns the
    /// generation of the new schedule. Must be called from within a Tokio runtime.
    pub fn start(
        &mut self,
        order_id: OrderId,
        on_tick: impl Fn(TickOutcome) + Send + Sync + 'static,
        interval: Duration,
    ) -> u64 {
        self.stop();
        let interval = interval.max(MIN_POLL_INTERVAL);

        let generation = {
            let mut current = lock(&self.generation);
            *current += 1;
            *current
        };

        let ticker = Ticker {
            gateway: self.gateway.clone(),
            guard: self.generation.clone(),
            on_tick: Arc::new(on_tick),
            order_id,
            generation,
            request_timeout: self.request_timeout,
        };
        let handle = tokio::spawn(ticker.run(interval));
        self.schedule = Some(Schedule { order_id, handle });

        info!(%order_id, generation, interval_ms = interval.as_millis() as u64, "Polling started");
        generation
    }

    /// Cancels the running schedule. Safe to call any number of times.
    pub fn stop(&mut self) {
        let Some(schedule) = self.schedule.take() else {
            return;
        };

        // Advance first: from here on no fetch of the old schedule can deliver.
        let generation = {
            let mut current = lock(&self.generation);
            *current += 1;
            *current
        };
        schedule.handle.abort();

        info!(order_id = %schedule.order_id, generation, "Polling stopped");
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Order currently being polled, if any.
    pub fn order_id(&self) -> Option<OrderId> {
        self.schedule.as_ref().map(|schedule| schedule.order_id)
    }

    /// Current generation token.
    pub fn generation(&self) -> u64 {
        *lock(&self.generation)
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(generation: &Mutex<u64>) -> MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The schedule task: owns the interval and the in-flight fetches.
///
/// Aborting this task drops the `JoinSet`, which aborts every fetch still running.
#[derive(Clone)]
struct Ticker {
    gateway: Arc<dyn OrderGateway>,
    guard: Arc<Mutex<u64>>,
    on_tick: TickCallback,
    order_id: OrderId,
    generation: u64,
    request_timeout: Duration,
}

impl Ticker {
    async fn run(self, interval: Duration) {
        let mut ticks = tokio::time::interval(interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();
        let mut sequence = 0u64;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    sequence += 1;
                    debug!(order_id = %self.order_id, generation = self.generation, sequence, "Tick");
                    in_flight.spawn(self.clone().fetch(sequence));
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }
    }

    async fn fetch(self, sequence: u64) {
        if !self.is_current() {
            return;
        }

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.gateway.fetch_order_status(self.order_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.request_timeout)),
        };

        if let Err(e) = &result {
            warn!(order_id = %self.order_id, sequence, error = %e, "Status fetch failed");
        }

        let current = lock(&self.guard);
        if *current != self.generation {
            debug!(order_id = %self.order_id, sequence, "Discarding fetch from a stopped schedule");
            return;
        }
        (self.on_tick)(TickOutcome {
            order_id: self.order_id,
            generation: self.generation,
            sequence,
            result,
        });
    }

    fn is_current(&self) -> bool {
        *lock(&self.guard) == self.generation
    }
}
