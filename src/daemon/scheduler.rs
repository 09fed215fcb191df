//! Scheduler - owns the evaluation loop and the public API
//!
//! State machine: Stopped -> Starting -> Active -> Stopped.
//!
//! Every evaluation (timer tick or on-demand) runs under one async mutex, so
//! sample -> evaluate -> record -> notify for decision N completes before
//! sampling for decision N+1 begins.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::daemon::tick::{SchedulerOptions, TickResult, TickState};
use crate::domain::{
    ConfigPatch, DeviceConditions, Priority, SampledConditions, ScheduleWindow, SchedulingConfig, SchedulingStats,
    SyncDecision,
};
use crate::engine::{self, Clock, SystemClock};
use crate::error::{Result, SchedulerError};
use crate::notify::{NotificationHub, Subscription};
use crate::providers::{ConditionProvider, sample_conditions};
use crate::stats::StatsTracker;
use crate::storage::KeyValueStore;
use crate::transport::SyncTransport;

/// Lifecycle state of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Starting,
    Active,
}

/// Handle to the running tick task. Dropping it closes the stop channel,
/// which also ends the loop.
struct Worker {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

struct Inner {
    providers: Arc<dyn ConditionProvider>,
    transport: Arc<dyn SyncTransport>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    options: SchedulerOptions,
    config: RwLock<Arc<SchedulingConfig>>,
    tracker: Mutex<StatsTracker>,
    tick_state: Mutex<TickState>,
    hub: NotificationHub,
    state: Mutex<SchedulerState>,
    /// Serializes evaluation cycles
    cycle: tokio::sync::Mutex<()>,
    /// Serializes start/stop and holds the tick task
    worker: tokio::sync::Mutex<Option<Worker>>,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    fn config_snapshot(&self) -> Arc<SchedulingConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, state: SchedulerState) {
        *relock(&self.state) = state;
    }

    async fn sample(&self) -> SampledConditions {
        sample_conditions(self.providers.as_ref(), self.options.provider_timeout).await
    }

    /// sample -> evaluate -> record -> notify, serialized with every other cycle
    async fn run_cycle(&self, priority: Priority) -> SyncDecision {
        let _cycle = self.cycle.lock().await;

        let SampledConditions { conditions, failed } = self.sample().await;
        let config = self.config_snapshot();
        let now = self.clock.now();

        let decision = {
            let mut tracker = relock(&self.tracker);
            let decision = engine::evaluate(&conditions, failed, priority, &config, tracker.stats_mut(), &now);
            tracker.record(&decision);
            decision
        };

        log::debug!(
            "Decision ({}): should_sync={} confidence={} delay={}ms reason={}",
            priority.as_str(),
            decision.should_sync,
            decision.confidence,
            decision.suggested_delay_ms,
            decision.reason
        );

        self.hub.conditions.broadcast(&conditions);
        self.hub.decisions.broadcast(&decision);

        decision
    }

    async fn tick(self: &Arc<Self>) -> TickResult {
        relock(&self.tick_state).tick();

        let decision = self.run_cycle(Priority::Normal).await;
        if !decision.should_sync || decision.confidence <= self.options.auto_sync_min_confidence {
            return TickResult::Evaluated;
        }

        let status = match self.transport.status().await {
            Ok(status) => status,
            Err(e) => {
                log::error!("Failed to read sync transport status: {}", e);
                return TickResult::Evaluated;
            }
        };

        if !status.ready_to_sync() {
            return TickResult::Skipped;
        }

        tracing::info!(
            confidence = decision.confidence,
            queued = status.queued_operations,
            "Conditions favorable, starting sync"
        );
        relock(&self.tick_state).triggered();

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            match AssertUnwindSafe(inner.transport.start_sync()).catch_unwind().await {
                Ok(Ok(())) => log::info!("Scheduled sync completed"),
                Ok(Err(e)) => {
                    log::error!("Scheduled sync failed: {}", e);
                    relock(&inner.tick_state).trigger_failed();
                }
                Err(_) => {
                    log::error!("Sync transport panicked");
                    relock(&inner.tick_state).trigger_failed();
                }
            }
        });

        TickResult::SyncTriggered
    }

    fn save_stats(&self) {
        let tracker = relock(&self.tracker);
        if let Err(e) = tracker.save(self.store.as_ref()) {
            log::error!("Failed to persist scheduling stats: {}", e);
        }
    }

    fn load_stats(&self) {
        let mut tracker = relock(&self.tracker);
        match tracker.load(self.store.as_ref()) {
            Ok(true) => log::info!("Restored scheduling stats ({} decisions)", tracker.snapshot().total_decisions),
            Ok(false) => log::debug!("No persisted scheduling stats, starting from zero"),
            Err(e) => log::error!("Failed to load scheduling stats, starting from zero: {}", e),
        }
    }
}

/// Holds only a weak reference so dropping every `Scheduler` handle frees the
/// state and closes the stop channel.
async fn run_loop(weak: Weak<Inner>, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let Some(inner) = weak.upgrade() else { break };
                let result = inner.tick().await;
                tracing::debug!(?result, "Tick complete");
            }
        }
    }

    log::debug!("Scheduler loop exited");
}

/// Builder for [`Scheduler`]
pub struct SchedulerBuilder {
    providers: Arc<dyn ConditionProvider>,
    transport: Arc<dyn SyncTransport>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
    options: SchedulerOptions,
}

impl SchedulerBuilder {
    /// Set the scheduling policy
    pub fn config(mut self, config: SchedulingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set loop options
    pub fn options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the clock used for window planning
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate config and options and build a stopped scheduler
    pub fn build(self) -> Result<Scheduler> {
        self.config.validate()?;
        self.options.validate()?;

        Ok(Scheduler {
            inner: Arc::new(Inner {
                providers: self.providers,
                transport: self.transport,
                store: self.store,
                clock: self.clock,
                options: self.options,
                config: RwLock::new(Arc::new(self.config)),
                tracker: Mutex::new(StatsTracker::new()),
                tick_state: Mutex::new(TickState::new()),
                hub: NotificationHub::new(),
                state: Mutex::new(SchedulerState::Stopped),
                cycle: tokio::sync::Mutex::new(()),
                worker: tokio::sync::Mutex::new(None),
            }),
        })
    }
}

/// Adaptive sync scheduler handle. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Start building a scheduler around its collaborators
    pub fn builder(
        providers: Arc<dyn ConditionProvider>,
        transport: Arc<dyn SyncTransport>,
        store: Arc<dyn KeyValueStore>,
    ) -> SchedulerBuilder {
        SchedulerBuilder {
            providers,
            transport,
            store,
            clock: Arc::new(SystemClock),
            config: SchedulingConfig::default(),
            options: SchedulerOptions::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *relock(&self.inner.state)
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.inner.options
    }

    /// Load persisted stats and arm the tick timer. No-op when already active.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&self) -> Result<()> {
        let mut worker = self.inner.worker.lock().await;
        if worker.is_some() {
            log::debug!("Scheduler already active");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::InvalidState(format!("no tokio runtime: {}", e)))?;

        self.inner.set_state(SchedulerState::Starting);
        {
            let _cycle = self.inner.cycle.lock().await;
            self.inner.load_stats();
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = runtime.spawn(run_loop(
            Arc::downgrade(&self.inner),
            self.inner.options.tick_interval,
            stop_rx,
        ));
        *worker = Some(Worker {
            stop_tx: Some(stop_tx),
            handle,
        });

        self.inner.set_state(SchedulerState::Active);
        log::info!(
            "Scheduler started (tick every {:?})",
            self.inner.options.tick_interval
        );
        Ok(())
    }

    /// Disarm the timer, wait for any in-flight tick, then persist stats.
    /// No-op when already stopped.
    ///
    /// Cancel safe: if this future is dropped before the loop has been
    /// joined, the scheduler stays `Active` and a later `stop` finishes the job.
    pub async fn stop(&self) {
        let mut worker = self.inner.worker.lock().await;
        let Some(running) = worker.as_mut() else {
            log::debug!("Scheduler already stopped");
            return;
        };

        // The loop may already have exited; the join below covers both cases
        if let Some(stop_tx) = running.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let joined = (&mut running.handle).await;

        // Nothing below awaits, so the rest completes once the join has
        *worker = None;
        if let Err(e) = joined {
            log::error!("Scheduler loop terminated abnormally: {}", e);
        }
        self.inner.save_stats();
        self.inner.set_state(SchedulerState::Stopped);
        log::info!("Scheduler stopped");
    }

    /// Evaluate immediately, outside the timer. Recorded and broadcast like a tick.
    pub async fn make_sync_decision(&self, priority: Priority) -> SyncDecision {
        self.inner.run_cycle(priority).await
    }

    /// Sample every provider and broadcast the snapshot to condition subscribers
    pub async fn get_current_conditions(&self) -> DeviceConditions {
        let conditions = self.inner.sample().await.conditions;
        self.inner.hub.conditions.broadcast(&conditions);
        conditions
    }

    /// Highest-priority schedule window active right now
    pub fn get_optimal_sync_window(&self) -> Option<ScheduleWindow> {
        let config = self.inner.config_snapshot();
        engine::active_window(&self.inner.clock.now(), &config.schedule_windows).cloned()
    }

    /// Current policy
    pub fn config(&self) -> Arc<SchedulingConfig> {
        self.inner.config_snapshot()
    }

    /// Merge `patch` into a fresh copy of the config and swap it in.
    /// An invalid result leaves the current config in place.
    pub fn update_config(&self, patch: &ConfigPatch) -> Result<()> {
        let mut current = self.inner.config.write().unwrap_or_else(|e| e.into_inner());
        let next = current.merged(patch);
        next.validate()?;
        *current = Arc::new(next);
        log::info!("Scheduling config updated");
        Ok(())
    }

    /// Snapshot of the accumulated stats
    pub fn get_stats(&self) -> SchedulingStats {
        relock(&self.inner.tracker).snapshot()
    }

    /// Zero the stats and persist the zeroed record
    pub fn reset_stats(&self) {
        let mut tracker = relock(&self.inner.tracker);
        tracker.reset();
        if let Err(e) = tracker.save(self.inner.store.as_ref()) {
            log::error!("Failed to persist reset stats: {}", e);
        }
    }

    /// Tick counters since construction
    pub fn tick_state(&self) -> TickState {
        *relock(&self.inner.tick_state)
    }

    pub fn on_sync_decision(&self, callback: impl Fn(&SyncDecision) + Send + Sync + 'static) -> Subscription {
        self.inner.hub.decisions.subscribe(callback)
    }

    pub fn on_conditions_update(&self, callback: impl Fn(&DeviceConditions) + Send + Sync + 'static) -> Subscription {
        self.inner.hub.conditions.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FixedClock;
    use crate::providers::FixedConditions;
    use crate::storage::{MemoryStore, STATS_KEY};
    use crate::transport::QueueTransport;
    use chrono::{NaiveDate, NaiveDateTime};
    use crate::domain::ConditionRating;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    // Wednesday 09:30, outside every default window
    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    struct Fixture {
        scheduler: Scheduler,
        providers: Arc<FixedConditions>,
        transport: Arc<QueueTransport>,
        store: Arc<MemoryStore>,
    }

    fn fixture(queued: u64) -> Fixture {
        let providers = Arc::new(FixedConditions::favorable());
        let transport = Arc::new(QueueTransport::new(queued));
        let store = Arc::new(MemoryStore::new());
        let scheduler = Scheduler::builder(providers.clone(), transport.clone(), store.clone())
            .clock(Arc::new(FixedClock::new(morning())))
            .options(SchedulerOptions::new(Duration::from_secs(30)))
            .build()
            .unwrap();
        Fixture {
            scheduler,
            providers,
            transport,
            store,
        }
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let result = Scheduler::builder(
            Arc::new(FixedConditions::favorable()),
            Arc::new(QueueTransport::new(0)),
            Arc::new(MemoryStore::new()),
        )
        .config(SchedulingConfig {
            min_connection_score: -1.0,
            ..Default::default()
        })
        .build();
        assert!(matches!(result, Err(SchedulerError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_tick_interval() {
        let result = Scheduler::builder(
            Arc::new(FixedConditions::favorable()),
            Arc::new(QueueTransport::new(0)),
            Arc::new(MemoryStore::new()),
        )
        .options(SchedulerOptions::new(Duration::ZERO))
        .build();
        assert!(matches!(result, Err(SchedulerError::Config(_))));
    }

    #[tokio::test]
    async fn test_failed_network_denied_with_zero_thresholds() {
        let providers = Arc::new(FixedConditions::favorable());
        providers.fail_network(true);
        let scheduler = Scheduler::builder(
            providers,
            Arc::new(QueueTransport::new(0)),
            Arc::new(MemoryStore::new()),
        )
        .config(SchedulingConfig {
            min_battery_level: 0.0,
            min_connection_score: 0.0,
            ..Default::default()
        })
        .clock(Arc::new(FixedClock::new(morning())))
        .build()
        .unwrap();

        let decision = scheduler.make_sync_decision(Priority::Normal).await;
        assert!(!decision.should_sync);
        assert_eq!(decision.conditions.network, ConditionRating::Poor);
        assert_eq!(decision.conditions.battery, ConditionRating::Good);
        assert_eq!(scheduler.get_stats().condition_breakdown.network_blocks, 1);
    }

    #[tokio::test]
    async fn test_on_demand_decision_records_and_notifies() {
        let f = fixture(0);
        let decisions = Arc::new(AtomicU64::new(0));
        let samples = Arc::new(AtomicU64::new(0));

        let d = decisions.clone();
        let _sub = f.scheduler.on_sync_decision(move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        });
        let s = samples.clone();
        let _sub2 = f.scheduler.on_conditions_update(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        let decision = f.scheduler.make_sync_decision(Priority::Normal).await;
        assert!(decision.should_sync);
        assert_eq!(decision.confidence, 100);
        assert_eq!(f.scheduler.get_stats().total_decisions, 1);
        assert_eq!(f.scheduler.get_stats().sync_approved, 1);
        assert_eq!(decisions.load(Ordering::SeqCst), 1);
        assert_eq!(samples.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_stop_transitions() {
        let f = fixture(0);
        assert_eq!(f.scheduler.state(), SchedulerState::Stopped);

        f.scheduler.start().await.unwrap();
        assert_eq!(f.scheduler.state(), SchedulerState::Active);
        // Re-entrant start is a no-op
        f.scheduler.start().await.unwrap();
        assert_eq!(f.scheduler.state(), SchedulerState::Active);

        f.scheduler.stop().await;
        assert_eq!(f.scheduler.state(), SchedulerState::Stopped);
        // Stop on stopped is a no-op
        f.scheduler.stop().await;
        assert_eq!(f.scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_persists_stats() {
        let f = fixture(0);
        f.scheduler.start().await.unwrap();
        f.scheduler.make_sync_decision(Priority::Low).await;
        f.scheduler.stop().await;

        let saved = f.store.get(STATS_KEY).unwrap().unwrap();
        let stats: SchedulingStats = serde_json::from_value(saved).unwrap();
        assert_eq!(stats.total_decisions, 1);
    }

    #[tokio::test]
    async fn test_start_restores_stats() {
        let f = fixture(0);
        let mut previous = SchedulingStats::default();
        previous.total_decisions = 41;
        previous.sync_approved = 41;
        f.store.set(STATS_KEY, &serde_json::to_value(previous).unwrap()).unwrap();

        f.scheduler.start().await.unwrap();
        assert_eq!(f.scheduler.get_stats().total_decisions, 41);
        f.scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_block_lifecycle() {
        let f = fixture(0);
        f.store.set_failing(true);
        f.scheduler.start().await.unwrap();
        assert_eq!(f.scheduler.get_stats(), SchedulingStats::default());
        f.scheduler.stop().await;
        assert_eq!(f.scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_triggers_sync_when_confident() {
        let f = fixture(5);
        let samples = Arc::new(AtomicU64::new(0));
        let s = samples.clone();
        let _sub = f.scheduler.on_conditions_update(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        f.scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::time::timeout(Duration::from_secs(1), f.transport.wait_for_starts(1))
            .await
            .unwrap();

        assert_eq!(f.scheduler.tick_state().tick_count, 1);
        assert_eq!(f.scheduler.tick_state().syncs_triggered, 1);
        assert_eq!(f.scheduler.get_stats().total_decisions, 1);
        assert_eq!(samples.load(Ordering::SeqCst), 1);
        f.scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_skips_when_nothing_queued() {
        let f = fixture(0);
        f.scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        f.scheduler.stop().await;

        assert_eq!(f.scheduler.tick_state().tick_count, 2);
        assert_eq!(f.transport.start_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_does_not_sync_when_in_flight() {
        let f = fixture(5);
        f.transport.set_syncing(true);
        f.scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        f.scheduler.stop().await;

        assert_eq!(f.transport.start_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_does_not_sync_below_threshold() {
        let f = fixture(5);
        // Heavy load: approved with confidence 80, which is not > 80
        f.providers.update(|c| c.device_performance.cpu_usage = 95.0);
        f.scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        f.scheduler.stop().await;

        assert_eq!(f.scheduler.get_stats().sync_approved, 1);
        assert_eq!(f.transport.start_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_contained() {
        let f = fixture(5);
        f.transport.set_failing(true);
        f.scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::time::timeout(Duration::from_secs(1), f.transport.wait_for_starts(1))
            .await
            .unwrap();
        // Let the spawned sync task finish
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(f.scheduler.state(), SchedulerState::Active);
        assert_eq!(f.scheduler.tick_state().trigger_failures, 1);
        assert_eq!(f.scheduler.get_stats().sync_approved, 1);
        f.scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let f = fixture(0);
        f.scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        f.scheduler.stop().await;
        let after_stop = f.scheduler.get_stats().total_decisions;

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(f.scheduler.get_stats().total_decisions, after_stop);
    }

    #[tokio::test]
    async fn test_dropped_stop_leaves_scheduler_resumable() {
        let f = fixture(0);
        f.scheduler.start().await.unwrap();
        f.scheduler.make_sync_decision(Priority::Normal).await;

        // Polled once then dropped before the loop could be joined
        assert!(f.scheduler.stop().now_or_never().is_none());
        assert_eq!(f.scheduler.state(), SchedulerState::Active);
        assert!(f.store.get(STATS_KEY).unwrap().is_none());

        f.scheduler.stop().await;
        assert_eq!(f.scheduler.state(), SchedulerState::Stopped);
        let saved: SchedulingStats = serde_json::from_value(f.store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.total_decisions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_active_scheduler_ends_loop() {
        let Fixture {
            scheduler,
            providers,
            transport,
            ..
        } = fixture(5);
        scheduler.start().await.unwrap();
        drop(scheduler);

        // The scheduler state is freed at once, not held by the loop
        assert_eq!(Arc::strong_count(&providers), 1);

        let metrics = tokio::runtime::Handle::current().metrics();
        tokio::time::timeout(Duration::from_secs(1), async {
            while metrics.num_alive_tasks() > 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(transport.start_count(), 0);
    }

    #[tokio::test]
    async fn test_update_config_swaps_atomically() {
        let f = fixture(0);
        f.scheduler
            .update_config(&ConfigPatch {
                min_battery_level: Some(95.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(f.scheduler.config().min_battery_level, 95.0);

        let decision = f.scheduler.make_sync_decision(Priority::Normal).await;
        assert!(!decision.should_sync);

        let err = f.scheduler.update_config(&ConfigPatch {
            min_battery_level: Some(500.0),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(f.scheduler.config().min_battery_level, 95.0);
    }

    #[tokio::test]
    async fn test_reset_stats_persists_zeroes() {
        let f = fixture(0);
        f.scheduler.make_sync_decision(Priority::Normal).await;
        f.scheduler.reset_stats();
        assert_eq!(f.scheduler.get_stats(), SchedulingStats::default());
        let saved: SchedulingStats = serde_json::from_value(f.store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, SchedulingStats::default());
    }

    #[tokio::test]
    async fn test_get_current_conditions_broadcasts() {
        let f = fixture(0);
        let samples = Arc::new(AtomicU64::new(0));
        let s = samples.clone();
        let _sub = f.scheduler.on_conditions_update(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        let conditions = f.scheduler.get_current_conditions().await;
        assert_eq!(conditions, f.providers.snapshot());
        assert_eq!(samples.load(Ordering::SeqCst), 1);
        assert_eq!(f.scheduler.get_stats().total_decisions, 0);
    }

    #[tokio::test]
    async fn test_optimal_window_uses_clock() {
        let clock = Arc::new(FixedClock::new(morning()));
        let scheduler = Scheduler::builder(
            Arc::new(FixedConditions::favorable()),
            Arc::new(QueueTransport::new(0)),
            Arc::new(MemoryStore::new()),
        )
        .clock(clock.clone())
        .build()
        .unwrap();

        assert!(scheduler.get_optimal_sync_window().is_none());
        clock.set(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(12, 15, 0).unwrap());
        assert_eq!(scheduler.get_optimal_sync_window().unwrap().name, "Lunch Break");
    }
}
