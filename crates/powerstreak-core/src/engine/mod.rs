//! Streak engine.
//!
//! Owns the in-memory [`StreakState`] and serialises check-ins against it:
//! an in-flight flag rejects overlapping attempts, the store write happens
//! before the in-memory state is replaced, and a one-shot timer flips
//! `can_check_in_now` back once the cooldown elapses.
//!
//! The write and the state replacement run together in a spawned task that
//! also owns the in-flight flag. A caller that stops polling `check_in`
//! halfway through never leaves a committed record behind a stale state.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = StreakEngine::open(processor, store, Arc::new(SystemClock)).await?;
//! let mut events = engine.subscribe();
//! let result = engine.check_in().await?;
//! ```

mod processor;

pub use processor::{CheckInProcessor, CheckInResult};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::{Clock, RandomSource, ThreadRandom};
use crate::error::{CheckInError, CoreError, StoreError};
use crate::events::Event;
use crate::gate::{GateResult, GateTimer};
use crate::ranks::RankTable;
use crate::rewards::RewardTable;
use crate::state::StreakState;
use crate::storage::{Config, StreakStore};

/// Artificial latency held inside the in-flight window
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(600);

const EVENT_CAPACITY: usize = 64;

/// Clears the in-flight flag when the check-in finishes or is dropped.
struct InFlightGuard {
    shared: Arc<Shared>,
}

impl InFlightGuard {
    fn acquire(shared: &Arc<Shared>) -> Option<Self> {
        shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                shared: Arc::clone(shared),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.shared.in_flight.store(false, Ordering::Release);
    }
}

/// Everything a commit task needs once the caller has let go.
struct Shared {
    processor: CheckInProcessor,
    store: Arc<dyn StreakStore>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn RandomSource>>,
    state: Arc<tokio::sync::Mutex<StreakState>>,
    in_flight: AtomicBool,
    events: broadcast::Sender<Event>,
    timer: GateTimer,
}

/// Async front end over [`CheckInProcessor`] and a [`StreakStore`].
pub struct StreakEngine {
    shared: Arc<Shared>,
    processing_delay: Duration,
}

impl StreakEngine {
    /// Load the stored state (or start fresh) and arm the reopen timer.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns `PersistenceFailure` if the record cannot be read.
    pub async fn open(
        processor: CheckInProcessor,
        store: Arc<dyn StreakStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CheckInError> {
        let loaded = load_blocking(&store).await?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let shared = Arc::new(Shared {
            processor,
            store,
            clock,
            rng: Mutex::new(Box::new(ThreadRandom)),
            state: Arc::new(tokio::sync::Mutex::new(StreakState::new())),
            in_flight: AtomicBool::new(false),
            events,
            timer: GateTimer::new(),
        });
        shared.install(loaded).await;
        Ok(Self {
            shared,
            processing_delay: DEFAULT_PROCESSING_DELAY,
        })
    }

    /// Build the processor from `config` and open the engine.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration`/`InvalidValue` for bad timing settings,
    /// or `PersistenceFailure` if loading fails.
    pub async fn from_config(
        config: &Config,
        store: Arc<dyn StreakStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoreError> {
        let processor = CheckInProcessor::new(
            config.timing.gate()?,
            RewardTable::standard(),
            RankTable::standard(),
        )
        .with_utc_offset(config.timing.utc_offset()?);

        let engine = Self::open(processor, store, clock).await?;
        Ok(engine.with_processing_delay(config.timing.processing_delay()))
    }

    pub fn with_random(self, rng: impl RandomSource + 'static) -> Self {
        *self.shared.rng.lock().unwrap_or_else(|e| e.into_inner()) = Box::new(rng);
        self
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn processor(&self) -> &CheckInProcessor {
        &self.shared.processor
    }

    /// Perform a check-in at the clock's current time.
    ///
    /// Dropping the returned future during the processing delay abandons the
    /// attempt. Once the write has started it runs to completion, and the
    /// in-flight flag stays set until the state has been replaced.
    ///
    /// # Errors
    /// - `AlreadyInFlight` while another check-in is being processed
    /// - `NotAllowed` while the gate is cooling down
    /// - `PersistenceFailure` if the store write fails; the in-memory state
    ///   is left as it was
    pub async fn check_in(&self) -> Result<CheckInResult, CheckInError> {
        let Some(guard) = InFlightGuard::acquire(&self.shared) else {
            warn!("check-in rejected: another check-in is in flight");
            return Err(CheckInError::AlreadyInFlight);
        };

        {
            let state = self.shared.state.lock().await;
            if let GateResult::Cooling { remaining } =
                self.shared.processor.evaluate(&state, self.shared.clock.now())
            {
                warn!(remaining_secs = remaining.num_seconds(), "check-in rejected: gate cooling");
                return Err(CheckInError::NotAllowed { remaining });
            }
        }

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let commit = tokio::spawn(Arc::clone(&self.shared).commit(guard));
        commit
            .await
            .map_err(|e| CheckInError::PersistenceFailure(e.into()))?
    }

    /// Gate state at the clock's current time
    pub async fn evaluate_gate(&self) -> GateResult {
        let state = self.shared.state.lock().await;
        let result = self.shared.processor.evaluate(&state, self.shared.clock.now());
        debug!(?result, "gate evaluated");
        result
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> StreakState {
        self.shared.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Whether a reopen callback is scheduled
    pub fn reopen_pending(&self) -> bool {
        self.shared.timer.is_pending()
    }

    /// Re-read the record from the store and re-arm the timer.
    ///
    /// # Errors
    /// Returns `PersistenceFailure` if the record cannot be read; the
    /// in-memory state is kept.
    pub async fn reload(&self) -> Result<StreakState, CheckInError> {
        let loaded = load_blocking(&self.shared.store).await?;
        Ok(self.shared.install(loaded).await)
    }

    /// Cancel the pending reopen timer.
    pub fn shutdown(&self) {
        if self.shared.timer.cancel() {
            debug!("engine shut down with a pending reopen");
        }
    }
}

impl Shared {
    /// Process, persist, then replace the state, all under the state lock.
    async fn commit(self: Arc<Self>, _guard: InFlightGuard) -> Result<CheckInResult, CheckInError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.processor.process(&state, now, &mut **rng)
        }
        .inspect_err(|e| warn!(error = %e, "check-in rejected"))?;

        let store = Arc::clone(&self.store);
        let record = result.clone();
        let written = tokio::task::spawn_blocking(move || store.record(&record))
            .await
            .map_err(StoreError::from)
            .and_then(|r| r);
        if let Err(e) = written {
            warn!(error = %e, "check-in not persisted, state unchanged");
            return Err(CheckInError::PersistenceFailure(e));
        }

        *state = result.new_state.clone();
        self.schedule_reopen(&state, now);
        drop(state);

        info!(
            streak = result.streak_day,
            points = result.points_awarded,
            boost = %result.applied_boost,
            total = result.new_state.total_points,
            "check-in completed"
        );
        self.publish(&result);
        Ok(result)
    }

    async fn install(&self, loaded: Option<StreakState>) -> StreakState {
        let now = self.clock.now();
        let mut next = loaded.unwrap_or_else(|| {
            debug!("no stored streak, starting fresh");
            StreakState::new()
        });
        next.can_check_in_now = self.processor.evaluate(&next, now).is_open();

        let mut state = self.state.lock().await;
        *state = next;
        self.schedule_reopen(&state, now);
        state.clone()
    }

    fn schedule_reopen(&self, state: &StreakState, now: DateTime<Utc>) {
        let GateResult::Cooling { remaining } = self.processor.evaluate(state, now) else {
            self.timer.cancel();
            return;
        };

        let scheduled_for = state.last_check_in_at;
        let shared = Arc::clone(&self.state);
        let events = self.events.clone();
        let clock = Arc::clone(&self.clock);
        self.timer.schedule(remaining, async move {
            let mut state = shared.lock().await;
            if state.last_check_in_at != scheduled_for {
                warn!("stale gate timer ignored");
                return;
            }
            state.can_check_in_now = true;
            drop(state);

            info!("gate reopened");
            let _ = events.send(Event::GateReopened { at: clock.now() });
        });
    }

    fn publish(&self, result: &CheckInResult) {
        let at = result.checked_in_at;
        let mut events = Vec::with_capacity(2 + result.badge_events.len());

        if let Some(previous_streak) = result.broken_streak {
            info!(previous_streak, "streak broken");
            events.push(Event::StreakBroken { previous_streak, at });
        }
        events.push(Event::CheckInCompleted {
            streak: result.streak_day,
            points_awarded: result.points_awarded,
            boost: result.applied_boost,
            mystery_payout: result.mystery_roll.map(|m| m.payout),
            total_points: result.new_state.total_points,
            at,
        });
        for badge in &result.badge_events {
            info!(badge = badge.name(), "badge unlocked");
            events.push(Event::BadgeUnlocked { badge: *badge, at });
        }
        if let Some(rank) = &result.rank_event {
            info!(rank = %rank, "rank unlocked");
            events.push(Event::RankUnlocked {
                rank: rank.clone(),
                at,
            });
        }

        for event in events {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}

async fn load_blocking(store: &Arc<dyn StreakStore>) -> Result<Option<StreakState>, CheckInError> {
    let store = Arc::clone(store);
    let loaded = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(StoreError::from)
        .and_then(|r| r);
    loaded.map_err(|e| {
        warn!(error = %e, "failed to read streak state");
        CheckInError::PersistenceFailure(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gate::CooldownGate;
    use crate::rewards::BadgeId;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    /// Memory store with a blocking write delay and switchable read failures
    struct SlowStore {
        inner: MemoryStore,
        write_delay: Duration,
        fail_reads: AtomicBool,
    }

    impl SlowStore {
        fn new(write_delay: Duration) -> Self {
            Self {
                inner: MemoryStore::new(),
                write_delay,
                fail_reads: AtomicBool::new(false),
            }
        }
    }

    impl StreakStore for SlowStore {
        fn load(&self) -> Result<Option<StreakState>, StoreError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk unplugged".into()));
            }
            self.inner.load()
        }

        fn save(&self, state: &StreakState) -> Result<(), StoreError> {
            std::thread::sleep(self.write_delay);
            self.inner.save(state)
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 7, 30, 0).unwrap()
    }

    fn fast_processor() -> CheckInProcessor {
        CheckInProcessor::new(
            CooldownGate::fast(),
            RewardTable::standard(),
            RankTable::standard(),
        )
    }

    async fn engine_with(
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
    ) -> StreakEngine {
        StreakEngine::open(fast_processor(), store, clock)
            .await
            .unwrap()
            .with_random(|| 0.5)
    }

    #[tokio::test(start_paused = true)]
    async fn first_run_starts_fresh_and_open() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;

        let state = engine.snapshot().await;
        assert_eq!(state.current_streak, 0);
        assert!(state.can_check_in_now);
        assert_eq!(engine.evaluate_gate().await, GateResult::Allowed);
        assert!(!engine.reopen_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn check_in_persists_then_replaces_state() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock).await;

        let result = engine.check_in().await.unwrap();
        assert_eq!(result.points_awarded, 20);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap(), Some(result.new_state.clone()));
        assert_eq!(engine.snapshot().await, result.new_state);
        assert!(engine.reopen_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_check_in_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock).await;

        let (a, b) = tokio::join!(engine.check_in(), engine.check_in());
        assert!(a.is_ok());
        assert!(matches!(b, Err(CheckInError::AlreadyInFlight)));
        assert_eq!(store.save_count(), 1);
        assert_eq!(engine.snapshot().await.connected_days, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cooling_gate_rejects_second_check_in() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock.clone()).await;

        engine.check_in().await.unwrap();
        clock.advance(chrono::Duration::seconds(2));
        let err = engine.check_in().await.unwrap_err();
        match err {
            CheckInError::NotAllowed { remaining } => {
                assert_eq!(remaining, chrono::Duration::seconds(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_leaves_state_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock).await;
        let before = engine.snapshot().await;

        store.fail_writes(true);
        let err = engine.check_in().await.unwrap_err();
        assert!(matches!(err, CheckInError::PersistenceFailure(_)));
        assert_eq!(engine.snapshot().await, before);
        assert!(!engine.reopen_pending());

        store.fail_writes(false);
        let result = engine.check_in().await.unwrap();
        assert_eq!(result.streak_day, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_reopens_gate_after_cooldown() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock.clone()).await;
        let mut events = engine.subscribe();

        engine.check_in().await.unwrap();
        assert!(!engine.snapshot().await.can_check_in_now);
        assert!(matches!(events.recv().await.unwrap(), Event::CheckInCompleted { .. }));

        clock.advance(chrono::Duration::seconds(5));
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(engine.snapshot().await.can_check_in_now);
        assert!(matches!(events.recv().await.unwrap(), Event::GateReopened { .. }));
        assert!(!engine.reopen_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_check_in_order() {
        let mut before = StreakState::new();
        before.current_streak = 2;
        before.best_streak = 2;
        before.connected_days = 2;
        before.total_points = 50;
        before.last_check_in_at = Some(t0() - chrono::Duration::seconds(10));

        let store = Arc::new(MemoryStore::with_state(before));
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;
        let mut events = engine.subscribe();

        engine.check_in().await.unwrap();
        match events.recv().await.unwrap() {
            Event::CheckInCompleted {
                streak,
                points_awarded,
                total_points,
                ..
            } => {
                assert_eq!(streak, 3);
                assert_eq!(points_awarded, 40);
                assert_eq!(total_points, 90);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            events.recv().await.unwrap(),
            Event::BadgeUnlocked { badge: BadgeId::Spark, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn broken_streak_is_announced_first() {
        let mut before = StreakState::new();
        before.current_streak = 4;
        before.best_streak = 4;
        before.connected_days = 4;
        before.last_check_in_at = Some(t0() - chrono::Duration::seconds(60));

        let store = Arc::new(MemoryStore::with_state(before));
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;
        let mut events = engine.subscribe();

        let result = engine.check_in().await.unwrap();
        assert_eq!(result.broken_streak, Some(4));
        assert!(matches!(
            events.recv().await.unwrap(),
            Event::StreakBroken { previous_streak: 4, .. }
        ));
        assert!(matches!(events.recv().await.unwrap(), Event::CheckInCompleted { streak: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn open_while_cooling_arms_timer() {
        let mut before = StreakState::new();
        before.current_streak = 1;
        before.best_streak = 1;
        before.connected_days = 1;
        before.last_check_in_at = Some(t0() - chrono::Duration::seconds(1));
        before.can_check_in_now = true;

        let store = Arc::new(MemoryStore::with_state(before));
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;

        assert!(!engine.snapshot().await.can_check_in_now);
        assert!(engine.reopen_pending());
        assert_eq!(
            engine.evaluate_gate().await.remaining(),
            chrono::Duration::seconds(4)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reload_to_open_state_cancels_timer() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock).await;
        let mut events = engine.subscribe();

        engine.check_in().await.unwrap();
        assert!(engine.reopen_pending());
        let _ = events.recv().await;

        store.overwrite(None);
        let state = engine.reload().await.unwrap();
        assert_eq!(state.current_streak, 0);
        assert!(!engine.reopen_pending());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_reopen() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;

        engine.check_in().await.unwrap();
        assert!(engine.reopen_pending());
        engine.shutdown();
        assert!(!engine.reopen_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn from_config_rejects_invalid_timing() {
        let mut config = Config::default();
        config.timing.profile = crate::storage::TimingProfile::Custom;
        config.timing.custom_cooldown_secs = 10;
        config.timing.custom_reset_secs = 5;

        let store: Arc<dyn StreakStore> = Arc::new(MemoryStore::new());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
        let err = StreakEngine::from_config(&config, store, clock).await.err();
        assert!(matches!(err, Some(CoreError::Config(_))));
    }

    #[tokio::test]
    async fn cancelled_check_in_still_commits_once() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(300)));
        let clock = Arc::new(ManualClock::new(t0()));
        let processor = CheckInProcessor::new(
            CooldownGate::production(),
            RewardTable::standard(),
            RankTable::standard(),
        );
        let engine = StreakEngine::open(processor, store.clone(), clock)
            .await
            .unwrap()
            .with_processing_delay(Duration::ZERO);
        let mut events = engine.subscribe();

        let first = tokio::time::timeout(Duration::from_millis(50), engine.check_in()).await;
        assert!(first.is_err(), "first attempt should have been cut short");

        // The write is still running and owns the in-flight flag
        assert!(matches!(engine.check_in().await, Err(CheckInError::AlreadyInFlight)));

        tokio::time::sleep(Duration::from_millis(500)).await;
        let state = engine.snapshot().await;
        assert_eq!(state.connected_days, 1);
        assert_eq!(state.last_check_in_at, Some(t0()));
        assert!(matches!(events.recv().await.unwrap(), Event::CheckInCompleted { streak: 1, .. }));

        assert!(matches!(engine.check_in().await, Err(CheckInError::NotAllowed { .. })));
        assert_eq!(store.inner.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_to_new_cooling_record_moves_reopen() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store.clone(), clock.clone()).await;
        let mut events = engine.subscribe();

        engine.check_in().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), Event::CheckInCompleted { .. }));

        // Another writer checked in two seconds later
        tokio::time::sleep(Duration::from_secs(2)).await;
        clock.advance(chrono::Duration::seconds(2));
        let mut moved = engine.snapshot().await;
        moved.last_check_in_at = Some(t0() + chrono::Duration::seconds(2));
        store.overwrite(Some(moved));

        let state = engine.reload().await.unwrap();
        assert!(!state.can_check_in_now);
        assert_eq!(engine.evaluate_gate().await.remaining(), chrono::Duration::seconds(5));

        // Past the old boundary, before the new one
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(events.try_recv().is_err());
        assert!(!engine.snapshot().await.can_check_in_now);
        assert!(engine.reopen_pending());

        clock.advance(chrono::Duration::seconds(5));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(events.recv().await.unwrap(), Event::GateReopened { .. }));
        assert!(events.try_recv().is_err());
        assert!(engine.snapshot().await.can_check_in_now);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_for_replaced_check_in_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = engine_with(store, clock).await;
        let mut events = engine.subscribe();

        engine.check_in().await.unwrap();
        let _ = events.recv().await;

        // Swap the instant out from under the pending callback
        engine.shared.state.lock().await.last_check_in_at = Some(t0() + chrono::Duration::seconds(1));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!engine.reopen_pending());
        assert!(!engine.snapshot().await.can_check_in_now);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn read_failures_surface_as_persistence_failure() {
        let store = Arc::new(SlowStore::new(Duration::ZERO));
        let clock = Arc::new(ManualClock::new(t0()));
        store.fail_reads.store(true, Ordering::SeqCst);
        let err = StreakEngine::open(fast_processor(), store.clone(), clock.clone())
            .await
            .err();
        assert!(matches!(
            err,
            Some(CheckInError::PersistenceFailure(StoreError::Unavailable(_)))
        ));

        store.fail_reads.store(false, Ordering::SeqCst);
        let engine = StreakEngine::open(fast_processor(), store.clone(), clock)
            .await
            .unwrap()
            .with_processing_delay(Duration::ZERO);
        engine.check_in().await.unwrap();

        store.fail_reads.store(true, Ordering::SeqCst);
        let err = engine.reload().await.unwrap_err();
        assert!(matches!(err, CheckInError::PersistenceFailure(_)));
        assert_eq!(engine.snapshot().await.connected_days, 1);
    }
}
