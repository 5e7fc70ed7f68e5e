//! Session registry and per-subscriber polling sessions
//!
//! Each subscriber owns at most one [`PollingSession`]. The session polls the
//! snapshot source on every tick, compares the result's fingerprint with the
//! last one it delivered and only notifies when something changed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use gagstock_core::{Fingerprint, ReferenceZone, RestockCountdowns};
use gagstock_providers::SnapshotSource;

use crate::clock::{Clock, SystemClock};
use crate::notifier::{Notifier, OutputChannel, StockNotification};
use crate::scheduler::{ScheduleHandle, Scheduler, TickFn};

/// Identifier of a tracking subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

/// Registry state errors, returned to the caller rather than logged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0} is already tracking stock")]
    AlreadySubscribed(SubscriberId),

    #[error("{0} has no active tracking session")]
    NotSubscribed(SubscriberId),
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Snapshot changed and the notifier accepted it
    Notified,
    /// Snapshot matched the last delivered one
    Unchanged,
    /// No snapshot could be fetched
    FetchFailed,
    /// Snapshot changed but delivery failed
    NotifyFailed,
    /// Session was stopped before the tick could finish
    Cancelled,
}

/// Collaborators shared by every session of a registry
pub struct TrackerContext {
    source: Arc<dyn SnapshotSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    zone: ReferenceZone,
}

impl TrackerContext {
    pub fn new(source: Arc<dyn SnapshotSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            clock: Arc::new(SystemClock),
            zone: ReferenceZone::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_zone(mut self, zone: ReferenceZone) -> Self {
        self.zone = zone;
        self
    }
}

/// One subscriber's polling state
pub struct PollingSession {
    subscriber: SubscriberId,
    destination: OutputChannel,
    /// `None` until the first snapshot is delivered
    last_fingerprint: Mutex<Option<Fingerprint>>,
    active: AtomicBool,
    context: Arc<TrackerContext>,
}

impl fmt::Debug for PollingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingSession")
            .field("subscriber", &self.subscriber)
            .field("destination", &self.destination)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl PollingSession {
    pub fn new(
        subscriber: SubscriberId,
        destination: OutputChannel,
        context: Arc<TrackerContext>,
    ) -> Self {
        Self {
            subscriber,
            destination,
            last_fingerprint: Mutex::new(None),
            active: AtomicBool::new(true),
            context,
        }
    }

    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    pub fn destination(&self) -> OutputChannel {
        self.destination
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.last_fingerprint.lock().clone()
    }

    /// Stop delivering; a tick already in flight finishes without notifying
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Poll once and notify if the snapshot changed
    pub async fn tick(&self) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Cancelled;
        }

        let snapshot = match self.context.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to fetch stock for {}: {}", self.subscriber, e);
                return TickOutcome::FetchFailed;
            }
        };

        if !self.is_active() {
            debug!("Discarding snapshot for stopped {}", self.subscriber);
            return TickOutcome::Cancelled;
        }

        let fingerprint = match Fingerprint::of(&snapshot) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                error!("Failed to fingerprint stock for {}: {}", self.subscriber, e);
                return TickOutcome::FetchFailed;
            }
        };

        {
            let mut last = self.last_fingerprint.lock();
            if last.as_ref() == Some(&fingerprint) {
                debug!("Stock unchanged for {}", self.subscriber);
                return TickOutcome::Unchanged;
            }
            *last = Some(fingerprint);
        }

        let now = self.context.clock.now();
        let notification = StockNotification {
            subscriber: self.subscriber,
            destination: self.destination,
            countdowns: RestockCountdowns::compute(&snapshot, now, self.context.zone),
            last_updated: self.context.zone.format_clock(now),
            snapshot,
        };

        if !self.is_active() {
            debug!("Dropping update for stopped {}", self.subscriber);
            return TickOutcome::Cancelled;
        }

        match self.context.notifier.notify(notification).await {
            Ok(()) => {
                debug!("Delivered stock update to {}", self.destination);
                TickOutcome::Notified
            }
            Err(e) => {
                warn!("Failed to notify {}: {}", self.subscriber, e);
                TickOutcome::NotifyFailed
            }
        }
    }
}

struct SessionEntry {
    session: Arc<PollingSession>,
    schedule: ScheduleHandle,
}

/// Owns every active session
pub struct SessionRegistry {
    sessions: DashMap<SubscriberId, SessionEntry>,
    context: Arc<TrackerContext>,
    scheduler: Arc<dyn Scheduler>,
    tick_interval: Duration,
}

impl SessionRegistry {
    pub fn new(
        context: TrackerContext,
        scheduler: Arc<dyn Scheduler>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            context: Arc::new(context),
            scheduler,
            tick_interval,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Start polling for a subscriber
    ///
    /// The first tick fires one interval after this returns.
    pub fn subscribe(
        &self,
        subscriber: SubscriberId,
        destination: OutputChannel,
    ) -> Result<Arc<PollingSession>, SessionError> {
        match self.sessions.entry(subscriber) {
            Entry::Occupied(_) => Err(SessionError::AlreadySubscribed(subscriber)),
            Entry::Vacant(vacant) => {
                let session = Arc::new(PollingSession::new(
                    subscriber,
                    destination,
                    Arc::clone(&self.context),
                ));

                let ticking = Arc::clone(&session);
                let tick: TickFn = Arc::new(move || {
                    let session = Arc::clone(&ticking);
                    Box::pin(async move {
                        session.tick().await;
                    })
                });
                let schedule = self.scheduler.schedule_repeating(self.tick_interval, tick);

                vacant.insert(SessionEntry {
                    session: Arc::clone(&session),
                    schedule,
                });

                info!(
                    "Started tracking for {} in {} every {:?}",
                    subscriber, destination, self.tick_interval
                );
                Ok(session)
            }
        }
    }

    /// Stop polling for a subscriber
    pub fn unsubscribe(&self, subscriber: SubscriberId) -> Result<(), SessionError> {
        let (_, entry) = self
            .sessions
            .remove(&subscriber)
            .ok_or(SessionError::NotSubscribed(subscriber))?;

        entry.session.deactivate();
        entry.schedule.cancel();

        info!("Stopped tracking for {}", subscriber);
        Ok(())
    }

    pub fn is_active(&self, subscriber: SubscriberId) -> bool {
        self.sessions.contains_key(&subscriber)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, subscriber: SubscriberId) -> Option<Arc<PollingSession>> {
        self.sessions
            .get(&subscriber)
            .map(|entry| Arc::clone(&entry.session))
    }

    /// Cancel every session, returning how many were stopped
    pub fn shutdown(&self) -> usize {
        let mut stopped = 0;
        self.sessions.retain(|_, entry| {
            entry.session.deactivate();
            stopped += 1;
            false
        });

        if stopped > 0 {
            info!("Stopped {} tracking sessions on shutdown", stopped);
        }
        stopped
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notifier::NotifyError;
    use crate::scheduler::ManualScheduler;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use gagstock_core::AggregateSnapshot;
    use gagstock_providers::FetchError;
    use std::collections::VecDeque;

    struct ScriptedSource {
        script: Mutex<VecDeque<Result<AggregateSnapshot, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<AggregateSnapshot, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
            })
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<AggregateSnapshot, FetchError> {
            self.script
                .lock()
                .pop_front()
                .unwrap_or(Err(FetchError::AllProvidersFailed(6)))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<StockNotification>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: StockNotification) -> Result<(), NotifyError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError::Delivery("channel gone".to_string()));
            }
            self.sent.lock().push(notification);
            Ok(())
        }
    }

    fn snapshot(gear: &[&str]) -> AggregateSnapshot {
        let mut snapshot = AggregateSnapshot::empty(Utc::now());
        snapshot.gear = gear.iter().map(|g| g.to_string()).collect();
        snapshot
    }

    fn session_with(
        source: Arc<ScriptedSource>,
        notifier: Arc<RecordingNotifier>,
    ) -> PollingSession {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 4, 15, 30).unwrap());
        let context = TrackerContext::new(source, notifier).with_clock(Arc::new(clock));
        PollingSession::new(SubscriberId(1), OutputChannel(99), Arc::new(context))
    }

    #[tokio::test]
    async fn test_first_tick_notifies_then_suppresses() {
        let source = ScriptedSource::new(vec![Ok(snapshot(&["Trowel"])), Ok(snapshot(&["Trowel"]))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session_with(source, notifier.clone());

        assert_eq!(session.tick().await, TickOutcome::Notified);
        assert_eq!(session.tick().await, TickOutcome::Unchanged);

        let sent = notifier.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, OutputChannel(99));
        assert_eq!(sent[0].subscriber, SubscriberId(1));
        // 04:15:30 UTC is 12:15:30 in Manila
        assert_eq!(sent[0].last_updated, "12:15:30 PM");
        assert_eq!(sent[0].countdowns.honey, "44m 30s");
    }

    /// Stops its session the moment a notification is being stamped
    struct StoppingClock {
        session: std::sync::OnceLock<std::sync::Weak<PollingSession>>,
    }

    impl Clock for StoppingClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            if let Some(session) = self.session.get().and_then(|s| s.upgrade()) {
                session.deactivate();
            }
            Utc.with_ymd_and_hms(2025, 6, 1, 4, 15, 30).unwrap()
        }
    }

    #[tokio::test]
    async fn test_stop_after_change_detected_sends_nothing() {
        let source = ScriptedSource::new(vec![Ok(snapshot(&["Trowel"]))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(StoppingClock {
            session: std::sync::OnceLock::new(),
        });
        let context = TrackerContext::new(source, notifier.clone()).with_clock(clock.clone());
        let session = Arc::new(PollingSession::new(
            SubscriberId(1),
            OutputChannel(99),
            Arc::new(context),
        ));
        clock.session.set(Arc::downgrade(&session)).unwrap();

        assert_eq!(session.tick().await, TickOutcome::Cancelled);
        assert!(!session.is_active());
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_fingerprint() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["Trowel"])),
            Err(FetchError::AllProvidersFailed(6)),
            Ok(snapshot(&["Trowel"])),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session_with(source, notifier.clone());

        session.tick().await;
        let before = session.last_fingerprint();

        assert_eq!(session.tick().await, TickOutcome::FetchFailed);
        assert_eq!(session.last_fingerprint(), before);
        assert_eq!(session.tick().await, TickOutcome::Unchanged);
        assert_eq!(notifier.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_notify_failure_consumes_change() {
        let source = ScriptedSource::new(vec![Ok(snapshot(&["Trowel"])), Ok(snapshot(&["Trowel"]))]);
        let notifier = Arc::new(RecordingNotifier::default());
        notifier.fail.store(true, Ordering::SeqCst);
        let session = session_with(source, notifier.clone());

        assert_eq!(session.tick().await, TickOutcome::NotifyFailed);
        assert!(session.last_fingerprint().is_some());

        notifier.fail.store(false, Ordering::SeqCst);
        assert_eq!(session.tick().await, TickOutcome::Unchanged);
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_session_does_not_fetch() {
        let source = ScriptedSource::new(vec![Ok(snapshot(&["Trowel"]))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session_with(source.clone(), notifier.clone());

        session.deactivate();
        assert_eq!(session.tick().await, TickOutcome::Cancelled);
        assert_eq!(source.script.lock().len(), 1);
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_registry_subscribe_and_unsubscribe() {
        let source = ScriptedSource::new(vec![]);
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ManualScheduler::new();
        let registry = SessionRegistry::new(
            TrackerContext::new(source, notifier),
            Arc::new(scheduler.clone()),
            Duration::from_secs(10),
        );

        registry.subscribe(SubscriberId(7), OutputChannel(1)).unwrap();
        assert!(registry.is_active(SubscriberId(7)));
        assert_eq!(registry.active_count(), 1);
        assert_eq!(scheduler.active_schedules(), 1);

        assert_eq!(
            registry.subscribe(SubscriberId(7), OutputChannel(2)).unwrap_err(),
            SessionError::AlreadySubscribed(SubscriberId(7))
        );
        assert_eq!(
            registry.session(SubscriberId(7)).unwrap().destination(),
            OutputChannel(1)
        );

        registry.unsubscribe(SubscriberId(7)).unwrap();
        assert!(!registry.is_active(SubscriberId(7)));
        assert_eq!(scheduler.active_schedules(), 0);
        assert_eq!(
            registry.unsubscribe(SubscriberId(7)).unwrap_err(),
            SessionError::NotSubscribed(SubscriberId(7))
        );
    }

    #[tokio::test]
    async fn test_shutdown_cancels_everything() {
        let source = ScriptedSource::new(vec![]);
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ManualScheduler::new();
        let registry = SessionRegistry::new(
            TrackerContext::new(source, notifier),
            Arc::new(scheduler.clone()),
            Duration::from_secs(10),
        );

        let first = registry.subscribe(SubscriberId(1), OutputChannel(1)).unwrap();
        registry.subscribe(SubscriberId(2), OutputChannel(1)).unwrap();

        assert_eq!(registry.shutdown(), 2);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(scheduler.active_schedules(), 0);
        assert!(!first.is_active());
    }
}
