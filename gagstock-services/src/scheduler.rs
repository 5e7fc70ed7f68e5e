//! Repeating schedules for polling sessions
//!
//! A schedule fires its tick once per period, first after one full period has
//! elapsed. Ticks of one schedule never overlap: the next tick is only started
//! once the previous one has finished. Dropping or cancelling the returned
//! [`ScheduleHandle`] stops the schedule, including a tick that is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Shortest period a schedule runs at; shorter requests are raised to it
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Callback run on every tick
pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Something that can run a tick callback on a fixed period
pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ScheduleHandle;
}

/// Exclusive ownership of a running schedule
pub struct ScheduleHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ScheduleHandle {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the schedule
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Runs each schedule as its own tokio task
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ScheduleHandle {
        let period = period.max(MIN_PERIOD);
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tick().await;
            }
        });

        let abort = task.abort_handle();
        ScheduleHandle::new(move || {
            debug!("Aborting scheduled task");
            abort.abort();
        })
    }
}

struct ManualTask {
    id: u64,
    period: Duration,
    next_due: Duration,
    tick: TickFn,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    tasks: Vec<ManualTask>,
}

/// Deterministic scheduler driven by virtual time
///
/// Nothing runs until [`ManualScheduler::advance`] is awaited, which fires
/// every tick falling due within the advanced window in time order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.state.lock().now
    }

    /// Schedules that have not been cancelled
    pub fn active_schedules(&self) -> usize {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move virtual time forward, running every tick that falls due
    pub async fn advance(&self, by: Duration) {
        let target = self.elapsed() + by;

        loop {
            let due = {
                let mut guard = self.state.lock();
                let state = &mut *guard;
                state.tasks.retain(|t| !t.cancelled.load(Ordering::SeqCst));

                let next = state
                    .tasks
                    .iter_mut()
                    .filter(|t| t.next_due <= target)
                    .min_by_key(|t| (t.next_due, t.id));

                match next {
                    Some(task) => {
                        let fired_at = task.next_due;
                        task.next_due += task.period;
                        let due = (Arc::clone(&task.tick), Arc::clone(&task.cancelled));
                        state.now = fired_at;
                        Some(due)
                    }
                    None => None,
                }
            };

            match due {
                Some((tick, cancelled)) => {
                    if !cancelled.load(Ordering::SeqCst) {
                        tick().await;
                    }
                }
                None => break,
            }
        }

        self.state.lock().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ScheduleHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));

        {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            let next_due = state.now + period;
            state.tasks.push(ManualTask {
                id,
                period,
                next_due,
                tick,
                cancelled: Arc::clone(&cancelled),
            });
        }

        ScheduleHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("elapsed", &self.elapsed())
            .field("active_schedules", &self.active_schedules())
            .finish()
    }
}
