use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use thiserror::Error;
use tokio::{runtime::Handle, sync::Notify, task::JoinHandle, time::Instant};

/// Callback invoked by the [TapTimer] once its deadline elapses
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Possible errors creating a [TapTimer]
#[derive(Error, Debug)]
pub enum TimerError {
    #[error("no async runtime available to run the timer task: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

struct TimerState {
    /// When the timer was last armed
    started: Instant,
    /// Zero while the timer is stopped
    threshold: Duration,
    /// Cleared together with the threshold, or taken when fired
    callback: Option<TimerCallback>,
}

impl TimerState {
    fn deadline(&self) -> Option<Instant> {
        if self.threshold.is_zero() || self.callback.is_none() {
            return None;
        }
        Some(self.started + self.threshold)
    }
}

struct Shared {
    state: Mutex<TimerState>,
    /// Signalled whenever the timer is armed or stopped
    wake: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restartable single-shot countdown. The deadline can be polled with
/// [TapTimer::is_expired] and, while armed, a background task invokes the
/// registered callback once the deadline elapses. The background task is
/// spawned once and reused across every start/stop cycle.
///
/// The callback runs on the runtime's worker, never on the thread that called
/// [TapTimer::start], so it must only hand the expiration off to its owner
/// (e.g. over a channel).
pub struct TapTimer {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl TapTimer {
    /// Create a new stopped timer. Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, TimerError> {
        let handle = Handle::try_current()?;
        let shared = Arc::new(Shared {
            state: Mutex::new(TimerState {
                started: Instant::now(),
                threshold: Duration::ZERO,
                callback: None,
            }),
            wake: Notify::new(),
        });
        let task = handle.spawn(TapTimer::run(shared.clone()));

        Ok(Self { shared, task })
    }

    /// Arm the timer to call the given callback after `threshold` has elapsed.
    /// Any previous deadline and callback are replaced. A zero threshold stops
    /// the timer instead.
    pub fn start<F>(&self, threshold: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if threshold.is_zero() {
            log::warn!("Tap timer started with a zero threshold; stopping it instead");
            self.stop();
            return;
        }

        {
            let mut state = self.shared.lock();
            state.started = Instant::now();
            state.threshold = threshold;
            state.callback = Some(Box::new(callback));
        }
        log::trace!("Tap timer armed for {threshold:?}");
        self.shared.wake.notify_one();
    }

    /// Disarm the timer. A callback that has not been taken by the background
    /// task yet will never run. Stopping a stopped timer does nothing.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            if state.threshold.is_zero() && state.callback.is_none() {
                return;
            }
            state.threshold = Duration::ZERO;
            state.callback = None;
        }
        log::trace!("Tap timer stopped");
        self.shared.wake.notify_one();
    }

    /// Returns true if the timer is stopped or its deadline has elapsed.
    pub fn is_expired(&self) -> bool {
        let state = self.shared.lock();
        if state.threshold.is_zero() {
            return true;
        }
        Instant::now().duration_since(state.started) >= state.threshold
    }

    /// Returns true only if the timer has been explicitly stopped (or was
    /// never started). An armed timer whose deadline elapsed is not stopped.
    pub fn is_stopped(&self) -> bool {
        self.shared.lock().threshold.is_zero()
    }

    /// Background loop: wait until armed, sleep until the deadline, then fire
    async fn run(shared: Arc<Shared>) {
        log::debug!("Tap timer task started");
        loop {
            let deadline = shared.lock().deadline();
            let Some(deadline) = deadline else {
                shared.wake.notified().await;
                continue;
            };

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => (),
                // Re-armed or stopped while sleeping; re-read the deadline
                _ = shared.wake.notified() => continue,
            }

            // The callback is taken under the lock so a concurrent stop either
            // wins entirely or happens after the callback was claimed.
            let callback = {
                let mut state = shared.lock();
                match state.deadline() {
                    Some(current) if current <= Instant::now() => state.callback.take(),
                    _ => None,
                }
            };
            if let Some(callback) = callback {
                log::trace!("Tap timer expired");
                callback();
            }
        }
    }
}

impl Drop for TapTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for TapTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("TapTimer")
            .field("threshold", &state.threshold)
            .field("armed", &state.callback.is_some())
            .finish()
    }
}
