//! Interruptible scheduler that drains a step trace.
//!
//! A run moves `Idle -> Running -> (Completed | Cancelled)`. Only one run is
//! active per controller; a second `start` while running is rejected, not
//! queued. The draining task suspends only between steps, through an
//! injectable [`Sleeper`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use algoviz_model::Coord;
use algoviz_trace::{Outcome, Progress, Status, Step, StepTrace};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::speed::IntervalProvider;

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// State plus the id of the run it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub run: u64,
    pub state: PlaybackState,
}

/// Delay between steps.
pub trait Sleeper: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Real time via `tokio::time::sleep`. Honors paused test clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// No delay; yields to the scheduler so cancellation still gets a turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Sleeper for Immediate {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        tokio::task::yield_now().boxed()
    }
}

/// Terminal report of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub status: Status,
    /// `None` when cancelled.
    pub outcome: Option<Outcome>,
    pub steps_delivered: u64,
}

impl Completion {
    pub fn path(&self) -> Option<&[Coord]> {
        self.outcome.as_ref().and_then(Outcome::path)
    }

    pub fn value(&self) -> Option<i64> {
        self.outcome.as_ref().and_then(Outcome::value)
    }
}

#[derive(Debug, Default)]
struct CancelSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.notify.notify_one();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        // notify_one stores a permit, so a cancel racing this await is kept.
        self.notify.notified().await;
    }
}

/// Cloneable cancel switch for one run, usable from inside callbacks.
#[derive(Debug, Clone)]
pub struct Canceller {
    run: u64,
    signal: Arc<CancelSignal>,
    state: Arc<watch::Sender<RunState>>,
}

impl Canceller {
    /// Stop the run. Idempotent, and a no-op once the run has finished.
    ///
    /// Returns `true` only for the call that took the run out of `Running`.
    /// The controller is released immediately, so a new run may start before
    /// this run's completion callback has fired.
    pub fn cancel(&self) -> bool {
        self.signal.cancel();
        let run = self.run;
        let released = self.state.send_if_modified(|current| {
            if current.run == run && current.state == PlaybackState::Running {
                current.state = PlaybackState::Cancelled;
                true
            } else {
                false
            }
        });
        if released {
            debug!(run, "cancel requested");
        }
        released
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

/// Handle to one run.
#[derive(Debug)]
pub struct PlaybackHandle {
    canceller: Canceller,
    task: JoinHandle<Completion>,
}

impl PlaybackHandle {
    pub fn run_id(&self) -> u64 {
        self.canceller.run
    }

    pub fn cancel(&self) -> bool {
        self.canceller.cancel()
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Whether the draining task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end.
    pub async fn join(self) -> Result<Completion> {
        Ok(self.task.await?)
    }
}

/// Marks the run finished even if a callback panics.
struct RunGuard {
    run: u64,
    state: Arc<watch::Sender<RunState>>,
}

impl RunGuard {
    /// Move this run out of `Running`. Returns `false` if a cancel got there
    /// first.
    fn settle(&self, terminal: PlaybackState) -> bool {
        let run = self.run;
        self.state.send_if_modified(|current| {
            if current.run == run && current.state == PlaybackState::Running {
                current.state = terminal;
                true
            } else {
                false
            }
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.settle(PlaybackState::Cancelled);
    }
}

/// Drains traces on the ambient Tokio runtime.
#[derive(Clone)]
pub struct PlaybackController {
    state: Arc<watch::Sender<RunState>>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::with_sleeper(Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(sleeper: Arc<dyn Sleeper>) -> Self {
        let (tx, _) = watch::channel(RunState::default());
        Self {
            state: Arc::new(tx),
            sleeper,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == PlaybackState::Running
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Start draining `trace`.
    ///
    /// `on_step` receives each step in order, with a wait of
    /// `interval.interval()` after it. `on_complete` is called exactly once
    /// with the terminal status. Fails with [`Error::RunAlreadyActive`] while
    /// another run is active; that run is left untouched.
    pub fn start<T, I, S, C>(
        &self,
        trace: T,
        interval: I,
        on_step: S,
        on_complete: C,
    ) -> Result<PlaybackHandle>
    where
        T: StepTrace + 'static,
        I: IntervalProvider,
        S: FnMut(Step) + Send + 'static,
        C: FnOnce(Completion) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let mut run = 0;
        let claimed = self.state.send_if_modified(|current| {
            if current.state == PlaybackState::Running {
                return false;
            }
            current.run += 1;
            current.state = PlaybackState::Running;
            run = current.run;
            true
        });
        if !claimed {
            warn!("start rejected: a run is already active");
            return Err(Error::RunAlreadyActive);
        }
        debug!(run, "playback started");

        let signal = Arc::new(CancelSignal::default());
        let canceller = Canceller {
            run,
            signal: signal.clone(),
            state: self.state.clone(),
        };
        let guard = RunGuard {
            run,
            state: self.state.clone(),
        };
        let task = runtime.spawn(drain(
            trace,
            interval,
            on_step,
            on_complete,
            signal,
            self.sleeper.clone(),
            guard,
        ));

        Ok(PlaybackHandle { canceller, task })
    }
}

async fn drain<T, I, S, C>(
    mut source: T,
    interval: I,
    mut on_step: S,
    on_complete: C,
    signal: Arc<CancelSignal>,
    sleeper: Arc<dyn Sleeper>,
    guard: RunGuard,
) -> Completion
where
    T: StepTrace,
    I: IntervalProvider,
    S: FnMut(Step) + Send,
    C: FnOnce(Completion) + Send,
{
    let run = guard.run;
    let mut delivered = 0u64;

    let outcome = loop {
        if signal.is_cancelled() {
            break None;
        }
        match source.advance() {
            Progress::Step(step) => {
                trace!(run, frame = step.frame(), kind = ?step.kind(), "step");
                on_step(step);
                delivered += 1;
            }
            Progress::Finished(outcome) => break Some(outcome),
        }

        let wait = interval.interval();
        tokio::select! {
            biased;
            _ = signal.cancelled() => break None,
            _ = sleeper.sleep(wait) => {}
        }
    };

    // A cancel that lands after the trace finished still wins, so the
    // completion agrees with the controller state.
    let completion = match outcome {
        Some(outcome) if guard.settle(PlaybackState::Completed) => Completion {
            status: outcome.status(),
            outcome: Some(outcome),
            steps_delivered: delivered,
        },
        _ => {
            guard.settle(PlaybackState::Cancelled);
            warn!(run, delivered, "playback cancelled");
            Completion {
                status: Status::Cancelled,
                outcome: None,
                steps_delivered: delivered,
            }
        }
    };
    debug!(run, status = ?completion.status, delivered, "playback finished");

    // Released before reporting so the callback may start the next run.
    drop(guard);
    on_complete(completion.clone());
    completion
}
