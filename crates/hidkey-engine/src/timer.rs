//! Single-shot, restartable timers for debounce and gesture windows.
//!
//! A timer never runs classifier code itself. On expiry its task posts a
//! [`TimerFired`] onto the engine's serial queue, and the owning handle decides
//! whether that expiry is still live via [`Timer::claim`]. An expiry that was
//! already queued when the handle was cancelled or rescheduled is therefore
//! discarded rather than acted on.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use hidkey_protocol::KeyCode;
use tokio::{runtime::Handle, sync::mpsc, time};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{Error, Result};

/// Which classifier timer an expiry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Quiet period after the last sample; expiry infers a release.
    KeyUp,
    /// Single/double classification window opened by a release.
    Window,
}

/// Message posted when a timer elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    /// Timer the expiry belongs to.
    pub kind: TimerKind,
    /// Sequence number of the schedule call that produced this expiry.
    pub generation: u64,
    /// Code captured when the timer was scheduled.
    pub code: KeyCode,
}

/// Receiving side of the expiry queue.
pub type FiredRx = mpsc::UnboundedReceiver<TimerFired>;

/// Shared spawning context for timers: the runtime that sleeps, the expiry
/// queue and a sequence counter that is unique across every timer created
/// from it.
///
/// Timers are spawned through the captured runtime handle, so a classifier
/// built on a scheduler can be driven from plain synchronous code.
#[derive(Clone, Debug)]
pub struct Scheduler {
    /// Runtime timer tasks are spawned on. Needs the time driver enabled.
    handle: Handle,
    /// Expiry queue feeding the engine loop.
    tx: mpsc::UnboundedSender<TimerFired>,
    /// Monotonic schedule counter.
    seq: Arc<AtomicU64>,
}

impl Scheduler {
    /// Create a scheduler on the current tokio runtime and the receiver its
    /// expiries arrive on. Fails with [`Error::NoRuntime`] outside a runtime.
    pub fn channel() -> Result<(Self, FiredRx)> {
        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::channel_on(handle))
    }

    /// Create a scheduler whose timers run on `handle`.
    pub fn channel_on(handle: Handle) -> (Self, FiredRx) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                handle,
                tx,
                seq: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Create an idle timer handle.
    pub fn timer(&self, kind: TimerKind) -> Timer {
        Timer {
            kind,
            scheduler: self.clone(),
            pending: None,
        }
    }

    /// Next unique generation.
    fn next_generation(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// The currently scheduled expiry of a handle.
#[derive(Debug)]
struct Pending {
    /// Cancels the sleeping task.
    token: CancellationToken,
    /// Generation the task will report.
    generation: u64,
}

/// Handle owning at most one scheduled expiry.
///
/// Scheduling supersedes any earlier expiry; cancelling is idempotent.
/// Dropping the handle cancels it.
#[derive(Debug)]
pub struct Timer {
    /// Kind reported on expiry.
    kind: TimerKind,
    /// Spawning context.
    scheduler: Scheduler,
    /// Live expiry, if any.
    pending: Option<Pending>,
}

impl Timer {
    /// Schedule an expiry carrying `code` after `delay`, replacing any pending one.
    ///
    /// The sleeping task runs on the scheduler's runtime; the caller need not
    /// be inside it.
    pub fn schedule(&mut self, delay: Duration, code: KeyCode) {
        self.cancel();

        let token = CancellationToken::new();
        let cancel = token.clone();
        let generation = self.scheduler.next_generation();
        let tx = self.scheduler.tx.clone();
        let fired = TimerFired {
            kind: self.kind,
            generation,
            code,
        };
        trace!(
            kind = ?self.kind,
            generation,
            code = %fired.code,
            delay_ms = delay.as_millis(),
            "timer_schedule"
        );

        self.scheduler.handle.spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {
                    if tx.send(fired).is_err() {
                        trace!(generation, "timer_fired_after_close");
                    }
                }
                _ = cancel.cancelled() => {
                    trace!(generation, "timer_cancelled");
                }
            }
        });

        self.pending = Some(Pending { token, generation });
    }

    /// Cancel the pending expiry, if any.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            p.token.cancel();
        }
    }

    /// True while an expiry is scheduled and not yet claimed or cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept `fired` if it is this handle's live expiry; the handle becomes idle.
    ///
    /// Returns false for expiries of other handles and for stale expiries that
    /// were queued before a cancel or reschedule.
    pub fn claim(&mut self, fired: &TimerFired) -> bool {
        match &self.pending {
            Some(p) if fired.kind == self.kind && p.generation == fired.generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
