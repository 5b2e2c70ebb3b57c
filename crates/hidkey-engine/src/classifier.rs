//! Gesture classification from a stream of "key currently held" samples.
//!
//! The device repeats a code while a control is held and never reports a
//! release. Release is inferred when the key-up timer elapses without a new
//! sample, or when a different code arrives. Each release of a short press
//! opens a window of `2 × key_up_timeout` for that code; a second release of
//! the same code inside the window is a double click, otherwise the window
//! expiry reports a single click. Holding a code for
//! [`LONG_PRESS_SAMPLES`] consecutive samples is a long press, which closes
//! the code's window and suppresses click classification for that run.
//!
//! Windows are tracked per code, so releasing a different code never cancels
//! or confirms another code's pending single click.

use std::{collections::HashMap, time::Duration};

use config::Config;
use hidkey_protocol::{Gesture, GestureEvent, KeyCode};
use tracing::trace;

use crate::timer::{Scheduler, Timer, TimerFired, TimerKind};

/// Consecutive identical samples that confirm a long press.
pub const LONG_PRESS_SAMPLES: u32 = 3;

/// Press tracking for the code currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressState {
    /// Code considered held; `None` when idle.
    current: Option<KeyCode>,
    /// Identical samples after the first one of the current run.
    repeat_count: u32,
    /// The current run already reported a long press.
    long_fired: bool,
}

impl PressState {
    /// Code considered held, if any.
    pub fn current(&self) -> Option<&KeyCode> {
        self.current.as_ref()
    }

    /// Repeats seen in the current run.
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Whether the current run already reported a long press.
    pub fn long_fired(&self) -> bool {
        self.long_fired
    }

    /// True when no code is held.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

/// Stateful classifier turning raw samples into [`GestureEvent`]s.
///
/// All methods are synchronous and must be driven from one serial context:
/// samples via [`on_sample`](Self::on_sample) and timer expiries, received
/// from the [`Scheduler`] queue, via [`on_timer`](Self::on_timer).
#[derive(Debug)]
pub struct GestureClassifier {
    /// Key-up debounce delay; zero disables release inference.
    key_up_timeout: Duration,
    /// Single/double window length.
    window: Duration,
    /// Held-code tracking.
    state: PressState,
    /// Key-up debounce timer.
    key_up: Timer,
    /// Open single/double windows by code.
    windows: HashMap<KeyCode, Timer>,
    /// Source of window timers.
    scheduler: Scheduler,
}

impl GestureClassifier {
    /// Create a classifier with the timings from `cfg`.
    pub fn new(cfg: &Config, scheduler: Scheduler) -> Self {
        Self::with_timeout(cfg.key_up_timeout(), cfg.double_click_window(), scheduler)
    }

    /// Create a classifier with explicit timings.
    pub fn with_timeout(key_up_timeout: Duration, window: Duration, scheduler: Scheduler) -> Self {
        Self {
            key_up_timeout,
            window,
            state: PressState::default(),
            key_up: scheduler.timer(TimerKind::KeyUp),
            windows: HashMap::new(),
            scheduler,
        }
    }

    /// Current press tracking.
    pub fn state(&self) -> &PressState {
        &self.state
    }

    /// Codes with an open single/double window, sorted.
    pub fn pending_windows(&self) -> Vec<KeyCode> {
        let mut codes: Vec<KeyCode> = self.windows.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// True when no release is pending and no click window is open.
    pub fn is_settled(&self) -> bool {
        !self.key_up.is_pending() && self.windows.is_empty()
    }

    /// True when release, click and long-press detection is active.
    fn debounce_enabled(&self) -> bool {
        !self.key_up_timeout.is_zero()
    }

    /// Classify one raw sample.
    pub fn on_sample(&mut self, code: KeyCode) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        let debounce = self.debounce_enabled();

        if self.state.current.as_ref() == Some(&code) {
            self.state.repeat_count = self.state.repeat_count.saturating_add(1);
            if debounce
                && !self.state.long_fired
                && self.state.repeat_count >= LONG_PRESS_SAMPLES - 1
            {
                self.state.long_fired = true;
                self.windows.remove(&code);
                out.push(GestureEvent::new(Gesture::Long, code.clone()));
            }
            out.push(GestureEvent::new(Gesture::Repeat, code.clone()));
        } else {
            if debounce {
                self.release(&mut out);
            }
            out.push(GestureEvent::new(Gesture::Down, code.clone()));
            self.state = PressState {
                current: Some(code.clone()),
                repeat_count: 0,
                long_fired: false,
            };
        }

        if self.state.repeat_count > 1 {
            out.push(GestureEvent::new(
                Gesture::RepeatCount(self.state.repeat_count),
                code.clone(),
            ));
        }

        if debounce {
            self.key_up.schedule(self.key_up_timeout, code);
        }
        trace!(
            current = ?self.state.current,
            repeat_count = self.state.repeat_count,
            events = out.len(),
            "sample"
        );
        out
    }

    /// Handle a timer expiry. Stale or foreign expiries produce nothing.
    pub fn on_timer(&mut self, fired: TimerFired) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        match fired.kind {
            TimerKind::KeyUp => {
                if !self.key_up.claim(&fired) {
                    trace!(generation = fired.generation, "stale_key_up_dropped");
                    return out;
                }
                if self.state.current.as_ref() == Some(&fired.code) {
                    self.release(&mut out);
                } else {
                    trace!(code = %fired.code, "key_up_for_idle_code");
                }
            }
            TimerKind::Window => {
                let live = self
                    .windows
                    .get_mut(&fired.code)
                    .is_some_and(|t| t.claim(&fired));
                if !live {
                    trace!(generation = fired.generation, "stale_window_dropped");
                    return out;
                }
                self.windows.remove(&fired.code);
                out.push(GestureEvent::new(Gesture::Single, fired.code));
            }
        }
        out
    }

    /// Release the held code: emit `Up` and classify the press.
    fn release(&mut self, out: &mut Vec<GestureEvent>) {
        let Some(code) = self.state.current.take() else {
            return;
        };
        self.key_up.cancel();
        out.push(GestureEvent::new(Gesture::Up, code.clone()));

        if !self.state.long_fired {
            if self.windows.remove(&code).is_some() {
                out.push(GestureEvent::new(Gesture::Double, code));
            } else {
                let mut window = self.scheduler.timer(TimerKind::Window);
                window.schedule(self.window, code.clone());
                self.windows.insert(code, window);
            }
        }
        self.state.repeat_count = 0;
        self.state.long_fired = false;
    }

    /// Cancel every timer. Later expiries already queued are ignored.
    pub fn shutdown(&mut self) {
        self.key_up.cancel();
        self.windows.clear();
        trace!("classifier_shutdown");
    }
}

#[cfg(test)]
mod tests {
    use tokio::{runtime::Builder, time};

    use super::*;
    use crate::timer::FiredRx;

    fn code(s: &str) -> KeyCode {
        KeyCode::parse(s).unwrap()
    }

    fn gestures(events: &[GestureEvent]) -> Vec<Gesture> {
        events.iter().map(|e| e.gesture).collect()
    }

    fn classifier(timeout_ms: u64) -> (GestureClassifier, FiredRx) {
        let (sched, rx) = Scheduler::channel().unwrap();
        let t = Duration::from_millis(timeout_ms);
        (GestureClassifier::with_timeout(t, t * 2, sched), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn first_sample_is_down() {
        let (mut c, _rx) = classifier(100);
        let evs = c.on_sample(code("0A"));
        assert_eq!(evs, vec![GestureEvent::new(Gesture::Down, code("0A"))]);
        assert_eq!(c.state().current(), Some(&code("0A")));
        assert_eq!(c.state().repeat_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn third_identical_sample_is_long_once() {
        let (mut c, _rx) = classifier(100);
        assert_eq!(gestures(&c.on_sample(code("0A"))), [Gesture::Down]);
        assert_eq!(gestures(&c.on_sample(code("0A"))), [Gesture::Repeat]);
        assert_eq!(
            gestures(&c.on_sample(code("0A"))),
            [Gesture::Long, Gesture::Repeat, Gesture::RepeatCount(2)]
        );
        assert_eq!(
            gestures(&c.on_sample(code("0A"))),
            [Gesture::Repeat, Gesture::RepeatCount(3)]
        );
        assert!(c.state().long_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn new_code_releases_previous_first() {
        let (mut c, _rx) = classifier(100);
        c.on_sample(code("0A"));
        let evs = c.on_sample(code("0B"));
        assert_eq!(
            evs,
            vec![
                GestureEvent::new(Gesture::Up, code("0A")),
                GestureEvent::new(Gesture::Down, code("0B")),
            ]
        );
        assert_eq!(c.pending_windows(), vec![code("0A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn key_up_expiry_releases_held_code() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.kind, TimerKind::KeyUp);
        let evs = c.on_timer(fired);
        assert_eq!(evs, vec![GestureEvent::new(Gesture::Up, code("0A"))]);
        assert!(c.state().is_idle());
        assert_eq!(c.pending_windows(), vec![code("0A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn window_expiry_is_single() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        let up = rx.recv().await.unwrap();
        c.on_timer(up);
        let window = rx.recv().await.unwrap();
        assert_eq!(window.kind, TimerKind::Window);
        assert_eq!(
            c.on_timer(window),
            vec![GestureEvent::new(Gesture::Single, code("0A"))]
        );
        assert!(c.pending_windows().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_release_inside_window_is_double() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        let up = rx.recv().await.unwrap();
        c.on_timer(up);
        c.on_sample(code("0A"));
        let up = rx.recv().await.unwrap();
        assert_eq!(up.kind, TimerKind::KeyUp);
        assert_eq!(
            gestures(&c.on_timer(up)),
            [Gesture::Up, Gesture::Double]
        );
        assert!(c.pending_windows().is_empty());
        // The first window was cancelled: nothing else arrives.
        time::sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn long_press_release_opens_no_window() {
        let (mut c, mut rx) = classifier(100);
        for _ in 0..3 {
            c.on_sample(code("0A"));
        }
        let up = rx.recv().await.unwrap();
        assert_eq!(gestures(&c.on_timer(up)), [Gesture::Up]);
        assert!(c.pending_windows().is_empty());
        assert_eq!(c.state(), &PressState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn long_press_closes_open_window() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        let up = rx.recv().await.unwrap();
        c.on_timer(up);
        assert_eq!(c.pending_windows(), vec![code("0A")]);
        for _ in 0..3 {
            c.on_sample(code("0A"));
        }
        assert!(c.pending_windows().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn windows_of_different_codes_are_independent() {
        let (mut c, _rx) = classifier(100);
        c.on_sample(code("0A"));
        c.on_sample(code("0B"));
        c.on_sample(code("0C"));
        assert_eq!(c.pending_windows(), vec![code("0A"), code("0B")]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_reports_down_and_repeat_only() {
        let (mut c, mut rx) = classifier(0);
        let mut all = Vec::new();
        for s in ["0A", "0A", "0A", "0A", "0B", "0A"] {
            all.extend(c.on_sample(code(s)));
        }
        assert_eq!(
            gestures(&all),
            [
                Gesture::Down,
                Gesture::Repeat,
                Gesture::Repeat,
                Gesture::RepeatCount(2),
                Gesture::Repeat,
                Gesture::RepeatCount(3),
                Gesture::Down,
                Gesture::Down,
            ]
        );
        time::sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_key_up_is_ignored() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        let stale = rx.recv().await.unwrap();
        // A repeat sample arrived before the queued expiry was handled.
        c.on_sample(code("0A"));
        assert!(c.on_timer(stale).is_empty());
        assert_eq!(c.state().current(), Some(&code("0A")));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_everything() {
        let (mut c, mut rx) = classifier(100);
        c.on_sample(code("0A"));
        c.on_sample(code("0B"));
        c.shutdown();
        assert!(c.pending_windows().is_empty());
        time::sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drives_from_synchronous_code() {
        let rt = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let (sched, mut rx) = Scheduler::channel_on(rt.handle().clone());
        let t = Duration::from_millis(100);
        let mut c = GestureClassifier::with_timeout(t, t * 2, sched);

        assert_eq!(gestures(&c.on_sample(code("0A"))), [Gesture::Down]);
        let up = rt.block_on(rx.recv()).unwrap();
        assert_eq!(gestures(&c.on_timer(up)), [Gesture::Up]);
        let window = rt.block_on(rx.recv()).unwrap();
        assert_eq!(
            c.on_timer(window),
            vec![GestureEvent::new(Gesture::Single, code("0A"))]
        );
        assert!(c.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_count_saturates() {
        let (mut c, _rx) = classifier(100);
        c.on_sample(code("0A"));
        c.state.repeat_count = u32::MAX - 1;
        assert_eq!(
            gestures(&c.on_sample(code("0A"))),
            [Gesture::Long, Gesture::Repeat, Gesture::RepeatCount(u32::MAX)]
        );
        assert_eq!(
            gestures(&c.on_sample(code("0A"))),
            [Gesture::Repeat, Gesture::RepeatCount(u32::MAX)]
        );
    }
}
