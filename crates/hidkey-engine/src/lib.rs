//! hidkey engine
//!
//! The engine turns raw HID samples into gesture events and channel updates:
//! - classifies samples into down/up/repeat/single/double/long
//! - infers releases with a key-up debounce timer
//! - maps codes to configured names
//! - fans events out to raw and named channels through a [`ChannelSink`]
//!
//! [`Engine::spawn`] runs everything on one tokio task. Samples and timer
//! expiries are queued to that task and handled one at a time, so classifier
//! state is never touched concurrently. [`GestureClassifier`] and
//! [`Dispatcher`] are public for callers that drive classification
//! themselves; such callers pass a runtime handle to
//! [`Scheduler::channel_on`] and may then call the classifier from any
//! synchronous context.

mod classifier;
mod error;
mod mapper;
mod sink;
mod timer;

pub mod test_support;

use config::Config;
use hidkey_protocol::{GestureEvent, KeyCode};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, trace, warn};

pub use classifier::{GestureClassifier, LONG_PRESS_SAMPLES, PressState};
pub use error::{Error, Result};
pub use mapper::KeyMapper;
pub use sink::{ChannelSink, ChannelStore, Dispatcher};
pub use timer::{FiredRx, Scheduler, Timer, TimerFired, TimerKind};

/// Work queued to the engine task.
#[derive(Debug)]
enum Input {
    /// Hex sample as delivered by the transport.
    Sample(String),
    /// Raw report bytes.
    Report(Vec<u8>),
    /// Stop immediately, cancelling pending timers.
    Shutdown,
}

/// Cloneable submitter of samples to a running engine.
///
/// The engine keeps running while any sender is alive.
#[derive(Clone, Debug)]
pub struct EngineSender {
    /// Input queue of the engine task.
    tx: mpsc::UnboundedSender<Input>,
}

impl EngineSender {
    /// Submit a hex-encoded sample. Malformed samples are dropped by the engine.
    pub fn send(&self, code: &str) -> Result<()> {
        self.push(Input::Sample(code.to_string()))
    }

    /// Submit raw report bytes.
    pub fn send_report(&self, bytes: &[u8]) -> Result<()> {
        self.push(Input::Report(bytes.to_vec()))
    }

    /// Queue one input.
    fn push(&self, input: Input) -> Result<()> {
        self.tx.send(input).map_err(|_| Error::Closed)
    }
}

/// Owner handle of a spawned engine. Yields the sink back when the engine stops.
#[derive(Debug)]
pub struct EngineHandle<S> {
    /// Submitter owned by the handle.
    sender: EngineSender,
    /// Engine task.
    task: JoinHandle<S>,
}

impl<S> EngineHandle<S> {
    /// A cloneable sender for other producers.
    pub fn sender(&self) -> EngineSender {
        self.sender.clone()
    }

    /// Submit a hex-encoded sample.
    pub fn send(&self, code: &str) -> Result<()> {
        self.sender.send(code)
    }

    /// Submit raw report bytes.
    pub fn send_report(&self, bytes: &[u8]) -> Result<()> {
        self.sender.send_report(bytes)
    }

    /// Stop now: pending timers are cancelled and no further events are emitted.
    pub async fn shutdown(self) -> Result<S> {
        // A closed queue means the task already ended; its result is still joined.
        let _ignored = self.sender.push(Input::Shutdown);
        Ok(self.task.await?)
    }

    /// Close this handle's sender and wait for the engine to settle.
    ///
    /// Once every sender is gone the engine keeps handling timer expiries until
    /// the held code is released and every open click window is classified.
    pub async fn finish(self) -> Result<S> {
        let Self { sender, task } = self;
        drop(sender);
        Ok(task.await?)
    }
}

/// The serial engine: classifier, dispatcher and sink driven from one task.
#[derive(Debug)]
pub struct Engine<S> {
    /// Gesture state machine.
    classifier: GestureClassifier,
    /// Event to channel fan-out.
    dispatcher: Dispatcher,
    /// Destination of channel updates.
    sink: S,
    /// Timer expiries.
    fired_rx: FiredRx,
    /// Samples and control messages.
    inputs: mpsc::UnboundedReceiver<Input>,
}

impl<S: ChannelSink + 'static> Engine<S> {
    /// Spawn an engine configured by `cfg` on the current tokio runtime.
    ///
    /// Panics outside a runtime, like `tokio::spawn`.
    pub fn spawn(cfg: &Config, sink: S) -> EngineHandle<S> {
        let (scheduler, fired_rx) = Scheduler::channel_on(Handle::current());
        let (tx, inputs) = mpsc::unbounded_channel();
        let engine = Self {
            classifier: GestureClassifier::new(cfg, scheduler),
            dispatcher: Dispatcher::new(KeyMapper::from_config(cfg)),
            sink,
            fired_rx,
            inputs,
        };
        debug!(
            device = %cfg.device_label(),
            key_up_timeout_ms = cfg.key_up_timeout().as_millis(),
            mappings = engine.dispatcher.mapper().len(),
            "engine_spawn"
        );
        EngineHandle {
            sender: EngineSender { tx },
            task: tokio::spawn(engine.run()),
        }
    }

    /// Main loop. Samples are preferred over expiries that became ready at
    /// the same time, so a late-processed repeat still defers a release.
    async fn run(mut self) -> S {
        loop {
            tokio::select! {
                biased;
                input = self.inputs.recv() => match input {
                    Some(Input::Sample(raw)) => match KeyCode::parse(&raw) {
                        Some(code) => self.on_sample(code),
                        None => warn!(sample = %raw, "ignoring malformed sample"),
                    },
                    Some(Input::Report(bytes)) => match KeyCode::from_report(&bytes) {
                        Some(code) => self.on_sample(code),
                        None => warn!("ignoring empty report"),
                    },
                    Some(Input::Shutdown) => {
                        self.classifier.shutdown();
                        break;
                    }
                    None => {
                        self.drain().await;
                        break;
                    }
                },
                Some(fired) = self.fired_rx.recv() => self.on_timer(fired),
            }
        }
        debug!("engine_stopped");
        self.sink
    }

    /// Handle expiries until no release or click window is outstanding.
    async fn drain(&mut self) {
        trace!("engine_drain");
        while !self.classifier.is_settled() {
            match self.fired_rx.recv().await {
                Some(fired) => self.on_timer(fired),
                None => break,
            }
        }
    }

    /// Classify and publish one sample.
    fn on_sample(&mut self, code: KeyCode) {
        let events = self.classifier.on_sample(code);
        self.publish(&events);
    }

    /// Classify and publish one timer expiry.
    fn on_timer(&mut self, fired: TimerFired) {
        let events = self.classifier.on_timer(fired);
        self.publish(&events);
    }

    /// Dispatch events to the sink in order.
    fn publish(&mut self, events: &[GestureEvent]) {
        for event in events {
            self.dispatcher.dispatch(event, &mut self.sink);
        }
    }
}
