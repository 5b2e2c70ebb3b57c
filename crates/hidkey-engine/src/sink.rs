//! Translation of gesture events into channel updates, and the sinks that
//! receive them.

use std::collections::BTreeMap;

use hidkey_protocol::{Channel, ChannelUpdate, Gesture, GestureEvent, Prefix};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::mapper::KeyMapper;

/// Receiver of channel updates. Creating and persisting channels is the
/// implementor's business; the engine only hands over values in order.
pub trait ChannelSink: Send {
    /// Write one channel value.
    fn publish(&mut self, update: ChannelUpdate);
}

impl ChannelSink for Vec<ChannelUpdate> {
    fn publish(&mut self, update: ChannelUpdate) {
        self.push(update);
    }
}

impl ChannelSink for mpsc::UnboundedSender<ChannelUpdate> {
    fn publish(&mut self, update: ChannelUpdate) {
        if self.send(update).is_err() {
            trace!("channel_sink_closed");
        }
    }
}

/// Last value of every channel written so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStore {
    /// Values by channel id.
    values: BTreeMap<String, String>,
}

impl ChannelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of channel `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Number of channels that have been written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ChannelSink for ChannelStore {
    fn publish(&mut self, update: ChannelUpdate) {
        self.values.insert(update.id(), update.value);
    }
}

/// Channel writes for one gesture, as `(channel, value suffix)` pairs.
///
/// The suffix is appended to the code (raw prefix) or mapped name (key prefix).
/// Action and dsl suffixes are the gesture's own tags.
fn channel_writes(gesture: Gesture) -> Vec<(Channel, String)> {
    let mut writes = Vec::with_capacity(2);
    match gesture {
        Gesture::Down => writes.push((Channel::Base, String::new())),
        Gesture::Single => writes.push((Channel::Single, String::new())),
        Gesture::Double => writes.push((Channel::Double, String::new())),
        Gesture::Long => writes.push((Channel::Long, String::new())),
        Gesture::RepeatCount(n) => writes.push((Channel::RepCnt, format!(".{}", n))),
        Gesture::Up | Gesture::Repeat => {}
    }
    if let Some(tag) = gesture.action_tag() {
        writes.push((Channel::Action, format!(".{}", tag)));
    }
    if let Some(tag) = gesture.dsl_tag() {
        writes.push((Channel::Dsl, format!(".{}", tag)));
    }
    writes
}

/// Fans gesture events out to raw and named channels.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    /// Name lookup for the key-prefixed channels.
    mapper: KeyMapper,
}

impl Dispatcher {
    /// Create a dispatcher using `mapper` for named channels.
    pub fn new(mapper: KeyMapper) -> Self {
        Self { mapper }
    }

    /// The mapper in use.
    pub fn mapper(&self) -> &KeyMapper {
        &self.mapper
    }

    /// Channel updates for `event`, in publish order.
    ///
    /// Each write goes to the raw channel first, then to the key channel when
    /// the code has a name.
    pub fn updates(&self, event: &GestureEvent) -> Vec<ChannelUpdate> {
        let name = self.mapper.lookup(&event.code);
        let mut out = Vec::new();
        for (channel, suffix) in channel_writes(event.gesture) {
            out.push(ChannelUpdate::new(
                Prefix::Raw,
                channel,
                format!("{}{}", event.code, suffix),
            ));
            if let Some(name) = name {
                out.push(ChannelUpdate::new(
                    Prefix::Key,
                    channel,
                    format!("{}{}", name, suffix),
                ));
            }
        }
        out
    }

    /// Publish every update for `event` to `sink`.
    pub fn dispatch<S: ChannelSink + ?Sized>(&self, event: &GestureEvent, sink: &mut S) {
        debug!(event = %event, "gesture");
        for update in self.updates(event) {
            trace!(update = %update, "channel_update");
            sink.publish(update);
        }
    }
}
