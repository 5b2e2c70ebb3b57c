//! Test support utilities for hidkey-engine unit and integration tests.
//! These helpers are public so the `tests/` suite can share them; they are
//! intended for use by tests only.

use std::{collections::BTreeMap, time::Duration};

use config::Config;
use hidkey_protocol::ChannelUpdate;
use tokio::time::{self, Instant};

use crate::ChannelSink;

/// A config with device ids filled in and the given key-up timeout.
pub fn test_config(key_up_timeout_ms: u64) -> Config {
    test_config_with_mappings(key_up_timeout_ms, &[])
}

/// Like [`test_config`], with `(code, name)` mappings.
pub fn test_config_with_mappings(key_up_timeout_ms: u64, mappings: &[(&str, &str)]) -> Config {
    let table: BTreeMap<String, String> = mappings
        .iter()
        .map(|(c, n)| (c.to_string(), n.to_string()))
        .collect();
    match Config::new(0x1d57, 0x002c, key_up_timeout_ms, table) {
        Ok(cfg) => cfg,
        Err(e) => panic!("invalid test config: {}", e.pretty()),
    }
}

/// Sink recording every update with the virtual time it was published at.
#[derive(Debug, Clone)]
pub struct Recorder {
    /// Reference point for timestamps.
    start: Instant,
    /// `(milliseconds since start, update)` in publish order.
    pub updates: Vec<(u64, ChannelUpdate)>,
}

impl Recorder {
    /// Start recording; timestamps are relative to now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            updates: Vec::new(),
        }
    }

    /// Timestamps at which channel `id` was written.
    pub fn times_of(&self, id: &str) -> Vec<u64> {
        self.updates
            .iter()
            .filter(|(_, u)| u.id() == id)
            .map(|(t, _)| *t)
            .collect()
    }

    /// Values written to channel `id`, in order.
    pub fn values_of(&self, id: &str) -> Vec<String> {
        self.updates
            .iter()
            .filter(|(_, u)| u.id() == id)
            .map(|(_, u)| u.value.clone())
            .collect()
    }

    /// `(time, value)` pairs written to channel `id`, in order.
    pub fn timeline(&self, id: &str) -> Vec<(u64, String)> {
        self.updates
            .iter()
            .filter(|(_, u)| u.id() == id)
            .map(|(t, u)| (*t, u.value.clone()))
            .collect()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSink for Recorder {
    fn publish(&mut self, update: ChannelUpdate) {
        let elapsed = self.start.elapsed().as_millis();
        self.updates
            .push((u64::try_from(elapsed).unwrap_or(u64::MAX), update));
    }
}

/// Sleep until `ms` milliseconds after `start` (no-op if already past).
pub async fn sleep_until_ms(start: Instant, ms: u64) {
    time::sleep_until(start + Duration::from_millis(ms)).await;
}
