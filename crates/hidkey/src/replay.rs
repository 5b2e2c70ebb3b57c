//! `hidkey replay`: drive the engine from a sample script.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    time::Duration,
};

use config::Config;
use hidkey_engine::{ChannelSink, Engine};
use hidkey_protocol::ChannelUpdate;
use serde::Serialize;
use tokio::{
    runtime::Builder,
    time::{self, Instant},
};
use tracing::{debug, info};

use crate::{
    cli::ReplayArgs,
    error::Result,
    script::{self, Step},
};

/// A channel update stamped with its offset from the start of the replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timed {
    /// Milliseconds since the replay started.
    pub at_ms: u64,
    /// The update itself.
    pub update: ChannelUpdate,
}

/// JSON shape of one output line.
#[derive(Serialize)]
struct JsonLine<'a> {
    /// Milliseconds since the replay started.
    at_ms: u64,
    /// Channel id.
    channel: String,
    /// Channel value.
    value: &'a str,
}

/// Sink collecting timestamped updates.
#[derive(Debug)]
struct Timeline {
    /// Replay start.
    start: Instant,
    /// Updates in publish order.
    entries: Vec<Timed>,
}

impl ChannelSink for Timeline {
    fn publish(&mut self, update: ChannelUpdate) {
        let at_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.entries.push(Timed { at_ms, update });
    }
}

/// Run the `replay` subcommand.
pub fn run(args: &ReplayArgs) -> Result<()> {
    let path = config::resolve_config_path(args.config.as_deref())?;
    let mut cfg = config::load_from_path(&path)?;
    if let Some(ms) = args.timeout {
        cfg = cfg.with_key_up_timeout(Duration::from_millis(ms));
    }
    let steps = script::parse(&read_script(args.script.as_deref())?)?;
    info!(
        config = %path.display(),
        steps = steps.len(),
        key_up_timeout_ms = cfg.key_up_timeout().as_millis(),
        "replay_start"
    );

    let runtime = Builder::new_current_thread()
        .enable_time()
        .build()?;
    let timeline = runtime.block_on(replay(&cfg, &steps))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_timeline(&mut out, &timeline, args.json)?;
    out.flush()?;
    Ok(())
}

/// Read the script from `path`, or stdin when absent.
fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => Ok(fs::read_to_string(p)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Feed `steps` to a fresh engine and collect everything it publishes until
/// all pending gestures are classified.
pub async fn replay(cfg: &Config, steps: &[Step]) -> Result<Vec<Timed>> {
    let start = Instant::now();
    let handle = Engine::spawn(
        cfg,
        Timeline {
            start,
            entries: Vec::new(),
        },
    );
    for step in steps {
        if let Some(at) = step.at {
            time::sleep_until(start + at).await;
        }
        if let Some(code) = &step.code {
            debug!(code = %code, "replay_sample");
            handle.send(code)?;
        }
    }
    Ok(handle.finish().await?.entries)
}

/// Print updates as `channel=value` lines, or JSON lines with timestamps.
pub fn write_timeline<W: Write>(out: &mut W, timeline: &[Timed], json: bool) -> Result<()> {
    for entry in timeline {
        if json {
            let line = JsonLine {
                at_ms: entry.at_ms,
                channel: entry.update.id(),
                value: &entry.update.value,
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", entry.update)?;
        }
    }
    Ok(())
}
