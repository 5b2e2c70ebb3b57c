//! `hidkey channels` and `hidkey check`.

use std::io::{self, Write};

use config::Config;
use hidkey_protocol::{ChannelSpec, catalog};

use crate::{
    cli::{ChannelsArgs, CheckArgs},
    error::Result,
};

/// Run the `channels` subcommand.
pub fn channels(args: &ChannelsArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_channels(&mut out, &catalog(), args.json)?;
    out.flush()?;
    Ok(())
}

/// Run the `check` subcommand.
pub fn check(args: &CheckArgs) -> Result<()> {
    let path = config::resolve_config_path(args.config.as_deref())?;
    let cfg = config::load_from_path(&path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "config: {}", path.display())?;
    write_summary(&mut out, &cfg)?;
    out.flush()?;
    Ok(())
}

/// Print the catalog as an aligned table or a JSON array.
fn write_channels<W: Write>(out: &mut W, specs: &[ChannelSpec], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, specs)?;
        writeln!(out)?;
        return Ok(());
    }
    let id_w = specs.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let name_w = specs.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for spec in specs {
        writeln!(
            out,
            "{:id_w$}  {:name_w$}  {}",
            spec.id, spec.name, spec.desc
        )?;
    }
    Ok(())
}

/// Print what a loaded config resolves to.
fn write_summary<W: Write>(out: &mut W, cfg: &Config) -> Result<()> {
    writeln!(out, "device: {}", cfg.device_label())?;
    if cfg.debounce_enabled() {
        writeln!(
            out,
            "key_up_timeout: {}ms",
            cfg.key_up_timeout().as_millis()
        )?;
        writeln!(
            out,
            "double_click_window: {}ms",
            cfg.double_click_window().as_millis()
        )?;
    } else {
        writeln!(out, "key_up_timeout: 0 (release inference disabled)")?;
    }
    writeln!(out, "mappings: {}", cfg.mappings().len())?;
    for (code, name) in cfg.mappings() {
        writeln!(out, "  {code} = {name}")?;
    }
    Ok(())
}
