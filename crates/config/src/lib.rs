//! Configuration for hidkey: device ids, the key-up timeout and the optional
//! code → name mapping table.

use std::{
    env,
    path::{Path, PathBuf},
};

mod error;
mod loader;
mod raw;
mod types;

#[cfg(test)]
mod test_parse;

pub use error::Error;
pub use loader::{load_from_path, load_from_str};
pub use types::{Config, DOUBLE_CLICK_FACTOR};

/// Determine the preferred user config path (`~/.hidkey/config.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".hidkey");
    p.push("config.ron");
    p
}

/// Resolve the effective config path using the default policy.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `~/.hidkey/config.ron` when it exists.
/// 3) Else return a "no config found" error naming the preferred path.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let preferred = default_config_path();
    if preferred.exists() {
        return Ok(preferred);
    }

    Err(Error::Read {
        path: Some(preferred),
        message: "No config found. Create ~/.hidkey/config.ron or pass --config".to_string(),
    })
}
