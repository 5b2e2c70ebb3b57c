//! Parse and load user configuration.

use std::{ffi::OsStr, fs, path::Path};

use ron::{Options, extensions::Extensions};

use crate::{Config, Error, error::excerpt_at, raw::RawConfig};

/// Parse a RON config from `source`. `path` is only used for error reporting.
///
/// Optional fields may be written bare (`key_up_timeout: 250`) rather than as
/// `Some(250)`.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    let options = Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    let raw: RawConfig = options.from_str(source).map_err(|e| {
        let line = e.span.start.line;
        let col = e.span.start.col;
        Error::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.code.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    })?;
    raw.into_config().map_err(|e| match path {
        Some(p) => e.with_path(p),
        None => e,
    })
}

/// Load a validated `Config` from a RON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    if path.extension() != Some(OsStr::new("ron")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported config format (expected a .ron file)".to_string(),
        });
    }
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}
