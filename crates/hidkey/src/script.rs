//! Sample scripts: a line-oriented recording of when each sample arrived.
//!
//! ```text
//! # tap 0A twice, then hold 0B
//! 0A
//! @150 0A
//! @600 0B
//! @640 0B
//! @680 0B
//! ```
//!
//! `@<ms>` waits until that offset from the start of the replay; a bare code
//! is delivered immediately. Either part may appear alone.

use std::time::Duration;

use crate::error::{Error, Result};

/// One script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Offset from the start of the replay to wait for.
    pub at: Option<Duration>,
    /// Sample to deliver, passed to the engine verbatim.
    pub code: Option<String>,
}

/// Parse a whole script. Offsets must be non-decreasing.
pub fn parse(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut last = Duration::ZERO;
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let step = parse_line(line, text)?;
        if let Some(at) = step.at {
            if at < last {
                return Err(Error::script(
                    line,
                    format!(
                        "offset @{} is earlier than the previous @{}",
                        at.as_millis(),
                        last.as_millis()
                    ),
                ));
            }
            last = at;
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Parse one non-empty, comment-free line.
fn parse_line(line: usize, text: &str) -> Result<Step> {
    let mut at = None;
    let mut code = None;
    for token in text.split_whitespace() {
        if let Some(ms) = token.strip_prefix('@') {
            if at.is_some() || code.is_some() {
                return Err(Error::script(line, "offset must come first"));
            }
            let ms: u64 = ms
                .parse()
                .map_err(|_| Error::script(line, format!("invalid offset {token:?}")))?;
            at = Some(Duration::from_millis(ms));
        } else if code.is_none() {
            code = Some(token.to_string());
        } else {
            return Err(Error::script(line, format!("unexpected {token:?}")));
        }
    }
    Ok(Step { at, code })
}
