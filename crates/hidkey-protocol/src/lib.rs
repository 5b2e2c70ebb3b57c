//! Shared value types for hidkey: raw key codes, classified gestures and the
//! fixed channel namespace they are published to.

use std::fmt::{self, Display, Write as _};

use serde::{Deserialize, Serialize};

mod channel;

pub use channel::{CHANNEL_COUNT, Channel, ChannelSpec, ChannelUpdate, Prefix, catalog};

/// Identity of a physical control as reported by the device.
///
/// Codes are upper-case hexadecimal renderings of the raw report bytes. The
/// device never reports a release, so a code only ever means "this control is
/// active right now".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    /// Parse a hex string into a code.
    ///
    /// Surrounding whitespace is ignored and digits are normalised to upper
    /// case. Returns `None` for empty input or any non-hex character.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(s.to_ascii_uppercase()))
    }

    /// Render raw report bytes as a code. Empty reports carry no identity.
    pub fn from_report(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ignored = write!(s, "{:02X}", b);
        }
        Some(Self(s))
    }

    /// Borrow the code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Classified outcome of key activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// First sample of a new code.
    Down,
    /// Inferred release (debounce expiry or superseded by another code).
    Up,
    /// A further identical sample while the code is held.
    Repeat,
    /// One press and release with no second press inside the window.
    Single,
    /// Two presses of the same code inside the window.
    Double,
    /// The code was held long enough to reach the long-press threshold.
    Long,
    /// Number of repeats seen so far in the current run (reported above 1).
    RepeatCount(u32),
}

impl Gesture {
    /// Suffix used on the action channel (`down`, `up`, `repeat`).
    pub fn action_tag(self) -> Option<&'static str> {
        match self {
            Self::Down => Some("down"),
            Self::Up => Some("up"),
            Self::Repeat => Some("repeat"),
            _ => None,
        }
    }

    /// Suffix used on the dsl channel (`single`, `double`, `long`).
    pub fn dsl_tag(self) -> Option<&'static str> {
        match self {
            Self::Single => Some("single"),
            Self::Double => Some("double"),
            Self::Long => Some("long"),
            _ => None,
        }
    }

    /// True for the three mutually exclusive click classifications.
    pub fn is_click(self) -> bool {
        self.dsl_tag().is_some()
    }
}

impl Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepeatCount(n) => write!(f, "repcnt({})", n),
            other => {
                let tag = other.action_tag().or(other.dsl_tag()).unwrap_or_default();
                f.write_str(tag)
            }
        }
    }
}

/// A gesture bound to the code that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    /// What happened.
    pub gesture: Gesture,
    /// Which control it happened to.
    pub code: KeyCode,
}

impl GestureEvent {
    /// Pair a gesture with a code.
    pub fn new(gesture: Gesture, code: KeyCode) -> Self {
        Self { gesture, code }
    }
}

impl Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.gesture, self.code)
    }
}
