//! Fixed channel namespace that gesture events are published to.
//!
//! Every channel exists once under the `raw` prefix (values carry the key
//! code) and once under the `key` prefix (values carry the mapped name).

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Number of channels in the catalog (both prefixes).
pub const CHANNEL_COUNT: usize = Prefix::ALL.len() * Channel::ALL.len();

/// Which value family a channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    /// Raw key codes.
    Raw,
    /// Names from the mapping table.
    Key,
}

impl Prefix {
    /// Both prefixes, raw first.
    pub const ALL: [Self; 2] = [Self::Raw, Self::Key];

    /// Channel name prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Key => "key",
        }
    }
}

/// Channel kind within a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Changes on the first press of a code.
    Base,
    /// Changes only on a double click.
    Double,
    /// Changes only on a single (short) click.
    Single,
    /// Changes only on a long press.
    Long,
    /// `<value>.down`, `<value>.up` or `<value>.repeat`.
    Action,
    /// `<value>.single`, `<value>.double` or `<value>.long`.
    Dsl,
    /// `<value>.<repeat count>`.
    RepCnt,
}

impl Channel {
    /// Every channel kind in catalog order.
    pub const ALL: [Self; 7] = [
        Self::Base,
        Self::Double,
        Self::Single,
        Self::Long,
        Self::Action,
        Self::Dsl,
        Self::RepCnt,
    ];

    /// Suffix appended to the prefix to form the channel id.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Base => "",
            Self::Double => "-double",
            Self::Single => "-single-short",
            Self::Long => "-long",
            Self::Action => "-action",
            Self::Dsl => "-dsl",
            Self::RepCnt => "-repcnt",
        }
    }

    /// Full channel id, e.g. `raw-single-short`.
    pub fn id(self, prefix: Prefix) -> String {
        format!("{}{}", prefix.as_str(), self.suffix())
    }
}

/// One value written to one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUpdate {
    /// Value family.
    pub prefix: Prefix,
    /// Channel kind.
    pub channel: Channel,
    /// New channel value.
    pub value: String,
}

impl ChannelUpdate {
    /// Build an update.
    pub fn new(prefix: Prefix, channel: Channel, value: impl Into<String>) -> Self {
        Self {
            prefix,
            channel,
            value: value.into(),
        }
    }

    /// Full channel id this update targets.
    pub fn id(&self) -> String {
        self.channel.id(self.prefix)
    }
}

impl Display for ChannelUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id(), self.value)
    }
}

/// Static description of a channel, for the host that creates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    /// Channel id.
    pub id: String,
    /// Short display name.
    pub name: String,
    /// One-line description.
    pub desc: String,
    /// Channels are published by the engine only; hosts must not write them.
    pub write: bool,
}

/// Display name and description for a channel.
fn describe(prefix: Prefix, channel: Channel) -> (String, String) {
    let p = prefix.as_str();
    let (named, subject) = match prefix {
        Prefix::Raw => ("", "key-code"),
        Prefix::Key => ("Named ", "name"),
    };
    let others = |a: Channel, b: Channel| format!("{}{} or {}{}", p, a.suffix(), p, b.suffix());
    match channel {
        Channel::Base => match prefix {
            Prefix::Raw => (
                "Raw Key Code".to_string(),
                "key-code, changes on first press".to_string(),
            ),
            Prefix::Key => (
                "Mapped Name".to_string(),
                "name of mapped key-code, changes on first press".to_string(),
            ),
        },
        Channel::Double => (
            format!("{}Double Click", named),
            format!(
                "changes only when double clicked, otherwise {} fires",
                others(Channel::Single, Channel::Long)
            ),
        ),
        Channel::Single => (
            format!("{}Single Click", named),
            format!(
                "changes only when single/short clicked, otherwise {} fires",
                others(Channel::Double, Channel::Long)
            ),
        ),
        Channel::Long => (
            format!("{}Long Press", named),
            format!(
                "changes only when long pressed, otherwise {} fires",
                others(Channel::Double, Channel::Single)
            ),
        ),
        Channel::Action => (
            format!("{}Action", named),
            format!("{} + .down, .up or .repeat", subject),
        ),
        Channel::Dsl => (
            format!("{}Double/Single/Long", named),
            format!(
                "{}{}, {}{} and {}{} in one channel: {} + .single, .double or .long",
                p,
                Channel::Double.suffix(),
                p,
                Channel::Single.suffix(),
                p,
                Channel::Long.suffix(),
                subject
            ),
        ),
        Channel::RepCnt => (
            format!("{}Repeat Count", named),
            format!("{} + .repeat count", subject),
        ),
    }
}

/// The complete, fixed channel set: every channel kind under both prefixes.
pub fn catalog() -> Vec<ChannelSpec> {
    let mut out = Vec::with_capacity(CHANNEL_COUNT);
    for prefix in Prefix::ALL {
        for channel in Channel::ALL {
            let (name, desc) = describe(prefix, channel);
            out.push(ChannelSpec {
                id: channel.id(prefix),
                name,
                desc,
                write: false,
            });
        }
    }
    out
}
