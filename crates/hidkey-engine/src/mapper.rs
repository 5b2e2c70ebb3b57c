//! Code to display-name lookup for the key-prefixed channels.

use std::{collections::BTreeMap, sync::Arc};

use hidkey_protocol::KeyCode;

/// Looks up display names for key codes.
///
/// The table is fixed for the lifetime of the mapper; a miss simply means the
/// code has no name.
#[derive(Debug, Clone, Default)]
pub struct KeyMapper {
    /// Names by code.
    names: Arc<BTreeMap<KeyCode, String>>,
}

impl KeyMapper {
    /// Build a mapper over `names`.
    pub fn new(names: BTreeMap<KeyCode, String>) -> Self {
        Self {
            names: Arc::new(names),
        }
    }

    /// Build a mapper from the configured table.
    pub fn from_config(cfg: &config::Config) -> Self {
        Self::new(cfg.mappings().clone())
    }

    /// Name for `code`, if one is configured.
    pub fn lookup(&self, code: &KeyCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no code is mapped.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
