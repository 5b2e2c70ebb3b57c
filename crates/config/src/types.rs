//! The validated configuration consumed by the engine.

use std::{collections::BTreeMap, time::Duration};

use hidkey_protocol::KeyCode;
use tracing::debug;

use crate::Error;

/// The single/double window is this many key-up timeouts long.
pub const DOUBLE_CLICK_FACTOR: u32 = 2;

/// Validated hidkey configuration.
///
/// Construct through [`Config::new`] or the loaders; every instance upholds
/// non-zero device ids and a mapping table keyed by normalised codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// USB vendor id of the device to open.
    vendor_id: u16,
    /// USB product id of the device to open.
    product_id: u16,
    /// Quiet period after which a held code is considered released.
    key_up_timeout: Duration,
    /// Display names by code.
    mappings: BTreeMap<KeyCode, String>,
}

impl Config {
    /// Validate parts into a config.
    ///
    /// Mapping keys are hex codes in any case; they are normalised so that
    /// lookups match what the device reports.
    pub fn new(
        vendor_id: u16,
        product_id: u16,
        key_up_timeout_ms: u64,
        mappings: BTreeMap<String, String>,
    ) -> Result<Self, Error> {
        if vendor_id == 0 || product_id == 0 {
            return Err(Error::invalid(
                if vendor_id == 0 {
                    "vendor_id"
                } else {
                    "product_id"
                },
                "vendor_id and product_id have to be configured",
            ));
        }
        let mut table = BTreeMap::new();
        for (code, name) in mappings {
            let Some(key) = KeyCode::parse(&code) else {
                return Err(Error::invalid(
                    "mappings",
                    format!("mapping key {:?} is not a hex key code", code),
                ));
            };
            table.insert(key, name);
        }
        debug!(
            vendor_id,
            product_id,
            key_up_timeout_ms,
            mappings = table.len(),
            "config_validated"
        );
        Ok(Self {
            vendor_id,
            product_id,
            key_up_timeout: Duration::from_millis(key_up_timeout_ms),
            mappings: table,
        })
    }

    /// USB vendor id.
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// USB product id.
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// Device label in `vendor-product` hex form, e.g. `1d57-002c`.
    pub fn device_label(&self) -> String {
        format!("{:04x}-{:04x}", self.vendor_id, self.product_id)
    }

    /// Key-up debounce delay. Zero disables release inference.
    pub fn key_up_timeout(&self) -> Duration {
        self.key_up_timeout
    }

    /// Whether release, click and long-press detection is active.
    pub fn debounce_enabled(&self) -> bool {
        !self.key_up_timeout.is_zero()
    }

    /// Length of the single/double classification window.
    pub fn double_click_window(&self) -> Duration {
        self.key_up_timeout * DOUBLE_CLICK_FACTOR
    }

    /// The mapping table.
    pub fn mappings(&self) -> &BTreeMap<KeyCode, String> {
        &self.mappings
    }

    /// Return a copy with a different key-up timeout.
    pub fn with_key_up_timeout(mut self, timeout: Duration) -> Self {
        self.key_up_timeout = timeout;
        self
    }
}
