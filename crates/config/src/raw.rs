//! Raw, as-written configuration and its conversion into a validated [`Config`].

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Config, Error};

/// A value users may write either as a number or as a string.
///
/// Device ids are commonly copied as hex strings (`"0x046d"`), and timeouts
/// sometimes arrive quoted from other tools.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumOrText {
    /// Plain integer.
    Num(i64),
    /// Quoted decimal or `0x` hex.
    Text(String),
}

impl NumOrText {
    /// Render the value as written, for error messages.
    fn describe(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Text(s) => format!("{:?}", s),
        }
    }

    /// Interpret as an integer. Text may be decimal or `0x`-prefixed hex.
    fn to_int(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(s) => {
                let s = s.trim();
                match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => i64::from_str_radix(hex, 16).ok(),
                    None => s.parse().ok(),
                }
            }
        }
    }
}

/// Configuration exactly as deserialized from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// USB vendor id.
    #[serde(default)]
    pub vendor_id: Option<NumOrText>,
    /// USB product id.
    #[serde(default)]
    pub product_id: Option<NumOrText>,
    /// Key-up timeout in milliseconds; absent means disabled.
    #[serde(default)]
    pub key_up_timeout: Option<NumOrText>,
    /// Code to name table.
    #[serde(default)]
    pub mappings: Option<BTreeMap<String, String>>,
}

/// Validate a device id field; zero or missing means "not configured".
fn device_id(field: &'static str, value: Option<&NumOrText>) -> Result<u16, Error> {
    let Some(value) = value else {
        return Err(Error::invalid(
            field,
            "vendor_id and product_id have to be configured",
        ));
    };
    match value.to_int() {
        Some(0) => Err(Error::invalid(
            field,
            "vendor_id and product_id have to be configured",
        )),
        Some(n) => u16::try_from(n)
            .map_err(|_| Error::invalid(field, format!("{} out of range (1..=0xffff)", n))),
        None => Err(Error::invalid(
            field,
            format!("{} is not a device id", value.describe()),
        )),
    }
}

impl RawConfig {
    /// Validate and convert into a [`Config`].
    pub fn into_config(self) -> Result<Config, Error> {
        let vendor_id = device_id("vendor_id", self.vendor_id.as_ref())?;
        let product_id = device_id("product_id", self.product_id.as_ref())?;
        let key_up_timeout_ms = match &self.key_up_timeout {
            None => 0,
            Some(v) => match v.to_int() {
                Some(n) if n >= 0 => n.unsigned_abs(),
                _ => {
                    return Err(Error::invalid(
                        "key_up_timeout",
                        "key_up_timeout must be a non-negative integer (milliseconds)",
                    ));
                }
            },
        };
        Config::new(
            vendor_id,
            product_id,
            key_up_timeout_ms,
            self.mappings.unwrap_or_default(),
        )
    }
}
