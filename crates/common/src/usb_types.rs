//! USB identifiers and device filters

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A vendor/product ID pair, written `045E:028E`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VidPid {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl VidPid {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for VidPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

impl FromStr for VidPid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vid, pid) = split_pair(s)?;
        Ok(Self {
            vendor_id: parse_hex_id(s, vid, "VID")?,
            product_id: parse_hex_id(s, pid, "PID")?,
        })
    }
}

/// A `VID:PID` pattern where either half may be `*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceFilter {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl DeviceFilter {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id.is_none_or(|v| v == vendor_id)
            && self.product_id.is_none_or(|p| p == product_id)
    }

    /// True if any filter matches; an empty list matches everything
    pub fn any_match(filters: &[DeviceFilter], vendor_id: u16, product_id: u16) -> bool {
        filters.is_empty() || filters.iter().any(|f| f.matches(vendor_id, product_id))
    }
}

impl From<VidPid> for DeviceFilter {
    fn from(id: VidPid) -> Self {
        Self {
            vendor_id: Some(id.vendor_id),
            product_id: Some(id.product_id),
        }
    }
}

impl fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vendor_id {
            Some(v) => write!(f, "0x{:04x}:", v)?,
            None => f.write_str("*:")?,
        }
        match self.product_id {
            Some(p) => write!(f, "0x{:04x}", p),
            None => f.write_str("*"),
        }
    }
}

impl FromStr for DeviceFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vid, pid) = split_pair(s)?;
        let part = |value: &str, name: &str| -> Result<Option<u16>, Error> {
            if value == "*" {
                Ok(None)
            } else {
                parse_hex_id(s, value, name).map(Some)
            }
        };

        Ok(Self {
            vendor_id: part(vid, "VID")?,
            product_id: part(pid, "PID")?,
        })
    }
}

impl TryFrom<String> for DeviceFilter {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DeviceFilter> for String {
    fn from(filter: DeviceFilter) -> Self {
        filter.to_string()
    }
}

fn split_pair(s: &str) -> Result<(&str, &str), Error> {
    let mut parts = s.trim().split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(vid), Some(pid), None) => Ok((vid, pid)),
        _ => Err(Error::filter(s, "expected VID:PID (e.g. '0x045e:0x028e')")),
    }
}

/// Parse a 1-4 digit hex ID, with or without a `0x` prefix
fn parse_hex_id(input: &str, id: &str, name: &str) -> Result<u16, Error> {
    let hex = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);

    if hex.is_empty() || hex.len() > 4 {
        return Err(Error::filter(
            input,
            format!("{} '{}' must be 1-4 hex digits", name, id),
        ));
    }

    // from_str_radix alone would accept a leading '+'
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::filter(
            input,
            format!("{} '{}' is not a valid hex number", name, id),
        ));
    }

    u16::from_str_radix(hex, 16)
        .map_err(|_| Error::filter(input, format!("{} '{}' is not a valid hex number", name, id)))
}
