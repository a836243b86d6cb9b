//! Gamepad vendors, protocols and handshake packets

use std::fmt;

/// Vendor IDs of controller makers the analyzer recognises
pub mod vendor {
    pub const MICROSOFT: u16 = 0x045E;
    pub const SONY: u16 = 0x054C;
    pub const NINTENDO: u16 = 0x057E;
    pub const GAMESIR: u16 = 0x3537;
    pub const BITDO: u16 = 0x2DC8;
    pub const RAZER: u16 = 0x1532;
    pub const LOGITECH: u16 = 0x046D;

    pub const KNOWN: [u16; 7] = [MICROSOFT, SONY, NINTENDO, GAMESIR, BITDO, RAZER, LOGITECH];
}

pub mod class {
    pub const PER_INTERFACE: u8 = 0x00;
    pub const HID: u8 = 0x03;
    pub const VENDOR_SPECIFIC: u8 = 0xFF;
}

/// Wire protocol spoken by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Xbox Gaming Input Protocol
    Gip,
    Ps4,
    Switch,
    Hid,
    Unknown,
}

impl Protocol {
    /// Guess the protocol from the vendor ID, then the device class
    pub fn detect(vendor_id: u16, device_class: u8) -> Self {
        match vendor_id {
            vendor::GAMESIR | vendor::MICROSOFT => Protocol::Gip,
            vendor::SONY => Protocol::Ps4,
            vendor::NINTENDO => Protocol::Switch,
            _ if device_class == class::HID => Protocol::Hid,
            _ => Protocol::Unknown,
        }
    }

    /// Packets that wake the controller up, sent in order
    pub fn init_packets(&self) -> &'static [&'static [u8]] {
        match self {
            Protocol::Gip => &[
                &[0x05, 0x20, 0x00, 0x01, 0x00],
                &[0x0A, 0x20, 0x00, 0x03, 0x00, 0x01, 0x14],
                &[0x06, 0x20, 0x00, 0x02, 0x01, 0x00],
            ],
            Protocol::Ps4 => &[&[0x05, 0xFF, 0x05, 0x00, 0x01, 0x00]],
            Protocol::Switch => &[&[0x80, 0x02]],
            Protocol::Hid | Protocol::Unknown => &[],
        }
    }

    /// A rumble or LED command used to check the OUT path
    pub fn output_test_packet(&self) -> Option<&'static [u8]> {
        match self {
            Protocol::Gip => Some(&[0x09, 0x09, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Protocol::Ps4 => Some(&[0x05, 0xFF, 0x05, 0x00, 0x01, 0x00]),
            Protocol::Switch => Some(&[0x80, 0x02]),
            Protocol::Hid | Protocol::Unknown => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Gip => "GIP",
            Protocol::Ps4 => "PS4/PS5",
            Protocol::Switch => "Switch",
            Protocol::Hid => "HID",
            Protocol::Unknown => "Unknown",
        })
    }
}

/// Whether a device is worth listing as a possible controller
pub fn is_candidate(vendor_id: u16, device_class: u8) -> bool {
    matches!(device_class, class::HID | class::VENDOR_SPECIFIC) || vendor::KNOWN.contains(&vendor_id)
}
