//! Endpoint address and attribute decoding

use crate::sys::{LIBUSB_ENDPOINT_IN, LIBUSB_TRANSFER_TYPE_INTERRUPT};
use std::fmt;

const DIRECTION_MASK: u8 = 0x80;
const TRANSFER_TYPE_MASK: u8 = 0x03;

/// Transfer direction encoded in bit 7 of an endpoint address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device to host
    In,
    /// Host to device
    Out,
}

impl Direction {
    pub fn of(endpoint_address: u8) -> Self {
        if endpoint_address & DIRECTION_MASK == LIBUSB_ENDPOINT_IN {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("IN"),
            Direction::Out => f.write_str("OUT"),
        }
    }
}

/// Transfer type from the low two bits of `bmAttributes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

impl EndpointType {
    pub fn from_attributes(attributes: u8) -> Self {
        match attributes & TRANSFER_TYPE_MASK {
            0 => EndpointType::Control,
            1 => EndpointType::Isochronous,
            2 => EndpointType::Bulk,
            LIBUSB_TRANSFER_TYPE_INTERRUPT => EndpointType::Interrupt,
            _ => unreachable!("masked to two bits"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EndpointType::Control => "Control",
            EndpointType::Isochronous => "Isochronous",
            EndpointType::Bulk => "Bulk",
            EndpointType::Interrupt => "Interrupt",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
