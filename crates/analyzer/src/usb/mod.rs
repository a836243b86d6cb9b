//! USB subsystem
//!
//! Device discovery and descriptor inspection go through `rusb`; the
//! handshake and report traffic go through `libusb-bridge` (see
//! [`crate::session`]).

pub mod enumerate;
pub mod structure;

pub use enumerate::{Candidate, list_candidates};
pub use structure::{
    ConfigSummary, DeviceSummary, EndpointSummary, InterfaceSummary, SelectedEndpoints,
};
