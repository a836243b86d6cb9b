//! Gamepad analyzer
//!
//! Finds attached game controllers, prints their descriptor tree, claims
//! the controller interface through `libusb-bridge`, sends the protocol's
//! wake-up handshake and an output test packet, and dumps incoming reports.

pub mod config;
pub mod gamepad;
pub mod report;
pub mod select;
pub mod session;
pub mod usb;

pub use config::AnalyzerConfig;
pub use gamepad::Protocol;
pub use session::{GamepadIo, Session, SessionSettings, SessionSummary};
