//! Common utilities for gamepad-usb
//!
//! Shared error handling, logging setup and USB identifier types used by the
//! analyzer and its configuration.

pub mod error;
pub mod logging;
pub mod usb_types;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use usb_types::{DeviceFilter, VidPid};
