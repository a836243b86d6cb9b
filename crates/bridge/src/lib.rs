//! Minimal libusb 1.0 binding surface
//!
//! This crate restates the small part of libusb that a gamepad host needs:
//! context init/exit, opening a device by VID/PID, kernel driver
//! attach/detach, interface claim/release, blocking interrupt transfers and
//! device reset. The native library is linked through `libusb1-sys`, so
//! consumers never need the libusb header tree.
//!
//! Two layers are provided:
//! - [`sys`]: the raw constants and C prototypes, forwarded unchanged.
//! - [`Context`] / [`DeviceHandle`]: RAII owners that call `libusb_exit` and
//!   `libusb_close` on drop and map return codes to [`Error`].
//!
//! [`header`] locates the libusb C header on the host for tooling that still
//! needs to compile against it.

pub mod context;
pub mod endpoint;
pub mod error;
pub mod handle;
pub mod header;
pub mod sys;

pub use context::Context;
pub use endpoint::{Direction, EndpointType};
pub use error::{Error, Result};
pub use handle::DeviceHandle;
pub use header::{HeaderError, HeaderLayout, LibusbHeader, locate_header};
