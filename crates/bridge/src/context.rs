//! libusb context ownership

use crate::error::{Error, Result, check};
use crate::handle::DeviceHandle;
use crate::sys;
use std::ptr::{self, NonNull};
use tracing::debug;

/// An initialized libusb context
///
/// Created with `libusb_init` and released with `libusb_exit` on drop. Device
/// handles borrow the context, so every handle is closed before the context
/// exits.
#[derive(Debug)]
pub struct Context {
    raw: NonNull<sys::libusb_context>,
}

// libusb contexts are safe to use from multiple threads.
unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl Context {
    /// Initialize a new libusb context
    pub fn new() -> Result<Self> {
        let mut raw = ptr::null_mut();
        check(unsafe { sys::libusb_init(&mut raw) })?;

        let raw = NonNull::new(raw).ok_or(Error::Other)?;
        debug!("Initialized libusb context {:p}", raw);
        Ok(Self { raw })
    }

    /// Open the first device matching `vendor_id:product_id`
    ///
    /// Returns `None` when no device matches or it cannot be opened; libusb
    /// does not report which.
    pub fn open_device_with_vid_pid(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> Option<DeviceHandle<'_>> {
        let raw = unsafe {
            sys::libusb_open_device_with_vid_pid(self.raw.as_ptr(), vendor_id, product_id)
        };

        match NonNull::new(raw) {
            Some(raw) => {
                debug!("Opened device {:04x}:{:04x}", vendor_id, product_id);
                Some(unsafe { DeviceHandle::from_raw(raw) })
            }
            None => {
                debug!(
                    "No openable device for {:04x}:{:04x}",
                    vendor_id, product_id
                );
                None
            }
        }
    }

    /// Raw pointer for calls into [`crate::sys`]
    pub fn as_raw(&self) -> *mut sys::libusb_context {
        self.raw.as_ptr()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe { sys::libusb_exit(self.raw.as_ptr()) };
        debug!("Exited libusb context");
    }
}
