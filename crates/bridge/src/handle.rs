//! Open device handle
//!
//! Every method is a single call into libusb. Nothing here remembers which
//! interfaces were claimed or which drivers were detached; callers that need
//! to undo those steps track them themselves.

use crate::context::Context;
use crate::endpoint::Direction;
use crate::error::{Error, Result, check};
use crate::sys;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_uint};
use std::ptr::NonNull;
use std::time::Duration;
use tracing::debug;

/// A device opened through [`Context::open_device_with_vid_pid`]
///
/// Closed with `libusb_close` on drop.
#[derive(Debug)]
pub struct DeviceHandle<'ctx> {
    raw: NonNull<sys::libusb_device_handle>,
    _context: PhantomData<&'ctx Context>,
}

unsafe impl Send for DeviceHandle<'_> {}
unsafe impl Sync for DeviceHandle<'_> {}

impl<'ctx> DeviceHandle<'ctx> {
    /// Take ownership of a raw handle
    ///
    /// # Safety
    /// `raw` must be a live handle opened on a context that outlives `'ctx`,
    /// and must not be closed by anyone else.
    pub unsafe fn from_raw(raw: NonNull<sys::libusb_device_handle>) -> Self {
        Self {
            raw,
            _context: PhantomData,
        }
    }

    /// Raw pointer for calls into [`crate::sys`]
    pub fn as_raw(&self) -> *mut sys::libusb_device_handle {
        self.raw.as_ptr()
    }

    /// Whether a kernel driver is bound to `interface`
    pub fn kernel_driver_active(&self, interface: u8) -> Result<bool> {
        let rc = check(unsafe {
            sys::libusb_kernel_driver_active(self.raw.as_ptr(), c_int::from(interface))
        })?;
        Ok(rc == 1)
    }

    /// Unbind the kernel driver from `interface`
    pub fn detach_kernel_driver(&self, interface: u8) -> Result<()> {
        check(unsafe {
            sys::libusb_detach_kernel_driver(self.raw.as_ptr(), c_int::from(interface))
        })?;
        debug!("Detached kernel driver from interface {}", interface);
        Ok(())
    }

    /// Rebind the kernel driver to `interface`
    pub fn attach_kernel_driver(&self, interface: u8) -> Result<()> {
        check(unsafe {
            sys::libusb_attach_kernel_driver(self.raw.as_ptr(), c_int::from(interface))
        })?;
        debug!("Attached kernel driver to interface {}", interface);
        Ok(())
    }

    pub fn claim_interface(&self, interface: u8) -> Result<()> {
        check(unsafe { sys::libusb_claim_interface(self.raw.as_ptr(), c_int::from(interface)) })?;
        debug!("Claimed interface {}", interface);
        Ok(())
    }

    pub fn release_interface(&self, interface: u8) -> Result<()> {
        check(unsafe {
            sys::libusb_release_interface(self.raw.as_ptr(), c_int::from(interface))
        })?;
        debug!("Released interface {}", interface);
        Ok(())
    }

    /// Perform a blocking interrupt transfer
    ///
    /// The direction comes from bit 7 of `endpoint`. For IN endpoints `data`
    /// receives the report; for OUT endpoints it is sent. Returns the number
    /// of bytes actually transferred. A zero `timeout` waits forever.
    pub fn interrupt_transfer(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize> {
        unsafe { self.transfer(endpoint, data.as_mut_ptr(), data.len(), timeout) }
    }

    /// Interrupt transfer from an IN endpoint into `buf`
    pub fn read_interrupt(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        expect_direction(endpoint, Direction::In)?;
        self.interrupt_transfer(endpoint, buf, timeout)
    }

    /// Interrupt transfer of `data` to an OUT endpoint
    pub fn write_interrupt(&self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize> {
        expect_direction(endpoint, Direction::Out)?;
        // libusb only reads from the buffer of an OUT transfer.
        unsafe { self.transfer(endpoint, data.as_ptr().cast_mut(), data.len(), timeout) }
    }

    /// Reset the device; claimed interfaces must be claimed again afterwards
    pub fn reset_device(&self) -> Result<()> {
        check(unsafe { sys::libusb_reset_device(self.raw.as_ptr()) })?;
        debug!("Reset device");
        Ok(())
    }

    unsafe fn transfer(
        &self,
        endpoint: u8,
        data: *mut u8,
        len: usize,
        timeout: Duration,
    ) -> Result<usize> {
        let length = transfer_length(len)?;
        let mut transferred: c_int = 0;

        check(unsafe {
            sys::libusb_interrupt_transfer(
                self.raw.as_ptr(),
                endpoint,
                data,
                length,
                &mut transferred,
                timeout_millis(timeout),
            )
        })?;

        Ok(usize::try_from(transferred).unwrap_or(0))
    }
}

impl Drop for DeviceHandle<'_> {
    fn drop(&mut self) {
        unsafe { sys::libusb_close(self.raw.as_ptr()) };
        debug!("Closed device handle");
    }
}

/// Reject an endpoint whose address points the other way
pub(crate) fn expect_direction(endpoint: u8, direction: Direction) -> Result<()> {
    if Direction::of(endpoint) == direction {
        Ok(())
    } else {
        debug!(
            "Endpoint 0x{:02x} is {}, expected {}",
            endpoint,
            Direction::of(endpoint),
            direction
        );
        Err(Error::InvalidParam)
    }
}

/// Buffer length as libusb's `int`; longer buffers cannot be described
pub(crate) fn transfer_length(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| Error::InvalidParam)
}

/// Convert a timeout to libusb's unsigned milliseconds, saturating
pub(crate) fn timeout_millis(timeout: Duration) -> c_uint {
    c_uint::try_from(timeout.as_millis()).unwrap_or(c_uint::MAX)
}
