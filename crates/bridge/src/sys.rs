//! Raw libusb declarations
//!
//! Constants are restated with libusb's published values. Functions are the
//! native symbols themselves; nothing here validates, retries or caches.

#![allow(non_camel_case_types)]

use std::os::raw::{c_int, c_uchar, c_uint};

pub use libusb1_sys::{libusb_context, libusb_device, libusb_device_handle};

pub use libusb1_sys::{
    libusb_attach_kernel_driver, libusb_claim_interface, libusb_close,
    libusb_detach_kernel_driver, libusb_exit, libusb_init, libusb_interrupt_transfer,
    libusb_kernel_driver_active, libusb_open_device_with_vid_pid, libusb_release_interface,
    libusb_reset_device,
};

pub const LIBUSB_SUCCESS: c_int = 0;
pub const LIBUSB_ERROR_IO: c_int = -1;
pub const LIBUSB_ERROR_INVALID_PARAM: c_int = -2;
pub const LIBUSB_ERROR_ACCESS: c_int = -3;
pub const LIBUSB_ERROR_NO_DEVICE: c_int = -4;
pub const LIBUSB_ERROR_NOT_FOUND: c_int = -5;
pub const LIBUSB_ERROR_BUSY: c_int = -6;
pub const LIBUSB_ERROR_TIMEOUT: c_int = -7;
pub const LIBUSB_ERROR_OVERFLOW: c_int = -8;
pub const LIBUSB_ERROR_PIPE: c_int = -9;
pub const LIBUSB_ERROR_INTERRUPTED: c_int = -10;
pub const LIBUSB_ERROR_NO_MEM: c_int = -11;
pub const LIBUSB_ERROR_NOT_SUPPORTED: c_int = -12;
pub const LIBUSB_ERROR_OTHER: c_int = -99;

pub const LIBUSB_TRANSFER_TYPE_INTERRUPT: u8 = 3;

pub const LIBUSB_ENDPOINT_IN: u8 = 0x80;
pub const LIBUSB_ENDPOINT_OUT: u8 = 0x00;

// Prototype shapes. libusb marks its API LIBUSB_CALL, which is the
// "system" ABI (stdcall on 32-bit Windows, C everywhere else).
pub type libusb_init_fn = unsafe extern "system" fn(*mut *mut libusb_context) -> c_int;
pub type libusb_exit_fn = unsafe extern "system" fn(*mut libusb_context);
pub type libusb_open_device_with_vid_pid_fn =
    unsafe extern "system" fn(*mut libusb_context, u16, u16) -> *mut libusb_device_handle;
pub type libusb_close_fn = unsafe extern "system" fn(*mut libusb_device_handle);
pub type libusb_interface_fn = unsafe extern "system" fn(*mut libusb_device_handle, c_int) -> c_int;
pub type libusb_interrupt_transfer_fn = unsafe extern "system" fn(
    *mut libusb_device_handle,
    c_uchar,
    *mut c_uchar,
    c_int,
    *mut c_int,
    c_uint,
) -> c_int;
pub type libusb_reset_device_fn = unsafe extern "system" fn(*mut libusb_device_handle) -> c_int;
