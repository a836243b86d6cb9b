//! libusb error codes as a Rust error type

use crate::sys::*;
use std::os::raw::c_int;
use thiserror::Error;

/// A negative libusb return code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Error {
    #[error("Input/Output error")]
    Io,

    #[error("Invalid parameter")]
    InvalidParam,

    #[error("Access denied (insufficient permissions)")]
    Access,

    #[error("No such device (it may have been disconnected)")]
    NoDevice,

    #[error("Entity not found")]
    NotFound,

    #[error("Resource busy")]
    Busy,

    #[error("Operation timed out")]
    Timeout,

    #[error("Overflow")]
    Overflow,

    #[error("Pipe error")]
    Pipe,

    #[error("System call interrupted (perhaps due to signal)")]
    Interrupted,

    #[error("Insufficient memory")]
    NoMem,

    #[error("Operation not supported or unimplemented on this platform")]
    NotSupported,

    #[error("Other error")]
    Other,

    /// A code libusb does not publish
    #[error("Unknown libusb error code {0}")]
    Unknown(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map a libusb return code to an error
    ///
    /// Codes outside the published set (including non-negative ones) become
    /// [`Error::Unknown`] so that `from_code(c).code() == c` always holds.
    pub fn from_code(code: c_int) -> Self {
        match code {
            LIBUSB_ERROR_IO => Error::Io,
            LIBUSB_ERROR_INVALID_PARAM => Error::InvalidParam,
            LIBUSB_ERROR_ACCESS => Error::Access,
            LIBUSB_ERROR_NO_DEVICE => Error::NoDevice,
            LIBUSB_ERROR_NOT_FOUND => Error::NotFound,
            LIBUSB_ERROR_BUSY => Error::Busy,
            LIBUSB_ERROR_TIMEOUT => Error::Timeout,
            LIBUSB_ERROR_OVERFLOW => Error::Overflow,
            LIBUSB_ERROR_PIPE => Error::Pipe,
            LIBUSB_ERROR_INTERRUPTED => Error::Interrupted,
            LIBUSB_ERROR_NO_MEM => Error::NoMem,
            LIBUSB_ERROR_NOT_SUPPORTED => Error::NotSupported,
            LIBUSB_ERROR_OTHER => Error::Other,
            other => Error::Unknown(other),
        }
    }

    /// The libusb return code for this error
    pub fn code(&self) -> c_int {
        match self {
            Error::Io => LIBUSB_ERROR_IO,
            Error::InvalidParam => LIBUSB_ERROR_INVALID_PARAM,
            Error::Access => LIBUSB_ERROR_ACCESS,
            Error::NoDevice => LIBUSB_ERROR_NO_DEVICE,
            Error::NotFound => LIBUSB_ERROR_NOT_FOUND,
            Error::Busy => LIBUSB_ERROR_BUSY,
            Error::Timeout => LIBUSB_ERROR_TIMEOUT,
            Error::Overflow => LIBUSB_ERROR_OVERFLOW,
            Error::Pipe => LIBUSB_ERROR_PIPE,
            Error::Interrupted => LIBUSB_ERROR_INTERRUPTED,
            Error::NoMem => LIBUSB_ERROR_NO_MEM,
            Error::NotSupported => LIBUSB_ERROR_NOT_SUPPORTED,
            Error::Other => LIBUSB_ERROR_OTHER,
            Error::Unknown(code) => *code,
        }
    }
}

/// Pass non-negative return values through, map negative ones to [`Error`]
pub fn check(rc: c_int) -> Result<c_int> {
    if rc < LIBUSB_SUCCESS {
        Err(Error::from_code(rc))
    } else {
        Ok(rc)
    }
}
