//! libusb header discovery
//!
//! Installs put the header either under a versioned directory
//! (`<libusb-1.0/libusb.h>`, the pkg-config layout) or flat in an include
//! directory (`<libusb.h>`, common with Homebrew and MSYS2). The versioned
//! layout always wins, even when a flat header appears in an earlier
//! directory.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Relative path of the versioned header
pub const VERSIONED_HEADER: &str = "libusb-1.0/libusb.h";
/// Relative path of the flat header
pub const FLAT_HEADER: &str = "libusb.h";

/// Environment variable listing extra include directories, searched first
pub const INCLUDE_DIR_ENV: &str = "LIBUSB_INCLUDE_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `<libusb-1.0/libusb.h>`
    Versioned,
    /// `<libusb.h>`
    Flat,
}

impl HeaderLayout {
    pub fn relative_path(&self) -> &'static str {
        match self {
            HeaderLayout::Versioned => VERSIONED_HEADER,
            HeaderLayout::Flat => FLAT_HEADER,
        }
    }
}

/// A located libusb header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibusbHeader {
    pub include_dir: PathBuf,
    pub layout: HeaderLayout,
}

impl LibusbHeader {
    /// Full path to the header file
    pub fn path(&self) -> PathBuf {
        self.include_dir.join(self.layout.relative_path())
    }

    /// The `#include` line a C consumer would use
    pub fn include_directive(&self) -> String {
        format!("#include <{}>", self.layout.relative_path())
    }
}

impl fmt::Display for LibusbHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("libusb headers not found (searched: {})", join_dirs(.searched))]
    NotFound { searched: Vec<PathBuf> },
}

fn join_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "no include directories".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the libusb header in `include_dirs`
///
/// Directories are searched in order for the versioned header first, then
/// again for the flat header.
pub fn locate_header<I, P>(include_dirs: I) -> Result<LibusbHeader, HeaderError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let dirs: Vec<PathBuf> = include_dirs
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();

    for layout in [HeaderLayout::Versioned, HeaderLayout::Flat] {
        for dir in &dirs {
            let candidate = dir.join(layout.relative_path());
            trace!("Checking {}", candidate.display());
            if candidate.is_file() {
                debug!("Found libusb header at {}", candidate.display());
                return Ok(LibusbHeader {
                    include_dir: dir.clone(),
                    layout,
                });
            }
        }
    }

    Err(HeaderError::NotFound { searched: dirs })
}

/// Include directories to search when none are configured
///
/// Entries from `LIBUSB_INCLUDE_DIR` come first, followed by the usual
/// system and package-manager prefixes.
pub fn default_include_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = env::var_os(INCLUDE_DIR_ENV)
        .map(|v| env::split_paths(&v).collect())
        .unwrap_or_default();

    dirs.extend(
        [
            "/usr/local/include",
            "/usr/include",
            "/opt/homebrew/include",
            "/opt/local/include",
        ]
        .into_iter()
        .map(PathBuf::from),
    );
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_directive() {
        let header = LibusbHeader {
            include_dir: PathBuf::from("/usr/include"),
            layout: HeaderLayout::Versioned,
        };
        assert_eq!(header.include_directive(), "#include <libusb-1.0/libusb.h>");
        assert_eq!(
            header.path(),
            PathBuf::from("/usr/include/libusb-1.0/libusb.h")
        );
    }

    #[test]
    fn test_not_found_message_lists_dirs() {
        let err = HeaderError::NotFound {
            searched: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        };
        assert_eq!(err.to_string(), "libusb headers not found (searched: /a, /b)");

        let err = HeaderError::NotFound { searched: vec![] };
        assert!(err.to_string().contains("no include directories"));
    }

    #[test]
    fn test_default_dirs_include_system_prefix() {
        assert!(default_include_dirs().contains(&PathBuf::from("/usr/include")));
    }
}
