//! Choosing which controller to analyze

use crate::usb::DeviceSummary;
use anyhow::{Context, Result, anyhow, bail};
use common::VidPid;
use std::io::{BufRead, Write};

/// Parse a 1-based menu choice into an index
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    let choice: usize = input
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid selection '{}'", input.trim()))?;

    if choice == 0 || choice > count {
        bail!("Invalid selection {}, expected 1-{}", choice, count);
    }
    Ok(choice - 1)
}

/// Ask for a menu choice on `out` and read the answer from `input`
///
/// Blocks until a line arrives; async callers run it on a blocking thread.
pub fn prompt_selection<R: BufRead, W: Write>(
    mut input: R,
    out: &mut W,
    count: usize,
) -> Result<usize> {
    write!(out, "\nSelect device [1-{}]: ", count)?;
    out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read selection")?;
    parse_selection(&line, count)
}

/// Index of the first device with the given VID:PID
pub fn find_by_id(summaries: &[&DeviceSummary], id: VidPid) -> Result<usize> {
    summaries
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| anyhow!("Device {} is not among the detected controllers", id))
}
