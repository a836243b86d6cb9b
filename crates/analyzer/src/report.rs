//! Human-readable output

use crate::usb::{Candidate, ConfigSummary, DeviceSummary};
use std::io::{self, Write};

/// Format bytes as upper-case hex pairs separated by spaces
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Numbered device list used for selection
pub fn write_device_list<W: Write>(out: &mut W, candidates: &[Candidate]) -> io::Result<()> {
    let summaries: Vec<&DeviceSummary> = candidates.iter().map(|c| &c.summary).collect();
    write_summaries(out, &summaries)
}

pub fn write_summaries<W: Write>(out: &mut W, summaries: &[&DeviceSummary]) -> io::Result<()> {
    writeln!(out, "\nFound {} device(s):", summaries.len())?;
    for (i, summary) in summaries.iter().enumerate() {
        writeln!(out, " {}: {} - {}", i + 1, summary.id, summary.display_name())?;
    }
    Ok(())
}

/// Device identity block
pub fn write_device<W: Write>(out: &mut W, summary: &DeviceSummary) -> io::Result<()> {
    writeln!(
        out,
        "\n[DEVICE] {} ({})",
        summary.product.as_deref().unwrap_or(""),
        summary.manufacturer.as_deref().unwrap_or("")
    )?;
    writeln!(
        out,
        "  ID: {} | Serial: {}",
        summary.id,
        summary.serial_number.as_deref().unwrap_or("N/A")
    )?;
    writeln!(
        out,
        "  System: Class:0x{:02X} Sub:0x{:02X} Proto:0x{:02X}",
        summary.class, summary.subclass, summary.protocol
    )?;
    writeln!(out, "  Detection: {}", summary.detected_protocol())
}

/// Configuration, interface and endpoint tree
pub fn write_configuration<W: Write>(out: &mut W, config: &ConfigSummary) -> io::Result<()> {
    writeln!(
        out,
        "  Config: #{} | Power: {}mA",
        config.value, config.max_power_ma
    )?;

    for interface in &config.interfaces {
        let kind = if interface.class == crate::gamepad::class::HID {
            "HID"
        } else {
            "Other"
        };
        writeln!(
            out,
            "  [Interface {}] Class: 0x{:02X} ({})",
            interface.number, interface.class, kind
        )?;

        for endpoint in &interface.endpoints {
            writeln!(
                out,
                "    {:<3} 0x{:02X} | {:<11} | MaxPkt: {}",
                endpoint.direction().to_string(),
                endpoint.address,
                endpoint.transfer_type().name(),
                endpoint.max_packet_size
            )?;
        }
    }
    Ok(())
}
