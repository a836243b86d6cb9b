//! Handshake and report monitoring on a claimed interface
//!
//! The session drives the device through the [`GamepadIo`] seam so the whole
//! flow can run against a mock. Progress lines go to the caller's writer;
//! diagnostics go to `tracing`.

use crate::gamepad::Protocol;
use crate::report::format_hex;
use crate::usb::SelectedEndpoints;
use libusb_bridge::{DeviceHandle, Error, Result};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Device operations the session needs
pub trait GamepadIo {
    fn kernel_driver_active(&self, interface: u8) -> Result<bool>;
    fn detach_kernel_driver(&self, interface: u8) -> Result<()>;
    fn attach_kernel_driver(&self, interface: u8) -> Result<()>;
    fn claim_interface(&self, interface: u8) -> Result<()>;
    fn release_interface(&self, interface: u8) -> Result<()>;
    fn write_interrupt(&self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize>;
    fn read_interrupt(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

impl GamepadIo for DeviceHandle<'_> {
    fn kernel_driver_active(&self, interface: u8) -> Result<bool> {
        DeviceHandle::kernel_driver_active(self, interface)
    }

    fn detach_kernel_driver(&self, interface: u8) -> Result<()> {
        DeviceHandle::detach_kernel_driver(self, interface)
    }

    fn attach_kernel_driver(&self, interface: u8) -> Result<()> {
        DeviceHandle::attach_kernel_driver(self, interface)
    }

    fn claim_interface(&self, interface: u8) -> Result<()> {
        DeviceHandle::claim_interface(self, interface)
    }

    fn release_interface(&self, interface: u8) -> Result<()> {
        DeviceHandle::release_interface(self, interface)
    }

    fn write_interrupt(&self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize> {
        DeviceHandle::write_interrupt(self, endpoint, data, timeout)
    }

    fn read_interrupt(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        DeviceHandle::read_interrupt(self, endpoint, buf, timeout)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub interface: u8,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub init_delay: Duration,
    pub monitor_duration: Duration,
    pub max_reports: u32,
    pub report_size: usize,
}

impl From<&crate::config::AnalyzerConfig> for SessionSettings {
    fn from(config: &crate::config::AnalyzerConfig) -> Self {
        Self {
            interface: config.analyzer.interface,
            read_timeout: config.timing.read_timeout(),
            write_timeout: config.timing.write_timeout(),
            init_delay: config.timing.init_delay(),
            monitor_duration: config.timing.monitor_duration(),
            max_reports: config.monitor.max_reports,
            report_size: config.monitor.report_size,
        }
    }
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub claimed: bool,
    pub access_denied: bool,
    pub init_sent: usize,
    pub init_failed: usize,
    pub output_sent: bool,
    pub reports: Vec<Vec<u8>>,
    pub cancelled: bool,
}

/// A claimed interface on one device
///
/// Dropping the session releases the interface and reattaches a kernel
/// driver that it detached.
pub struct Session<'a, D: GamepadIo> {
    device: &'a D,
    settings: SessionSettings,
    detached: bool,
    claimed: bool,
}

impl<'a, D: GamepadIo> Session<'a, D> {
    pub fn new(device: &'a D, settings: SessionSettings) -> Self {
        Self {
            device,
            settings,
            detached: false,
            claimed: false,
        }
    }

    /// Claim, send the handshake and output test, then monitor input
    ///
    /// Stops monitoring early once `stop` is set.
    pub fn run<W: Write>(
        &mut self,
        protocol: Protocol,
        endpoints: SelectedEndpoints,
        out: &mut W,
        stop: &AtomicBool,
    ) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        match self.claim(out)? {
            Ok(()) => summary.claimed = true,
            Err(e) => {
                summary.access_denied = e == Error::Access;
                return Ok(summary);
            }
        }

        if let Some(endpoint) = endpoints.output {
            let (sent, failed) = self.send_init(protocol, endpoint, out)?;
            summary.init_sent = sent;
            summary.init_failed = failed;
            summary.output_sent = self.test_output(protocol, endpoint, out)?;
        }

        match endpoints.input {
            Some(endpoint) => {
                let (reports, cancelled) = self.monitor(endpoint, out, stop)?;
                summary.reports = reports;
                summary.cancelled = cancelled;
            }
            None => writeln!(out, "\n[INPUT] No IN endpoint found, skipping...")?,
        }

        Ok(summary)
    }

    fn claim<W: Write>(&mut self, out: &mut W) -> io::Result<Result<()>> {
        let interface = self.settings.interface;

        // Detaching is best effort; platforms without kernel drivers report NotSupported.
        match self.device.kernel_driver_active(interface) {
            Ok(true) => match self.device.detach_kernel_driver(interface) {
                Ok(()) => {
                    self.detached = true;
                    writeln!(out, "  [STATUS] Kernel driver detached")?;
                }
                Err(e) => warn!("Failed to detach kernel driver from interface {}: {}", interface, e),
            },
            Ok(false) => debug!("No kernel driver active on interface {}", interface),
            Err(e) => debug!("Could not check kernel driver status: {}", e),
        }

        match self.device.claim_interface(interface) {
            Ok(()) => {
                self.claimed = true;
                info!("Claimed interface {}", interface);
                writeln!(out, "  [STATUS] Interface claimed successfully")?;
                Ok(Ok(()))
            }
            Err(e) => {
                warn!("Failed to claim interface {}: {}", interface, e);
                writeln!(out, "  [ERROR] Connection refused: {}", e)?;
                if e == Error::Access {
                    writeln!(out, "    -> Info: Try running with 'sudo'")?;
                }
                Ok(Err(e))
            }
        }
    }

    fn send_init<W: Write>(
        &self,
        protocol: Protocol,
        endpoint: u8,
        out: &mut W,
    ) -> io::Result<(usize, usize)> {
        let packets = protocol.init_packets();
        if packets.is_empty() {
            return Ok((0, 0));
        }

        writeln!(
            out,
            "\n[INIT] Sending {} Handshake ({} packets)...",
            protocol,
            packets.len()
        )?;

        let (mut sent, mut failed) = (0, 0);
        for (i, packet) in packets.iter().enumerate() {
            let n = i + 1;
            match self
                .device
                .write_interrupt(endpoint, packet, self.settings.write_timeout)
            {
                Ok(_) => {
                    sent += 1;
                    writeln!(out, "  -> ({}/{}) Sent: {}", n, packets.len(), format_hex(packet))?;
                    if !self.settings.init_delay.is_zero() {
                        thread::sleep(self.settings.init_delay);
                    }
                }
                Err(e) => {
                    failed += 1;
                    writeln!(out, "  -> ({}/{}) ALERT: Write failed - {}", n, packets.len(), e)?;
                }
            }
        }

        Ok((sent, failed))
    }

    fn test_output<W: Write>(&self, protocol: Protocol, endpoint: u8, out: &mut W) -> io::Result<bool> {
        let Some(packet) = protocol.output_test_packet() else {
            return Ok(false);
        };

        writeln!(out, "\n[OUTPUT] Testing Feedback (Rumble/LED)...")?;
        match self
            .device
            .write_interrupt(endpoint, packet, self.settings.write_timeout)
        {
            Ok(_) => {
                writeln!(out, "  -> Sent: {}", format_hex(packet))?;
                Ok(true)
            }
            Err(e) => {
                writeln!(out, "  -> ALERT: Write failed - {}", e)?;
                Ok(false)
            }
        }
    }

    fn monitor<W: Write>(
        &self,
        endpoint: u8,
        out: &mut W,
        stop: &AtomicBool,
    ) -> io::Result<(Vec<Vec<u8>>, bool)> {
        let max_reports = self.settings.max_reports as usize;
        writeln!(
            out,
            "\n[INPUT] Monitoring {} reports (Ctrl+C to stop)...",
            max_reports
        )?;

        let mut reports = Vec::new();
        let mut buf = vec![0u8; self.settings.report_size];
        let start = Instant::now();
        let mut cancelled = false;

        while reports.len() < max_reports && start.elapsed() < self.settings.monitor_duration {
            if stop.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            match self
                .device
                .read_interrupt(endpoint, &mut buf, self.settings.read_timeout)
            {
                Ok(len) => {
                    let report = buf[..len.min(buf.len())].to_vec();
                    writeln!(
                        out,
                        "  [{:5.3}s] < {}",
                        start.elapsed().as_secs_f64(),
                        format_hex(&report)
                    )?;
                    reports.push(report);
                }
                Err(Error::Timeout) => {}
                Err(Error::NoDevice) => {
                    warn!("Device disconnected while monitoring");
                    break;
                }
                Err(e) => debug!("Interrupt read on {:#04x} failed: {}", endpoint, e),
            }
        }

        if reports.is_empty() {
            writeln!(out, "  -> No reports received (Try pressing buttons)")?;
        }

        Ok((reports, cancelled))
    }

    /// Release the interface and hand it back to the kernel driver
    pub fn close(&mut self) {
        let interface = self.settings.interface;

        if self.claimed {
            if let Err(e) = self.device.release_interface(interface) {
                warn!("Failed to release interface {}: {}", interface, e);
            }
            self.claimed = false;
        }

        if self.detached {
            match self.device.attach_kernel_driver(interface) {
                Ok(()) => debug!("Reattached kernel driver to interface {}", interface),
                Err(e) => warn!("Could not reattach kernel driver to interface {}: {}", interface, e),
            }
            self.detached = false;
        }
    }
}

impl<D: GamepadIo> Drop for Session<'_, D> {
    fn drop(&mut self) {
        self.close();
    }
}
