//! Session flow tests
//!
//! Drives the claim / handshake / output test / monitor sequence against a
//! mock device that records every call.
//!
//! Run with: `cargo test -p analyzer --test session_tests`

use analyzer::gamepad::Protocol;
use analyzer::session::{GamepadIo, Session, SessionSettings};
use analyzer::usb::SelectedEndpoints;
use libusb_bridge::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    KernelDriverActive(u8),
    Detach(u8),
    Attach(u8),
    Claim(u8),
    Release(u8),
    Write(u8, Vec<u8>),
    Read(u8),
}

#[derive(Default)]
struct MockDevice {
    kernel_driver: Option<Result<bool>>,
    claim_result: Option<Error>,
    failing_writes: Vec<usize>,
    reads: Mutex<VecDeque<Result<Vec<u8>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockDevice {
    fn with_reports(reports: &[&[u8]]) -> Self {
        Self {
            reads: Mutex::new(reports.iter().map(|r| Ok(r.to_vec())).collect()),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(_, data) => Some(data),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GamepadIo for MockDevice {
    fn kernel_driver_active(&self, interface: u8) -> Result<bool> {
        self.record(Call::KernelDriverActive(interface));
        self.kernel_driver.unwrap_or(Ok(false))
    }

    fn detach_kernel_driver(&self, interface: u8) -> Result<()> {
        self.record(Call::Detach(interface));
        Ok(())
    }

    fn attach_kernel_driver(&self, interface: u8) -> Result<()> {
        self.record(Call::Attach(interface));
        Ok(())
    }

    fn claim_interface(&self, interface: u8) -> Result<()> {
        self.record(Call::Claim(interface));
        match self.claim_result {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn release_interface(&self, interface: u8) -> Result<()> {
        self.record(Call::Release(interface));
        Ok(())
    }

    fn write_interrupt(&self, endpoint: u8, data: &[u8], _timeout: Duration) -> Result<usize> {
        let index = self.writes().len();
        self.record(Call::Write(endpoint, data.to_vec()));
        if self.failing_writes.contains(&index) {
            Err(Error::Pipe)
        } else {
            Ok(data.len())
        }
    }

    fn read_interrupt(&self, endpoint: u8, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        self.record(Call::Read(endpoint));
        match self.reads.lock().unwrap().pop_front() {
            Some(Ok(report)) => {
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
            None => Err(Error::Timeout),
        }
    }
}

fn settings() -> SessionSettings {
    SessionSettings {
        interface: 0,
        read_timeout: Duration::from_millis(1),
        write_timeout: Duration::from_millis(1),
        init_delay: Duration::ZERO,
        monitor_duration: Duration::from_millis(30),
        max_reports: 2,
        report_size: 64,
    }
}

fn both_endpoints() -> SelectedEndpoints {
    SelectedEndpoints {
        input: Some(0x81),
        output: Some(0x01),
    }
}

// ============================================================================
// Claiming
// ============================================================================

#[test]
fn test_claims_interface_and_releases_on_close() {
    let device = MockDevice::with_reports(&[&[0x01], &[0x02]]);
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = {
        let mut session = Session::new(&device, settings());
        let summary = session
            .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
            .unwrap();
        session.close();
        summary
    };

    assert!(summary.claimed);
    let calls = device.calls();
    assert_eq!(calls[0], Call::KernelDriverActive(0));
    assert_eq!(calls[1], Call::Claim(0));
    assert_eq!(calls.last(), Some(&Call::Release(0)));
    assert!(!calls.contains(&Call::Detach(0)));
    assert!(!calls.contains(&Call::Attach(0)));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[STATUS] Interface claimed successfully"));
}

#[test]
fn test_detaches_and_reattaches_kernel_driver() {
    let device = MockDevice {
        kernel_driver: Some(Ok(true)),
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    {
        let mut session = Session::new(&device, settings());
        session
            .run(Protocol::Unknown, SelectedEndpoints::default(), &mut out, &stop)
            .unwrap();
        // Dropped without close()
    }

    let calls = device.calls();
    assert_eq!(
        calls,
        vec![
            Call::KernelDriverActive(0),
            Call::Detach(0),
            Call::Claim(0),
            Call::Release(0),
            Call::Attach(0),
        ]
    );
    assert!(String::from_utf8(out).unwrap().contains("Kernel driver detached"));
}

#[test]
fn test_kernel_driver_query_failure_is_tolerated() {
    let device = MockDevice {
        kernel_driver: Some(Err(Error::NotSupported)),
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let mut session = Session::new(&device, settings());
    let summary = session
        .run(Protocol::Unknown, SelectedEndpoints::default(), &mut out, &stop)
        .unwrap();

    assert!(summary.claimed);
}

#[test]
fn test_access_denied_stops_session() {
    let device = MockDevice {
        claim_result: Some(Error::Access),
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = {
        let mut session = Session::new(&device, settings());
        session
            .run(Protocol::Gip, both_endpoints(), &mut out, &stop)
            .unwrap()
    };

    assert!(!summary.claimed);
    assert!(summary.access_denied);
    assert!(device.writes().is_empty());
    // Nothing was claimed, so nothing is released
    assert!(!device.calls().contains(&Call::Release(0)));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[ERROR] Connection refused: Access denied"));
    assert!(text.contains("Try running with 'sudo'"));
}

#[test]
fn test_busy_claim_has_no_permission_hint() {
    let device = MockDevice {
        claim_result: Some(Error::Busy),
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Gip, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert!(!summary.access_denied);
    assert!(!String::from_utf8(out).unwrap().contains("sudo"));
}

// ============================================================================
// Handshake and Output Test
// ============================================================================

#[test]
fn test_gip_handshake_then_output_test() {
    let device = MockDevice::default();
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Gip, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.init_sent, 3);
    assert_eq!(summary.init_failed, 0);
    assert!(summary.output_sent);

    let writes = device.writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[0], vec![0x05, 0x20, 0x00, 0x01, 0x00]);
    assert_eq!(writes[1], vec![0x0A, 0x20, 0x00, 0x03, 0x00, 0x01, 0x14]);
    assert_eq!(writes[2], vec![0x06, 0x20, 0x00, 0x02, 0x01, 0x00]);
    assert_eq!(
        writes[3],
        vec![0x09, 0x09, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
    assert!(device.calls().contains(&Call::Write(0x01, writes[0].clone())));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[INIT] Sending GIP Handshake (3 packets)..."));
    assert!(text.contains("-> (2/3) Sent: 0A 20 00 03 00 01 14"));
    assert!(text.contains("[OUTPUT] Testing Feedback (Rumble/LED)..."));
}

#[test]
fn test_failed_init_write_does_not_abort() {
    let device = MockDevice {
        failing_writes: vec![1],
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Gip, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.init_sent, 2);
    assert_eq!(summary.init_failed, 1);
    assert!(summary.output_sent);
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("-> (2/3) ALERT: Write failed - Pipe error")
    );
}

#[test]
fn test_hid_sends_nothing() {
    let device = MockDevice::default();
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.init_sent, 0);
    assert!(!summary.output_sent);
    assert!(device.writes().is_empty());
}

#[test]
fn test_no_out_endpoint_skips_writes() {
    let device = MockDevice::default();
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let endpoints = SelectedEndpoints {
        input: Some(0x81),
        output: None,
    };
    Session::new(&device, settings())
        .run(Protocol::Switch, endpoints, &mut out, &stop)
        .unwrap();

    assert!(device.writes().is_empty());
}

// ============================================================================
// Input Monitoring
// ============================================================================

#[test]
fn test_monitor_stops_at_max_reports() {
    let device = MockDevice::with_reports(&[&[0x01, 0x02], &[0x03], &[0x04]]);
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.reports, vec![vec![0x01, 0x02], vec![0x03]]);
    assert!(!summary.cancelled);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[INPUT] Monitoring 2 reports"));
    assert!(text.contains("< 01 02"));
    assert!(!text.contains("No reports received"));
}

#[test]
fn test_monitor_skips_errors_and_times_out() {
    let device = MockDevice {
        reads: Mutex::new(VecDeque::from(vec![Err(Error::Io), Ok(vec![0xAA])])),
        ..Default::default()
    };
    let mut settings = settings();
    settings.max_reports = 5;
    settings.monitor_duration = Duration::from_millis(20);
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings)
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.reports, vec![vec![0xAA]]);
}

#[test]
fn test_monitor_reports_silence() {
    let device = MockDevice::default();
    let mut settings = settings();
    settings.monitor_duration = Duration::from_millis(10);
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings)
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert!(summary.reports.is_empty());
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("No reports received (Try pressing buttons)")
    );
}

#[test]
fn test_monitor_truncates_to_report_size() {
    let device = MockDevice::with_reports(&[&[0x11; 100]]);
    let mut settings = settings();
    settings.max_reports = 1;
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings)
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert_eq!(summary.reports[0].len(), 64);
}

#[test]
fn test_monitor_honours_stop_flag() {
    let device = MockDevice::with_reports(&[&[0x01]]);
    let mut out = Vec::new();
    let stop = AtomicBool::new(true);

    let summary = Session::new(&device, settings())
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert!(summary.cancelled);
    assert!(summary.reports.is_empty());
    assert!(!device.calls().contains(&Call::Read(0x81)));
}

#[test]
fn test_disconnect_ends_monitoring() {
    let device = MockDevice {
        reads: Mutex::new(VecDeque::from(vec![
            Err(Error::NoDevice),
            Ok(vec![0x01]),
        ])),
        ..Default::default()
    };
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let summary = Session::new(&device, settings())
        .run(Protocol::Hid, both_endpoints(), &mut out, &stop)
        .unwrap();

    assert!(summary.reports.is_empty());
    let reads = device
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Read(_)))
        .count();
    assert_eq!(reads, 1);
}

#[test]
fn test_missing_in_endpoint() {
    let device = MockDevice::default();
    let mut out = Vec::new();
    let stop = AtomicBool::new(false);

    let endpoints = SelectedEndpoints {
        input: None,
        output: Some(0x02),
    };
    Session::new(&device, settings())
        .run(Protocol::Ps4, endpoints, &mut out, &stop)
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[INPUT] No IN endpoint found, skipping..."));
    assert_eq!(device.writes().len(), 2);
}
