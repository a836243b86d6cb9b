//! Descriptor summaries and endpoint selection

use crate::gamepad::Protocol;
use common::VidPid;
use libusb_bridge::{Direction, EndpointType};
use tracing::warn;

/// Shown when a string descriptor exists but cannot be read
pub const UNREADABLE: &str = "<Unreadable>";

/// Identity of an attached device, read from its device descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub id: VidPid,
    pub bus_number: u8,
    pub address: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceSummary {
    pub fn detected_protocol(&self) -> Protocol {
        Protocol::detect(self.id.vendor_id, self.class)
    }

    /// Product name for the device list
    pub fn display_name(&self) -> &str {
        match self.product.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown Device",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub value: u8,
    pub max_power_ma: u16,
    pub interfaces: Vec<InterfaceSummary>,
}

impl ConfigSummary {
    /// Find an endpoint by address across all interfaces
    pub fn endpoint(&self, address: u8) -> Option<&EndpointSummary> {
        self.interfaces
            .iter()
            .flat_map(|i| i.endpoints.iter())
            .find(|ep| ep.address == address)
    }
}

/// One alternate setting of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSummary {
    pub number: u8,
    pub alternate_setting: u8,
    pub class: u8,
    pub endpoints: Vec<EndpointSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSummary {
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
}

impl EndpointSummary {
    pub fn direction(&self) -> Direction {
        Direction::of(self.address)
    }

    pub fn transfer_type(&self) -> EndpointType {
        EndpointType::from_attributes(self.attributes)
    }
}

/// Endpoint addresses used for the handshake (OUT) and report monitor (IN)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectedEndpoints {
    pub input: Option<u8>,
    pub output: Option<u8>,
}

impl SelectedEndpoints {
    /// Pick endpoints in descriptor order
    ///
    /// Each direction takes the first endpoint seen, and is overwritten by
    /// every later interrupt endpoint, so the last interrupt endpoint wins.
    pub fn select(config: &ConfigSummary) -> Self {
        let mut selected = Self::default();

        for endpoint in config.interfaces.iter().flat_map(|i| i.endpoints.iter()) {
            let slot = match endpoint.direction() {
                Direction::In => &mut selected.input,
                Direction::Out => &mut selected.output,
            };

            if endpoint.transfer_type() == EndpointType::Interrupt || slot.is_none() {
                *slot = Some(endpoint.address);
            }
        }

        selected
    }

    /// Keep only selections that are interrupt endpoints
    ///
    /// The fallback in [`select`](Self::select) may land on a bulk or
    /// isochronous endpoint, which the bridge cannot drive with interrupt
    /// transfers.
    pub fn interrupt_only(self, config: &ConfigSummary) -> Self {
        let keep = |address: Option<u8>| {
            let address = address?;
            match config.endpoint(address).map(EndpointSummary::transfer_type) {
                Some(EndpointType::Interrupt) => Some(address),
                Some(kind) => {
                    warn!(
                        "Endpoint 0x{:02x} is {}, not interrupt; skipping it",
                        address, kind
                    );
                    None
                }
                None => None,
            }
        };

        Self {
            input: keep(self.input),
            output: keep(self.output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(address: u8, attributes: u8) -> EndpointSummary {
        EndpointSummary {
            address,
            attributes,
            max_packet_size: 64,
        }
    }

    fn config(endpoints: Vec<Vec<EndpointSummary>>) -> ConfigSummary {
        ConfigSummary {
            value: 1,
            max_power_ma: 500,
            interfaces: endpoints
                .into_iter()
                .enumerate()
                .map(|(n, endpoints)| InterfaceSummary {
                    number: n as u8,
                    alternate_setting: 0,
                    class: 0xFF,
                    endpoints,
                })
                .collect(),
        }
    }

    #[test]
    fn test_select_interrupt_pair() {
        let cfg = config(vec![vec![ep(0x81, 0x03), ep(0x01, 0x03)]]);
        let selected = SelectedEndpoints::select(&cfg);
        assert_eq!(selected.input, Some(0x81));
        assert_eq!(selected.output, Some(0x01));
    }

    #[test]
    fn test_first_endpoint_is_fallback() {
        let cfg = config(vec![vec![ep(0x82, 0x02), ep(0x83, 0x02), ep(0x02, 0x02)]]);
        let selected = SelectedEndpoints::select(&cfg);
        assert_eq!(selected.input, Some(0x82));
        assert_eq!(selected.output, Some(0x02));
    }

    #[test]
    fn test_interrupt_overrides_earlier_bulk() {
        let cfg = config(vec![vec![ep(0x82, 0x02)], vec![ep(0x84, 0x03)]]);
        assert_eq!(SelectedEndpoints::select(&cfg).input, Some(0x84));
    }

    #[test]
    fn test_last_interrupt_wins() {
        let cfg = config(vec![vec![ep(0x81, 0x03)], vec![ep(0x83, 0x03), ep(0x85, 0x02)]]);
        assert_eq!(SelectedEndpoints::select(&cfg).input, Some(0x83));
    }

    #[test]
    fn test_interrupt_only_drops_bulk_fallback() {
        let cfg = config(vec![vec![ep(0x82, 0x02), ep(0x01, 0x03)]]);
        let selected = SelectedEndpoints::select(&cfg);
        assert_eq!(selected.input, Some(0x82));

        let usable = selected.interrupt_only(&cfg);
        assert_eq!(usable.input, None);
        assert_eq!(usable.output, Some(0x01));
    }

    #[test]
    fn test_interrupt_only_keeps_interrupt_pair() {
        let cfg = config(vec![vec![ep(0x81, 0x03), ep(0x02, 0x03)]]);
        let selected = SelectedEndpoints::select(&cfg);
        assert_eq!(selected.interrupt_only(&cfg), selected);
    }

    #[test]
    fn test_no_endpoints() {
        let cfg = config(vec![vec![]]);
        assert_eq!(SelectedEndpoints::select(&cfg), SelectedEndpoints::default());
    }

    #[test]
    fn test_display_name() {
        let mut summary = DeviceSummary {
            id: VidPid::new(0x045E, 0x028E),
            bus_number: 1,
            address: 4,
            class: 0xFF,
            subclass: 0xFF,
            protocol: 0xFF,
            manufacturer: None,
            product: None,
            serial_number: None,
        };
        assert_eq!(summary.display_name(), "Unknown Device");
        assert_eq!(summary.detected_protocol(), Protocol::Gip);

        summary.product = Some("Controller".to_string());
        assert_eq!(summary.display_name(), "Controller");
    }
}
