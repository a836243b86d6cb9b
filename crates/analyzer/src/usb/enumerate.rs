//! Controller discovery and descriptor reading

use super::structure::{
    ConfigSummary, DeviceSummary, EndpointSummary, InterfaceSummary, UNREADABLE,
};
use crate::gamepad;
use common::{DeviceFilter, VidPid};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, TransferType, UsbContext};
use tracing::{debug, trace, warn};

/// A device that looks like a game controller
pub struct Candidate {
    pub device: Device<Context>,
    pub summary: DeviceSummary,
}

/// List attached devices that may be controllers
///
/// A device qualifies when its class is HID or vendor specific, or when its
/// vendor is a known controller maker. `filters` further restrict the list.
pub fn list_candidates(
    context: &Context,
    filters: &[DeviceFilter],
) -> Result<Vec<Candidate>, rusb::Error> {
    let mut found = Vec::new();

    for device in context.devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    "Skipping device on bus {} addr {}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                );
                continue;
            }
        };

        let (vid, pid) = (descriptor.vendor_id(), descriptor.product_id());
        if !gamepad::is_candidate(vid, descriptor.class_code()) {
            trace!("Not a controller: {:04x}:{:04x}", vid, pid);
            continue;
        }
        if !DeviceFilter::any_match(filters, vid, pid) {
            debug!("Device ignored by filter: {:04x}:{:04x}", vid, pid);
            continue;
        }

        let summary = summarize(&device, &descriptor);
        found.push(Candidate { device, summary });
    }

    debug!("Found {} candidate device(s)", found.len());
    Ok(found)
}

fn summarize(device: &Device<Context>, descriptor: &DeviceDescriptor) -> DeviceSummary {
    // Strings need an open handle; without one every present string is unreadable.
    let handle = device.open().ok();
    let read = |index: Option<u8>| read_string(handle.as_ref(), index);

    DeviceSummary {
        id: VidPid::new(descriptor.vendor_id(), descriptor.product_id()),
        bus_number: device.bus_number(),
        address: device.address(),
        class: descriptor.class_code(),
        subclass: descriptor.sub_class_code(),
        protocol: descriptor.protocol_code(),
        manufacturer: read(descriptor.manufacturer_string_index()),
        product: read(descriptor.product_string_index()),
        serial_number: read(descriptor.serial_number_string_index()),
    }
}

fn read_string(handle: Option<&DeviceHandle<Context>>, index: Option<u8>) -> Option<String> {
    let index = index?;
    let text = handle
        .and_then(|h| h.read_string_descriptor_ascii(index).ok())
        .unwrap_or_else(|| UNREADABLE.to_string());
    Some(text)
}

/// Read the active configuration, selecting the first one if unconfigured
pub fn read_configuration(device: &Device<Context>) -> Result<ConfigSummary, rusb::Error> {
    ensure_configured(device);

    let config = match device.active_config_descriptor() {
        Ok(config) => config,
        Err(e) => {
            debug!("No active configuration ({}), using the first one", e);
            device.config_descriptor(0)?
        }
    };

    let interfaces = config
        .interfaces()
        .flat_map(|interface| interface.descriptors())
        .map(|alt| InterfaceSummary {
            number: alt.interface_number(),
            alternate_setting: alt.setting_number(),
            class: alt.class_code(),
            endpoints: alt
                .endpoint_descriptors()
                .map(|ep| EndpointSummary {
                    address: ep.address(),
                    attributes: transfer_type_bits(ep.transfer_type()),
                    max_packet_size: ep.max_packet_size(),
                })
                .collect(),
        })
        .collect();

    Ok(ConfigSummary {
        value: config.number(),
        max_power_ma: config.max_power(),
        interfaces,
    })
}

fn ensure_configured(device: &Device<Context>) {
    let Ok(handle) = device.open() else {
        return;
    };

    if let Ok(0) = handle.active_configuration() {
        let first = device.config_descriptor(0).map(|c| c.number());
        match first.and_then(|value| handle.set_active_configuration(value)) {
            Ok(()) => debug!("Selected first configuration"),
            Err(e) => debug!("Could not select configuration: {}", e),
        }
    }
}

fn transfer_type_bits(transfer_type: TransferType) -> u8 {
    match transfer_type {
        TransferType::Control => 0,
        TransferType::Isochronous => 1,
        TransferType::Bulk => 2,
        TransferType::Interrupt => 3,
    }
}
