//! The bridge GATT service.
//!
//! One primary service with a single data characteristic: the central writes
//! it (with or without response) and subscribes to its notifications.

use i2c_ble_bridge::config::{AttributeHandles, I2C_BUFFER_SIZE};
use i2c_ble_bridge::{AttributeWrite, RadioEvent};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, RegisterError, WriteOp};
use nrf_softdevice::ble::{Connection, Uuid};
use nrf_softdevice::Softdevice;

pub const DEVICE_NAME: &str = "I2C BLE Bridge";

/// Bridge service UUID, little-endian as the SoftDevice expects.
pub const SERVICE_UUID: [u8; 16] = [
    0x7b, 0x2c, 0x51, 0x0a, 0x3e, 0x4d, 0x9f, 0x86, 0x2a, 0x41, 0x6c, 0xe1, 0x00, 0x10, 0x1c, 0xb1,
];

pub const DATA_UUID: [u8; 16] = [
    0x7b, 0x2c, 0x51, 0x0a, 0x3e, 0x4d, 0x9f, 0x86, 0x2a, 0x41, 0x6c, 0xe1, 0x01, 0x10, 0x1c, 0xb1,
];

/// Registered bridge service. Translates raw GATT writes into
/// [`RadioEvent`]s.
pub struct BridgeServer {
    handles: AttributeHandles,
}

impl BridgeServer {
    /// Add the service to the SoftDevice attribute table.
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, Uuid::new_128(&SERVICE_UUID))?;

        let attr = Attribute::new([0u8; I2C_BUFFER_SIZE]).variable_len(I2C_BUFFER_SIZE as u16);
        let md = Metadata::new(Properties::new().write().write_without_response().notify());
        let data = service
            .add_characteristic(Uuid::new_128(&DATA_UUID), attr, md)?
            .build();
        let _ = service.build();

        Ok(Self {
            handles: AttributeHandles {
                data_value: data.value_handle,
                data_cccd: data.cccd_handle,
            },
        })
    }

    #[must_use]
    pub fn handles(&self) -> AttributeHandles {
        self.handles
    }
}

impl gatt_server::Server for BridgeServer {
    type Event = RadioEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        let write = AttributeWrite::new(handle, data);
        match op {
            WriteOp::Request => Some(RadioEvent::WriteRequest(write)),
            WriteOp::Command | WriteOp::SignedWriteCommand => Some(RadioEvent::WriteCommand(write)),
            _ => None,
        }
    }
}
