//! Compile-time configuration and protocol constants.
//!
//! The behaviour switches are Cargo features; this
//! module folds them into a [`BridgeConfig`] value so the rest of the core
//! takes them as data and tests can flip them freely.

pub use ipc_proto::{I2C_BUFFER_SIZE, I2C_SLAVE_ADDR};

/// How long the disconnect LED stays lit before advertising restarts (ms).
pub const DISCONNECT_INDICATION_MS: u32 = 3000;

/// Largest attribute value a [`crate::radio::RadioEvent`] carries.
///
/// Must hold at least one full I2C transfer; longer client writes are cut
/// by the radio adapter.
pub const MAX_ATTR_VALUE_LEN: usize = 64;

const _: () = assert!(MAX_ATTR_VALUE_LEN >= I2C_BUFFER_SIZE);

/// GATT handles of the bridged characteristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttributeHandles {
    /// Value handle of the data characteristic (client writes, server notifications).
    pub data_value: u16,
    /// Client characteristic configuration descriptor of the data characteristic.
    pub data_cccd: u16,
}

/// Behaviour switches of the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// Start the I2C slave on connect and stop it on disconnect.
    pub i2c_only_when_connected: bool,
    /// Zero-fill the read buffer once the master has read it.
    pub reset_read_data: bool,
    /// Call into the power collaborator on every loop iteration.
    pub low_power_mode: bool,
    /// Drive the status LEDs.
    pub led_indication: bool,
    pub handles: AttributeHandles,
}

impl BridgeConfig {
    /// Configuration selected by the enabled Cargo features.
    #[must_use]
    pub const fn from_features(handles: AttributeHandles) -> Self {
        Self {
            i2c_only_when_connected: cfg!(feature = "i2c-only-when-connected"),
            reset_read_data: cfg!(feature = "reset-i2c-read-data"),
            low_power_mode: cfg!(feature = "low-power-mode"),
            led_indication: cfg!(feature = "led-indication"),
            handles,
        }
    }
}
