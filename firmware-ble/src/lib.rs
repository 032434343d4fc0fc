//! I2C to BLE bridge firmware for nRF52840.
//!
//! The nRF52 answers as an I2C slave to the touch device and exposes one
//! GATT characteristic to a BLE central. Bytes the touch device writes are
//! notified to the central; bytes the central writes are served to the touch
//! device's next read.
//!
//! # Hardware Configuration
//!
//! | Function   | Pin   | Description |
//! |------------|-------|-------------|
//! | TWIS SDA   | P0.26 | I2C slave data (address 0x08) |
//! | TWIS SCL   | P0.27 | I2C slave clock |
//! | LED 1      | P0.13 | Advertising (active low) |
//! | LED 2      | P0.14 | Connected (active low) |
//! | LED 3      | P0.15 | Disconnected / stack failure (active low) |
//!
//! # Architecture
//!
//! The bridge core is a blocking poll loop and runs in thread mode. Everything
//! that must keep moving while it blocks runs on a higher-priority interrupt
//! executor:
//!
//! - **SoftDevice Task**: Runs the SoftDevice event loop
//! - **BLE Task**: Advertises on request, serves the GATT connection and
//!   queues [`RadioEvent`](i2c_ble_bridge::RadioEvent)s for the core
//! - **TWIS Task**: Services I2C transactions against the shared
//!   [`BufferedSlave`](i2c_ble_bridge::BufferedSlave)
//!
//! # Modules
//!
//! - [`gatt`]: Bridge service registration and write routing ([`BridgeServer`])
//! - [`radio`]: [`RadioStack`](i2c_ble_bridge::RadioStack) over the SoftDevice ([`SoftdeviceRadio`])
//! - [`slave`]: [`SlavePort`](i2c_ble_bridge::SlavePort) over TWIS ([`SharedSlave`])
//! - [`board`]: Status LEDs and SoftDevice sleep ([`Leds`], [`SdPower`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`led-indication`** (default), **`i2c-only-when-connected`**,
//!   **`reset-i2c-read-data`**, **`low-power-mode`**: forwarded to the core

#![no_std]

pub use i2c_ble_bridge::{
    AttributeHandles, BridgeConfig, BridgeError, BufferedSlave, I2cBleBridge, Indication,
    RadioEvent, RadioStack, SlavePort,
};

pub mod board;
pub mod gatt;
pub mod radio;
pub mod slave;

pub use board::{Leds, SdPower};
pub use gatt::{BridgeServer, DEVICE_NAME};
pub use radio::{run_ble, SoftdeviceRadio};
pub use slave::{run_twis, SharedSlave};
