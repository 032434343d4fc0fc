//! Transport core of an I2C to BLE bridge.
//!
//! A touch device talks I2C to a BLE module; this crate is the logic in the
//! middle. It is platform-agnostic: the I2C peripheral, the BLE stack, LEDs
//! and power control are traits the firmware crates implement.
//!
//! # Overview
//!
//! Bridge device:
//!
//! - [`slave`]: status-register I2C slave seam ([`SlavePort`], [`BufferedSlave`], [`IrqGuard`])
//! - [`radio`]: BLE stack seam ([`RadioStack`], [`RadioEvent`])
//! - [`notify`]: subscription flag and notify-with-retry ([`NotificationGate`])
//! - [`bridge`]: the context, buffer manager and event dispatcher ([`I2cBleBridge`])
//! - [`board`]: LED and power collaborators ([`Indicator`], [`PowerControl`])
//! - [`config`]: feature switches and GATT handles ([`BridgeConfig`])
//!
//! Touch device:
//!
//! - [`master`]: one-shot message sender ([`IpcSender`], [`HalMaster`])
//! - [`gesture`]: gesture to LED/message mapping ([`GestureHandler`])
//!
//! # Data Flow
//!
//! ```text
//! touch device --I2C write--> slave write buffer --notification--> BLE client
//! BLE client --attribute write--> slave read buffer --I2C read--> touch device
//! ```
//!
//! Payloads are relayed as opaque bytes; the bridge never decodes them.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` (embedded targets)
//! - **`log`**: Log through the `log` facade
//! - **`i2c-only-when-connected`**: Run the I2C slave only while a client is connected
//! - **`reset-i2c-read-data`**: Zero the read buffer after the master read it
//! - **`low-power-mode`**: Sleep once per main loop iteration
//! - **`led-indication`** (default): Show link state on the status LEDs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod board;
pub mod bridge;
pub mod config;
pub mod gesture;
pub mod master;
pub mod notify;
pub mod radio;
pub mod slave;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use board::{Indication, Indicator, NoIndicator, NoPowerControl, PowerControl};
pub use bridge::{BridgeError, I2cBleBridge};
pub use config::{AttributeHandles, BridgeConfig};
pub use gesture::{Gesture, GestureHandler, LedChannel, LedPwm, TouchReport};
pub use master::{HalMaster, IpcSender, MasterPort, MasterStatus, TransferError};
pub use notify::{NotificationGate, NotifyOutcome};
pub use radio::{AttributeWrite, LinkState, RadioEvent, RadioStack, StackError};
pub use slave::{BufferedSlave, IrqGuard, SlavePort, SlaveStatus};

pub use ipc_proto;
