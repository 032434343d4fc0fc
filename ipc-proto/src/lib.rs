//! Private I2C protocol between the touch device and the BLE bridge.
//!
//! Both devices agree on a single fixed-size record, [`Message`], sent as the
//! complete payload of one I2C master-write transaction. There is no framing,
//! no length prefix and no checksum: the I2C transaction boundary is the
//! message boundary.
//!
//! # Wire Format
//!
//! ```text
//! offset  size  field
//! 0       4     event   (u32, little-endian)
//! 4       4     i_param (i32, little-endian)
//! ```
//!
//! The layout matches the C struct `{ enum event; int32 iParam; }` on a
//! 32-bit little-endian MCU, so both ends must stay bit-for-bit identical.
//!
//! # Example
//!
//! ```
//! use ipc_proto::{App, AppEvent, Message, MESSAGE_SIZE};
//!
//! let msg = Message::launch_app(App::VoiceAssistant);
//! let bytes = msg.to_bytes();
//! assert_eq!(bytes.len(), MESSAGE_SIZE);
//!
//! let decoded = Message::from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.event_kind(), Some(AppEvent::LaunchApp));
//! assert_eq!(decoded.app(), Some(App::VoiceAssistant));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod message;

pub use message::{App, AppEvent, DecodeError, Message};

/// 7-bit I2C address of the BLE bridge in slave mode.
pub const I2C_SLAVE_ADDR: u8 = 0x08;

/// Maximum bytes per I2C transaction in either direction.
///
/// This is the largest transfer the bridge's slave buffers accept.
pub const I2C_BUFFER_SIZE: usize = 61;

/// Encoded size of a [`Message`] in bytes.
pub const MESSAGE_SIZE: usize = 8;

const _: () = assert!(MESSAGE_SIZE <= I2C_BUFFER_SIZE);
