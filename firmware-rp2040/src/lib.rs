//! Touch device firmware for RP2040.
//!
//! The touch front-end decodes gestures on its own and streams
//! [`TouchReport`] frames over UART. This firmware maps them to LED feedback
//! and, on a clockwise rotation, asks the BLE bridge to launch the voice
//! assistant by writing a [`Message`](i2c_ble_bridge::ipc_proto::Message) to its I2C slave
//! address.
//!
//! # Hardware Configuration
//!
//! | Function   | GPIO | Description |
//! |------------|------|-------------|
//! | I2C0 SDA   | 4    | I2C master data (to the bridge) |
//! | I2C0 SCL   | 5    | I2C master clock |
//! | UART1 TX   | 8    | Report echo |
//! | UART1 RX   | 9    | Touch reports in |
//! | PWM6 A     | 12   | Blue LED |
//! | PWM6 B     | 13   | Green LED |
//! | LED        | 25   | On-board LED (transfer error indicator) |
//!
//! # Modules
//!
//! - [`touch`]: UART touch report source ([`UartTouchSource`])
//! - [`leds`]: PWM LED pair ([`PwmLeds`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

// Re-export core types for convenience
pub use i2c_ble_bridge::{
    Gesture, GestureHandler, HalMaster, IpcSender, LedChannel, LedPwm, TouchReport, TransferError,
};

pub mod leds;
pub mod touch;

pub use leds::PwmLeds;
pub use touch::{TouchError, UartTouchSource};
