//! UART source of touch reports.
//!
//! Each report is one fixed 8-byte frame (see [`TouchReport::from_bytes`]).
//! Every frame is echoed back on TX so a console on the other end can follow
//! along.
//!
//! # Pins
//!
//! Uses UART1 by default:
//! - GPIO 8: TX
//! - GPIO 9: RX

use embassy_rp::uart::{Async, Error as UartError, Uart};
use i2c_ble_bridge::TouchReport;

/// Error type for touch report reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum TouchError {
    /// UART/communication I/O error.
    Io,
    /// UART framing error.
    Framing,
    /// Receive FIFO overrun; the frame is lost.
    Overrun,
}

#[inline]
fn uart_error_to_touch_error(e: UartError) -> TouchError {
    match e {
        UartError::Framing => TouchError::Framing,
        UartError::Overrun => TouchError::Overrun,
        _ => TouchError::Io,
    }
}

/// Reads [`TouchReport`]s from UART.
pub struct UartTouchSource<'d> {
    uart: Uart<'d, Async>,
    frame: [u8; TouchReport::FRAME_SIZE],
}

impl<'d> UartTouchSource<'d> {
    #[must_use]
    pub fn new(uart: Uart<'d, Async>) -> Self {
        Self {
            uart,
            frame: [0; TouchReport::FRAME_SIZE],
        }
    }

    /// Wait for the next complete frame, echo it and decode it.
    pub async fn receive(&mut self) -> Result<TouchReport, TouchError> {
        self.uart
            .read(&mut self.frame)
            .await
            .map_err(uart_error_to_touch_error)?;

        if self.uart.write(&self.frame).await.is_err() {
            defmt::warn!("echo failed");
        }

        Ok(TouchReport::from_bytes(&self.frame))
    }
}
