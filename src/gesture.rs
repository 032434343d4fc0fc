//! Touch-device side: turn decoded touchpad gestures into LED feedback and
//! launch requests for the bridge.

use embedded_hal::delay::DelayNs;
use ipc_proto::{App, Message};

use crate::master::{IpcSender, MasterPort, TransferError};

/// PWM compare value that keeps an LED dark.
pub const PWM_LED_OFF: u16 = 10001;
/// PWM compare value for roughly half brightness.
pub const PWM_LED_HALF_POWER: u16 = 5000;
/// Touch coordinate to PWM compare scale.
pub const PWM_SCALAR: u32 = 100;

/// Gesture code as reported by the touch-sensing subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    #[default]
    None,
    SingleClick,
    EdgeSwipeLeft,
    EdgeSwipeRight,
    RotateCw,
    RotateCcw,
}

impl Gesture {
    /// Decode a gesture code. Unknown codes count as no gesture.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::SingleClick,
            2 => Self::EdgeSwipeLeft,
            3 => Self::EdgeSwipeRight,
            4 => Self::RotateCw,
            5 => Self::RotateCcw,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::SingleClick => 1,
            Self::EdgeSwipeLeft => 2,
            Self::EdgeSwipeRight => 3,
            Self::RotateCw => 4,
            Self::RotateCcw => 5,
        }
    }
}

/// One scan result from the touchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchReport {
    pub gesture: Gesture,
    /// Finger position packed as `y << 16 | x`, or [`TouchReport::NO_TOUCH`].
    pub xy: u32,
}

impl TouchReport {
    /// `xy` value when no finger is on the pad.
    pub const NO_TOUCH: u32 = 0xFFFF_FFFF;

    /// Encoded size: gesture code then `xy`, both little-endian `u32`.
    pub const FRAME_SIZE: usize = 8;

    #[must_use]
    pub const fn new(gesture: Gesture, xy: u32) -> Self {
        Self { gesture, xy }
    }

    #[must_use]
    pub const fn at(gesture: Gesture, x: u16, y: u16) -> Self {
        Self::new(gesture, ((y as u32) << 16) | (x as u32))
    }

    #[must_use]
    pub fn from_bytes(frame: &[u8; Self::FRAME_SIZE]) -> Self {
        let code = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
        let xy = u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);
        Self::new(Gesture::from_code(code), xy)
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::FRAME_SIZE] {
        let mut frame = [0u8; Self::FRAME_SIZE];
        frame[..4].copy_from_slice(&self.gesture.code().to_le_bytes());
        frame[4..].copy_from_slice(&self.xy.to_le_bytes());
        frame
    }

    #[inline]
    #[must_use]
    pub const fn is_touched(&self) -> bool {
        self.xy != Self::NO_TOUCH
    }

    /// Finger position as `(x, y)`, if touched.
    #[must_use]
    pub const fn position(&self) -> Option<(u16, u16)> {
        if self.is_touched() {
            Some((self.xy as u16, (self.xy >> 16) as u16))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedChannel {
    Blue,
    Green,
}

/// The two PWM-driven feedback LEDs.
pub trait LedPwm {
    fn read_compare(&self, channel: LedChannel) -> u16;
    fn write_compare(&mut self, channel: LedChannel, value: u16);
}

/// Maps gestures to LED feedback and bridge messages.
pub struct GestureHandler<M, D, L> {
    sender: IpcSender<M, D>,
    leds: L,
}

impl<M: MasterPort, D: DelayNs, L: LedPwm> GestureHandler<M, D, L> {
    pub fn new(sender: IpcSender<M, D>, leds: L) -> Self {
        Self { sender, leds }
    }

    /// React to one touchpad scan.
    ///
    /// Returns the transfer result when a message was sent. A failed
    /// transfer is logged and not retried.
    pub fn handle(&mut self, report: TouchReport) -> Option<Result<(), TransferError>> {
        match report.gesture {
            Gesture::SingleClick | Gesture::EdgeSwipeLeft | Gesture::EdgeSwipeRight => {
                debug!("gesture {:?}", report.gesture);
                None
            }
            Gesture::RotateCw => {
                debug!("gesture {:?}", report.gesture);
                self.leds.write_compare(LedChannel::Green, PWM_LED_HALF_POWER);

                let result = self.sender.send(&Message::launch_app(App::VoiceAssistant));
                if let Err(e) = result {
                    warn!("launch request failed: {:?}", e);
                }
                Some(result)
            }
            Gesture::RotateCcw => {
                debug!("gesture {:?}", report.gesture);
                self.leds.write_compare(LedChannel::Green, PWM_LED_OFF);
                None
            }
            Gesture::None => {
                if let Some((x, y)) = report.position() {
                    self.track(LedChannel::Blue, x);
                    self.track(LedChannel::Green, y);
                }
                None
            }
        }
    }

    // A channel switched off stays off until a gesture turns it back on
    fn track(&mut self, channel: LedChannel, coord: u16) {
        let value = if self.leds.read_compare(channel) == PWM_LED_OFF {
            PWM_LED_OFF
        } else {
            u16::try_from(u32::from(coord) * PWM_SCALAR).unwrap_or(u16::MAX)
        };
        self.leds.write_compare(channel, value);
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn sender(&self) -> &IpcSender<M, D> {
        &self.sender
    }

    pub fn sender_mut(&mut self) -> &mut IpcSender<M, D> {
        &mut self.sender
    }
}
