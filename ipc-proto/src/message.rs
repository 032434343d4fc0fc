//! The fixed-size transfer record and its discriminators.

use crate::MESSAGE_SIZE;

/// Event discriminator carried in [`Message::event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum AppEvent {
    None = 0,
    /// Ask the host to launch the application named by `i_param`.
    LaunchApp = 1,
}

impl AppEvent {
    /// Map a raw discriminator back to a known event.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::LaunchApp),
            _ => None,
        }
    }
}

/// Application identifiers used as the `i_param` of [`AppEvent::LaunchApp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum App {
    None = 0,
    VoiceAssistant = 1,
}

impl App {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::VoiceAssistant),
            _ => None,
        }
    }
}

/// Error returned when a byte slice is not exactly one encoded [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Slice length differs from [`MESSAGE_SIZE`].
    Length { actual: usize },
}

/// A command sent from the touch device to the bridge.
///
/// Raw fields are kept as integers so that unknown discriminators survive a
/// relay untouched; use [`Message::event_kind`] and [`Message::app`] for the
/// typed view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub event: u32,
    pub i_param: i32,
}

impl Message {
    #[must_use]
    pub const fn new(event: AppEvent, i_param: i32) -> Self {
        Self {
            event: event as u32,
            i_param,
        }
    }

    /// Build a launch request for `app`.
    #[must_use]
    pub const fn launch_app(app: App) -> Self {
        Self::new(AppEvent::LaunchApp, app as i32)
    }

    #[inline]
    #[must_use]
    pub const fn event_kind(&self) -> Option<AppEvent> {
        AppEvent::from_raw(self.event)
    }

    /// The launched application, if this is a known launch request.
    #[must_use]
    pub const fn app(&self) -> Option<App> {
        match self.event_kind() {
            Some(AppEvent::LaunchApp) => App::from_raw(self.i_param),
            _ => None,
        }
    }

    /// Encode to the wire layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; MESSAGE_SIZE] {
        let mut out = [0u8; MESSAGE_SIZE];
        out[..4].copy_from_slice(&self.event.to_le_bytes());
        out[4..].copy_from_slice(&self.i_param.to_le_bytes());
        out
    }

    /// Decode one record. The slice must be exactly [`MESSAGE_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bytes: &[u8; MESSAGE_SIZE] = bytes.try_into().map_err(|_| DecodeError::Length {
            actual: bytes.len(),
        })?;

        Ok(Self {
            event: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            i_param: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_voice_assistant_layout() {
        let msg = Message::launch_app(App::VoiceAssistant);
        assert_eq!(msg.to_bytes(), [1, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_negative_param_is_little_endian_twos_complement() {
        let msg = Message {
            event: 0x0102_0304,
            i_param: -2,
        };
        assert_eq!(msg.to_bytes(), [0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert_eq!(
            Message::from_bytes(&[0; 7]),
            Err(DecodeError::Length { actual: 7 })
        );
        assert_eq!(
            Message::from_bytes(&[0; 9]),
            Err(DecodeError::Length { actual: 9 })
        );
        assert_eq!(
            Message::from_bytes(&[]),
            Err(DecodeError::Length { actual: 0 })
        );
    }

    #[test]
    fn test_unknown_discriminators_survive_decode() {
        let raw = [0xAA, 0, 0, 0, 0x2A, 0, 0, 0];
        let msg = Message::from_bytes(&raw).unwrap();
        assert_eq!(msg.event, 0xAA);
        assert_eq!(msg.i_param, 42);
        assert_eq!(msg.event_kind(), None);
        assert_eq!(msg.app(), None);
        assert_eq!(msg.to_bytes(), raw);
    }

    #[test]
    fn test_app_only_for_launch_events() {
        let msg = Message::new(AppEvent::None, App::VoiceAssistant as i32);
        assert_eq!(msg.event_kind(), Some(AppEvent::None));
        assert_eq!(msg.app(), None);
    }
}
