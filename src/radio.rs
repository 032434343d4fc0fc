//! Radio stack seam: link state, the event union handed to the dispatcher and
//! the [`RadioStack`] trait implemented by the firmware's BLE adapter.

use heapless::Vec;

use crate::config::MAX_ATTR_VALUE_LEN;

/// Error type for radio stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackError {
    /// Transient rejection (TX queue full, congestion). Worth retrying.
    Busy,
    /// No link to send on.
    Disconnected,
    /// Handle unknown to the attribute table.
    InvalidHandle,
    /// Vendor stack error code.
    Raw(u32),
}

/// Radio link state as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Disconnected,
    Advertising,
    Connected,
}

/// A client write to a GATT attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttributeWrite {
    pub handle: u16,
    pub value: Vec<u8, MAX_ATTR_VALUE_LEN>,
}

impl AttributeWrite {
    /// Build a write event, keeping at most [`MAX_ATTR_VALUE_LEN`] bytes of `value`.
    #[must_use]
    pub fn new(handle: u16, value: &[u8]) -> Self {
        let len = value.len().min(MAX_ATTR_VALUE_LEN);
        let mut stored = Vec::new();
        // Cannot fail: len is clamped to capacity
        let _ = stored.extend_from_slice(&value[..len]);
        Self {
            handle,
            value: stored,
        }
    }
}

/// Events delivered by the radio stack.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// The stack finished initializing.
    StackOn,
    /// A central connected.
    Connected,
    /// The central went away.
    Disconnected,
    /// Attribute write that expects a write response.
    WriteRequest(AttributeWrite),
    /// Attribute write without response.
    WriteCommand(AttributeWrite),
    /// Any other stack event, by vendor code.
    Unhandled(u32),
}

/// The BLE stack as the bridge drives it.
///
/// Implementations queue stack events internally; the bridge drains them with
/// [`poll_event`](RadioStack::poll_event) after pumping
/// [`process_events`](RadioStack::process_events). Pumping never dispatches
/// on its own, so callers stay in control of when state changes.
pub trait RadioStack {
    /// Bring the stack up. The first queued event afterwards is normally
    /// [`RadioEvent::StackOn`].
    fn start(&mut self) -> Result<(), StackError>;

    fn start_advertising(&mut self) -> Result<(), StackError>;

    /// Send `value` as a notification of the characteristic at `handle`.
    fn notify(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError>;

    /// Update the locally stored value of an attribute.
    fn write_attribute(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError>;

    /// Acknowledge the last [`RadioEvent::WriteRequest`].
    fn write_response(&mut self) -> Result<(), StackError>;

    /// Let the stack make progress (flush TX, collect RX events).
    fn process_events(&mut self);

    /// Next queued event, if any.
    fn poll_event(&mut self) -> Option<RadioEvent>;

    fn link_state(&self) -> LinkState;
}
