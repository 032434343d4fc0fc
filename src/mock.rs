//! Recording test doubles shared by the unit tests.

extern crate std;

use std::collections::VecDeque;
use std::vec::Vec;

use crate::board::{Indication, Indicator, PowerControl};
use crate::radio::{LinkState, RadioEvent, RadioStack, StackError};
use crate::slave::{BufferedSlave, SlavePort, SlaveStatus};

/// Scriptable radio stack that records everything the bridge asks of it.
#[derive(Default)]
pub struct MockRadio {
    pub link: LinkState,
    pub events: VecDeque<RadioEvent>,
    pub notifications: Vec<(u16, Vec<u8>)>,
    pub attributes: Vec<(u16, Vec<u8>)>,
    pub write_responses: usize,
    pub advertising_starts: usize,
    pub notify_attempts: usize,
    pub pumps: usize,
    pub start_error: Option<StackError>,
    rejections: usize,
    rejection: Option<StackError>,
    drop_after_pumps: Option<usize>,
    on_pump: Vec<RadioEvent>,
}

impl MockRadio {
    pub fn connected() -> Self {
        Self {
            link: LinkState::Connected,
            ..Self::default()
        }
    }

    /// Fail the next `count` notifies with `error`.
    pub fn reject_notifies(&mut self, count: usize, error: StackError) {
        self.rejections = count;
        self.rejection = Some(error);
    }

    /// Drop the link (and queue a disconnect) on the `pumps`-th pump.
    pub fn drop_link_after_pumps(&mut self, pumps: usize) {
        self.drop_after_pumps = Some(pumps);
    }

    /// Queue `event` the next time the stack is pumped.
    pub fn queue_on_pump(&mut self, event: RadioEvent) {
        self.on_pump.push(event);
    }

    pub fn push(&mut self, event: RadioEvent) {
        self.events.push_back(event);
    }

    /// A central connects: link up and the event queued.
    pub fn connect(&mut self) {
        self.link = LinkState::Connected;
        self.events.push_back(RadioEvent::Connected);
    }

    pub fn disconnect(&mut self) {
        self.link = LinkState::Disconnected;
        self.events.push_back(RadioEvent::Disconnected);
    }
}

impl RadioStack for MockRadio {
    fn start(&mut self) -> Result<(), StackError> {
        match self.start_error {
            Some(e) => Err(e),
            None => {
                self.events.push_back(RadioEvent::StackOn);
                Ok(())
            }
        }
    }

    fn start_advertising(&mut self) -> Result<(), StackError> {
        self.advertising_starts += 1;
        self.link = LinkState::Advertising;
        Ok(())
    }

    fn notify(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError> {
        self.notify_attempts += 1;
        if self.link != LinkState::Connected {
            return Err(StackError::Disconnected);
        }
        if self.rejections > 0 {
            self.rejections -= 1;
            return Err(self.rejection.unwrap_or(StackError::Busy));
        }
        self.notifications.push((handle, value.to_vec()));
        Ok(())
    }

    fn write_attribute(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError> {
        self.attributes.push((handle, value.to_vec()));
        Ok(())
    }

    fn write_response(&mut self) -> Result<(), StackError> {
        self.write_responses += 1;
        Ok(())
    }

    fn process_events(&mut self) {
        self.pumps += 1;
        self.events.extend(self.on_pump.drain(..));
        if self.drop_after_pumps == Some(self.pumps) {
            self.link = LinkState::Disconnected;
            self.events.push_back(RadioEvent::Disconnected);
        }
    }

    fn poll_event(&mut self) -> Option<RadioEvent> {
        self.events.pop_front()
    }

    fn link_state(&self) -> LinkState {
        self.link
    }
}

#[derive(Default)]
pub struct MockIndicator {
    pub shown: Vec<Indication>,
}

impl Indicator for MockIndicator {
    fn indicate(&mut self, indication: Indication) {
        self.shown.push(indication);
    }
}

#[derive(Default)]
pub struct MockPower {
    pub sleeps: usize,
}

impl PowerControl for MockPower {
    fn enter_low_power(&mut self) {
        self.sleeps += 1;
    }
}

/// Delay that only adds up what it was asked to wait.
#[derive(Default)]
pub struct MockDelay {
    pub waited_ns: u64,
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += u64::from(ns);
    }
}

/// Interrupt and read-buffer traffic seen by a [`MockSlave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveOp {
    DisableInt,
    EnableInt,
    ReadBufAccess,
}

/// [`BufferedSlave`] that logs interrupt masking and read-buffer access in
/// call order.
#[derive(Default)]
pub struct MockSlave {
    pub inner: BufferedSlave,
    pub ops: Vec<SlaveOp>,
}

impl SlavePort for MockSlave {
    fn start(&mut self) {
        self.inner.start();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn status(&self) -> SlaveStatus {
        self.inner.status()
    }

    fn write_buf_size(&self) -> usize {
        self.inner.write_buf_size()
    }

    fn clear_write_status(&mut self) {
        self.inner.clear_write_status();
    }

    fn clear_read_status(&mut self) {
        self.inner.clear_read_status();
    }

    fn clear_write_buf(&mut self) {
        self.inner.clear_write_buf();
    }

    fn clear_read_buf(&mut self) {
        self.inner.clear_read_buf();
    }

    fn with_write_buf<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        self.inner.with_write_buf(f)
    }

    fn with_read_buf_mut<T>(&mut self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        self.ops.push(SlaveOp::ReadBufAccess);
        self.inner.with_read_buf_mut(f)
    }

    fn disable_int(&mut self) {
        self.ops.push(SlaveOp::DisableInt);
        self.inner.disable_int();
    }

    fn enable_int(&mut self) {
        self.ops.push(SlaveOp::EnableInt);
        self.inner.enable_int();
    }
}
