//! Notification gate: the client's subscription flag and the blocking
//! notify-with-retry path.

use crate::radio::{LinkState, RadioStack};

/// How a [`NotificationGate::send`] ended.
///
/// Purely informational. Nothing is reported to the I2C side either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyOutcome {
    /// The stack accepted the notification.
    Sent,
    /// The client has not enabled notifications; nothing was submitted.
    Unsubscribed,
    /// The link dropped while the stack kept rejecting the notification.
    Abandoned,
}

/// Subscription state of the data characteristic plus the send path.
///
/// The flag holds the raw first byte of the last CCCD write; any nonzero
/// value counts as subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationGate {
    subscription: u8,
    handle: u16,
}

impl NotificationGate {
    /// Unsubscribed gate notifying on the characteristic at `handle`.
    #[must_use]
    pub const fn new(handle: u16) -> Self {
        Self {
            subscription: 0,
            handle,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription != 0
    }

    #[inline]
    #[must_use]
    pub const fn subscription(&self) -> u8 {
        self.subscription
    }

    #[inline]
    pub fn set_subscription(&mut self, value: u8) {
        self.subscription = value;
    }

    /// Back to unsubscribed (link loss).
    #[inline]
    pub fn clear(&mut self) {
        self.subscription = 0;
    }

    #[inline]
    #[must_use]
    pub const fn handle(&self) -> u16 {
        self.handle
    }

    /// Push `value` to the client if it subscribed.
    ///
    /// Blocks until the stack takes the notification. Every attempt is
    /// followed by one [`RadioStack::process_events`] pump; rejections are
    /// retried for as long as the link stays connected. There is no timeout:
    /// a stack that never drains its TX queue stalls the caller.
    ///
    /// Events the stack queues meanwhile are left for the caller to
    /// dispatch, so the subscription flag cannot change under a send.
    pub fn send<R: RadioStack + ?Sized>(&self, radio: &mut R, value: &[u8]) -> NotifyOutcome {
        if !self.is_subscribed() {
            return NotifyOutcome::Unsubscribed;
        }

        let mut attempts: u32 = 0;
        loop {
            let result = radio.notify(self.handle, value);
            attempts = attempts.wrapping_add(1);
            radio.process_events();

            match result {
                Ok(()) => {
                    if attempts > 1 {
                        debug!("notification sent after {} attempts", attempts);
                    }
                    return NotifyOutcome::Sent;
                }
                Err(e) => {
                    if radio.link_state() != LinkState::Connected {
                        warn!("link lost, dropping notification ({:?})", e);
                        return NotifyOutcome::Abandoned;
                    }
                    trace!("notify rejected: {:?}, retrying", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRadio;
    use crate::radio::StackError;

    const HANDLE: u16 = 0x0010;

    fn subscribed() -> NotificationGate {
        let mut gate = NotificationGate::new(HANDLE);
        gate.set_subscription(1);
        gate
    }

    #[test]
    fn test_unsubscribed_gate_sends_nothing() {
        let gate = NotificationGate::new(HANDLE);
        let mut radio = MockRadio::connected();

        assert_eq!(gate.send(&mut radio, &[1, 2, 3]), NotifyOutcome::Unsubscribed);
        assert!(radio.notifications.is_empty());
        assert_eq!(radio.pumps, 0);
    }

    #[test]
    fn test_subscribed_gate_sends_exact_bytes() {
        let gate = subscribed();
        let mut radio = MockRadio::connected();

        assert_eq!(gate.send(&mut radio, &[9, 8, 7]), NotifyOutcome::Sent);
        assert_eq!(radio.notifications.len(), 1);
        assert_eq!(radio.notifications[0].0, HANDLE);
        assert_eq!(radio.notifications[0].1, [9, 8, 7]);
    }

    #[test]
    fn test_busy_stack_is_retried_with_pumping() {
        let gate = subscribed();
        let mut radio = MockRadio::connected();
        radio.reject_notifies(3, StackError::Busy);

        assert_eq!(gate.send(&mut radio, &[1]), NotifyOutcome::Sent);
        assert_eq!(radio.notify_attempts, 4);
        assert_eq!(radio.pumps, 4);
        assert_eq!(radio.notifications.len(), 1);
    }

    #[test]
    fn test_link_drop_abandons_notification() {
        let gate = subscribed();
        let mut radio = MockRadio::connected();
        radio.reject_notifies(100, StackError::Busy);
        radio.drop_link_after_pumps(2);

        assert_eq!(gate.send(&mut radio, &[1]), NotifyOutcome::Abandoned);
        assert_eq!(radio.notify_attempts, 2);
        assert!(radio.notifications.is_empty());
    }

    #[test]
    fn test_nonzero_subscription_byte_counts_as_subscribed() {
        let mut gate = NotificationGate::new(HANDLE);
        gate.set_subscription(2);
        assert!(gate.is_subscribed());
        gate.clear();
        assert!(!gate.is_subscribed());
        assert_eq!(gate.subscription(), 0);
    }

    #[test]
    fn test_events_queued_during_retry_are_not_consumed() {
        let gate = subscribed();
        let mut radio = MockRadio::connected();
        radio.reject_notifies(1, StackError::Busy);
        radio.queue_on_pump(crate::radio::RadioEvent::Unhandled(0x42));

        assert_eq!(gate.send(&mut radio, &[1]), NotifyOutcome::Sent);
        assert_eq!(radio.poll_event(), Some(crate::radio::RadioEvent::Unhandled(0x42)));
    }
}
