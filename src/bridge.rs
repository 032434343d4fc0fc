use embedded_hal::delay::DelayNs;

use crate::board::{Indication, Indicator, PowerControl};
use crate::config::{BridgeConfig, DISCONNECT_INDICATION_MS, I2C_BUFFER_SIZE};
use crate::notify::{NotificationGate, NotifyOutcome};
use crate::radio::{AttributeWrite, LinkState, RadioEvent, RadioStack, StackError};
use crate::slave::{IrqGuard, SlavePort, SlaveStatus};

/// The bridge context: I2C slave buffers on one side, the BLE data
/// characteristic on the other.
///
/// Everything the bridge needs lives in this struct and is driven from a
/// single thread: [`run_once`](Self::run_once) pumps the radio, dispatches
/// its events and then services the slave. The only critical section is the
/// copy of client data into the read buffer, done under an [`IrqGuard`].
///
/// # Error Handling
///
/// Only stack start-up can fail ([`init`](Self::init)). Rejected
/// notifications are retried by the [`NotificationGate`] and a lost link
/// silently drops them; other stack errors are logged and ignored.
pub struct I2cBleBridge<S, R, I, P, D> {
    slave: S,
    radio: R,
    indicator: I,
    power: P,
    delay: D,
    gate: NotificationGate,
    config: BridgeConfig,
    byte_count: usize,
}

impl<S, R, I, P, D> I2cBleBridge<S, R, I, P, D>
where
    S: SlavePort,
    R: RadioStack,
    I: Indicator,
    P: PowerControl,
    D: DelayNs,
{
    /// Assemble the bridge. Nothing is started until [`init`](Self::init).
    pub fn new(slave: S, radio: R, indicator: I, power: P, delay: D, config: BridgeConfig) -> Self {
        Self {
            slave,
            radio,
            indicator,
            power,
            delay,
            gate: NotificationGate::new(config.handles.data_value),
            config,
            byte_count: 0,
        }
    }

    /// Bring the bridge up: LEDs off, radio stack on, and the I2C slave
    /// started unless it only runs while connected.
    ///
    /// A stack failure shows the disconnect indication and is returned; the
    /// device has nothing useful to do without a radio.
    pub fn init(&mut self) -> Result<(), BridgeError> {
        self.show(Indication::Off);

        if let Err(e) = self.radio.start() {
            error!("radio stack failed to start: {:?}", e);
            self.show(Indication::Disconnected);
            return Err(BridgeError::StackStart(e));
        }

        if !self.config.i2c_only_when_connected {
            self.slave.start();
        }
        info!("bridge up");
        Ok(())
    }

    /// Run the bridge forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    /// One iteration of the main loop.
    pub fn run_once(&mut self) {
        if self.config.low_power_mode {
            self.power.enter_low_power();
        }

        self.process_events();

        if !self.config.i2c_only_when_connected || self.radio.link_state() == LinkState::Connected {
            self.poll_transfer();
        }
    }

    /// Pump the radio stack and dispatch whatever it queued.
    pub fn process_events(&mut self) {
        self.radio.process_events();
        while let Some(event) = self.radio.poll_event() {
            self.dispatch(event);
        }
    }

    /// Service completed I2C transactions.
    ///
    /// A finished master write is forwarded as a notification (when the
    /// client subscribed) before the write cursor is rewound; a finished
    /// master read rewinds the read cursor. Returns the gate's outcome if a
    /// write was handled. Idle is the normal case and returns `None`.
    pub fn poll_transfer(&mut self) -> Option<NotifyOutcome> {
        let mut outcome = None;

        if self.slave.status().contains(SlaveStatus::WR_CMPLT) {
            let size = self.slave.write_buf_size();
            let mut captured = [0u8; I2C_BUFFER_SIZE];
            self.byte_count = self.slave.with_write_buf(|buf| {
                let count = size.min(buf.len()).min(captured.len());
                captured[..count].copy_from_slice(&buf[..count]);
                count
            });
            self.slave.clear_write_status();

            trace!("i2c write complete, {} bytes", self.byte_count);
            outcome = Some(self.gate.send(&mut self.radio, &captured[..self.byte_count]));

            self.slave.clear_write_buf();
        }

        if self.slave.status().contains(SlaveStatus::RD_CMPLT) {
            self.slave.clear_read_buf();
            if self.config.reset_read_data {
                self.slave.with_read_buf_mut(|buf| buf.fill(0));
            }
            self.slave.clear_read_status();
            trace!("i2c read complete");
        }

        outcome
    }

    /// Handle one radio stack event.
    pub fn dispatch(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::StackOn => {
                debug!("stack on");
                self.advertise();
            }
            RadioEvent::Disconnected => {
                info!("client disconnected");
                self.gate.clear();
                if self.config.i2c_only_when_connected {
                    self.slave.stop();
                }
                if self.config.led_indication {
                    self.indicator.indicate(Indication::Disconnected);
                    self.delay.delay_ms(DISCONNECT_INDICATION_MS);
                }
                self.advertise();
            }
            RadioEvent::Connected => {
                info!("client connected");
                self.show(Indication::Connected);
                if self.config.i2c_only_when_connected {
                    self.slave.start();
                }
            }
            RadioEvent::WriteRequest(write) => {
                self.handle_write(&write);
                if let Err(e) = self.radio.write_response() {
                    warn!("write response failed: {:?}", e);
                }
            }
            RadioEvent::WriteCommand(write) => self.handle_write(&write),
            RadioEvent::Unhandled(code) => {
                trace!("ignoring stack event {}", code);
            }
        }
    }

    fn handle_write(&mut self, write: &AttributeWrite) {
        let handles = self.config.handles;

        if write.handle == handles.data_cccd {
            let Some(&flag) = write.value.first() else {
                warn!("empty CCCD write ignored");
                return;
            };
            self.gate.set_subscription(flag);
            debug!("notifications {}", if flag != 0 { "enabled" } else { "disabled" });

            // Reflect the state so a client read of the descriptor sees it
            if let Err(e) = self.radio.write_attribute(handles.data_cccd, &[flag, 0]) {
                warn!("CCCD update failed: {:?}", e);
            }
        } else if write.handle == handles.data_value {
            let value = write.value.as_slice();
            let mut slave = IrqGuard::new(&mut self.slave);
            let len = slave.with_read_buf_mut(|buf| {
                let len = value.len().min(buf.len());
                buf[..len].copy_from_slice(&value[..len]);
                len
            });
            drop(slave);

            if len < value.len() {
                warn!("client write of {} bytes truncated to {}", value.len(), len);
            }
        } else {
            trace!("write to unknown handle {}", write.handle);
        }
    }

    fn advertise(&mut self) {
        match self.radio.start_advertising() {
            Ok(()) => self.show(Indication::Advertising),
            Err(e) => warn!("advertising failed to start: {:?}", e),
        }
    }

    fn show(&mut self, indication: Indication) {
        if self.config.led_indication {
            self.indicator.indicate(indication);
        }
    }

    /// Whether the client enabled notifications.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.gate.is_subscribed()
    }

    /// Byte count captured at the most recent write-complete.
    ///
    /// Rewinding the write buffer does not reset it, so after a transfer it
    /// still reports the length that was forwarded.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get a reference to the I2C slave.
    pub fn slave(&self) -> &S {
        &self.slave
    }

    /// Get a mutable reference to the I2C slave.
    ///
    /// The firmware's bus glue feeds transactions through this.
    pub fn slave_mut(&mut self) -> &mut S {
        &mut self.slave
    }

    /// Get a reference to the radio stack.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Get a mutable reference to the radio stack.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Decompose the bridge into its slave and radio.
    pub fn into_parts(self) -> (S, R) {
        (self.slave, self.radio)
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// The radio stack refused to start.
    StackStart(StackError),
}
