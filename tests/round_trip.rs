//! Touch device to BLE client, end to end on the host.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use i2c_ble_bridge::ipc_proto::{App, Message, MESSAGE_SIZE};
use i2c_ble_bridge::{
    AttributeHandles, AttributeWrite, BridgeConfig, BufferedSlave, Gesture, GestureHandler,
    I2cBleBridge, IpcSender, LedChannel, LedPwm, LinkState, MasterPort, MasterStatus,
    NoIndicator, NoPowerControl, RadioEvent, RadioStack, StackError, TouchReport, TransferError,
};

const HANDLES: AttributeHandles = AttributeHandles {
    data_value: 0x0010,
    data_cccd: 0x0011,
};

/// I2C wire straight into the bridge's slave buffers.
struct Wire<'a> {
    slave: &'a mut BufferedSlave,
    status: MasterStatus,
    written: usize,
}

impl<'a> Wire<'a> {
    fn new(slave: &'a mut BufferedSlave) -> Self {
        Self {
            slave,
            status: MasterStatus::NONE,
            written: 0,
        }
    }
}

impl MasterPort for Wire<'_> {
    fn clear_status(&mut self) {
        self.status = MasterStatus::NONE;
        self.written = 0;
    }

    fn write_buf(&mut self, _address: u8, bytes: &[u8]) -> Result<(), TransferError> {
        match self.slave.master_write(bytes) {
            Some(accepted) => {
                self.written = accepted;
                self.status = MasterStatus::WR_CMPLT;
            }
            // Address NAK
            None => self.status = MasterStatus::WR_CMPLT | MasterStatus::ERR_XFER,
        }
        Ok(())
    }

    fn status(&self) -> MasterStatus {
        self.status
    }

    fn write_buf_size(&self) -> usize {
        self.written
    }
}

#[derive(Default)]
struct Radio {
    link: LinkState,
    events: VecDeque<RadioEvent>,
    notifications: Vec<Vec<u8>>,
}

impl RadioStack for Radio {
    fn start(&mut self) -> Result<(), StackError> {
        self.events.push_back(RadioEvent::StackOn);
        Ok(())
    }

    fn start_advertising(&mut self) -> Result<(), StackError> {
        self.link = LinkState::Advertising;
        Ok(())
    }

    fn notify(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError> {
        assert_eq!(handle, HANDLES.data_value);
        self.notifications.push(value.to_vec());
        Ok(())
    }

    fn write_attribute(&mut self, _handle: u16, _value: &[u8]) -> Result<(), StackError> {
        Ok(())
    }

    fn write_response(&mut self) -> Result<(), StackError> {
        Ok(())
    }

    fn process_events(&mut self) {}

    fn poll_event(&mut self) -> Option<RadioEvent> {
        self.events.pop_front()
    }

    fn link_state(&self) -> LinkState {
        self.link
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct Leds([u16; 2]);

impl LedPwm for Leds {
    fn read_compare(&self, channel: LedChannel) -> u16 {
        self.0[channel as usize]
    }

    fn write_compare(&mut self, channel: LedChannel, value: u16) {
        self.0[channel as usize] = value;
    }
}

type Bridge = I2cBleBridge<BufferedSlave, Radio, NoIndicator, NoPowerControl, NoDelay>;

fn subscribed_bridge(gated: bool) -> Bridge {
    let mut config = BridgeConfig::from_features(HANDLES);
    config.i2c_only_when_connected = gated;

    let mut bridge = I2cBleBridge::new(
        BufferedSlave::new(),
        Radio::default(),
        NoIndicator,
        NoPowerControl,
        NoDelay,
        config,
    );
    bridge.init().unwrap();
    bridge.run_once();

    let radio = bridge.radio_mut();
    radio.link = LinkState::Connected;
    radio.events.push_back(RadioEvent::Connected);
    radio
        .events
        .push_back(RadioEvent::WriteRequest(AttributeWrite::new(HANDLES.data_cccd, &[1, 0])));
    bridge.run_once();
    assert!(bridge.is_subscribed());
    bridge
}

#[test]
fn test_launch_message_reaches_client_verbatim() {
    let mut bridge = subscribed_bridge(false);
    let msg = Message::launch_app(App::VoiceAssistant);

    let mut tx = IpcSender::new(Wire::new(bridge.slave_mut()), NoDelay);
    assert_eq!(tx.send(&msg), Ok(()));
    drop(tx);

    bridge.run_once();

    let sent = &bridge.radio().notifications;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), MESSAGE_SIZE);
    assert_eq!(sent[0], msg.to_bytes());
}

#[test]
fn test_gesture_to_notification() {
    let mut bridge = subscribed_bridge(false);

    let mut handler = GestureHandler::new(
        IpcSender::new(Wire::new(bridge.slave_mut()), NoDelay),
        Leds([0; 2]),
    );
    let result = handler.handle(TouchReport::new(Gesture::RotateCw, TouchReport::NO_TOUCH));
    assert_eq!(result, Some(Ok(())));
    drop(handler);

    bridge.run_once();
    assert_eq!(
        bridge.radio().notifications,
        vec![Message::launch_app(App::VoiceAssistant).to_bytes().to_vec()]
    );
}

#[test]
fn test_unknown_payload_is_relayed_untouched() {
    let mut bridge = subscribed_bridge(false);
    let msg = Message {
        event: 0xDEAD_BEEF,
        i_param: -7,
    };

    let mut tx = IpcSender::new(Wire::new(bridge.slave_mut()), NoDelay);
    tx.send(&msg).unwrap();
    drop(tx);
    bridge.run_once();

    assert_eq!(bridge.radio().notifications[0], msg.to_bytes());
}

#[test]
fn test_consecutive_messages_each_start_at_index_zero() {
    let mut bridge = subscribed_bridge(false);

    for param in 0..3 {
        let msg = Message {
            event: 1,
            i_param: param,
        };
        let mut tx = IpcSender::new(Wire::new(bridge.slave_mut()), NoDelay);
        tx.send(&msg).unwrap();
        drop(tx);
        bridge.run_once();
    }

    let sent = &bridge.radio().notifications;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2][4..], 2i32.to_le_bytes());
}

#[test]
fn test_stopped_slave_fails_the_send() {
    let mut bridge = subscribed_bridge(true);

    // Link drops: the gated slave stops
    bridge.radio_mut().link = LinkState::Disconnected;
    bridge.radio_mut().events.push_back(RadioEvent::Disconnected);
    bridge.run_once();

    let mut tx = IpcSender::new(Wire::new(bridge.slave_mut()), NoDelay);
    assert_eq!(tx.send(&Message::default()), Err(TransferError::Bus));
}
