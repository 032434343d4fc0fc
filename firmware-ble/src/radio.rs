//! [`RadioStack`] over the nRF SoftDevice.
//!
//! The SoftDevice side ([`run_ble`]) runs on the interrupt executor and only
//! talks to the thread-mode bridge through [`SHARED`]: it records the
//! connection and link state and queues events; [`SoftdeviceRadio`] reads
//! them back when the bridge polls.

use core::cell::RefCell;

use defmt::{error, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::Deque;
use i2c_ble_bridge::{LinkState, RadioEvent, RadioStack, StackError};
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError};
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::{raw, RawError, Softdevice};

use crate::gatt::{BridgeServer, DEVICE_NAME, SERVICE_UUID};

/// Stack events buffered between two bridge polls.
pub const EVENT_QUEUE_LEN: usize = 8;

struct Shared {
    events: Deque<RadioEvent, EVENT_QUEUE_LEN>,
    conn: Option<Connection>,
    link: LinkState,
}

impl Shared {
    fn push(&mut self, event: RadioEvent) {
        if self.events.push_back(event).is_err() {
            warn!("radio event queue full, event dropped");
        }
    }
}

static SHARED: Mutex<CriticalSectionRawMutex, RefCell<Shared>> = Mutex::new(RefCell::new(Shared {
    events: Deque::new(),
    conn: None,
    link: LinkState::Disconnected,
}));

/// Raised by the bridge to start one advertising round.
static ADVERTISE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

fn with_shared<T>(f: impl FnOnce(&mut Shared) -> T) -> T {
    SHARED.lock(|shared| f(&mut shared.borrow_mut()))
}

fn connection() -> Result<Connection, StackError> {
    with_shared(|s| s.conn.clone()).ok_or(StackError::Disconnected)
}

fn stack_error(e: RawError) -> StackError {
    match e {
        RawError::Resources | RawError::Busy => StackError::Busy,
        RawError::InvalidParam | RawError::NotFound => StackError::InvalidHandle,
        other => StackError::Raw(other as u32),
    }
}

/// The bridge's handle on the SoftDevice.
pub struct SoftdeviceRadio {
    _sd: &'static Softdevice,
}

impl SoftdeviceRadio {
    #[must_use]
    pub fn new(sd: &'static Softdevice) -> Self {
        Self { _sd: sd }
    }
}

impl RadioStack for SoftdeviceRadio {
    fn start(&mut self) -> Result<(), StackError> {
        // The SoftDevice is enabled before the bridge exists
        with_shared(|s| s.push(RadioEvent::StackOn));
        Ok(())
    }

    fn start_advertising(&mut self) -> Result<(), StackError> {
        with_shared(|s| s.link = LinkState::Advertising);
        ADVERTISE.signal(());
        Ok(())
    }

    fn notify(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError> {
        let conn = connection()?;
        gatt_server::notify_value(&conn, handle, value).map_err(|e| match e {
            NotifyValueError::Disconnected => StackError::Disconnected,
            NotifyValueError::Raw(raw) => stack_error(raw),
        })
    }

    fn write_attribute(&mut self, handle: u16, value: &[u8]) -> Result<(), StackError> {
        let conn_handle = connection()?.handle().ok_or(StackError::Disconnected)?;
        let mut gatts_value = raw::ble_gatts_value_t {
            len: value.len() as u16,
            offset: 0,
            p_value: value.as_ptr() as *mut u8,
        };
        // SAFETY: the SoftDevice copies `value` before returning
        let ret = unsafe { raw::sd_ble_gatts_value_set(conn_handle, handle, &mut gatts_value) };
        RawError::convert(ret).map_err(stack_error)
    }

    fn write_response(&mut self) -> Result<(), StackError> {
        // The SoftDevice answers non-authorized write requests itself
        Ok(())
    }

    fn process_events(&mut self) {
        // The SoftDevice is serviced by its own task on the interrupt
        // executor; it keeps running while the bridge blocks.
    }

    fn poll_event(&mut self) -> Option<RadioEvent> {
        with_shared(|s| s.events.pop_front())
    }

    fn link_state(&self) -> LinkState {
        with_shared(|s| s.link)
    }
}

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_128(ServiceList::Complete, &[SERVICE_UUID])
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .full_name(DEVICE_NAME)
    .build();

/// Advertise whenever the bridge asks, then serve the connection until the
/// central leaves.
pub async fn run_ble(sd: &'static Softdevice, server: &'static BridgeServer) -> ! {
    loop {
        ADVERTISE.wait().await;

        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let config = peripheral::Config::default();

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("advertising failed: {:?}", e);
                with_shared(|s| s.link = LinkState::Disconnected);
                continue;
            }
        };

        with_shared(|s| {
            s.conn = Some(conn.clone());
            s.link = LinkState::Connected;
            s.push(RadioEvent::Connected);
        });

        let reason = gatt_server::run(&conn, server, |event| with_shared(|s| s.push(event))).await;
        info!("gatt server exited: {:?}", reason);

        with_shared(|s| {
            s.conn = None;
            s.link = LinkState::Disconnected;
            s.push(RadioEvent::Disconnected);
        });
    }
}
