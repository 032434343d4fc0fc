//! nRF52840-DK board collaborators.

use embassy_nrf::gpio::Output;
use i2c_ble_bridge::{Indication, Indicator, PowerControl};
use nrf_softdevice::raw;

/// The three status LEDs (active low).
pub struct Leds {
    advertising: Output<'static>,
    connected: Output<'static>,
    disconnected: Output<'static>,
}

impl Leds {
    pub fn new(
        advertising: Output<'static>,
        connected: Output<'static>,
        disconnected: Output<'static>,
    ) -> Self {
        Self {
            advertising,
            connected,
            disconnected,
        }
    }
}

impl Indicator for Leds {
    fn indicate(&mut self, indication: Indication) {
        self.advertising.set_high();
        self.connected.set_high();
        self.disconnected.set_high();

        match indication {
            Indication::Off => {}
            Indication::Advertising => self.advertising.set_low(),
            Indication::Connected => self.connected.set_low(),
            Indication::Disconnected => self.disconnected.set_low(),
        }
    }
}

/// Sleeps through the SoftDevice until the next event.
#[derive(Default)]
pub struct SdPower;

impl PowerControl for SdPower {
    fn enter_low_power(&mut self) {
        // SAFETY: plain SVC call, valid whenever the SoftDevice is enabled
        let _ = unsafe { raw::sd_app_evt_wait() };
    }
}
