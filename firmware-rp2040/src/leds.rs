//! Blue/green LED pair on one PWM slice.

use embassy_rp::pwm::{Config, Pwm};
use i2c_ble_bridge::gesture::PWM_LED_HALF_POWER;
use i2c_ble_bridge::{LedChannel, LedPwm};

/// PWM period in counts. A compare above it keeps the LED dark.
pub const PWM_TOP: u16 = 10_000;

/// Channel A drives blue, channel B green. Both LEDs are wired active low:
/// the compare value is the dark share of the period.
pub struct PwmLeds<'d> {
    pwm: Pwm<'d>,
    config: Config,
}

impl<'d> PwmLeds<'d> {
    /// Take over `pwm` and start both LEDs at half power.
    pub fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = Config::default();
        config.top = PWM_TOP;
        config.compare_a = PWM_LED_HALF_POWER;
        config.compare_b = PWM_LED_HALF_POWER;
        pwm.set_config(&config);

        Self { pwm, config }
    }
}

impl LedPwm for PwmLeds<'_> {
    fn read_compare(&self, channel: LedChannel) -> u16 {
        match channel {
            LedChannel::Blue => self.config.compare_a,
            LedChannel::Green => self.config.compare_b,
        }
    }

    fn write_compare(&mut self, channel: LedChannel, value: u16) {
        match channel {
            LedChannel::Blue => self.config.compare_a = value,
            LedChannel::Green => self.config.compare_b = value,
        }
        self.pwm.set_config(&self.config);
    }
}
