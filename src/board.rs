//! Board collaborators the bridge calls into: status LEDs and the MCU power
//! mode. Both are optional; the `No*` types compile to nothing.

/// What the status LEDs should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indication {
    /// All LEDs dark.
    Off,
    Advertising,
    Connected,
    Disconnected,
}

/// Visual link-state feedback.
pub trait Indicator {
    fn indicate(&mut self, indication: Indication);
}

/// Indicator for boards without LEDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    #[inline]
    fn indicate(&mut self, _indication: Indication) {}
}

/// MCU power management.
pub trait PowerControl {
    /// Sleep until the next wake-up source fires.
    fn enter_low_power(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerControl;

impl PowerControl for NoPowerControl {
    #[inline]
    fn enter_low_power(&mut self) {}
}

impl<T: Indicator + ?Sized> Indicator for &mut T {
    fn indicate(&mut self, indication: Indication) {
        (**self).indicate(indication);
    }
}

impl<T: PowerControl + ?Sized> PowerControl for &mut T {
    fn enter_low_power(&mut self) {
        (**self).enter_low_power();
    }
}
