#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Blocking, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, UART1};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::Delay;
use touch_launcher_rp2040::{GestureHandler, HalMaster, IpcSender, PwmLeds, UartTouchSource};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

type Handler = GestureHandler<HalMaster<I2c<'static, I2C0, Blocking>>, Delay, PwmLeds<'static>>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Touch launcher starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let touch = UartTouchSource::new(uart);

    // --- I2C master to the bridge ---
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = 100_000;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let sender = IpcSender::new(HalMaster::new(i2c), Delay);

    // --- LEDs ---
    let pwm = Pwm::new_output_ab(p.PWM_SLICE6, p.PIN_12, p.PIN_13, PwmConfig::default());
    let leds = PwmLeds::new(pwm);

    // On-board LED flags failed transfers
    let error_led = Output::new(p.PIN_25, Level::Low);

    let handler = GestureHandler::new(sender, leds);
    spawner.spawn(touch_task(touch, handler, error_led).unwrap());

    info!("Touch launcher initialized, waiting for reports...");
}

/// Touch task - reads reports from UART and acts on them.
#[embassy_executor::task]
async fn touch_task(
    mut touch: UartTouchSource<'static>,
    mut handler: Handler,
    mut error_led: Output<'static>,
) {
    loop {
        match touch.receive().await {
            Ok(report) => match handler.handle(report) {
                Some(Ok(())) => {
                    info!("launch request delivered");
                    error_led.set_low();
                }
                Some(Err(e)) => {
                    warn!("launch request failed: {:?}", e);
                    error_led.set_high();
                }
                None => {}
            },
            Err(e) => {
                error!("Touch input error: {:?}", e);
                error_led.toggle();
            }
        }
    }
}
