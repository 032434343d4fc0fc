#![no_std]
#![no_main]

use defmt::{error, info, unwrap};
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::twis::{self, Twis};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::Delay;
use i2c_ble_bridge::config::I2C_SLAVE_ADDR;
use i2c_ble_bridge_nrf::{
    run_ble, run_twis, BridgeConfig, BridgeServer, I2cBleBridge, Leds, SdPower, SharedSlave,
    SoftdeviceRadio, DEVICE_NAME,
};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    TWISPI0 => twis::InterruptHandler<peripherals::TWISPI0>;
});

/// Runs everything that must keep going while the bridge loop blocks.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

static SERVER: StaticCell<BridgeServer> = StaticCell::new();

#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static BridgeServer) -> ! {
    run_ble(sd, server).await
}

#[embassy_executor::task]
async fn twis_task(twis: Twis<'static>) -> ! {
    run_twis(twis).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(raw::BLE_GATTS_VLOC_STACK as u8),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("I2C-BLE bridge starting...");

    // Keep clear of the priorities the SoftDevice reserves (0, 1, 4)
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    // --- Status LEDs ---
    let leds = Leds::new(
        Output::new(p.P0_13, Level::High, OutputDrive::Standard),
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_15, Level::High, OutputDrive::Standard),
    );

    // --- I2C slave ---
    let mut twis_config = twis::Config::default();
    twis_config.address0 = I2C_SLAVE_ADDR;
    interrupt::TWISPI0.set_priority(Priority::P3);
    let twis = Twis::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twis_config);

    // --- SoftDevice and GATT table ---
    let sd = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(unwrap!(BridgeServer::new(sd)));
    let handles = server.handles();
    let sd: &'static Softdevice = sd;

    // --- High priority executor ---
    interrupt::EGU1_SWI1.set_priority(Priority::P5);
    let spawner = EXECUTOR_HIGH.start(interrupt::EGU1_SWI1);
    spawner.spawn(softdevice_task(sd).unwrap());
    spawner.spawn(ble_task(sd, server).unwrap());
    spawner.spawn(twis_task(twis).unwrap());

    // --- Bridge ---
    let mut bridge = I2cBleBridge::new(
        SharedSlave::new(),
        SoftdeviceRadio::new(sd),
        leds,
        SdPower,
        Delay,
        BridgeConfig::from_features(handles),
    );

    if let Err(e) = bridge.init() {
        error!("bridge init failed: {:?}", e);
        // No radio, nothing to bridge
        loop {
            cortex_m::asm::wfe();
        }
    }

    info!("I2C-BLE bridge initialized, slave address {=u8:#x}", I2C_SLAVE_ADDR);
    bridge.run()
}
