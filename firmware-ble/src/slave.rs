//! [`SlavePort`] over the nRF TWIS peripheral.
//!
//! The slave buffers live in one [`BufferedSlave`] behind a critical-section
//! mutex. [`run_twis`] feeds it from the TWIS peripheral; the bridge holds a
//! [`SharedSlave`] handle to the same state.

use core::cell::RefCell;

use defmt::{trace, warn};
use embassy_nrf::twis::{Command, Twis};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use i2c_ble_bridge::config::I2C_BUFFER_SIZE;
use i2c_ble_bridge::{BufferedSlave, SlavePort, SlaveStatus};

static SLAVE: Mutex<CriticalSectionRawMutex, RefCell<BufferedSlave>> =
    Mutex::new(RefCell::new(BufferedSlave::new()));

fn with_slave<T>(f: impl FnOnce(&mut BufferedSlave) -> T) -> T {
    SLAVE.lock(|slave| f(&mut slave.borrow_mut()))
}

/// The bridge's handle on the shared slave buffers.
#[derive(Default)]
pub struct SharedSlave {
    _private: (),
}

impl SharedSlave {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl SlavePort for SharedSlave {
    fn start(&mut self) {
        with_slave(|s| s.start());
    }

    fn stop(&mut self) {
        with_slave(|s| s.stop());
    }

    fn status(&self) -> SlaveStatus {
        with_slave(|s| s.status())
    }

    fn write_buf_size(&self) -> usize {
        with_slave(|s| s.write_buf_size())
    }

    fn clear_write_status(&mut self) {
        with_slave(|s| s.clear_write_status());
    }

    fn clear_read_status(&mut self) {
        with_slave(|s| s.clear_read_status());
    }

    fn clear_write_buf(&mut self) {
        with_slave(|s| s.clear_write_buf());
    }

    fn clear_read_buf(&mut self) {
        with_slave(|s| s.clear_read_buf());
    }

    fn with_write_buf<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        with_slave(|s| f(s.write_buf()))
    }

    fn with_read_buf_mut<T>(&mut self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        with_slave(|s| f(s.read_buf_mut()))
    }

    fn disable_int(&mut self) {
        with_slave(|s| s.disable_int());
    }

    fn enable_int(&mut self) {
        with_slave(|s| s.enable_int());
    }
}

/// Serve I2C transactions from the touch device forever.
///
/// Writes land in the slave's write buffer; reads are answered from its
/// read buffer. While the slave is stopped or masked, writes are dropped
/// and reads return the over-read character only.
pub async fn run_twis(mut twis: Twis<'static>) -> ! {
    let mut rx = [0u8; I2C_BUFFER_SIZE];
    let mut tx = [0u8; I2C_BUFFER_SIZE];

    loop {
        let command = match twis.listen(&mut rx).await {
            Ok(command) => command,
            Err(e) => {
                warn!("twis listen error: {:?}", e);
                continue;
            }
        };

        let written = match command {
            Command::Write(n) | Command::WriteRead(n) => n,
            Command::Read => 0,
        };
        if written > 0 && with_slave(|s| s.master_write(&rx[..written])).is_none() {
            trace!("i2c write of {} bytes refused", written);
        }

        if matches!(command, Command::Write(_)) {
            continue;
        }

        let pending = with_slave(|s| {
            s.pending_read().map(|bytes| {
                tx[..bytes.len()].copy_from_slice(bytes);
                bytes.len()
            })
        });
        match twis.respond_to_read(&tx[..pending.unwrap_or(0)]).await {
            Ok(sent) if pending.is_some() => with_slave(|s| s.complete_read(sent)),
            Ok(_) => trace!("i2c read refused"),
            Err(e) => warn!("twis read error: {:?}", e),
        }
    }
}
