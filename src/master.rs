//! Touch-side I2C master: send one [`Message`] to the bridge and report
//! whether the whole record arrived.

use core::ops::{BitOr, BitOrAssign};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use ipc_proto::{Message, I2C_SLAVE_ADDR, MESSAGE_SIZE};

/// Poll period while waiting for the master to finish (µs).
pub const POLL_INTERVAL_US: u32 = 10;

/// Default bound on one message transfer (µs).
pub const DEFAULT_TIMEOUT_US: u32 = 10_000;

/// Master status register as a bitfield.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MasterStatus(pub u8);

impl MasterStatus {
    /// The write transfer finished (successfully or not).
    pub const WR_CMPLT: Self = Self(1 << 0);
    /// The transfer ended with a bus error (NAK, arbitration loss, ...).
    pub const ERR_XFER: Self = Self(1 << 1);

    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, flag: MasterStatus) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

impl BitOr for MasterStatus {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MasterStatus {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Why a message did not make it to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// The master refused to start the transfer (bus busy, bad state).
    Start,
    /// The transfer completed with the error flag set.
    Bus,
    /// Fewer bytes than the record size were accepted.
    ShortWrite { written: usize, expected: usize },
    /// No completion within the allowed time.
    Timeout,
}

/// An I2C peripheral in master mode, status-register style.
pub trait MasterPort {
    fn clear_status(&mut self);

    /// Start a complete write transfer of `bytes` to `address`.
    ///
    /// Returns [`TransferError::Start`] if the transfer could not be started;
    /// completion is reported through [`status`](MasterPort::status).
    fn write_buf(&mut self, address: u8, bytes: &[u8]) -> Result<(), TransferError>;

    fn status(&self) -> MasterStatus;

    /// Bytes of the last write the slave acknowledged.
    fn write_buf_size(&self) -> usize;
}

/// [`MasterPort`] over any blocking `embedded-hal` I2C bus.
///
/// The HAL call runs the whole transfer, so completion is known as soon as
/// [`write_buf`](MasterPort::write_buf) returns.
pub struct HalMaster<I> {
    i2c: I,
    status: MasterStatus,
    written: usize,
}

impl<I: I2c> HalMaster<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            status: MasterStatus::NONE,
            written: 0,
        }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> MasterPort for HalMaster<I> {
    fn clear_status(&mut self) {
        self.status = MasterStatus::NONE;
        self.written = 0;
    }

    fn write_buf(&mut self, address: u8, bytes: &[u8]) -> Result<(), TransferError> {
        match self.i2c.write(address, bytes) {
            Ok(()) => {
                self.written = bytes.len();
                self.status = MasterStatus::WR_CMPLT;
            }
            Err(e) => {
                warn!("i2c write to {} failed: {}", address, kind_name(e.kind()));
                self.written = 0;
                self.status = MasterStatus::WR_CMPLT | MasterStatus::ERR_XFER;
            }
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

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Bus => "bus",
        ErrorKind::ArbitrationLoss => "arbitration loss",
        ErrorKind::NoAcknowledge(_) => "nack",
        ErrorKind::Overrun => "overrun",
        _ => "other",
    }
}

/// Sends [`Message`]s to the bridge's slave address.
///
/// One attempt per call; retry policy is up to the caller.
pub struct IpcSender<M, D> {
    master: M,
    delay: D,
    address: u8,
}

impl<M: MasterPort, D: DelayNs> IpcSender<M, D> {
    /// Sender targeting [`I2C_SLAVE_ADDR`].
    pub fn new(master: M, delay: D) -> Self {
        Self {
            master,
            delay,
            address: I2C_SLAVE_ADDR,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// [`send_message`](Self::send_message) with [`DEFAULT_TIMEOUT_US`].
    pub fn send(&mut self, msg: &Message) -> Result<(), TransferError> {
        self.send_message(msg, DEFAULT_TIMEOUT_US)
    }

    /// Write `msg` in one complete transfer and wait for it to finish.
    ///
    /// Succeeds only if the error flag stays clear and exactly
    /// [`MESSAGE_SIZE`] bytes were accepted. Gives up with
    /// [`TransferError::Timeout`] once `timeout_us` elapsed without a
    /// write-complete.
    pub fn send_message(&mut self, msg: &Message, timeout_us: u32) -> Result<(), TransferError> {
        let bytes = msg.to_bytes();

        self.master.clear_status();
        self.master.write_buf(self.address, &bytes)?;

        let mut waited: u32 = 0;
        while !self.master.status().contains(MasterStatus::WR_CMPLT) {
            if waited >= timeout_us {
                warn!("i2c write timed out after {} us", waited);
                return Err(TransferError::Timeout);
            }
            self.delay.delay_us(POLL_INTERVAL_US);
            waited = waited.saturating_add(POLL_INTERVAL_US);
        }

        if self.master.status().contains(MasterStatus::ERR_XFER) {
            return Err(TransferError::Bus);
        }

        let written = self.master.write_buf_size();
        if written != MESSAGE_SIZE {
            return Err(TransferError::ShortWrite {
                written,
                expected: MESSAGE_SIZE,
            });
        }

        Ok(())
    }

    pub fn master(&self) -> &M {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    pub fn into_parts(self) -> (M, D) {
        (self.master, self.delay)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::MockDelay;
    use ipc_proto::App;
    use std::vec::Vec;

    /// Master whose transfer outcome is scripted.
    #[derive(Default)]
    struct ScriptedMaster {
        refuse_start: bool,
        never_completes: bool,
        error: bool,
        accept: Option<usize>,
        status: MasterStatus,
        written: usize,
        clears: usize,
        sent: Vec<(u8, Vec<u8>)>,
    }

    impl MasterPort for ScriptedMaster {
        fn clear_status(&mut self) {
            self.clears += 1;
            self.status = MasterStatus::NONE;
        }

        fn write_buf(&mut self, address: u8, bytes: &[u8]) -> Result<(), TransferError> {
            if self.refuse_start {
                return Err(TransferError::Start);
            }
            self.sent.push((address, bytes.to_vec()));
            self.written = self.accept.unwrap_or(bytes.len()).min(bytes.len());
            if !self.never_completes {
                self.status = MasterStatus::WR_CMPLT;
                if self.error {
                    self.status |= MasterStatus::ERR_XFER;
                }
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

    fn sender(master: ScriptedMaster) -> IpcSender<ScriptedMaster, MockDelay> {
        IpcSender::new(master, MockDelay::default())
    }

    #[test]
    fn test_complete_transfer_succeeds() {
        let mut tx = sender(ScriptedMaster::default());
        let msg = Message::launch_app(App::VoiceAssistant);

        assert_eq!(tx.send(&msg), Ok(()));
        assert_eq!(tx.master().clears, 1);
        assert_eq!(tx.master().sent.len(), 1);
        assert_eq!(tx.master().sent[0].0, I2C_SLAVE_ADDR);
        assert_eq!(tx.master().sent[0].1, msg.to_bytes());
    }

    #[test]
    fn test_error_flag_reports_bus_error() {
        let mut tx = sender(ScriptedMaster {
            error: true,
            ..ScriptedMaster::default()
        });
        assert_eq!(tx.send(&Message::default()), Err(TransferError::Bus));
    }

    #[test]
    fn test_short_write_reports_error() {
        let mut tx = sender(ScriptedMaster {
            accept: Some(5),
            ..ScriptedMaster::default()
        });
        assert_eq!(
            tx.send(&Message::default()),
            Err(TransferError::ShortWrite {
                written: 5,
                expected: MESSAGE_SIZE
            })
        );
    }

    #[test]
    fn test_refused_start_is_reported() {
        let mut tx = sender(ScriptedMaster {
            refuse_start: true,
            ..ScriptedMaster::default()
        });
        assert_eq!(tx.send(&Message::default()), Err(TransferError::Start));
    }

    #[test]
    fn test_stuck_transfer_times_out() {
        let mut tx = sender(ScriptedMaster {
            never_completes: true,
            ..ScriptedMaster::default()
        });
        assert_eq!(tx.send_message(&Message::default(), 100), Err(TransferError::Timeout));

        let (_, delay) = tx.into_parts();
        assert_eq!(delay.waited_ns, 100_000);
    }

    #[test]
    fn test_custom_address() {
        let mut tx = sender(ScriptedMaster::default()).with_address(0x42);
        tx.send(&Message::default()).unwrap();
        assert_eq!(tx.master().sent[0].0, 0x42);
    }
}
