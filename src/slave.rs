//! I2C slave seam: status flags, the [`SlavePort`] trait, the buffered slave
//! model and the interrupt guard used around manual buffer updates.

use core::ops::{BitOr, BitOrAssign, Deref, DerefMut};

use crate::config::I2C_BUFFER_SIZE;

/// Slave status register as a bitfield.
///
/// # Example
///
/// ```
/// use i2c_ble_bridge::SlaveStatus;
///
/// let status = SlaveStatus::WR_CMPLT | SlaveStatus::RD_CMPLT;
/// assert!(status.contains(SlaveStatus::WR_CMPLT));
/// assert!(!SlaveStatus::NONE.contains(SlaveStatus::RD_CMPLT));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveStatus(pub u8);

impl SlaveStatus {
    /// The master finished writing into the write buffer.
    pub const WR_CMPLT: Self = Self(1 << 0);
    /// The master finished reading from the read buffer.
    pub const RD_CMPLT: Self = Self(1 << 1);

    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, flag: SlaveStatus) -> bool {
        (self.0 & flag.0) == flag.0
    }

    #[inline]
    pub fn clear(&mut self, flag: SlaveStatus) {
        self.0 &= !flag.0;
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SlaveStatus {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SlaveStatus {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// An I2C peripheral in slave mode with two registered buffers.
///
/// Mirrors a status-register style slave: the hardware fills the write
/// buffer and drains the read buffer on its own, software only inspects the
/// status, resets cursors and clears flags.
pub trait SlavePort {
    /// Enable the slave and reinitialize both buffer cursors.
    fn start(&mut self);

    /// Disable the slave. Further transactions are refused.
    fn stop(&mut self);

    fn status(&self) -> SlaveStatus;

    /// Bytes written by the master since the write cursor was last cleared.
    fn write_buf_size(&self) -> usize;

    fn clear_write_status(&mut self);

    fn clear_read_status(&mut self);

    /// Rewind the write cursor so the next master write starts at index 0.
    fn clear_write_buf(&mut self);

    /// Rewind the read cursor so the next master read starts at index 0.
    fn clear_read_buf(&mut self);

    /// Run `f` over the whole write buffer (bytes received from the master).
    ///
    /// Implementations backed by shared state may hold a lock for the
    /// duration of `f`; keep it short.
    fn with_write_buf<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T;

    /// Run `f` over the whole read buffer (bytes served to the master).
    fn with_read_buf_mut<T>(&mut self, f: impl FnOnce(&mut [u8]) -> T) -> T;

    /// Mask the slave interrupt source.
    fn disable_int(&mut self);

    /// Unmask the slave interrupt source.
    fn enable_int(&mut self);
}

/// Scoped critical section over a [`SlavePort`].
///
/// The slave interrupt is disabled for the guard's lifetime and re-enabled
/// when it drops, including on early return.
pub struct IrqGuard<'a, P: SlavePort> {
    port: &'a mut P,
}

impl<'a, P: SlavePort> IrqGuard<'a, P> {
    pub fn new(port: &'a mut P) -> Self {
        port.disable_int();
        Self { port }
    }
}

impl<P: SlavePort> Deref for IrqGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.port
    }
}

impl<P: SlavePort> DerefMut for IrqGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.port
    }
}

impl<P: SlavePort> Drop for IrqGuard<'_, P> {
    fn drop(&mut self) {
        self.port.enable_int();
    }
}

/// Software model of a buffered I2C slave.
///
/// The firmware feeds it from its real peripheral through the
/// hardware-side methods ([`master_write`](Self::master_write),
/// [`pending_read`](Self::pending_read), [`complete_read`](Self::complete_read));
/// the bridge only sees the [`SlavePort`] side.
pub struct BufferedSlave<const N: usize = I2C_BUFFER_SIZE> {
    write_buf: [u8; N],
    read_buf: [u8; N],
    write_cursor: usize,
    read_cursor: usize,
    status: SlaveStatus,
    running: bool,
    irq_enabled: bool,
}

impl<const N: usize> BufferedSlave<N> {
    /// A stopped slave with zeroed buffers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            write_buf: [0; N],
            read_buf: [0; N],
            write_cursor: 0,
            read_cursor: 0,
            status: SlaveStatus::NONE,
            running: false,
            irq_enabled: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    #[must_use]
    pub const fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }

    #[inline]
    fn accepts_transactions(&self) -> bool {
        self.running && self.irq_enabled
    }

    /// The master wrote `bytes` to us.
    ///
    /// Bytes are appended at the write cursor; anything past capacity is
    /// NAKed. Returns how many bytes were accepted, `None` if the
    /// transaction was refused outright.
    pub fn master_write(&mut self, bytes: &[u8]) -> Option<usize> {
        if !self.accepts_transactions() {
            return None;
        }

        let room = N - self.write_cursor;
        let accepted = bytes.len().min(room);
        self.write_buf[self.write_cursor..self.write_cursor + accepted]
            .copy_from_slice(&bytes[..accepted]);
        self.write_cursor += accepted;
        self.status |= SlaveStatus::WR_CMPLT;

        Some(accepted)
    }

    /// The whole write buffer.
    #[inline]
    #[must_use]
    pub fn write_buf(&self) -> &[u8] {
        &self.write_buf
    }

    /// The whole read buffer.
    #[inline]
    pub fn read_buf_mut(&mut self) -> &mut [u8] {
        &mut self.read_buf
    }

    /// Bytes the next master read would receive, or `None` if refused.
    #[must_use]
    pub fn pending_read(&self) -> Option<&[u8]> {
        if !self.accepts_transactions() {
            return None;
        }
        Some(&self.read_buf[self.read_cursor..])
    }

    /// The master clocked out `count` bytes of [`pending_read`](Self::pending_read).
    pub fn complete_read(&mut self, count: usize) {
        if !self.accepts_transactions() {
            return;
        }
        self.read_cursor = (self.read_cursor + count).min(N);
        self.status |= SlaveStatus::RD_CMPLT;
    }

    /// Serve one master read into `out`. Returns the bytes delivered.
    pub fn master_read(&mut self, out: &mut [u8]) -> Option<usize> {
        let pending = self.pending_read()?;
        let count = pending.len().min(out.len());
        out[..count].copy_from_slice(&pending[..count]);
        self.complete_read(count);
        Some(count)
    }
}

impl<const N: usize> Default for BufferedSlave<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlavePort for BufferedSlave<N> {
    fn start(&mut self) {
        self.running = true;
        self.write_cursor = 0;
        self.read_cursor = 0;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn status(&self) -> SlaveStatus {
        self.status
    }

    fn write_buf_size(&self) -> usize {
        self.write_cursor
    }

    fn clear_write_status(&mut self) {
        self.status.clear(SlaveStatus::WR_CMPLT);
    }

    fn clear_read_status(&mut self) {
        self.status.clear(SlaveStatus::RD_CMPLT);
    }

    fn clear_write_buf(&mut self) {
        self.write_cursor = 0;
    }

    fn clear_read_buf(&mut self) {
        self.read_cursor = 0;
    }

    fn with_write_buf<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        f(&self.write_buf)
    }

    fn with_read_buf_mut<T>(&mut self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        f(&mut self.read_buf)
    }

    fn disable_int(&mut self) {
        self.irq_enabled = false;
    }

    fn enable_int(&mut self) {
        self.irq_enabled = true;
    }
}
