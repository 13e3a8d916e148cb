//! Byte transports that carry SSD1306 transactions.

use crate::Result;
use tracing::trace;

/// One-way link to the panel controller.
///
/// Each call carries one complete transaction. Callers only look at whether
/// the write succeeded, never at the returned count.
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }
}

/// Accepts every transaction and logs it at trace level.
///
/// Useful for dry runs on machines without the panel attached.
#[derive(Debug, Default)]
pub struct TraceTransport {
    transactions: usize,
}

impl TraceTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions seen so far.
    pub fn transactions(&self) -> usize {
        self.transactions
    }
}

impl Transport for TraceTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.transactions += 1;
        trace!("i2c write #{}: {:02X?}", self.transactions, bytes);
        Ok(bytes.len())
    }
}

#[cfg(target_os = "linux")]
pub use linux::I2cDevTransport;

#[cfg(target_os = "linux")]
mod linux {
    use super::Transport;
    use crate::{Error, Result};
    use std::fs::{File, OpenOptions};
    use std::io::Write;
    use std::os::unix::io::AsRawFd;
    use std::time::Duration;
    use tracing::{debug, info};

    /// `I2C_SLAVE` request from `linux/i2c-dev.h`.
    const I2C_SLAVE: u64 = 0x0703;

    /// Settling time after power-up before the controller accepts commands.
    const POWER_ON_DELAY: Duration = Duration::from_millis(100);

    /// Transport over a Linux `/dev/i2c-N` character device.
    #[derive(Debug)]
    pub struct I2cDevTransport {
        file: File,
        path: String,
        address: u16,
    }

    impl I2cDevTransport {
        /// Opens `/dev/i2c-<bus>` and binds it to a 7-bit slave address.
        pub fn open(bus: u8, address: u16) -> Result<Self> {
            Self::open_path(&format!("/dev/i2c-{}", bus), address)
        }

        /// Opens a specific i2c-dev node.
        pub fn open_path(path: &str, address: u16) -> Result<Self> {
            if address > 0x7F {
                return Err(Error::InvalidAddress(address));
            }

            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .map_err(|e| {
                    debug!("Failed to open {}: {}", path, e);
                    match e.kind() {
                        std::io::ErrorKind::NotFound => Error::DeviceNotFound(path.to_string()),
                        _ => Error::Io(e),
                    }
                })?;

            // SAFETY: the descriptor is owned by `file` for the duration of
            // the call and I2C_SLAVE takes its argument by value.
            let ret = unsafe {
                libc::ioctl(file.as_raw_fd(), I2C_SLAVE as _, address as libc::c_ulong)
            };
            if ret < 0 {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }

            info!("I2C device opened at {} (address {:#04X})", path, address);

            debug!("Waiting {:?} for panel power-up", POWER_ON_DELAY);
            std::thread::sleep(POWER_ON_DELAY);

            Ok(Self {
                file,
                path: path.to_string(),
                address,
            })
        }

        /// Returns the device node path.
        pub fn path(&self) -> &str {
            &self.path
        }

        /// Returns the bound slave address.
        pub fn address(&self) -> u16 {
            self.address
        }
    }

    impl Transport for I2cDevTransport {
        fn write(&mut self, bytes: &[u8]) -> Result<usize> {
            // i2c-dev sends each write(2) as one transaction; a partial
            // write is an error.
            self.file.write_all(bytes)?;
            Ok(bytes.len())
        }
    }
}
