use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};
use tracing::{debug, info};

use crate::core::{Error, Result, SpiConfig};
use super::Transport;

/// spidev ioctl magic (`linux/spi/spidev.h`)
const SPI_IOC_MAGIC: u8 = b'k';
const SPI_IOC_NR_MESSAGE: u8 = 0;
const SPI_IOC_NR_MODE: u8 = 1;
const SPI_IOC_NR_BITS_PER_WORD: u8 = 3;
const SPI_IOC_NR_MAX_SPEED_HZ: u8 = 4;

nix::ioctl_write_ptr!(spi_write_mode, SPI_IOC_MAGIC, SPI_IOC_NR_MODE, u8);
nix::ioctl_write_ptr!(spi_write_bits_per_word, SPI_IOC_MAGIC, SPI_IOC_NR_BITS_PER_WORD, u8);
nix::ioctl_write_ptr!(spi_write_max_speed_hz, SPI_IOC_MAGIC, SPI_IOC_NR_MAX_SPEED_HZ, u32);
nix::ioctl_write_buf!(spi_message, SPI_IOC_MAGIC, SPI_IOC_NR_MESSAGE, SpiIocTransfer);

/// `struct spi_ioc_transfer`
#[derive(Debug, Default, Clone, Copy)]
#[repr(C)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// Linux spidev character device
pub struct SpiDevice {
    file: File,
    device: String,
    config: SpiConfig,
}

impl SpiDevice {
    /// Opens and configures a spidev device (mode, word size, clock)
    pub fn open(device: &str, config: SpiConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|e| Error::open_failed(device, e))?;
        let fd = file.as_raw_fd();

        unsafe {
            spi_write_mode(fd, &config.mode)
                .map_err(|e| Error::open_failed(device, format!("set mode: {}", e)))?;
            spi_write_bits_per_word(fd, &config.bits_per_word)
                .map_err(|e| Error::open_failed(device, format!("set bits per word: {}", e)))?;
            spi_write_max_speed_hz(fd, &config.speed_hz)
                .map_err(|e| Error::open_failed(device, format!("set speed: {}", e)))?;
        }

        info!(
            device,
            speed_hz = config.speed_hz,
            bits_per_word = config.bits_per_word,
            mode = config.mode,
            "SPI device configured"
        );

        Ok(SpiDevice {
            file,
            device: device.to_string(),
            config,
        })
    }

    /// Runs one `SPI_IOC_MESSAGE(1)` transfer
    fn transfer(&self, tx: Option<&[u8]>, rx: Option<&mut [u8]>, len: usize) -> nix::Result<()> {
        let xfer = SpiIocTransfer {
            tx_buf: tx.map_or(0, |b| b.as_ptr() as u64),
            rx_buf: rx.map_or(0, |b| b.as_mut_ptr() as u64),
            len: len as u32,
            speed_hz: self.config.speed_hz,
            bits_per_word: self.config.bits_per_word,
            ..Default::default()
        };
        // The buffers outlive the ioctl call
        unsafe { spi_message(self.file.as_raw_fd(), &[xfer]) }?;
        Ok(())
    }
}

impl Transport for SpiDevice {
    fn name(&self) -> &str {
        &self.device
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        let mut fds = [PollFd::new(self.file.as_raw_fd(), PollFlags::POLLIN)];

        match poll(&mut fds, timeout_ms) {
            Ok(0) | Err(Errno::EINTR) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(Error::read_failed(format!("poll {}: {}", self.device, e))),
        }

        let revents = fds[0].revents().unwrap_or(PollFlags::empty());
        if revents.intersects(PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL) {
            return Err(Error::read_failed(format!("poll {}: {:?}", self.device, revents)));
        }
        if !revents.contains(PollFlags::POLLIN) {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        self.transfer(None, Some(&mut byte), 1)
            .map_err(|e| Error::read_failed(format!("transfer {}: {}", self.device, e)))?;
        debug!(byte = byte[0], "SPI byte received");
        Ok(Some(byte[0]))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.transfer(Some(bytes), None, bytes.len())
            .map_err(|e| Error::Io(e.into()))
    }
}
