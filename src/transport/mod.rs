//! Byte transports
//!
//! The protocol core only needs two primitives from the physical link:
//! read at most one byte within a bounded wait, and write a whole frame.
//! Drivers implement [`Transport`]; [`open`] builds the one selected by a
//! [`LinkConfig`].

pub mod mock;
pub mod serial;
#[cfg(target_os = "linux")]
pub mod spi;

pub use self::mock::MockTransport;
pub use self::serial::SerialTransport;
#[cfg(target_os = "linux")]
pub use self::spi::SpiDevice;

use std::time::Duration;
use tracing::info;

use crate::core::{Error, LinkConfig, Result, TransportKind};

/// Raw byte link to the controller
pub trait Transport: Send {
    /// Human-readable name for logs (usually the device path)
    fn name(&self) -> &str;

    /// Waits up to `timeout` for one byte.
    ///
    /// `Ok(None)` means nothing arrived in time. Driver failures are
    /// [`Error::TransportReadFailed`]; a source that has ended for good
    /// returns [`Error::TransportClosed`].
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>>;

    /// Writes all of `bytes` as a single transfer
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        (**self).read_byte(timeout)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }
}

/// Opens the transport described by `config`
pub fn open(config: &LinkConfig) -> Result<Box<dyn Transport>> {
    config.validate()?;

    let transport: Box<dyn Transport> = match &config.transport {
        #[cfg(target_os = "linux")]
        TransportKind::Spi { device } => Box::new(SpiDevice::open(device, config.spi)?),
        #[cfg(not(target_os = "linux"))]
        TransportKind::Spi { device } => {
            return Err(Error::open_failed(device.as_str(), "spidev is only available on Linux"));
        }
        TransportKind::Serial { device, baud_rate } => {
            Box::new(SerialTransport::open(device, *baud_rate, config.poll_interval)?)
        }
    };

    info!(device = transport.name(), "Transport opened");
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device_fails() {
        let config = LinkConfig {
            transport: TransportKind::Spi {
                device: "/nonexistent/spidev9.9".to_string(),
            },
            ..Default::default()
        };
        let err = match open(&config) {
            Err(e) => e,
            Ok(_) => panic!("missing device opened"),
        };
        assert!(matches!(err, Error::TransportOpenFailed { .. }));
        assert!(err.to_string().contains("/nonexistent/spidev9.9"));
    }

    #[test]
    fn test_open_validates_first() {
        let mut config = LinkConfig::default();
        config.spi.bits_per_word = 9;
        assert!(matches!(open(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_boxed_transport_delegates() {
        let mut boxed: Box<dyn Transport> = Box::new(MockTransport::with_bytes(b"@"));
        assert_eq!(boxed.name(), "mock");
        assert_eq!(boxed.read_byte(Duration::from_millis(1)).unwrap(), Some(b'@'));
        boxed.write_bytes(b"@TS,0000000001#").unwrap();
    }
}
