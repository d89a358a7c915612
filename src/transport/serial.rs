use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::info;

use crate::core::{Error, Result};
use super::Transport;

/// UART link to the controller, 8N1
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    device: String,
}

impl SerialTransport {
    /// Opens a serial port with an initial read timeout
    pub fn open(device: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|e| Error::open_failed(device, e))?;

        info!(device, baud_rate, "Serial port opened");

        Ok(SerialTransport {
            port,
            device: device.to_string(),
        })
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.device
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        if self.port.timeout() != timeout {
            self.port
                .set_timeout(timeout)
                .map_err(|e| Error::read_failed(format!("set timeout on {}: {}", self.device, e)))?;
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(e) => Err(Error::read_failed(format!("read {}: {}", self.device, e))),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port() {
        let result = SerialTransport::open("/nonexistent/ttyS99", 115_200, Duration::from_millis(100));
        assert!(matches!(result, Err(Error::TransportOpenFailed { .. })));
    }

    #[test]
    #[ignore] // Requires serial hardware
    fn test_read_times_out() {
        let mut port = SerialTransport::open("/dev/ttyAMA0", 115_200, Duration::from_millis(10)).unwrap();
        assert!(port.read_byte(Duration::from_millis(10)).is_ok());
    }
}
