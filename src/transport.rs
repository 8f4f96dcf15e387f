use std::io::{self, Read, Write};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("link is not open")]
    NotOpen,

    #[error("serial port '{port}': {source}")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("serial port '{port}' io: {source}")]
    Io {
        port: String,
        #[source]
        source: io::Error,
    },
}

/// Byte link to the companion device.
///
/// Writes are not acknowledged and may return while bytes are still queued. Callers
/// pace themselves with [`Transport::idle`], which stands in for a completion signal
/// the link does not have.
pub trait Transport {
    fn open(&mut self) -> Result<(), TransportError>;

    fn close(&mut self);

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Reads at most one byte, `None` if the device sent nothing.
    fn read_status(&mut self) -> Result<Option<u8>, TransportError>;

    /// Treat everything written so far as sent once `wait` has elapsed.
    fn idle(&mut self, wait: Duration) {
        std::thread::sleep(wait);
    }
}

pub struct SerialTransport {
    port_name: String,
    baud: u32,
    status_timeout: Duration,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    pub fn new(port_name: impl Into<String>, baud: u32, status_timeout: Duration) -> Self {
        Self {
            port_name: port_name.into(),
            baud,
            status_timeout,
            port: None,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn io_err(&self, source: io::Error) -> TransportError {
        TransportError::Io {
            port: self.port_name.clone(),
            source,
        }
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        // 8N1, no flow control: must match the companion bootloader.
        let port = serialport::new(&self.port_name, self.baud)
            .timeout(self.status_timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| TransportError::Serial {
                port: self.port_name.clone(),
                source: e,
            })?;

        debug!(port = %self.port_name, baud = self.baud, "link open");
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!(port = %self.port_name, "link closed");
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        // Left unflushed; the caller idles for the drain time.
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        let r = port.write_all(bytes);
        r.map_err(|e| self.io_err(e))
    }

    fn read_status(&mut self) -> Result<Option<u8>, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        let mut buf = [0u8; 1];
        match port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(self.io_err(e)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_transport_rejects_io_before_open() {
        let mut t = SerialTransport::new("/dev/null-port", 57_600, Duration::from_millis(10));
        assert!(matches!(t.write_all(&[0xF0]), Err(TransportError::NotOpen)));
        assert!(matches!(t.read_status(), Err(TransportError::NotOpen)));
        t.close();
        assert_eq!(t.port_name(), "/dev/null-port");
    }
}
