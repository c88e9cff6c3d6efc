//! Serial port access and session plumbing
//!
//! Provides port enumeration and auto-discovery, a byte-level trait seam
//! over the raw port (so the framer and streamer can be tested against
//! scripted links), and the `SerialSession` that couples an open port with
//! line framing and the optional traffic log.

use crate::framer::{LineFramer, ReadLines};
use crate::log::TrafficLog;
use crate::streamer::CommandSink;
use grblstream_core::{ConnectionError, Result};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Byte-level serial interface
///
/// The per-read timeout is set by the framer before every read so the
/// overall deadline stays accurate.
pub trait SerialLink {
    /// Read a single byte; `Ok(None)` when the read timed out
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Set the timeout for subsequent reads
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Write all bytes to the port
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB serial number if available
    pub serial_number: Option<String>,
}

/// List serial ports that look like CNC controllers
///
/// Filters enumerated ports to the patterns controllers show up under:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    match serialport::available_ports() {
        Ok(ports) => {
            let infos = ports
                .iter()
                .filter(|port| is_valid_cnc_port(&port.port_name))
                .map(|port| {
                    let (description, manufacturer, serial_number) = match &port.port_type {
                        serialport::SerialPortType::UsbPort(usb) => (
                            format!(
                                "USB {} {}",
                                usb.manufacturer.as_deref().unwrap_or("Device"),
                                usb.product.as_deref().unwrap_or("Serial Port")
                            ),
                            usb.manufacturer.clone(),
                            usb.serial_number.clone(),
                        ),
                        serialport::SerialPortType::BluetoothPort => {
                            ("Bluetooth Serial".to_string(), None, None)
                        }
                        serialport::SerialPortType::PciPort => {
                            ("PCI Serial".to_string(), None, None)
                        }
                        _ => ("Serial Port".to_string(), None, None),
                    };
                    SerialPortInfo {
                        port_name: port.port_name.clone(),
                        description,
                        manufacturer,
                        serial_number,
                    }
                })
                .collect();
            Ok(infos)
        }
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(ConnectionError::SerialError {
                reason: format!("Failed to enumerate ports: {}", e),
            }
            .into())
        }
    }
}

/// Check if a port name matches CNC controller patterns
fn is_valid_cnc_port(port_name: &str) -> bool {
    if port_name.starts_with("COM") && port_name[3..].chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    if port_name.starts_with("/dev/ttyUSB") || port_name.starts_with("/dev/ttyACM") {
        return true;
    }

    if port_name.starts_with("/dev/cu.usbserial-") || port_name.starts_with("/dev/cu.usbmodem") {
        return true;
    }

    false
}

/// Resolve a device selector to a concrete port name
///
/// The selector may be a port path (used as-is), a USB serial number
/// (matched against enumerated ports), or absent, in which case the first
/// candidate port is chosen.
pub fn find_device(selector: Option<&str>) -> Result<String> {
    if let Some(selector) = selector {
        if selector.starts_with('/') || selector.starts_with("COM") {
            return Ok(selector.to_string());
        }

        let ports = list_ports()?;
        return ports
            .iter()
            .find(|p| p.serial_number.as_deref() == Some(selector))
            .map(|p| p.port_name.clone())
            .ok_or_else(|| {
                ConnectionError::PortNotFound {
                    port: selector.to_string(),
                }
                .into()
            });
    }

    let ports = list_ports()?;
    match ports.first() {
        Some(port) => {
            tracing::info!(
                "auto-selected {} ({})",
                port.port_name,
                port.description
            );
            Ok(port.port_name.clone())
        }
        None => Err(ConnectionError::NoDeviceFound {
            reason: "no candidate serial ports present".to_string(),
        }
        .into()),
    }
}

/// An open serial port backed by the `serialport` crate
pub struct PortHandle {
    inner: Box<dyn serialport::SerialPort>,
}

/// Open `port` at `baud` with an initial short read timeout
pub fn open_port(port: &str, baud: u32) -> Result<PortHandle> {
    let builder = serialport::new(port, baud).timeout(Duration::from_millis(10));
    match builder.open() {
        Ok(inner) => Ok(PortHandle { inner }),
        Err(e) => {
            tracing::warn!("Failed to open serial port {}: {}", port, e);
            Err(ConnectionError::FailedToOpen {
                port: port.to_string(),
                reason: e.to_string(),
            }
            .into())
        }
    }
}

impl SerialLink for PortHandle {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.inner
            .set_timeout(timeout)
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }
}

/// One connection session: open port, line framer, optional traffic log
///
/// Owns the scoped resources of the session; both the port and the log are
/// released when the session drops, on every exit path.
pub struct SerialSession<L: SerialLink> {
    link: L,
    framer: LineFramer,
    log: Option<TrafficLog>,
}

impl<L: SerialLink> SerialSession<L> {
    /// Wrap an open link
    pub fn new(link: L) -> Self {
        Self {
            link,
            framer: LineFramer::new(),
            log: None,
        }
    }

    /// Mirror traffic to `log`
    pub fn with_log(mut self, log: TrafficLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Read completed lines until `deadline` elapses
    ///
    /// Partial lines are retained in the session across calls.
    pub fn read_lines(&mut self, deadline: Option<Duration>) -> ReadLines<'_, L> {
        self.framer
            .read_lines(&mut self.link, deadline, self.log.as_mut())
    }
}

impl<L: SerialLink> CommandSink for SerialSession<L> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if let Some(log) = &mut self.log {
            log.tx(&String::from_utf8_lossy(data));
        }
        self.link.write_all(data)?;
        Ok(())
    }
}
