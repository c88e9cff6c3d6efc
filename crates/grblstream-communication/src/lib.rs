//! # grblstream Communication
//!
//! Serial communication and the flow-controlled streaming protocol for
//! GRBL controllers: line framing under a deadline, response/error
//! classification, and the dispatcher that keeps the firmware's receive
//! buffer full without overflowing it.

pub mod catalog;
pub mod framer;
pub mod line;
pub mod log;
pub mod response;
pub mod serial;
pub mod streamer;

pub use framer::{LineFramer, ReadLines};
pub use line::{Line, LineDisplay, LineStatus};
pub use log::TrafficLog;
pub use response::DeviceResponse;
pub use serial::{
    find_device, list_ports, open_port, PortHandle, SerialLink, SerialPortInfo, SerialSession,
};
pub use streamer::{CommandSink, Streamer, DEFAULT_BUFFER_SIZE};
