//! # grblstream
//!
//! A command-line G-code streamer for GRBL CNC controllers. Keeps the
//! firmware's serial receive buffer as full as possible without
//! overflowing it, matches asynchronous acknowledgments back to the lines
//! that produced them, and surfaces per-line and per-stream failures.
//!
//! ## Architecture
//!
//! grblstream is organized as a workspace with multiple crates:
//!
//! 1. **grblstream-core** - Error taxonomy and shared results
//! 2. **grblstream-communication** - Line framing, response classification,
//!    the flow-controlled dispatcher, and serial port access
//! 3. **grblstream-settings** - Persisted settings and configuration
//!    resolution
//! 4. **grblstream** - The command-line binary

pub use grblstream_communication::{
    catalog, find_device, list_ports, open_port, CommandSink, DeviceResponse, Line, LineDisplay,
    LineFramer, LineStatus, PortHandle, SerialLink, SerialPortInfo, SerialSession, Streamer,
    TrafficLog, DEFAULT_BUFFER_SIZE,
};

pub use grblstream_core::{ConnectionError, Error, Result, SettingsError, StreamError};

pub use grblstream_settings::{default_settings_path, Overrides, Settings, StreamConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging on stderr with RUST_LOG environment variable
/// support, leaving stdout for streaming progress output.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
