//! Error handling for grblstream
//!
//! Provides error types for the layers of the streamer:
//! - Stream errors (protocol faults while streaming G-code)
//! - Connection errors (serial port discovery and I/O)
//! - Settings errors (persisted configuration)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Streaming protocol error type
///
/// Faults raised while dispatching G-code lines and matching device
/// acknowledgments. `MalformedResponse` is fatal to the stream;
/// `CommandRejected` refers to a single line and leaves the rest of the
/// stream operating.
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    /// Device output matched neither `ok`, `error[:code]`, `alarm:<code>`,
    /// nor a status report frame. The stream must be considered unreliable
    /// until externally reset; queues are left untouched.
    #[error("unidentified message from device: {response:?}")]
    MalformedResponse {
        /// The raw line received from the device.
        response: String,
    },

    /// A line whose transmit form can never fit the device's receive
    /// buffer. Caught at enqueue time: such a line would block the window
    /// forever.
    #[error("gcode '{gcode}' needs {transmit_len} bytes but the device buffer holds {capacity}")]
    LineTooLong {
        /// The raw source text of the oversized line.
        gcode: String,
        /// Transmit byte length of the canonical form plus newline.
        transmit_len: usize,
        /// Configured device buffer capacity.
        capacity: usize,
    },

    /// Device answered `error[:code]` to a specific line.
    #[error("error on gcode '{gcode}': {response} - {description}")]
    CommandRejected {
        /// The raw source text of the rejected line.
        gcode: String,
        /// The raw response received from the device.
        response: String,
        /// Human-readable description resolved from the error catalog.
        description: String,
    },
}

/// Connection error type
///
/// Errors related to locating and talking to the serial device.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// Requested port does not exist
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Auto-discovery found no candidate device
    #[error("No serial device found: {reason}")]
    NoDeviceFound {
        /// Why discovery came up empty.
        reason: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },
}

/// Settings error type
///
/// Errors raised while loading or saving the persisted settings file.
#[derive(Error, Debug, Clone)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("Failed to read settings file {path}: {reason}")]
    ReadFailed {
        /// Path of the settings file.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Settings file could not be written
    #[error("Failed to write settings file {path}: {reason}")]
    WriteFailed {
        /// Path of the settings file.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Settings file is not valid JSON
    #[error("Invalid settings file {path}: {reason}")]
    InvalidJson {
        /// Path of the settings file.
        path: String,
        /// The parse failure.
        reason: String,
    },

    /// Settings values failed validation
    #[error("Invalid settings: {reason}")]
    Invalid {
        /// The reason validation failed.
        reason: String,
    },
}

/// Main error type for grblstream
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Streaming protocol error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a per-line rejection that leaves the stream usable
    pub fn is_command_rejected(&self) -> bool {
        matches!(self, Error::Stream(StreamError::CommandRejected { .. }))
    }

    /// Check if this is a fatal protocol violation
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Error::Stream(StreamError::MalformedResponse { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
