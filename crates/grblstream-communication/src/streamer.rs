//! Flow-controlled G-code dispatcher
//!
//! Owns two ordered queues of [`Line`]: `pending` (awaiting transmission)
//! and `in_flight` (transmitted, awaiting acknowledgment). Transmission is
//! limited so the total transmit byte length of in-flight lines never
//! exceeds the firmware's receive buffer capacity. Responses are matched
//! strictly FIFO: the Nth response received resolves the Nth line ever
//! transmitted, never identified by content.

use crate::line::Line;
use crate::response::DeviceResponse;
use grblstream_core::{Error, Result, StreamError};
use std::collections::VecDeque;

/// Default GRBL receive buffer capacity in bytes
///
/// Only differs when the firmware was compiled with a non-standard buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// Destination for canonical command bytes
///
/// Receives exactly the canonical line form plus a single trailing
/// newline, nothing else.
pub trait CommandSink {
    /// Write raw bytes to the device
    fn write(&mut self, data: &[u8]) -> Result<()>;
}

/// Flow-controlled scheduler for one connection session
///
/// All operations execute on the caller's single thread of control; the
/// queues and capacity accounting need no synchronization under this
/// design.
pub struct Streamer<S: CommandSink> {
    sink: S,
    capacity: usize,
    pending: VecDeque<Line>,
    in_flight: VecDeque<Line>,
}

impl<S: CommandSink> Streamer<S> {
    /// Create a streamer with the default buffer capacity
    pub fn new(sink: S) -> Self {
        Self::with_capacity(sink, DEFAULT_BUFFER_SIZE)
    }

    /// Create a streamer with an explicit buffer capacity
    pub fn with_capacity(sink: S, capacity: usize) -> Self {
        Self {
            sink,
            capacity,
            pending: VecDeque::new(),
            in_flight: VecDeque::new(),
        }
    }

    /// Append a line to the pending queue, then advance the window once
    ///
    /// May transmit immediately when capacity allows. Blank lines are not
    /// filtered here; callers wanting to skip them must filter before
    /// enqueueing. A line whose transmit length exceeds the capacity is
    /// rejected outright: it could never be transmitted and would block
    /// every line behind it forever.
    pub fn enqueue(&mut self, line: Line) -> Result<()> {
        if line.transmit_len() > self.capacity {
            return Err(Error::Stream(StreamError::LineTooLong {
                gcode: line.raw().to_string(),
                transmit_len: line.transmit_len(),
                capacity: self.capacity,
            }));
        }
        self.pending.push_back(line);
        self.advance()?;
        Ok(())
    }

    /// Transmit pending lines while the window has room
    ///
    /// Strict FIFO: stops at the first pending line that would overflow the
    /// window, never skipping ahead to a shorter line that would fit,
    /// because firmware command ordering must be preserved exactly as
    /// submitted. Returns true iff either queue is still non-empty.
    pub fn advance(&mut self) -> Result<bool> {
        loop {
            let payload = match self.pending.front() {
                Some(head) if self.used_capacity() + head.transmit_len() <= self.capacity => {
                    let mut buf = Vec::with_capacity(head.transmit_len());
                    buf.extend_from_slice(head.canonical().as_bytes());
                    buf.push(b'\n');
                    buf
                }
                _ => break,
            };

            self.sink.write(&payload)?;
            if let Some(mut line) = self.pending.pop_front() {
                tracing::debug!(gcode = line.canonical(), "transmitted");
                line.mark_sent();
                self.in_flight.push_back(line);
            }
        }

        Ok(!self.pending.is_empty() || !self.in_flight.is_empty())
    }

    /// Classify a line of device output and resolve the window
    ///
    /// - Unrecognized text is a fatal protocol violation: the queues are
    ///   left untouched and `MalformedResponse` is returned.
    /// - `alarm:<code>` and `<...>` reports are out-of-band: the queues are
    ///   left untouched and the classification is handed back.
    /// - `ok` / `error[:code]` resolve the oldest in-flight line. The
    ///   window is advanced with the freed capacity *before* a rejection is
    ///   surfaced, so buffer occupancy is accurate and consistent at the
    ///   moment the caller observes the fault.
    pub fn on_response(&mut self, text: &str) -> Result<DeviceResponse> {
        let response = DeviceResponse::parse(text).ok_or_else(|| StreamError::MalformedResponse {
            response: text.to_string(),
        })?;

        if !response.is_ack() {
            return Ok(response);
        }

        // An acknowledgment with nothing in flight means the firmware
        // answered a line we never sent; the stream is unreliable.
        let mut line = self
            .in_flight
            .pop_front()
            .ok_or_else(|| StreamError::MalformedResponse {
                response: text.to_string(),
            })?;

        let errored = matches!(response, DeviceResponse::Error { .. });
        line.attach_status(text, errored);
        self.advance()?;

        if errored {
            return Err(Error::Stream(StreamError::CommandRejected {
                gcode: line.raw().to_string(),
                response: text.to_string(),
                description: response.description(),
            }));
        }

        Ok(response)
    }

    /// True iff both queues are empty
    pub fn finished(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    /// Sum of transmit byte lengths over the in-flight queue
    pub fn used_capacity(&self) -> usize {
        self.in_flight.iter().map(|l| l.transmit_len()).sum()
    }

    /// Configured firmware buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines awaiting transmission
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of transmitted lines awaiting acknowledgment
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Access the output sink, e.g. for realtime commands
    ///
    /// Bytes written here bypass the window accounting entirely; GRBL
    /// realtime characters (`?`, `!`, `~`) do not occupy the receive
    /// buffer.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
