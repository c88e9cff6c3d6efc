//! Line framing over a raw serial byte stream
//!
//! Reassembles device output into complete newline-terminated lines under
//! an overall deadline. The deadline bounds total elapsed wall-clock time
//! across one `read_lines` call, not any single underlying read: before
//! each low-level read the remaining budget is recomputed, and when it
//! reaches zero the iterator ends. A partially received line is retained
//! internally for the next invocation; no partial line is ever yielded.

use crate::log::TrafficLog;
use crate::serial::SerialLink;
use std::io;
use std::time::{Duration, Instant};

/// Per-read timeout slice used when no overall deadline is given
const UNBOUNDED_READ_SLICE: Duration = Duration::from_millis(500);

/// Reassembles raw bytes into completed lines
///
/// Holds the partial-line buffer between `read_lines` invocations, so the
/// read loop may be abandoned between line boundaries at any time without
/// losing state.
#[derive(Debug, Default)]
pub struct LineFramer {
    partial: Vec<u8>,
}

impl LineFramer {
    /// Create a framer with an empty partial-line buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Read completed lines from `link` until `deadline` elapses
    ///
    /// With `deadline: None` the iterator blocks until lines arrive and
    /// never ends on its own. Each yielded line has its trailing `\r?\n`
    /// stripped; byte sequences that are not valid UTF-8 are replaced with
    /// U+FFFD on completion. Completed lines are mirrored to `log` when one
    /// is given.
    pub fn read_lines<'a, L: SerialLink>(
        &'a mut self,
        link: &'a mut L,
        deadline: Option<Duration>,
        log: Option<&'a mut TrafficLog>,
    ) -> ReadLines<'a, L> {
        ReadLines {
            framer: self,
            link,
            log,
            started: Instant::now(),
            deadline,
            done: false,
        }
    }

    /// Number of buffered bytes belonging to an incomplete line
    pub fn pending_partial_len(&self) -> usize {
        self.partial.len()
    }
}

/// Iterator over completed lines, bounded by the overall deadline
pub struct ReadLines<'a, L: SerialLink> {
    framer: &'a mut LineFramer,
    link: &'a mut L,
    log: Option<&'a mut TrafficLog>,
    started: Instant,
    deadline: Option<Duration>,
    done: bool,
}

impl<L: SerialLink> Iterator for ReadLines<'_, L> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Remaining budget, recomputed before every low-level read.
            let timeout = match self.deadline {
                Some(total) => {
                    let elapsed = self.started.elapsed();
                    if elapsed >= total {
                        self.done = true;
                        return None;
                    }
                    total - elapsed
                }
                None => UNBOUNDED_READ_SLICE,
            };

            if let Err(e) = self.link.set_timeout(timeout) {
                self.done = true;
                return Some(Err(e));
            }

            match self.link.read_byte() {
                Ok(Some(byte)) => {
                    self.framer.partial.push(byte);
                    if byte == b'\n' {
                        let completed = std::mem::take(&mut self.framer.partial);
                        let completed = String::from_utf8_lossy(&completed);
                        if let Some(log) = self.log.as_deref_mut() {
                            log.rx(&completed);
                        }
                        let line = completed
                            .trim_end_matches('\n')
                            .trim_end_matches('\r')
                            .to_string();
                        return Some(Ok(line));
                    }
                }
                // Timeout on the underlying read; the loop re-checks the
                // overall budget and either retries or ends.
                Ok(None) => continue,
                // Transient interruption (terminal resize delivers a signal
                // mid-read); retried transparently.
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
