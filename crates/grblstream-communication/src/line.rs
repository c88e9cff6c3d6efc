//! A single G-code line tracked through the streaming window
//!
//! The canonical transmit form is computed exactly once at construction:
//! parenthetical `(...)` comments, `;`-to-end-of-line comments, and all
//! whitespace are stripped, and the remainder is upper-cased. The transmit
//! byte length (canonical form + newline terminator) is fixed at the same
//! moment and drives all buffer accounting.

use std::fmt;
use std::sync::Arc;

/// Observer for a line's progress through the window
///
/// Both callbacks are invoked synchronously at the exact transition point.
/// The dispatcher never exposes queue contents for polling; these
/// notifications are the only channel through which an external display
/// observes progress.
pub trait LineDisplay: Send + Sync {
    /// The line was transmitted to the device
    fn marked_sent(&self);

    /// A device response was attached to the line
    fn status_attached(&self, status: &str);
}

/// Lifecycle status of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Queued, not yet transmitted
    Pending,
    /// Transmitted, awaiting acknowledgment
    Sent,
    /// Device answered `ok` (terminal)
    Acknowledged,
    /// Device answered `error[:code]` (terminal)
    Errored,
}

/// One G-code command and its transmission state
pub struct Line {
    raw: String,
    canonical: String,
    transmit_len: usize,
    status: LineStatus,
    response: Option<String>,
    display: Option<Arc<dyn LineDisplay>>,
}

impl Line {
    /// Create a line from raw source text
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let canonical = normalize(&raw);
        // Fixed here and never recomputed; changing it mid-flight would
        // desynchronize the window's capacity accounting.
        let transmit_len = canonical.len() + 1;
        Self {
            raw,
            canonical,
            transmit_len,
            status: LineStatus::Pending,
            response: None,
            display: None,
        }
    }

    /// Attach a display observer
    pub fn with_display(mut self, display: Arc<dyn LineDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    /// The raw source text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The canonical transmit form (no comments, no whitespace, upper-cased)
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Transmit byte length: canonical form plus the newline terminator
    pub fn transmit_len(&self) -> usize {
        self.transmit_len
    }

    /// Current lifecycle status
    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// The attached device response, once one has arrived
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// True when the canonical form is empty (pure comment or blank line)
    ///
    /// Such a line is still a valid, trackable unit: it is transmitted as a
    /// bare newline and the firmware acknowledges it like any other line.
    pub fn is_blank(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Mark the line as transmitted and notify the display
    pub(crate) fn mark_sent(&mut self) {
        self.status = LineStatus::Sent;
        if let Some(display) = &self.display {
            display.marked_sent();
        }
    }

    /// Attach the device response, move to a terminal status, and notify
    pub(crate) fn attach_status(&mut self, response: &str, errored: bool) {
        self.status = if errored {
            LineStatus::Errored
        } else {
            LineStatus::Acknowledged
        };
        self.response = Some(response.to_string());
        if let Some(display) = &self.display {
            display.status_attached(response);
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line")
            .field("raw", &self.raw)
            .field("canonical", &self.canonical)
            .field("transmit_len", &self.transmit_len)
            .field("status", &self.status)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// Strip `(...)` and `;` comments and all whitespace, then upper-case
///
/// An unterminated `(` comment is kept literally, matching the firmware's
/// own tolerance for it.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        match c {
            ';' => break,
            '(' => {
                if let Some(end) = rest.find(')') {
                    rest = &rest[end + 1..];
                } else {
                    out.push('(');
                    rest = &rest[1..];
                }
            }
            c if c.is_whitespace() => rest = &rest[c.len_utf8()..],
            c => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out.to_uppercase()
}
