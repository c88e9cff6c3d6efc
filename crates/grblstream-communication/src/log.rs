//! Diagnostic serial traffic log
//!
//! Mirrors every transmitted write and every completed received line to a
//! timestamped file. A failure to write this log must never abort the
//! stream; it is reported through `tracing` instead of the main
//! transmit/receive path.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Append-only log of serial traffic
///
/// Line format: `[<unix-epoch-seconds, 2 decimals>] >> <text>` for
/// transmissions and `<<` for received lines, with embedded CR/LF rendered
/// as literal `\r` / `\n` escapes.
pub struct TrafficLog {
    file: File,
    path: PathBuf,
}

impl TrafficLog {
    /// Create (truncating) the log file at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Record bytes transmitted to the device
    pub fn tx(&mut self, text: &str) {
        self.append(">>", text);
    }

    /// Record a completed line received from the device
    pub fn rx(&mut self, text: &str) {
        self.append("<<", text);
    }

    fn append(&mut self, direction: &str, text: &str) {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let escaped = text.replace('\r', "\\r").replace('\n', "\\n");
        if let Err(e) = writeln!(self.file, "[{:.2}] {} {}", stamp, direction, escaped) {
            tracing::warn!("serial log write to {} failed: {}", self.path.display(), e);
        }
    }

    /// Path the log is being written to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_and_escapes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("traffic.log");

        let mut log = TrafficLog::create(&path).expect("create log");
        log.tx("G0X10\n");
        log.rx("ok\r\n");
        drop(log);

        let content = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with(">> G0X10\\n"));
        assert!(lines[1].ends_with("<< ok\\r\\n"));

        // Timestamp renders as epoch seconds with two decimal places.
        let stamp = &lines[0][1..lines[0].find(']').expect("closing bracket")];
        let dot = stamp.find('.').expect("decimal point");
        assert_eq!(stamp.len() - dot - 1, 2);
        stamp.parse::<f64>().expect("numeric timestamp");
    }
}
