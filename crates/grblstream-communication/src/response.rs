//! GRBL response classification
//!
//! Parses a single line of device output into an acknowledgment
//! (`ok` / `error[:code]`) or an out-of-band message (`alarm:<code>`,
//! `<...>` status report). Anything else is unrecognized, which the
//! dispatcher treats as a fatal protocol violation.

use crate::catalog;
use std::fmt;

/// A classified line of device output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceResponse {
    /// OK acknowledgment for the oldest in-flight line
    Ok,
    /// Error acknowledgment for the oldest in-flight line
    ///
    /// The numeric code is optional: plain `error` (GRBL v0.9 style text
    /// errors) is still a recognized acknowledgment.
    Error {
        /// Parsed error code, if the response carried one.
        code: Option<u8>,
        /// The raw response text, preserved verbatim.
        raw: String,
    },
    /// Asynchronous alarm message, not tied to any in-flight line
    ///
    /// The code is `None` when the numeric part overflows the catalog's
    /// code range; the message still classifies as an alarm.
    Alarm {
        /// Parsed alarm code, if it fits the catalog's range.
        code: Option<u8>,
        /// The raw response text, preserved verbatim.
        raw: String,
    },
    /// `<...>` status report frame produced by `?` polling
    Report {
        /// The raw report text, preserved verbatim.
        raw: String,
    },
}

impl DeviceResponse {
    /// Classify a line of device output
    ///
    /// Matching is case-insensitive on the leading token. Returns `None`
    /// when the line matches none of the recognized forms.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let lower = line.to_ascii_lowercase();

        if lower.starts_with("ok") {
            return Some(DeviceResponse::Ok);
        }

        if lower.starts_with("error") {
            let code = lower
                .strip_prefix("error:")
                .and_then(|rest| parse_leading_u8(rest));
            return Some(DeviceResponse::Error {
                code,
                raw: line.to_string(),
            });
        }

        if let Some(rest) = lower.strip_prefix("alarm:") {
            if !leading_digits(rest).is_empty() {
                return Some(DeviceResponse::Alarm {
                    code: parse_leading_u8(rest),
                    raw: line.to_string(),
                });
            }
            return None;
        }

        if line.starts_with('<') && line.ends_with('>') {
            return Some(DeviceResponse::Report {
                raw: line.to_string(),
            });
        }

        None
    }

    /// True for responses that resolve the oldest in-flight line
    pub fn is_ack(&self) -> bool {
        matches!(self, DeviceResponse::Ok | DeviceResponse::Error { .. })
    }

    /// Human-readable description, resolved through the code catalog
    ///
    /// Unknown codes degrade to a generic description; an `error` without a
    /// code falls back to the raw response text.
    pub fn description(&self) -> String {
        match self {
            DeviceResponse::Ok => "ok".to_string(),
            DeviceResponse::Error {
                code: Some(code), ..
            } => catalog::describe_error(*code),
            DeviceResponse::Error { code: None, raw } => raw.clone(),
            DeviceResponse::Alarm {
                code: Some(code), ..
            } => catalog::describe_alarm(*code),
            DeviceResponse::Alarm { code: None, raw } => raw.clone(),
            DeviceResponse::Report { raw } => raw.clone(),
        }
    }
}

impl fmt::Display for DeviceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error {
                code: Some(code), ..
            } => write!(f, "error:{} - {}", code, catalog::describe_error(*code)),
            Self::Error { code: None, raw } => write!(f, "{}", raw),
            Self::Alarm {
                code: Some(code), ..
            } => {
                write!(f, "ALARM:{} - {}", code, catalog::describe_alarm(*code))
            }
            Self::Alarm { code: None, raw } => write!(f, "{}", raw),
            Self::Report { raw } => write!(f, "{}", raw),
        }
    }
}

/// The run of decimal digits at the start of `s`
fn leading_digits(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

/// Parse the decimal digits at the start of `s`, ignoring any trailing text
///
/// `None` when there are no digits or the value overflows `u8`.
fn parse_leading_u8(s: &str) -> Option<u8> {
    let digits = leading_digits(s);
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u8>().ok()
}
