//! Outbound record model and syslog severity names

use crate::log_parser::ParsedSyslogEntry;
use serde::{Deserialize, Serialize};

/// Device class tag used when none is configured
pub const DEFAULT_DEVICE_TYPE: &str = "PON";

/// Returned by [`severity_name`] for codes outside 0-7
pub const UNKNOWN_SEVERITY: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Informational,
    Debug,
}

impl Severity {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Severity::Emergency),
            1 => Some(Severity::Alert),
            2 => Some(Severity::Critical),
            3 => Some(Severity::Error),
            4 => Some(Severity::Warning),
            5 => Some(Severity::Notice),
            6 => Some(Severity::Informational),
            7 => Some(Severity::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "emerg",
            Severity::Alert => "alert",
            Severity::Critical => "crit",
            Severity::Error => "err",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Informational => "info",
            Severity::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Textual name of a numeric syslog severity
pub fn severity_name(code: u32) -> &'static str {
    Severity::from_code(code)
        .map(|severity| severity.as_str())
        .unwrap_or(UNKNOWN_SEVERITY)
}

/// JSON object accepted by the ingestion endpoint.
///
/// The syslog timestamp is intentionally not part of the record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    pub level: String,
    pub job: String,
    pub message: String,
    pub hostname: String,
    pub facility: u32,
    pub device_type: String,
}

impl LogRecord {
    /// Build a record from a parsed entry.
    ///
    /// `job` is the program tag, or the hostname when the tag is empty.
    pub fn from_entry(entry: &ParsedSyslogEntry, device_type: &str) -> Self {
        let job = if entry.program.is_empty() {
            entry.hostname.clone()
        } else {
            entry.program.clone()
        };

        Self {
            level: severity_name(entry.severity).to_string(),
            job,
            message: entry.message.clone(),
            hostname: entry.hostname.clone(),
            facility: entry.facility,
            device_type: device_type.to_string(),
        }
    }
}
