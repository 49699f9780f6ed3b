//! BSD-style syslog line parsing
//!
//! Accepts lines of the form `<PRI>Mon D HH:MM:SS HOSTNAME PROGRAM: MESSAGE`.
//! The structural fields and the priority are extracted independently and
//! both must succeed for an entry to be produced.

use crate::errors::{CollectorError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Fields recovered from one syslog line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSyslogEntry {
    pub priority: u32,
    pub facility: u32,
    pub severity: u32,
    /// Captured as-is, never normalized
    pub timestamp: String,
    pub hostname: String,
    pub program: String,
    pub message: String,
}

fn syslog_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^<[0-9]+>(?P<timestamp>\w+ \d+ \d+:\d+:\d+) (?P<hostname>\S+) (?P<program>[^:]+): (?P<message>.+)",
        )
        .expect("syslog pattern is a valid regex")
    })
}

/// Parse one framed syslog message.
///
/// Returns [`CollectorError::Unparsed`] when the line does not have the
/// expected shape and [`CollectorError::InvalidPriority`] when the text
/// between `<` and `>` is not an integer.
pub fn parse(raw: &str) -> Result<ParsedSyslogEntry> {
    let captures = syslog_pattern()
        .captures(raw)
        .ok_or_else(|| CollectorError::Unparsed(raw.to_string()))?;

    let field = |name: &str| {
        captures
            .name(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    let priority = extract_priority(raw)?;

    Ok(ParsedSyslogEntry {
        priority,
        facility: priority / 8,
        severity: priority % 8,
        timestamp: field("timestamp"),
        hostname: field("hostname"),
        program: field("program"),
        message: field("message"),
    })
}

/// Read the integer between the first `<` and the following `>`.
///
/// No range check is applied; values above 191 still decode arithmetically.
pub fn extract_priority(raw: &str) -> Result<u32> {
    let open = raw
        .find('<')
        .ok_or_else(|| CollectorError::InvalidPriority(raw.to_string()))?;
    let rest = &raw[open + 1..];
    let close = rest
        .find('>')
        .ok_or_else(|| CollectorError::InvalidPriority(rest.to_string()))?;

    let pri = &rest[..close];
    pri.parse::<u32>()
        .map_err(|_| CollectorError::InvalidPriority(pri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let entry = parse("<134>Jan 5 10:00:00 ont-42 pppd: link down").unwrap();

        assert_eq!(entry.priority, 134);
        assert_eq!(entry.facility, 16);
        assert_eq!(entry.severity, 6);
        assert_eq!(entry.timestamp, "Jan 5 10:00:00");
        assert_eq!(entry.hostname, "ont-42");
        assert_eq!(entry.program, "pppd");
        assert_eq!(entry.message, "link down");
    }

    #[test]
    fn test_every_valid_priority_decodes() {
        for n in 0..=191u32 {
            let line = format!("<{}>Mar 17 03:04:05 olt-1 gponmgr: onu 3 up", n);
            let entry = parse(&line).unwrap();
            assert_eq!(entry.priority, n);
            assert_eq!(entry.facility, n / 8);
            assert_eq!(entry.severity, n % 8);
        }
    }

    #[test]
    fn test_priority_out_of_range_is_not_rejected() {
        let entry = parse("<999>Jan 5 10:00:00 host tag: body").unwrap();
        assert_eq!(entry.facility, 124);
        assert_eq!(entry.severity, 7);
    }

    #[test]
    fn test_priority_overflow_is_invalid() {
        let err = parse("<99999999999>Jan 5 10:00:00 host tag: body").unwrap_err();
        assert!(matches!(err, CollectorError::InvalidPriority(_)));
    }

    #[test]
    fn test_missing_priority_is_unparsed() {
        let err = parse("Jan 5 10:00:00 host tag: body").unwrap_err();
        assert!(matches!(err, CollectorError::Unparsed(_)));
    }

    #[test]
    fn test_malformed_structure_is_unparsed() {
        for line in [
            "",
            "<13>",
            "<13>hello world",
            "<13>Jan 5 10:00:00 host no colon here",
            "<13>2024-01-05T10:00:00Z host tag: body",
            "<abc>Jan 5 10:00:00 host tag: body",
            "<13>Jan 5 10:00:00 host tag:",
        ] {
            let err = parse(line).unwrap_err();
            assert!(err.is_parse_failure(), "expected parse failure for {:?}", line);
        }
    }

    #[test]
    fn test_program_may_contain_spaces() {
        let entry = parse("<30>Feb 11 23:59:01 ont-7 dhcp client: lease renewed").unwrap();
        assert_eq!(entry.program, "dhcp client");
        assert_eq!(entry.message, "lease renewed");
    }

    #[test]
    fn test_message_keeps_later_colons() {
        let entry = parse("<11>Jan 15 08:00:00 olt-2 alarm: los: port 1/1/3").unwrap();
        assert_eq!(entry.program, "alarm");
        assert_eq!(entry.message, "los: port 1/1/3");
    }

    #[test]
    fn test_message_stops_at_newline() {
        let entry = parse("<14>Jan 5 10:00:00 host app: first\nsecond").unwrap();
        assert_eq!(entry.message, "first");
    }

    #[test]
    fn test_extract_priority() {
        assert_eq!(extract_priority("<0>x").unwrap(), 0);
        assert_eq!(extract_priority("<191>x").unwrap(), 191);
        assert!(extract_priority("no delimiters").is_err());
        assert!(extract_priority("<12 unterminated").is_err());
        assert!(extract_priority("<>x").is_err());
    }
}
