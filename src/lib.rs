//! Syslog Forwarder Library
//!
//! Receives BSD-style syslog messages over UDP and TCP on a shared port,
//! extracts their fields and forwards each one as a JSON record to an HTTP
//! log-ingestion endpoint.

pub mod config;
pub mod collector;
pub mod log_parser;
pub mod pipeline;
pub mod record;
pub mod transport;
pub mod errors;

pub use config::Config;
pub use collector::{ConnectionStrategy, ConnectionWorker, ListenerState, SyslogCollector, TaskPerConnection};
pub use log_parser::ParsedSyslogEntry;
pub use pipeline::{Pipeline, ProcessOutcome, Transport};
pub use record::{LogRecord, Severity, severity_name};
pub use transport::{Forwarder, HttpForwarder};
pub use errors::{CollectorError, Result};
