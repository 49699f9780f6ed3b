//! Per-message processing: parse, build the record, forward it
//!
//! This is the single place where parse and delivery failures are handled.
//! Both are logged and turned into a [`ProcessOutcome`]; nothing here returns
//! an error to the caller, so one bad message cannot stop a socket loop.

use crate::log_parser;
use crate::record::LogRecord;
use crate::transport::Forwarder;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which socket a message arrived on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Udp => write!(f, "UDP"),
            Transport::Tcp => write!(f, "TCP"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    Forwarded,
    Unparsed,
    DeliveryFailed,
}

#[derive(Clone)]
pub struct Pipeline {
    forwarder: Arc<dyn Forwarder>,
    device_type: Arc<str>,
}

impl Pipeline {
    pub fn new(forwarder: Arc<dyn Forwarder>, device_type: &str) -> Self {
        Self {
            forwarder,
            device_type: Arc::from(device_type),
        }
    }

    /// Run one raw message through parse -> build -> forward.
    pub async fn process(&self, raw: &[u8], peer: SocketAddr, transport: Transport) -> ProcessOutcome {
        let text = String::from_utf8_lossy(raw);
        let message = text.trim();

        let entry = match log_parser::parse(message) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "Could not parse {} syslog message from {}: {}",
                    transport, peer, e
                );
                return ProcessOutcome::Unparsed;
            }
        };

        let record = LogRecord::from_entry(&entry, &self.device_type);

        match self.forwarder.forward(&record).await {
            Ok(()) => {
                info!("Forwarded {} message from {}", transport, peer);
                ProcessOutcome::Forwarded
            }
            Err(e) => {
                error!(
                    "Error sending {} message from {} to endpoint: {}",
                    transport, peer, e
                );
                ProcessOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::{CollectorError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Forwarder stub that records every call
    #[derive(Default)]
    pub(crate) struct RecordingForwarder {
        records: Mutex<Vec<LogRecord>>,
        fail: bool,
    }

    impl RecordingForwarder {
        pub(crate) fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub(crate) fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }

        pub(crate) fn calls(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Forwarder for RecordingForwarder {
        async fn forward(&self, record: &LogRecord) -> Result<()> {
            self.records.lock().unwrap().push(record.clone());
            if self.fail {
                Err(CollectorError::Delivery("Endpoint server error 500: boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn peer() -> SocketAddr {
        "192.0.2.10:40514".parse().unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_record() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let pipeline = Pipeline::new(forwarder.clone(), "PON");

        let outcome = pipeline
            .process(b"<134>Jan 5 10:00:00 ont-42 pppd: link down\n", peer(), Transport::Udp)
            .await;

        assert_eq!(outcome, ProcessOutcome::Forwarded);
        assert_eq!(
            forwarder.records(),
            vec![LogRecord {
                level: "info".to_string(),
                job: "pppd".to_string(),
                message: "link down".to_string(),
                hostname: "ont-42".to_string(),
                facility: 16,
                device_type: "PON".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_unparsed_messages_never_reach_forwarder() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let pipeline = Pipeline::new(forwarder.clone(), "PON");

        for raw in [
            &b""[..],
            &b"   \r\n"[..],
            &b"Jan 5 10:00:00 ont-42 pppd: no priority"[..],
            &b"<134>not a syslog line"[..],
            &b"<x>Jan 5 10:00:00 ont-42 pppd: bad pri"[..],
            &b"\xff\xfe\xfd"[..],
        ] {
            let outcome = pipeline.process(raw, peer(), Transport::Tcp).await;
            assert_eq!(outcome, ProcessOutcome::Unparsed);
        }

        assert_eq!(forwarder.calls(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_contained() {
        let forwarder = Arc::new(RecordingForwarder::failing());
        let pipeline = Pipeline::new(forwarder.clone(), "PON");

        let first = pipeline
            .process(b"<11>Jan 5 10:00:00 olt-1 alarm: los", peer(), Transport::Udp)
            .await;
        let second = pipeline
            .process(b"<14>Jan 5 10:00:01 olt-1 alarm: los cleared", peer(), Transport::Udp)
            .await;

        assert_eq!(first, ProcessOutcome::DeliveryFailed);
        assert_eq!(second, ProcessOutcome::DeliveryFailed);
        assert_eq!(forwarder.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced_not_fatal() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let pipeline = Pipeline::new(forwarder.clone(), "ONT");

        let outcome = pipeline
            .process(b"<13>Jan 5 10:00:00 ont-9 app: caf\xe9", peer(), Transport::Udp)
            .await;

        assert_eq!(outcome, ProcessOutcome::Forwarded);
        let records = forwarder.records();
        assert_eq!(records[0].message, "caf\u{fffd}");
        assert_eq!(records[0].device_type, "ONT");
        assert_eq!(records[0].level, "notice");
    }
}
