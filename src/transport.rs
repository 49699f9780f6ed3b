//! HTTP transport for delivering records to the ingestion endpoint

use crate::config::Config;
use crate::errors::{CollectorError, Result};
use crate::record::LogRecord;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Delivers one record to wherever logs are collected.
///
/// Implementations make a single attempt; failures are returned, not retried.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, record: &LogRecord) -> Result<()>;
}

/// POSTs each record as a one-element JSON array with basic auth
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: Client,
    endpoint_url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl HttpForwarder {
    /// Create a new HTTP forwarder
    pub fn new(
        endpoint_url: String,
        username: String,
        password: String,
        verify_tls: bool,
        http_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(format!("syslog_forwarder/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CollectorError::Http)?;

        Ok(Self {
            client,
            endpoint_url,
            username,
            password,
            timeout: http_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.endpoint_url.clone(),
            config.username.clone(),
            config.password.clone(),
            config.verify_tls,
            config.http_timeout,
        )
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Handle the HTTP response from the endpoint
    async fn handle_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            debug!("Record accepted by {} ({})", self.endpoint_url, status);
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        let error_message = match status.as_u16() {
            400 => format!("Bad request: {}", error_body),
            401 => format!("Unauthorized: {}", error_body),
            403 => format!("Forbidden: {}", error_body),
            404 => format!("Endpoint not found: {}", error_body),
            413 => format!("Record too large: {}", error_body),
            429 => format!("Rate limited: {}", error_body),
            500..=599 => format!("Endpoint server error {}: {}", status, error_body),
            _ => format!("Unexpected response {}: {}", status, error_body),
        };

        Err(CollectorError::Delivery(error_message))
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, record: &LogRecord) -> Result<()> {
        let body = serde_json::to_vec(std::slice::from_ref(record))?;

        let request = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.username, Some(&self.password))
            .body(body);

        let response = timeout(self.timeout, request.send())
            .await
            .map_err(|_| CollectorError::Timeout)?
            .map_err(CollectorError::from)?;

        self.handle_response(response).await
    }
}
