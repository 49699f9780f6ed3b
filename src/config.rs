//! Configuration management for the syslog forwarder

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON ingestion endpoint the records are POSTed to
    pub endpoint_url: String,

    /// Basic-auth user for the endpoint
    pub username: String,

    /// Basic-auth password for the endpoint
    pub password: String,

    /// Verify the endpoint's TLS certificate
    pub verify_tls: bool,

    /// Address both syslog sockets bind to
    pub bind_address: IpAddr,

    /// Port shared by the UDP and TCP sockets
    pub port: u16,

    /// Pending connection queue depth for the TCP listener
    pub tcp_backlog: u32,

    /// Size of a single datagram / stream read
    pub recv_buffer_size: usize,

    /// HTTP timeout for endpoint requests
    pub http_timeout: Duration,

    /// Tag written into every record's `device_type`
    pub device_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:5080/api/default/gpon_logs/_json".to_string(),
            username: String::new(),
            password: String::new(),
            verify_tls: false,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 514,
            tcp_backlog: 5,
            recv_buffer_size: 4096,
            http_timeout: Duration::from_secs(10),
            device_type: "PON".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("tcp_backlog", &self.tcp_backlog)
            .field("recv_buffer_size", &self.recv_buffer_size)
            .field("http_timeout", &self.http_timeout)
            .field("device_type", &self.device_type)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("OPENOBSERVE_URL") {
            config.endpoint_url = url;
        }

        if let Some(username) = lookup("OPENOBSERVE_USERNAME") {
            config.username = username;
        }

        if let Some(password) = lookup("OPENOBSERVE_PASSWORD") {
            config.password = password;
        }

        if let Some(verify) = lookup("VERIFY_SSL") {
            config.verify_tls = matches!(verify.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Some(host) = lookup("SYSLOG_HOST") {
            if let Ok(addr) = host.trim().parse() {
                config.bind_address = addr;
            }
        }

        if let Some(port) = lookup("SYSLOG_PORT") {
            if let Ok(port) = port.trim().parse() {
                config.port = port;
            }
        }

        if let Some(backlog) = lookup("SYSLOG_TCP_BACKLOG") {
            if let Ok(backlog) = backlog.trim().parse() {
                config.tcp_backlog = backlog;
            }
        }

        if let Some(size) = lookup("SYSLOG_RECV_BUFFER_SIZE") {
            if let Ok(size) = size.trim().parse() {
                config.recv_buffer_size = size;
            }
        }

        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.trim().parse::<u64>() {
                config.http_timeout = Duration::from_secs(seconds);
            }
        }

        if let Some(device_type) = lookup("DEVICE_TYPE") {
            config.device_type = device_type;
        }

        config
    }

    /// Socket address both listeners bind to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint_url.is_empty() {
            return Err("endpoint_url cannot be empty".to_string());
        }

        if let Err(e) = reqwest::Url::parse(&self.endpoint_url) {
            return Err(format!("endpoint_url '{}' is not a valid URL: {}", self.endpoint_url, e));
        }

        if self.username.is_empty() {
            return Err("username cannot be empty".to_string());
        }

        if self.tcp_backlog == 0 {
            return Err("tcp_backlog must be greater than 0".to_string());
        }

        if self.recv_buffer_size == 0 {
            return Err("recv_buffer_size must be greater than 0".to_string());
        }

        if self.http_timeout.is_zero() {
            return Err("http_timeout must be greater than 0".to_string());
        }

        if self.device_type.is_empty() {
            return Err("device_type cannot be empty".to_string());
        }

        Ok(())
    }
}
