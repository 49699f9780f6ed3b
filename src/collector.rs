//! Dual-transport syslog listener
//!
//! One UDP socket and one TCP listener share the configured port. A single
//! `select!` waits on both; datagrams are processed inline on the listener
//! task, accepted connections are handed to a [`ConnectionStrategy`].

use crate::config::Config;
use crate::errors::{CollectorError, Result};
use crate::pipeline::{Pipeline, Transport};
use crate::transport::Forwarder;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream, UdpSocket};
use tracing::{debug, error, info, instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Initializing,
    Running,
    Draining,
    Stopped,
}

/// Decides how an accepted connection gets its worker scheduled.
pub trait ConnectionStrategy: Send + Sync {
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr, worker: ConnectionWorker);
}

/// One detached task per connection, no upper bound
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskPerConnection;

impl ConnectionStrategy for TaskPerConnection {
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr, worker: ConnectionWorker) {
        tokio::spawn(async move {
            worker.run(stream, peer).await;
        });
    }
}

/// Reads one TCP connection until the peer closes it.
///
/// Every successful read is treated as one complete message; no reassembly
/// happens across reads.
#[derive(Clone)]
pub struct ConnectionWorker {
    pipeline: Pipeline,
    read_buffer_size: usize,
}

impl ConnectionWorker {
    pub fn new(pipeline: Pipeline, read_buffer_size: usize) -> Self {
        Self {
            pipeline,
            read_buffer_size,
        }
    }

    #[instrument(skip_all, fields(peer = %peer))]
    pub async fn run<S>(self, stream: S, peer: SocketAddr)
    where
        S: AsyncRead + Unpin,
    {
        info!("New TCP connection from {}", peer);

        if let Err(e) = self.serve(stream, peer).await {
            error!("Error handling TCP connection from {}: {}", peer, e);
        }

        info!("TCP connection from {} closed", peer);
    }

    /// Process reads until EOF; returns how many messages were read.
    pub async fn serve<S>(&self, mut stream: S, peer: SocketAddr) -> Result<usize>
    where
        S: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.read_buffer_size];
        let mut messages = 0;

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            messages += 1;
            self.pipeline.process(&buf[..n], peer, Transport::Tcp).await;
        }

        Ok(messages)
    }
}

/// Bound UDP + TCP sockets plus everything needed to serve them
pub struct SyslogCollector {
    config: Config,
    udp: UdpSocket,
    tcp: TcpListener,
    pipeline: Pipeline,
    strategy: Arc<dyn ConnectionStrategy>,
    state: ListenerState,
}

impl SyslogCollector {
    /// Bind both sockets.
    ///
    /// The TCP listener is bound first; when the configured port is 0 the UDP
    /// socket reuses whatever port TCP was given so both still share one.
    pub async fn bind(config: Config, forwarder: Arc<dyn Forwarder>) -> Result<Self> {
        config.validate().map_err(CollectorError::Config)?;
        let addr = config.listen_addr();

        let tcp_err = |source| CollectorError::Bind {
            transport: "tcp",
            addr,
            source,
        };
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(tcp_err)?;
        socket.set_reuseaddr(true).map_err(tcp_err)?;
        socket.bind(addr).map_err(tcp_err)?;
        let tcp = socket.listen(config.tcp_backlog).map_err(tcp_err)?;

        let tcp_addr = tcp.local_addr()?;
        info!("Listening for syslog messages on TCP {}", tcp_addr);

        let udp_addr = SocketAddr::new(addr.ip(), tcp_addr.port());
        let udp = UdpSocket::bind(udp_addr)
            .await
            .map_err(|source| CollectorError::Bind {
                transport: "udp",
                addr: udp_addr,
                source,
            })?;
        info!("Listening for syslog messages on UDP {}", udp.local_addr()?);

        let pipeline = Pipeline::new(forwarder, &config.device_type);

        Ok(Self {
            config,
            udp,
            tcp,
            pipeline,
            strategy: Arc::new(TaskPerConnection),
            state: ListenerState::Initializing,
        })
    }

    /// Replace the default task-per-connection scheduling
    pub fn with_strategy(mut self, strategy: Arc<dyn ConnectionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn tcp_local_addr(&self) -> Result<SocketAddr> {
        Ok(self.tcp.local_addr()?)
    }

    pub fn udp_local_addr(&self) -> Result<SocketAddr> {
        Ok(self.udp.local_addr()?)
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to wait for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` completes, then close both sockets.
    ///
    /// Connection workers already running are left to finish on their own.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.transition(ListenerState::Running);

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                result = self.udp.recv_from(&mut buf) => match result {
                    Ok((len, peer)) => {
                        debug!("Received {} byte datagram from {}", len, peer);
                        self.pipeline.process(&buf[..len], peer, Transport::Udp).await;
                    }
                    Err(e) => error!("UDP receive error: {}", e),
                },
                result = self.tcp.accept() => match result {
                    Ok((stream, peer)) => {
                        let worker = ConnectionWorker::new(
                            self.pipeline.clone(),
                            self.config.recv_buffer_size,
                        );
                        self.strategy.dispatch(stream, peer, worker);
                    }
                    Err(e) => error!("TCP accept error: {}", e),
                },
            }
        }

        self.transition(ListenerState::Draining);
        let SyslogCollector { udp, tcp, .. } = self;
        drop(udp);
        drop(tcp);
        debug!("Listener state {:?} -> {:?}", ListenerState::Draining, ListenerState::Stopped);
        info!("Syslog sockets closed");

        Ok(())
    }

    fn transition(&mut self, next: ListenerState) {
        debug!("Listener state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
