//! Pose stream server
//!
//! Owns the background accept/serve loop and forwards wire records to the
//! single active client. One inbound connection is served at a time; the
//! next connection attempt is not serviced until the current client
//! disconnects.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::wire::WireRecord;

/// Single-client pose stream server
///
/// `start()` launches a background serve loop; `send()` is best-effort and
/// returns immediately when no client is connected. A `send` racing a
/// concurrent disconnect may legitimately fail; callers must tolerate
/// that, not treat it as fatal.
pub struct StreamServer {
    config: ServerConfig,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// State shared between the caller-facing handle and the serve loop
struct Shared {
    /// Serve loop is alive (cleared by the loop itself on fatal failure)
    running: AtomicBool,

    /// Stop request, observed by the serve loop at each poll boundary
    quit: AtomicBool,

    /// Write half of the active client connection, if any
    client: Mutex<Option<OwnedWriteHalf>>,

    /// Address the listener actually bound to
    local_addr: std::sync::Mutex<Option<SocketAddr>>,
}

impl StreamServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                quit: AtomicBool::new(false),
                client: Mutex::new(None),
                local_addr: std::sync::Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the background serve loop
    ///
    /// Idempotent: returns `true` without side effects when the loop is
    /// already running. Bind/listen failures happen inside the loop and
    /// leave the server reporting not-running.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;

        if self.shared.running.load(Ordering::SeqCst) {
            return true;
        }

        self.shared.quit.store(false, Ordering::SeqCst);
        self.shared.running.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        *task = Some(tokio::spawn(async move {
            serve_loop(shared, config).await;
        }));

        true
    }

    /// Stop the background serve loop
    ///
    /// Requests the loop to terminate and waits up to the configured stop
    /// timeout; if the loop has not acknowledged by then, the task is
    /// aborted and resources are reclaimed regardless. No-op when not
    /// running.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;

        let Some(mut handle) = task.take() else {
            return;
        };

        self.shared.quit.store(true, Ordering::SeqCst);

        if timeout(self.config.stop_timeout, &mut handle).await.is_err() {
            tracing::warn!("Serve loop did not stop in time, aborting task");
            handle.abort();
        }

        self.shared.running.store(false, Ordering::SeqCst);
        *self.shared.client.lock().await = None;
        *self.shared.local_addr.lock().unwrap() = None;
    }

    /// Send a wire record to the connected client, best-effort
    ///
    /// Returns `false` immediately when no client is connected. When
    /// connected, writes the full record (partial writes are retried by
    /// `write_all`); an unrecoverable write error drops the client handle
    /// and returns `false`.
    pub async fn send(&self, record: &WireRecord) -> bool {
        let mut client = self.shared.client.lock().await;

        let Some(stream) = client.as_mut() else {
            return false;
        };

        match stream.write_all(&record.to_bytes()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Send failed, dropping client handle");
                *client = None;
                false
            }
        }
    }

    /// Whether the serve loop is running
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Whether a client is currently connected
    pub async fn is_connected(&self) -> bool {
        self.shared.client.lock().await.is_some()
    }

    /// Address the listener bound to, once listening
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.shared.local_addr.lock().unwrap()
    }
}

/// Background accept/serve loop
///
/// Serves one client at a time: poll for a connection (re-checking the
/// quit flag at a bounded interval), accept it, publish the write half for
/// `send()`, then drain inbound bytes purely to detect disconnection.
async fn serve_loop(shared: Arc<Shared>, config: ServerConfig) {
    let listener = match bind_listener(&shared, &config).await {
        Ok(listener) => listener,
        Err(e) => {
            // Fatal to the server: no retry across bind/listen failures.
            tracing::error!(addr = %config.bind_addr, error = %e, "Failed to bind listener");
            shared.running.store(false, Ordering::SeqCst);
            return;
        }
    };

    tracing::info!(addr = %config.bind_addr, "Pose stream server listening");

    'serve: loop {
        let (socket, peer_addr) = loop {
            if shared.quit.load(Ordering::SeqCst) {
                break 'serve;
            }

            match timeout(config.accept_poll_interval, listener.accept()).await {
                Ok(Ok(conn)) => break conn,
                Ok(Err(e)) => {
                    // Transient accept failure; keep listening.
                    tracing::warn!(error = %e, "Failed to accept connection");
                }
                Err(_) => {
                    // Poll interval elapsed; re-check the quit flag.
                }
            }
        };

        tracing::info!(peer = %peer_addr, "Client connected");

        if config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(error = %e, "Failed to set TCP_NODELAY");
            }
        }

        drain_client(&shared, &config, socket, peer_addr).await;

        // Invalidate any write half `send` may still be holding.
        *shared.client.lock().await = None;

        tracing::info!(peer = %peer_addr, "Client disconnected");

        if shared.quit.load(Ordering::SeqCst) {
            break;
        }
    }

    shared.running.store(false, Ordering::SeqCst);
    *shared.local_addr.lock().unwrap() = None;
    tracing::info!("Serve loop exited");
}

async fn bind_listener(shared: &Shared, config: &ServerConfig) -> Result<TcpListener> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    *shared.local_addr.lock().unwrap() = Some(listener.local_addr()?);
    Ok(listener)
}

/// Read-drain the client until it disconnects or a stop is requested
///
/// Inbound bytes carry no meaning; they are logged and discarded. The
/// read is the liveness signal: EOF or a read error ends the session.
async fn drain_client(
    shared: &Arc<Shared>,
    config: &ServerConfig,
    socket: TcpStream,
    peer_addr: SocketAddr,
) {
    let (mut read_half, write_half) = socket.into_split();
    *shared.client.lock().await = Some(write_half);

    let mut buf = vec![0u8; config.drain_buffer_size];

    loop {
        if shared.quit.load(Ordering::SeqCst) {
            return;
        }

        match timeout(config.accept_poll_interval, read_half.read(&mut buf)).await {
            Ok(Ok(0)) => {
                tracing::debug!(peer = %peer_addr, "Client closed connection");
                return;
            }
            Ok(Ok(n)) => {
                tracing::debug!(peer = %peer_addr, bytes = n, "Discarding inbound bytes");
            }
            Ok(Err(e)) => {
                tracing::warn!(peer = %peer_addr, error = %e, "Read failed, closing session");
                return;
            }
            Err(_) => {
                // Poll interval elapsed; re-check the quit flag.
            }
        }
    }
}
