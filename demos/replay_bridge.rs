//! Replay bridge demo
//!
//! Run with: cargo run --example replay_bridge [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example replay_bridge                  # binds to 0.0.0.0:3010
//!   cargo run --example replay_bridge 127.0.0.1:3011   # binds to 127.0.0.1:3011
//!
//! Serves a synthetic tracked object moving in a slow circle, standing in
//! for a real tracking feed. Connect a client and read 32-byte pose
//! records:
//!
//!   ncat localhost 3010 | xxd
//!
//! Stop with Ctrl-C. Set RUST_LOG=debug to see per-record logging.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use trackbridge::source::QueuedSource;
use trackbridge::{BridgeConfig, BridgeDriver, PoseSample, ServerConfig, StreamServer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:3010".into())
        .parse()
        .expect("invalid bind address");

    let config = BridgeConfig::default().server(ServerConfig::with_addr(bind_addr));

    let server = Arc::new(StreamServer::new(config.server.clone()));
    if !server.start().await {
        tracing::error!("Failed to start stream server");
        return;
    }

    let (feed, source) = QueuedSource::channel();

    // Stand-in tracking feed: one sensor circling the origin at 100 Hz.
    tokio::spawn(async move {
        let mut t = 0.0f64;
        loop {
            let sample = PoseSample::new(
                t,
                1,
                [t.cos(), 1.0, t.sin()],
                [0.0, (t / 2.0).sin(), 0.0, (t / 2.0).cos()],
            );
            if feed.send(sample).is_err() {
                break;
            }
            t += 0.01;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let driver = BridgeDriver::new(source, Arc::clone(&server), &config);
    driver
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
}
