//! trackbridge
//!
//! Bridges a motion-tracking data source to a single downstream consumer
//! over raw TCP, translating tracker update events into a stream of fixed
//! 32-byte binary pose records. When real updates stall for longer than a
//! configurable staleness threshold, the last known pose is re-sent as a
//! synthetic keep-alive record so the consumer always sees fresh data.
//!
//! The wire format is deliberately dumb: no framing, no negotiation, host
//! native byte order. A client connects and reads exactly 32 bytes per
//! record: `{timestamp: f32, sensor: i32, position: [f32; 3],
//! rotation: [f32; 4]}`, the rotation always normalized to unit length.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trackbridge::source::QueuedSource;
//! use trackbridge::{BridgeConfig, BridgeDriver, StreamServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = BridgeConfig::default();
//!
//!     let server = Arc::new(StreamServer::new(config.server.clone()));
//!     server.start().await;
//!
//!     let (feed, source) = QueuedSource::channel();
//!     // hand `feed` to whatever produces pose updates...
//!     # drop(feed);
//!
//!     let driver = BridgeDriver::new(source, Arc::clone(&server), &config);
//!     driver
//!         .run_until(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await;
//! }
//! ```

pub mod bridge;
pub mod error;
pub mod freshness;
pub mod server;
pub mod source;
pub mod wire;

pub use bridge::{BridgeConfig, BridgeDriver};
pub use error::{BridgeError, Result};
pub use freshness::{FreshnessState, MicroClock, SYNTHETIC_SENSOR};
pub use server::{ServerConfig, StreamServer};
pub use wire::{PoseSample, WireRecord, WIRE_RECORD_LEN};
