//! Bridge driver
//!
//! Glues the tracking-source callback and the freshness timer to the
//! stream server: real updates are encoded and forwarded as they arrive,
//! and a synthetic keep-alive record is sent whenever the feed goes stale.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::freshness::{FreshnessState, MicroClock, DEFAULT_STALENESS_US};
use crate::server::{ServerConfig, StreamServer};
use crate::source::TrackingSource;
use crate::wire::{PoseSample, WireRecord};

/// Bridge configuration options
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Stream server configuration
    pub server: ServerConfig,

    /// Staleness threshold in microseconds before keep-alives fire
    pub staleness_threshold_us: u32,

    /// Pose reported until the source first delivers a real update
    pub initial_pose: PoseSample,

    /// Log every pose update and synthesized record at debug level
    pub log_poses: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            staleness_threshold_us: DEFAULT_STALENESS_US,
            initial_pose: PoseSample::identity(),
            log_poses: false,
        }
    }
}

impl BridgeConfig {
    /// Set the server configuration
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Set the staleness threshold in microseconds
    pub fn staleness_threshold_us(mut self, threshold_us: u32) -> Self {
        self.staleness_threshold_us = threshold_us;
        self
    }

    /// Set the initial pose
    pub fn initial_pose(mut self, pose: PoseSample) -> Self {
        self.initial_pose = pose;
        self
    }

    /// Enable per-pose debug logging
    pub fn log_poses(mut self) -> Self {
        self.log_poses = true;
        self
    }
}

/// Drives the tracking source and the freshness check
///
/// The source's callback stays synchronous and cheap: it only forwards
/// samples into a channel. The driver drains that channel on each loop
/// iteration, updates the freshness state, and performs the async sends.
/// Send failures are non-fatal and dropped silently.
pub struct BridgeDriver<S: TrackingSource> {
    source: S,
    server: Arc<StreamServer>,
    freshness: FreshnessState,
    clock: MicroClock,
    rx: mpsc::UnboundedReceiver<PoseSample>,
    log_poses: bool,
    frames: u64,
    seen_first: bool,
}

impl<S: TrackingSource> BridgeDriver<S> {
    /// Wire a tracking source to a stream server
    ///
    /// Registers the update handler on the source. The handler is
    /// unregistered again when `run_until` tears down.
    pub fn new(mut source: S, server: Arc<StreamServer>, config: &BridgeConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        source.register_handler(Box::new(move |sample| {
            // Receiver outlives the handler registration; a send only
            // fails during teardown, where the sample is moot anyway.
            let _ = tx.send(sample);
        }));

        let clock = MicroClock::new();
        let freshness = FreshnessState::new(
            config.staleness_threshold_us,
            &config.initial_pose,
            clock.now(),
        );

        Self {
            source,
            server,
            freshness,
            clock,
            rx,
            log_poses: config.log_poses,
            frames: 0,
            seen_first: false,
        }
    }

    /// Run the main loop until the shutdown future resolves
    ///
    /// On exit the server is stopped before the source handler is
    /// unregistered, so nothing sends through a half-torn-down pipeline.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown requested");
            }
            _ = self.pump() => {}
        }

        self.server.stop().await;
        self.source.unregister_handler();

        tracing::info!(frames = self.frames, "Bridge stopped");
    }

    async fn pump(&mut self) {
        loop {
            self.tick().await;
            tokio::task::yield_now().await;
        }
    }

    /// One main-loop iteration: pump the source, forward its updates,
    /// then run the freshness check
    async fn tick(&mut self) {
        self.source.step();

        while let Ok(sample) = self.rx.try_recv() {
            self.on_update(sample).await;
        }

        if let Some(sample) = self.freshness.check(self.clock.now()) {
            if self.log_poses {
                tracing::debug!(
                    position = ?sample.position,
                    orientation = ?sample.orientation,
                    "Synthesizing keep-alive record"
                );
            }
            let _ = self.server.send(&WireRecord::from_sample(&sample)).await;
        }
    }

    async fn on_update(&mut self, sample: PoseSample) {
        self.frames += 1;

        if !self.seen_first {
            self.seen_first = true;
            tracing::info!(
                sensor = sample.sensor,
                position = ?sample.position,
                orientation = ?sample.orientation,
                "Seen tracked object"
            );
        } else if self.log_poses {
            tracing::debug!(
                sensor = sample.sensor,
                position = ?sample.position,
                orientation = ?sample.orientation,
                "Tracker update"
            );
        }

        self.freshness.update(&sample, self.clock.now());

        // Best-effort delivery: a failed send just means this update was
        // not delivered.
        let _ = self.server.send(&WireRecord::from_sample(&sample)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::QueuedSource;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();

        assert_eq!(config.staleness_threshold_us, DEFAULT_STALENESS_US);
        assert_eq!(config.initial_pose, PoseSample::identity());
        assert!(!config.log_poses);
    }

    #[test]
    fn test_builder_chaining() {
        let pose = PoseSample::new(0.0, 0, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]);
        let config = BridgeConfig::default()
            .server(ServerConfig::with_addr("127.0.0.1:0".parse().unwrap()))
            .staleness_threshold_us(5_000)
            .initial_pose(pose)
            .log_poses();

        assert_eq!(config.server.bind_addr.port(), 0);
        assert_eq!(config.staleness_threshold_us, 5_000);
        assert_eq!(config.initial_pose, pose);
        assert!(config.log_poses);
    }

    #[tokio::test]
    async fn test_teardown_stops_server() {
        let config = BridgeConfig::default()
            .server(
                ServerConfig::with_addr("127.0.0.1:0".parse().unwrap())
                    .accept_poll_interval(Duration::from_millis(20))
                    .stop_timeout(Duration::from_secs(1)),
            );

        let server = Arc::new(StreamServer::new(config.server.clone()));
        assert!(server.start().await);

        let (_tx, source) = QueuedSource::channel();
        let driver = BridgeDriver::new(source, Arc::clone(&server), &config);

        driver
            .run_until(tokio::time::sleep(Duration::from_millis(100)))
            .await;

        assert!(!server.is_running());
    }
}
