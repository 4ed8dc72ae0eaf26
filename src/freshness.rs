//! Freshness tracking
//!
//! Holds the last known pose and decides, once per main-loop tick, whether
//! the feed has gone stale and a synthetic keep-alive record must be sent.
//! Timestamps are 32-bit microsecond counters; elapsed time uses wrapping
//! subtraction so the comparison stays correct across counter wraparound
//! (roughly every 71.6 minutes).

use std::time::Instant;

use crate::wire::PoseSample;

/// Sensor id reserved for synthesized keep-alive records
pub const SYNTHETIC_SENSOR: i32 = 0;

/// Default staleness threshold in microseconds
pub const DEFAULT_STALENESS_US: u32 = 10_000;

/// Monotonic microsecond counter truncated to 32 bits
///
/// Mirrors the upstream feed's microsecond wall counter: the value wraps
/// at `u32::MAX` and only differences between nearby readings are
/// meaningful.
#[derive(Debug, Clone)]
pub struct MicroClock {
    epoch: Instant,
}

impl MicroClock {
    /// Create a clock anchored at the current instant
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Microseconds since the epoch, modulo 2^32
    pub fn now(&self) -> u32 {
        (self.epoch.elapsed().as_micros() & u32::MAX as u128) as u32
    }
}

impl Default for MicroClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Last-known pose and staleness bookkeeping
///
/// Updated by the tracking callback path and read by the main loop; owned
/// explicitly rather than living in process-wide state so both sides can
/// be exercised in unit tests.
#[derive(Debug, Clone)]
pub struct FreshnessState {
    last_position: [f64; 3],
    last_orientation: [f64; 4],
    last_update_us: u32,
    threshold_us: u32,
}

impl FreshnessState {
    /// Create freshness state from an initial pose
    ///
    /// The initial pose is reported for the tracked object until the
    /// source first delivers a real update.
    pub fn new(threshold_us: u32, initial: &PoseSample, now_us: u32) -> Self {
        Self {
            last_position: initial.position,
            last_orientation: initial.orientation,
            last_update_us: now_us,
            threshold_us,
        }
    }

    /// Record a real tracker update
    pub fn update(&mut self, sample: &PoseSample, now_us: u32) {
        self.last_position = sample.position;
        self.last_orientation = sample.orientation;
        self.last_update_us = now_us;
    }

    /// Microseconds since the last update, wraparound-safe
    pub fn elapsed(&self, now_us: u32) -> u32 {
        now_us.wrapping_sub(self.last_update_us)
    }

    /// Decide whether a synthetic keep-alive record is due
    ///
    /// Returns the sample to synthesize when strictly more than the
    /// threshold has elapsed since the last update, and resets the
    /// timestamp so the keep-alive fires on a steady cadence rather than
    /// every subsequent tick.
    pub fn check(&mut self, now_us: u32) -> Option<PoseSample> {
        if self.elapsed(now_us) <= self.threshold_us {
            return None;
        }

        self.last_update_us = now_us;

        Some(PoseSample {
            timestamp: f64::from(now_us),
            sensor: SYNTHETIC_SENSOR,
            position: self.last_position,
            orientation: self.last_orientation,
        })
    }

    /// Configured staleness threshold in microseconds
    pub fn threshold_us(&self) -> u32 {
        self.threshold_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(now_us: u32) -> FreshnessState {
        FreshnessState::new(DEFAULT_STALENESS_US, &PoseSample::identity(), now_us)
    }

    #[test]
    fn test_fresh_within_threshold() {
        let mut state = state_at(1_000);
        assert!(state.check(1_000 + DEFAULT_STALENESS_US).is_none());
    }

    #[test]
    fn test_fires_past_threshold() {
        let mut state = state_at(1_000);
        let sample = state.check(1_000 + DEFAULT_STALENESS_US + 1).unwrap();

        assert_eq!(sample.sensor, SYNTHETIC_SENSOR);
        assert_eq!(sample.position, [0.0; 3]);
        assert_eq!(sample.orientation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_fires_exactly_once() {
        let mut state = state_at(0);
        let now = DEFAULT_STALENESS_US + 1;

        assert!(state.check(now).is_some());
        // Timestamp was reset; the very next tick must not re-fire.
        assert!(state.check(now).is_none());
        assert!(state.check(now + DEFAULT_STALENESS_US).is_none());
        assert!(state.check(now + DEFAULT_STALENESS_US + 1).is_some());
    }

    #[test]
    fn test_update_resets_and_stores_pose() {
        let mut state = state_at(0);
        let sample = PoseSample::new(1.0, 4, [1.0, 2.0, 3.0], [0.0, 1.0, 0.0, 0.0]);

        state.update(&sample, 5_000);
        assert!(state.check(5_000 + DEFAULT_STALENESS_US).is_none());

        let synth = state.check(5_000 + DEFAULT_STALENESS_US + 1).unwrap();
        assert_eq!(synth.position, sample.position);
        assert_eq!(synth.orientation, sample.orientation);
        assert_eq!(synth.sensor, SYNTHETIC_SENSOR);
    }

    #[test]
    fn test_wraparound_elapsed() {
        let state = FreshnessState::new(
            DEFAULT_STALENESS_US,
            &PoseSample::identity(),
            u32::MAX - 100,
        );

        // Counter wrapped between the update and the observation.
        assert_eq!(state.elapsed(50), 151);
    }

    #[test]
    fn test_wraparound_fires() {
        let mut state = FreshnessState::new(
            DEFAULT_STALENESS_US,
            &PoseSample::identity(),
            u32::MAX - 100,
        );

        assert!(state.check(9_899).is_none());
        assert!(state.check(9_901).is_some());
    }
}
