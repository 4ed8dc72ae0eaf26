//! Fixed-layout binary pose records
//!
//! Each record is exactly 32 bytes, packed with no padding, in host-native
//! byte order: `{timestamp: f32, sensor: i32, position: [f32; 3],
//! rotation: [f32; 4]}`. There is no length prefix or framing; a client
//! reads exactly 32 bytes per record.

use bytes::{Buf, BufMut};

use crate::error::{BridgeError, Result};

/// Size of an encoded wire record in bytes
pub const WIRE_RECORD_LEN: usize = 32;

/// A pose update from the tracking source
///
/// Carries the source's full double precision; narrowing to `f32` happens
/// at encode time. Orientation is a quaternion in `[x, y, z, w]` order and
/// is not required to be normalized here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Time of the update in seconds
    pub timestamp: f64,

    /// Sensor number (0 is reserved for synthesized keep-alive records)
    pub sensor: i32,

    /// Position vector
    pub position: [f64; 3],

    /// Orientation quaternion, `[x, y, z, w]`
    pub orientation: [f64; 4],
}

impl PoseSample {
    /// Create a new sample
    pub fn new(timestamp: f64, sensor: i32, position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            timestamp,
            sensor,
            position,
            orientation,
        }
    }

    /// Sample at the origin with a w=1 quaternion, sensor 0, time 0
    pub fn identity() -> Self {
        Self::new(0.0, 0, [0.0; 3], [0.0, 0.0, 0.0, 1.0])
    }
}

impl Default for PoseSample {
    fn default() -> Self {
        Self::identity()
    }
}

/// Normalize a quaternion to unit length, narrowing to `f32`
///
/// The squared-magnitude sum is accumulated in `f64` before narrowing.
/// A zero-magnitude input divides by zero and produces NaN components;
/// this is not detected or corrected and propagates into the encoded
/// record.
pub fn normalize_quaternion(q: [f64; 4]) -> [f32; 4] {
    let sum: f64 = q.iter().map(|c| c * c).sum();
    let scale = 1.0 / sum.sqrt();

    [
        (q[0] * scale) as f32,
        (q[1] * scale) as f32,
        (q[2] * scale) as f32,
        (q[3] * scale) as f32,
    ]
}

/// Fixed 32-byte binary pose record
///
/// Constructed fresh per send and never mutated after encoding. The
/// rotation field always holds the normalized quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireRecord {
    /// Time in seconds
    pub timestamp: f32,

    /// Sensor number
    pub sensor: i32,

    /// Position vector
    pub position: [f32; 3],

    /// Orientation quaternion, unit norm for nonzero input
    pub rotation: [f32; 4],
}

impl WireRecord {
    /// Build a record from a pose sample, normalizing the orientation
    ///
    /// This is the single normalization path for both real tracker events
    /// and synthesized fallback data.
    pub fn from_sample(sample: &PoseSample) -> Self {
        Self {
            timestamp: sample.timestamp as f32,
            sensor: sample.sensor,
            position: [
                sample.position[0] as f32,
                sample.position[1] as f32,
                sample.position[2] as f32,
            ],
            rotation: normalize_quaternion(sample.orientation),
        }
    }

    /// Encode into a buffer in host-native byte order
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_f32_ne(self.timestamp);
        buf.put_i32_ne(self.sensor);
        for p in self.position {
            buf.put_f32_ne(p);
        }
        for r in self.rotation {
            buf.put_f32_ne(r);
        }
    }

    /// Encode into a fixed-size byte array
    pub fn to_bytes(&self) -> [u8; WIRE_RECORD_LEN] {
        let mut bytes = [0u8; WIRE_RECORD_LEN];
        let mut slice = &mut bytes[..];
        self.encode(&mut slice);
        bytes
    }

    /// Decode a record from a buffer
    ///
    /// Fails if fewer than [`WIRE_RECORD_LEN`] bytes are available.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < WIRE_RECORD_LEN {
            return Err(BridgeError::TruncatedRecord {
                expected: WIRE_RECORD_LEN,
                actual: buf.len(),
            });
        }

        let timestamp = buf.get_f32_ne();
        let sensor = buf.get_i32_ne();
        let position = [buf.get_f32_ne(), buf.get_f32_ne(), buf.get_f32_ne()];
        let rotation = [
            buf.get_f32_ne(),
            buf.get_f32_ne(),
            buf.get_f32_ne(),
            buf.get_f32_ne(),
        ];

        Ok(Self {
            timestamp,
            sensor,
            position,
            rotation,
        })
    }
}
