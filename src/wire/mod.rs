//! Wire record codec
//!
//! This module provides:
//! - The fixed 32-byte binary pose record sent to the client
//! - Quaternion normalization applied before encoding
//! - Encode/decode helpers over `bytes` buffers

pub mod record;

pub use record::{normalize_quaternion, PoseSample, WireRecord, WIRE_RECORD_LEN};
