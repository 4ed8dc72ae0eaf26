//! Bridge error types
//!
//! Error type shared across the codec and server modules.

/// Error type for bridge operations
#[derive(Debug)]
pub enum BridgeError {
    /// Underlying socket I/O failure
    Io(std::io::Error),
    /// Buffer too short to hold a full wire record
    TruncatedRecord {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },
}

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Io(e) => write!(f, "I/O error: {}", e),
            BridgeError::TruncatedRecord { expected, actual } => {
                write!(
                    f,
                    "Truncated wire record: need {} bytes, have {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::Io(e)
    }
}
