//! Error handling for telemetry reads and derivation.

/// A specialized `Result` type for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// The main error type for hardware telemetry operations.
///
/// Nothing here is fatal to a sampling loop: every variant degrades the
/// affected snapshot section for the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The platform or hardware cannot answer this query at all
    #[error("subsystem unsupported: {0}")]
    Unsupported(String),

    /// A normally working query failed this cycle; retried on the next one
    #[error("transient read failure: {0}")]
    Read(String),

    /// Raw counter or sensor text could not be parsed
    #[error("failed to parse telemetry: {0}")]
    Parse(String),
}

impl TelemetryError {
    /// Create a new unsupported-subsystem error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a new transient read error
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// True when the failure is permanent for this platform rather than
    /// something worth retrying next cycle.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
