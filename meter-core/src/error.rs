use thiserror::Error;

/// Main error type for meter telemetry operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Channel index {index} out of range (channel count: {count})")]
    ChannelOutOfRange { index: usize, count: usize },

    #[error("Interval index {index} out of range (interval count: {count})")]
    IntervalOutOfRange { index: usize, count: usize },

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unknown quantity type: {0}")]
    UnknownQuantityType(u8),

    #[error("Invalid {kind} value: {value}")]
    InvalidEnumValue { kind: &'static str, value: u32 },

    #[error("Field overflow: {field} value {value} exceeds {max}")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

/// Result type alias for meter telemetry operations
pub type MeterResult<T> = Result<T, MeterError>;
