//! Engine error types

use thiserror::Error;

/// Errors raised at the engine's setup boundaries.
///
/// The per-frame pass never returns these; malformed geometry or unknown
/// particle types degrade to "no particles" instead.
#[derive(Error, Debug)]
pub enum DisintegrateError {
    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A discovery attribute carried a malformed value
    #[error("Invalid value for attribute `{attribute}`: {value:?}")]
    InvalidAttribute { attribute: String, value: String },

    /// Discovery input named no containment mode
    #[error("Missing containment mode (`dis-type`)")]
    MissingMode,

    /// Snapshot buffer length does not match its dimensions
    #[error("Snapshot buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    SnapshotSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The engine was activated before any particle type was registered
    #[error("No particle types registered")]
    NoParticleTypes,

    /// An id that does not belong to this engine
    #[error("Unknown element")]
    UnknownElement,
}

impl DisintegrateError {
    pub(crate) fn attribute(attribute: &str, value: &str) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, DisintegrateError>;
