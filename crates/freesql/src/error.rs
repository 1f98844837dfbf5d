//! Error types for freesql

use thiserror::Error;

/// Result type alias for freesql operations
pub type FreeSqlResult<T> = Result<T, FreeSqlError>;

/// Error types for SQL template building.
///
/// Every variant describes a programmer error in the composition. A build
/// either succeeds completely or fails with one of these; there is no partial
/// output.
#[derive(Debug, Clone, Error)]
pub enum FreeSqlError {
    /// Dialect / logical database mismatch, unknown logical database or an
    /// invalid configuration file.
    #[error("Config error: {0}")]
    Config(String),

    /// Builder misuse: rebinding parameters, marking a non-expression nullable,
    /// unbalanced brackets, placeholder/value mismatch.
    #[error("State error: {0}")]
    State(String),

    /// The shard locator could not map a logical table to a physical shard.
    #[error("Shard resolution error on table '{table}': {message}")]
    ShardResolution { table: String, message: String },
}

impl FreeSqlError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Create a shard resolution error for a specific logical table
    pub fn shard(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShardResolution {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a state error
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this is a shard resolution error
    pub fn is_shard_resolution(&self) -> bool {
        matches!(self, Self::ShardResolution { .. })
    }
}

impl From<toml::de::Error> for FreeSqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
