//! Error types for spectrom

use thiserror::Error;

/// Result type alias for spectrom operations
pub type SpectromResult<T> = Result<T, SpectromError>;

/// Error types for data-access and form operations
#[derive(Debug, Error)]
pub enum SpectromError {
    /// Missing or invalid model configuration (table name, default key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognized enumerated input (join direction, comparison operator,
    /// group joiner, ordering, field type)
    #[error("Input error: {0}")]
    Input(String),

    /// Unknown column referenced under strict column checking
    #[error("Column `{column}` not found in table `{table}`")]
    UnknownColumn { column: String, table: String },

    /// Empty or unusable data payload
    #[error("Data error: {0}")]
    Data(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error surfaced by the database handle
    #[error("Database error: {0}")]
    Database(String),
}

impl SpectromError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an input validation error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create an unknown-column error for a specific table
    pub fn unknown_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Create a data error
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Check if this is an input validation error
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }

    /// Check if this is an unknown-column error
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, Self::UnknownColumn { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
