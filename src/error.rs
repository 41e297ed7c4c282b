//! Error types for the tablebook reservation service
//!
//! Domain failures (bad slot, no table, unknown id, double cancel, bad
//! argument) are expected outcomes and carry an [`ErrorKind`] that transports
//! map onto their own wire representation. Infrastructure failures use
//! thiserror `#[from]` conversions, and anyhow is accepted at the binary edge.

use crate::types::TimeSlot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for tablebook operations
#[derive(Error, Debug)]
pub enum TablebookError {
    /// Requested slot is not part of the configured schedule
    #[error("Invalid time slot: {0}")]
    InvalidTimeSlot(String),

    /// No table can seat the party at that date and slot
    #[error("No tables available for {party_size} people on {date} at {time_slot}")]
    NoAvailability {
        date: String,
        time_slot: String,
        party_size: u32,
        /// Slots on the same date that can still seat the party
        alternatives: Vec<TimeSlot>,
    },

    /// Unknown reservation id
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// Unknown table reference
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Reservation was cancelled before
    #[error("Reservation already cancelled: {0}")]
    AlreadyCancelled(String),

    /// Malformed or missing argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tool name not served by this process
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for tablebook operations
pub type Result<T> = std::result::Result<T, TablebookError>;

/// Transport-neutral classification of a [`TablebookError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTimeSlot,
    NoAvailability,
    NotFound,
    AlreadyCancelled,
    InvalidArgument,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidTimeSlot => "invalid_time_slot",
            ErrorKind::NoAvailability => "no_availability",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyCancelled => "already_cancelled",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TablebookError {
    /// Classify this error for transport mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            TablebookError::InvalidTimeSlot(_) => ErrorKind::InvalidTimeSlot,
            TablebookError::NoAvailability { .. } => ErrorKind::NoAvailability,
            TablebookError::ReservationNotFound(_)
            | TablebookError::TableNotFound(_)
            | TablebookError::UnknownTool(_) => ErrorKind::NotFound,
            TablebookError::AlreadyCancelled(_) => ErrorKind::AlreadyCancelled,
            TablebookError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            TablebookError::Config(_)
            | TablebookError::Io(_)
            | TablebookError::Serialization(_)
            | TablebookError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether this is an expected, recoverable outcome to report to the caller
    pub fn is_expected(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    /// Shorthand for an [`TablebookError::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TablebookError::InvalidArgument(message.into())
    }
}

/// Convert anyhow::Error to TablebookError
impl From<anyhow::Error> for TablebookError {
    fn from(err: anyhow::Error) -> Self {
        TablebookError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TablebookError::ReservationNotFound("RES9999".to_string());
        assert_eq!(err.to_string(), "Reservation not found: RES9999");

        let err = TablebookError::NoAvailability {
            date: "2025-11-15".to_string(),
            time_slot: "19:00".to_string(),
            party_size: 4,
            alternatives: vec![],
        };
        assert_eq!(
            err.to_string(),
            "No tables available for 4 people on 2025-11-15 at 19:00"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            TablebookError::TableNotFound("table-9".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TablebookError::AlreadyCancelled("RES0001".into()).kind(),
            ErrorKind::AlreadyCancelled
        );
        assert!(TablebookError::invalid_argument("party_size").is_expected());
        assert!(!TablebookError::Other("boom".into()).is_expected());
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TablebookError = json_err.into();
        assert!(matches!(err, TablebookError::Serialization(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err: TablebookError = anyhow::anyhow!("wrapped").into();
        assert_eq!(err.to_string(), "wrapped");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::NoAvailability).unwrap();
        assert_eq!(json, "\"no_availability\"");
        assert_eq!(ErrorKind::InvalidTimeSlot.to_string(), "invalid_time_slot");
    }
}
