//! Error types for the Interview Coach Prep client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user should do next when an action is refused locally.
///
/// Guidance errors never reach the network: they are produced by precondition
/// checks and carry enough information for a renderer to offer a follow-up
/// action instead of a bare error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Guidance {
    /// The user is not signed in.
    SignIn,
    /// No interview attempts remain for today.
    QuotaExhausted,
    /// A resume must be analyzed before interviewing.
    UploadResume { redirect: String },
    /// The answer box is empty.
    EmptyAnswer,
}

impl std::fmt::Display for Guidance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guidance::SignIn => write!(f, "Please sign in to start an interview"),
            Guidance::QuotaExhausted => {
                write!(f, "You have no interview sessions remaining today")
            }
            Guidance::UploadResume { .. } => write!(
                f,
                "Please upload your resume in the dashboard before starting an interview"
            ),
            Guidance::EmptyAnswer => write!(f, "Please type or speak an answer first"),
        }
    }
}

/// A shared error type for the whole client.
///
/// Typed, structured variants with automatic conversion from the common
/// error types via `From`.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum IcpError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (client state storage)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The bearer token was rejected or is missing.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend refused the call because of a quota or rate limit.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status or an unusable body.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// A capture device could not be used.
    #[error("Device error: {0}")]
    Device(String),

    /// The operation is not allowed in the current session phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A previous call of the same kind is still in flight.
    #[error("Busy: {0}")]
    Busy(&'static str),

    /// Rejected locally; the user should follow the attached guidance.
    #[error("{0}")]
    Guidance(Guidance),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IcpError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Device error
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a Backend error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the backend rejected our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Check if this is a guidance (locally rejected) error
    pub fn is_guidance(&self) -> bool {
        matches!(self, Self::Guidance(_))
    }

    /// Returns the guidance payload, if any.
    pub fn guidance(&self) -> Option<&Guidance> {
        match self {
            Self::Guidance(g) => Some(g),
            _ => None,
        }
    }

    /// Check if this error came from talking to the backend.
    ///
    /// Returns true for network failures, non-success statuses and rate limits;
    /// these are the errors a user can retry.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Backend { .. } | Self::RateLimited(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for IcpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for IcpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for IcpError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for IcpError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<Guidance> for IcpError {
    fn from(guidance: Guidance) -> Self {
        Self::Guidance(guidance)
    }
}

/// Conversion from anyhow::Error (used at capability boundaries)
impl From<anyhow::Error> for IcpError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, IcpError>`.
pub type Result<T> = std::result::Result<T, IcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_round_trips_through_error() {
        let err: IcpError = Guidance::QuotaExhausted.into();
        assert!(err.is_guidance());
        assert_eq!(err.guidance(), Some(&Guidance::QuotaExhausted));
        assert!(!err.is_remote());
    }

    #[test]
    fn test_remote_errors_are_retryable() {
        assert!(IcpError::Network("timeout".into()).is_remote());
        assert!(IcpError::backend(500, "boom").is_remote());
        assert!(!IcpError::Unauthorized("expired".into()).is_remote());
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IcpError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }
}
