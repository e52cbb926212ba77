//! Room Controller error types.
//!
//! Variants map to wire error codes for client replies. Internal details are
//! logged server-side but not exposed to clients.

use thiserror::Error;

/// Room Controller error type.
///
/// Maps to wire error code values:
/// - `Banned`, `WrongPassword`, `LockMismatch`: `UNAUTHORIZED` (2)
/// - `RoomNotFound`, `ParticipantNotFound`: `NOT_FOUND` (4)
/// - `JoinRejected`: `REJECTED` (5)
/// - `Backend`, `BridgeClosed`, `Internal`: `INTERNAL_ERROR` (6)
/// - `BackendTimeout`: `TIMEOUT` (7)
#[derive(Debug, Error)]
pub enum RcError {
    /// No live session under the requested room id.
    #[error("Room not found")]
    RoomNotFound,

    /// The target is not currently a member of the room.
    #[error("Participant not found")]
    ParticipantNotFound,

    /// The participant is on the room's ban list.
    #[error("Participant is banned")]
    Banned,

    /// Supplied password did not match.
    #[error("Wrong password")]
    WrongPassword,

    /// Supplied owner lock did not match.
    #[error("Owner lock mismatch")]
    LockMismatch,

    /// The backend omitted the participant from an otherwise successful join.
    #[error("Join rejected for participant")]
    JoinRejected,

    /// The backend reported terminal failure for the operation.
    #[error("Backend failure: {0}")]
    Backend(String),

    /// The backend reported the operation timed out.
    ///
    /// Distinct from [`RcError::Backend`] so callers can react differently
    /// to a timeout than to a generic failure.
    #[error("Backend timeout")]
    BackendTimeout,

    /// The bridge shut down before the operation completed.
    #[error("Bridge closed")]
    BridgeClosed,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RcError {
    /// Returns the wire error code value for this error.
    #[must_use]
    pub fn error_code(&self) -> i32 {
        match self {
            RcError::Banned | RcError::WrongPassword | RcError::LockMismatch => 2, // UNAUTHORIZED
            RcError::RoomNotFound | RcError::ParticipantNotFound => 4,             // NOT_FOUND
            RcError::JoinRejected => 5,                                            // REJECTED
            RcError::Backend(_) | RcError::BridgeClosed | RcError::Internal(_) => 6, // INTERNAL_ERROR
            RcError::BackendTimeout => 7,                                          // TIMEOUT
        }
    }

    /// Returns a client-safe error message (no internal details).
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            RcError::Backend(_) | RcError::BridgeClosed | RcError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            RcError::BackendTimeout => "The operation timed out, please retry".to_string(),
            other => other.to_string(),
        }
    }
}
