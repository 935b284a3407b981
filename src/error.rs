//! Error types for the login phase
//!
//! Every error raised during login is fatal to the connection. Most of
//! them are answered with a single Login Response carrying a
//! status-class/status-detail pair before the connection is closed;
//! `reject_status` returns that pair. The two exceptions are transport
//! failures (nothing can be sent) and a non-login opcode on the very
//! first PDU, which RFC 3720 requires to be dropped silently.

use thiserror::Error;

/// Login phase errors
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header or payload could not be parsed, or a value is
    /// syntactically invalid.
    #[error("malformed PDU: {0}")]
    MalformedUnit(String),

    /// A key the protocol requires at this point was not sent.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// CmdSN decreased, or ExpStatSN does not match.
    #[error("sequence violation: {0}")]
    SequenceViolation(String),

    /// Unsupported protocol version or flag.
    #[error("unsupported parameter: {0}")]
    UnsupportedParameter(String),

    /// Requested target does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// CHAP failure, unsupported auth method, or a denying policy.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Initiator name or portal absent from the group's allow-list.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// Out-of-order or repeated protocol step.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The first PDU on a new connection was not a Login Request.
    /// No response may be sent for this one.
    #[error("first PDU has invalid opcode 0x{0:02x}")]
    BadFirstPdu(u8),
}

impl LoginError {
    /// The (status-class, status-detail) pair for the Login Response
    /// rejecting this error, or `None` when no response may be sent.
    pub fn reject_status(&self) -> Option<(u8, u8)> {
        use crate::pdu::login_status::*;
        match self {
            LoginError::Io(_) | LoginError::BadFirstPdu(_) => None,
            LoginError::MalformedUnit(_) => Some((INITIATOR_ERROR, DETAIL_GENERIC)),
            LoginError::MissingParameter(_) => Some((INITIATOR_ERROR, DETAIL_MISSING_PARAMETER)),
            LoginError::SequenceViolation(_) | LoginError::UnsupportedParameter(_) => {
                Some((INITIATOR_ERROR, DETAIL_UNSUPPORTED_VERSION))
            }
            LoginError::NotFound(_) => Some((INITIATOR_ERROR, DETAIL_TARGET_NOT_FOUND)),
            LoginError::PermissionDenied(_) => Some((INITIATOR_ERROR, DETAIL_AUTH_FAILURE)),
            LoginError::NotAllowed(_) => {
                Some((INITIATOR_ERROR, DETAIL_AUTHORIZATION_FAILURE))
            }
            LoginError::ProtocolViolation(_) => {
                Some((INITIATOR_ERROR, DETAIL_INVALID_DURING_LOGIN))
            }
        }
    }
}

/// Result type for login phase operations
pub type LoginResult<T> = Result<T, LoginError>;
