//! Error types for the StrataKV client
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Unified error type for StrataKV client operations
#[derive(Debug, Error)]
pub enum StrataError {
    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("connection failed: {0}")]
    Connection(String),

    // -------------------------------------------------------------------------
    // Conditional-Operation Rejections
    // -------------------------------------------------------------------------
    /// A reject rule fired because the object is absent.
    #[error("object does not exist")]
    ObjectDoesNotExist,

    /// A reject rule fired because the object is present.
    #[error("object already exists")]
    ObjectAlreadyExists,

    /// A version predicate fired. `requested` is the version the caller
    /// supplied in its reject rules; `observed` is the version the service
    /// reported as current at the time of rejection.
    #[error("version conflict: requested {requested} but observed {observed}")]
    VersionConflict { requested: u64, observed: u64 },

    // -------------------------------------------------------------------------
    // Service Errors
    // -------------------------------------------------------------------------
    /// The object is larger than the read buffer the client offered.
    #[error("object exceeds the client read buffer")]
    ValueTooLarge,

    /// Any other non-zero status from the service, preserved verbatim.
    #[error("service error: status {0}")]
    Service(u32),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("transport fault: {0}")]
    Transport(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),
}
